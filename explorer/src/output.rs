//! Append-only output channel.
//!
//! The shared display surface for query results, errors, and node
//! info. Each `append` takes one formatted block; concurrent writers
//! interleave at block granularity only.

use std::sync::Mutex;

/// Append-only text channel visible to the user.
pub trait OutputChannel: Send + Sync {
    /// Appends one formatted block.
    fn append(&self, block: &str);

    /// Brings the channel into view.
    fn show(&self);
}

/// Output channel writing blocks to stdout.
///
/// `show` is a no-op: a console is always in view.
#[derive(Debug, Default)]
pub struct ConsoleChannel;

impl OutputChannel for ConsoleChannel {
    fn append(&self, block: &str) {
        println!("{}", block);
    }

    fn show(&self) {}
}

/// In-memory output channel for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct BufferChannel {
    blocks: Mutex<Vec<String>>,
    shown: Mutex<bool>,
}

impl BufferChannel {
    /// Creates an empty buffer channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all appended blocks, in append order.
    pub fn blocks(&self) -> Vec<String> {
        self.blocks.lock().expect("output buffer poisoned").clone()
    }

    /// Whether `show` has been called at least once.
    pub fn was_shown(&self) -> bool {
        *self.shown.lock().expect("output buffer poisoned")
    }
}

impl OutputChannel for BufferChannel {
    fn append(&self, block: &str) {
        self.blocks
            .lock()
            .expect("output buffer poisoned")
            .push(block.to_string());
    }

    fn show(&self) {
        *self.shown.lock().expect("output buffer poisoned") = true;
    }
}
