//! FaunaDB schema explorer.
//!
//! Browses a database's schema as a lazily-loaded tree, runs FQL
//! queries from a document, and writes results to an append-only
//! output channel. The command surface is an explicit registry of
//! handler closures over injected dependencies, so any host (console
//! binary, editor integration, tests) can drive it.

pub mod auth;
pub mod client;
pub mod commands;
pub mod content;
pub mod output;
pub mod provider;
pub mod query;
pub mod state;

// Re-export commonly used types
pub use client::{FaunaClient, HttpFaunaClient};
pub use commands::{activate, CommandRegistry, EditorHost, Extension};
pub use content::FqlContentProvider;
pub use output::{BufferChannel, ConsoleChannel, OutputChannel};
pub use provider::SchemaTreeProvider;
pub use query::QueryRunner;
pub use state::AppState;
