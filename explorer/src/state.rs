//! Application state for the explorer.

use std::sync::Arc;

use common::config::AppConfig;

use crate::client::FaunaClient;
use crate::output::OutputChannel;

/// Dependencies shared across command handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub client: Arc<dyn FaunaClient>,
    pub output: Arc<dyn OutputChannel>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        config: AppConfig,
        client: Arc<dyn FaunaClient>,
        output: Arc<dyn OutputChannel>,
    ) -> Self {
        Self {
            config,
            client,
            output,
        }
    }
}
