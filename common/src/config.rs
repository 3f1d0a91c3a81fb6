//! Application configuration.
//!
//! Loaded once from environment variables at startup.

use std::path::PathBuf;

/// Default Fauna HTTP API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://db.fauna.com";

/// Name of the local credentials file searched in the workspace.
pub const CREDENTIALS_FILE: &str = ".faunarc";

/// Key looked up inside the credentials file.
pub const CREDENTIALS_KEY: &str = "FAUNA_KEY";

/// Application configuration shared across components.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Admin secret key from configuration (`FAUNA_ADMIN_SECRET_KEY`).
    /// A key found in the workspace `.faunarc` takes precedence.
    pub admin_secret_key: Option<String>,
    /// Base URL of the Fauna HTTP API (`FAUNA_ENDPOINT`).
    pub endpoint: String,
    /// Workspace directory searched for the credentials file
    /// (`FAUNA_WORKSPACE`, defaults to the current directory).
    pub workspace_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_secret_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            workspace_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset. Empty values count as unset.
    pub fn load() -> Self {
        Self {
            admin_secret_key: env_non_empty("FAUNA_ADMIN_SECRET_KEY"),
            endpoint: env_non_empty("FAUNA_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            workspace_dir: env_non_empty("FAUNA_WORKSPACE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Path of the credentials file inside the workspace.
    pub fn credentials_path(&self) -> PathBuf {
        self.workspace_dir.join(CREDENTIALS_FILE)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
