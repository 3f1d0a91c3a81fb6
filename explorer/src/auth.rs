//! Admin secret resolution.
//!
//! The secret is resolved exactly once at activation: a `FAUNA_KEY`
//! found in the workspace `.faunarc` wins over the configured
//! `admin_secret_key`. Neither source present means activation must
//! abort. The secret value itself is never logged.

use common::config::{AppConfig, CREDENTIALS_FILE, CREDENTIALS_KEY};
use common::utils::env_file;
use tracing::info;

/// Resolves the admin secret from the workspace credentials file or
/// the configuration, in that order of precedence.
pub fn resolve_secret(config: &AppConfig) -> Option<String> {
    if let Some(local) = env_file::read_key(&config.credentials_path(), CREDENTIALS_KEY) {
        info!(source = CREDENTIALS_FILE, "admin secret resolved");
        return Some(local);
    }

    if let Some(configured) = config.admin_secret_key.clone() {
        info!(source = "configuration", "admin secret resolved");
        return Some(configured);
    }

    None
}
