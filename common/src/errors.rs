//! Application error types.
//!
//! Provides a unified error type shared by all crates in the workspace.

use thiserror::Error;

/// Result alias using [`AppError`].
pub type AppResult<T> = Result<T, AppError>;

/// Unified application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// No admin secret could be resolved from configuration or the
    /// local credentials file. Fatal at activation time.
    #[error("no FaunaDB admin secret key was found in configuration or .faunarc")]
    MissingSecret,

    /// A query was rejected before submission (empty text, invalid request).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The remote service answered with an error response.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A schema node referenced by id or path does not exist.
    #[error("schema node not found: {0}")]
    NodeNotFound(String),

    /// Unknown command identifier passed to the registry.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Transport-level failure talking to the remote service.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed JSON in a remote response.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem failure (credentials file, query document).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
