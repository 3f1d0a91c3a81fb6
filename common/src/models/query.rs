//! FQL query models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for submitting an FQL query.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct QueryRequest {
    /// FQL text to execute; parsing is left to the remote service.
    #[validate(length(min = 1, message = "FQL query text is required"))]
    pub query: String,
}

impl QueryRequest {
    /// Creates a request from raw query text.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}
