//! FQL query runner.
//!
//! Submits query text through the remote client and writes the
//! outcome to the output channel. Exactly one block is appended per
//! invocation and no error ever propagates back to the caller.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

use common::errors::AppError;
use common::models::query::QueryRequest;

use crate::client::FaunaClient;
use crate::output::OutputChannel;

/// Runs FQL queries against the remote service.
pub struct QueryRunner {
    client: Arc<dyn FaunaClient>,
    output: Arc<dyn OutputChannel>,
}

impl QueryRunner {
    /// Creates a runner over a client and an output channel.
    pub fn new(client: Arc<dyn FaunaClient>, output: Arc<dyn OutputChannel>) -> Self {
        Self { client, output }
    }

    /// Executes `query_text` and appends one result or error block.
    pub async fn run(&self, query_text: &str) {
        let request = QueryRequest::new(query_text.trim());
        if let Err(e) = request.validate() {
            let err = AppError::InvalidQuery(e.to_string());
            warn!(error = %err, "query rejected before submission");
            self.emit(format!("ERROR: {}", err));
            return;
        }

        match self.client.query(None, &request.query).await {
            Ok(value) => {
                info!("query succeeded");
                let body = serde_json::to_string_pretty(&value)
                    .unwrap_or_else(|_| value.to_string());
                self.emit(body);
            }
            Err(e) => {
                warn!(error = %e, "query failed");
                self.emit(format!("ERROR: {}", e));
            }
        }
    }

    fn emit(&self, body: String) {
        let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        self.output.append(&format!("[{}]\n{}", stamp, body));
        self.output.show();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use common::errors::{AppError, AppResult};
    use crate::output::BufferChannel;

    struct FixedClient {
        result: Result<Value, String>,
    }

    #[async_trait]
    impl FaunaClient for FixedClient {
        async fn query(&self, _scope: Option<&str>, _fql: &str) -> AppResult<Value> {
            self.result
                .clone()
                .map_err(AppError::QueryFailed)
        }

        async fn list_databases(&self, _scope: Option<&str>) -> AppResult<Vec<Value>> {
            Ok(Vec::new())
        }

        async fn list_collections(&self, _scope: Option<&str>) -> AppResult<Vec<Value>> {
            Ok(Vec::new())
        }

        async fn list_indexes(&self, _scope: Option<&str>) -> AppResult<Vec<Value>> {
            Ok(Vec::new())
        }

        async fn list_functions(&self, _scope: Option<&str>) -> AppResult<Vec<Value>> {
            Ok(Vec::new())
        }

        async fn collection_indexes(
            &self,
            _scope: Option<&str>,
            _collection: &str,
        ) -> AppResult<Vec<Value>> {
            Ok(Vec::new())
        }
    }

    fn runner(result: Result<Value, String>) -> (QueryRunner, Arc<BufferChannel>) {
        let output = Arc::new(BufferChannel::new());
        let runner = QueryRunner::new(
            Arc::new(FixedClient { result }),
            Arc::clone(&output) as Arc<dyn OutputChannel>,
        );
        (runner, output)
    }

    #[tokio::test]
    async fn test_success_writes_one_result_block() {
        let (runner, output) = runner(Ok(json!({"data": ["users"]})));
        runner.run("Paginate(Collections())").await;

        let blocks = output.blocks();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("users"));
        assert!(output.was_shown());
    }

    #[tokio::test]
    async fn test_failure_writes_one_error_block() {
        let (runner, output) = runner(Err("invalid expression".to_string()));
        runner.run("BadSyntax(").await;

        let blocks = output.blocks();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("ERROR"));
        assert!(blocks[0].contains("invalid expression"));
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected_locally() {
        let (runner, output) = runner(Ok(json!(null)));
        runner.run("   ").await;

        let blocks = output.blocks();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("ERROR"));
    }
}
