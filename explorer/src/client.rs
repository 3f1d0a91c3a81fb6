//! Remote FaunaDB client.
//!
//! The query surface is an opaque RPC boundary: FQL text goes over the
//! wire verbatim and the remote service owns parsing and execution.
//! Schema introspection is a handful of canned FQL listings over the
//! same endpoint. No retry, pooling, or timeout logic is layered on
//! top of reqwest.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use common::errors::{AppError, AppResult};

/// Remote database client boundary.
///
/// `scope` selects a child database via Fauna scoped-secret syntax;
/// `None` queries the database the secret belongs to.
#[async_trait]
pub trait FaunaClient: Send + Sync {
    /// Submits raw FQL text and returns the result value.
    async fn query(&self, scope: Option<&str>, fql: &str) -> AppResult<Value>;

    /// Lists databases reachable within the scope.
    async fn list_databases(&self, scope: Option<&str>) -> AppResult<Vec<Value>>;

    /// Lists collections within the scope.
    async fn list_collections(&self, scope: Option<&str>) -> AppResult<Vec<Value>>;

    /// Lists indexes within the scope.
    async fn list_indexes(&self, scope: Option<&str>) -> AppResult<Vec<Value>>;

    /// Lists user-defined functions within the scope.
    async fn list_functions(&self, scope: Option<&str>) -> AppResult<Vec<Value>>;

    /// Lists the indexes sourced by one collection within the scope.
    async fn collection_indexes(
        &self,
        scope: Option<&str>,
        collection: &str,
    ) -> AppResult<Vec<Value>>;
}

/// [`FaunaClient`] implementation over the Fauna HTTP API.
pub struct HttpFaunaClient {
    endpoint: String,
    secret: String,
    http: reqwest::Client,
}

impl HttpFaunaClient {
    /// Creates a client for the given endpoint and admin secret.
    pub fn new(endpoint: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            secret: secret.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Secret used for a request: scoped-secret syntax for child
    /// databases, the plain secret otherwise.
    fn scoped_secret(&self, scope: Option<&str>) -> String {
        match scope {
            Some(path) if !path.is_empty() => format!("{}:{}:admin", self.secret, path),
            _ => self.secret.clone(),
        }
    }

    async fn listing(&self, scope: Option<&str>, fql: String) -> AppResult<Vec<Value>> {
        let value = self.query(scope, &fql).await?;
        Ok(as_entries(value))
    }
}

#[async_trait]
impl FaunaClient for HttpFaunaClient {
    async fn query(&self, scope: Option<&str>, fql: &str) -> AppResult<Value> {
        let url = format!("{}/query/1", self.endpoint.trim_end_matches('/'));
        let request_id = Uuid::new_v4().to_string();
        debug!(request_id = %request_id, scope = scope.unwrap_or(""), "submitting query");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.scoped_secret(scope))
            .header("X-Request-Id", &request_id)
            .json(&json!({ "query": fql }))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            return Err(AppError::QueryFailed(describe_error(&body, status)));
        }
        Ok(unwrap_envelope(body))
    }

    async fn list_databases(&self, scope: Option<&str>) -> AppResult<Vec<Value>> {
        self.listing(scope, listing_fql("Databases")).await
    }

    async fn list_collections(&self, scope: Option<&str>) -> AppResult<Vec<Value>> {
        self.listing(scope, listing_fql("Collections")).await
    }

    async fn list_indexes(&self, scope: Option<&str>) -> AppResult<Vec<Value>> {
        self.listing(scope, listing_fql("Indexes")).await
    }

    async fn list_functions(&self, scope: Option<&str>) -> AppResult<Vec<Value>> {
        self.listing(scope, listing_fql("Functions")).await
    }

    async fn collection_indexes(
        &self,
        scope: Option<&str>,
        collection: &str,
    ) -> AppResult<Vec<Value>> {
        let name = serde_json::to_string(collection)?;
        let fql = format!(
            r#"Filter({}, Lambda("doc", Equals(Select(["source", "id"], Var("doc"), ""), {})))"#,
            listing_fql("Indexes"),
            name
        );
        self.listing(scope, fql).await
    }
}

/// Canned FQL listing that resolves each ref to its document so the
/// entries carry names and descriptive fields.
fn listing_fql(set: &str) -> String {
    format!(r#"Map(Paginate({}()), Lambda("ref", Get(Var("ref"))))"#, set)
}

/// Unwraps the response envelope; older deployments answer under
/// `resource`, newer ones under `data`. Unknown shapes pass through.
fn unwrap_envelope(mut body: Value) -> Value {
    if let Some(resource) = body.get_mut("resource") {
        return resource.take();
    }
    body
}

/// Flattens a listing result into its entries.
fn as_entries(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Best-effort error description from a remote error body.
fn describe_error(body: &Value, status: StatusCode) -> String {
    body.pointer("/errors/0/description")
        .or_else(|| body.pointer("/errors/0/code"))
        .or_else(|| body.pointer("/error/message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("remote service answered {}", status))
}
