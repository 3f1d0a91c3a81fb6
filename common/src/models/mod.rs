//! Shared data models for the explorer.

pub mod query;
pub mod schema;

// Re-export commonly used types
pub use query::QueryRequest;
pub use schema::{NodeId, NodeKind, SchemaNode};
