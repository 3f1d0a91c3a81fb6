//! Schema tree models.
//!
//! Contains the node types that make up the sidebar schema tree.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a node in the provider's node table.
///
/// Parent references are stored as `NodeId` lookup keys rather than
/// owned edges, so the tree has no cyclic ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Root node id, seeded when the tree is (re)built.
pub const ROOT_ID: NodeId = NodeId(0);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a schema tree node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Synthetic tree root.
    Root,
    /// A database (top level, reachable with the held secret).
    Database,
    /// A collection inside a database.
    Collection,
    /// An index inside a database or sourced by a collection.
    Index,
    /// A user-defined function inside a database.
    Function,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Root => write!(f, "root"),
            NodeKind::Database => write!(f, "database"),
            NodeKind::Collection => write!(f, "collection"),
            NodeKind::Index => write!(f, "index"),
            NodeKind::Function => write!(f, "function"),
        }
    }
}

/// One entry in the schema tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Node identifier within the current tree generation.
    pub id: NodeId,
    /// Display name.
    pub name: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Parent node id (lookup key only; `None` for the root).
    pub parent: Option<NodeId>,
    /// Slash-joined database scope this node lives in. Empty for the
    /// root and for top-level databases' own scope handling.
    pub path: String,
    /// Raw entry returned by the remote listing call, kept for
    /// on-demand display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl SchemaNode {
    /// Creates the synthetic root node.
    pub fn root() -> Self {
        Self {
            id: ROOT_ID,
            name: "root".to_string(),
            kind: NodeKind::Root,
            parent: None,
            path: String::new(),
            detail: None,
        }
    }

    /// Database scope for fetching this node's children: databases
    /// extend their parent scope with their own name, other kinds
    /// inherit it.
    pub fn child_scope(&self) -> String {
        match self.kind {
            NodeKind::Database if self.path.is_empty() => self.name.clone(),
            NodeKind::Database => format!("{}/{}", self.path, self.name),
            _ => self.path.clone(),
        }
    }
}

/// Extracts a display name from a raw listing entry.
///
/// The remote API returns either plain strings, ref objects
/// (`{"@ref": {"id": "users", ...}}`) or full documents with a `name`
/// field; all three shapes are accepted.
pub fn entry_name(entry: &Value) -> Option<String> {
    if let Some(s) = entry.as_str() {
        return Some(s.to_string());
    }
    if let Some(name) = entry.get("name").and_then(Value::as_str) {
        return Some(name.to_string());
    }
    entry
        .pointer("/ref/@ref/id")
        .or_else(|| entry.pointer("/@ref/id"))
        .or_else(|| entry.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
