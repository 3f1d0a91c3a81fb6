//! Schema tree provider.
//!
//! Holds the node table for the sidebar tree and fetches children
//! lazily on first expansion. Children are cached until an explicit
//! [`SchemaTreeProvider::refresh`], which discards the whole tree and
//! notifies subscribers; there is no per-node invalidation.
//!
//! Remote failures never cross this layer: a failed listing is logged
//! and surfaced as an empty child list, and the node stays unloaded so
//! a later expansion may retry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use common::errors::{AppError, AppResult};
use common::models::schema::{entry_name, NodeId, NodeKind, SchemaNode, ROOT_ID};

use crate::client::FaunaClient;
use crate::output::OutputChannel;

/// Lazily-loaded schema tree over a [`FaunaClient`].
pub struct SchemaTreeProvider {
    client: Arc<dyn FaunaClient>,
    state: Mutex<TreeState>,
    changes: watch::Sender<u64>,
}

/// Node table for one tree generation.
struct TreeState {
    nodes: HashMap<NodeId, SchemaNode>,
    children: HashMap<NodeId, Vec<NodeId>>,
    next_id: u64,
    generation: u64,
}

impl TreeState {
    fn seeded() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(ROOT_ID, SchemaNode::root());
        Self {
            nodes,
            children: HashMap::new(),
            next_id: 1,
            generation: 0,
        }
    }

    fn insert_child(&mut self, parent: NodeId, kind: NodeKind, path: &str, entry: Value) -> Option<NodeId> {
        let name = entry_name(&entry)?;
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SchemaNode {
                id,
                name,
                kind,
                parent: Some(parent),
                path: path.to_string(),
                detail: Some(entry),
            },
        );
        Some(id)
    }
}

impl SchemaTreeProvider {
    /// Creates a provider with an empty, root-only tree.
    pub fn new(client: Arc<dyn FaunaClient>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            client,
            state: Mutex::new(TreeState::seeded()),
            changes,
        }
    }

    /// Returns a node by id, if it exists in the current generation.
    pub fn node(&self, id: NodeId) -> Option<SchemaNode> {
        self.lock().nodes.get(&id).cloned()
    }

    /// Subscribes to tree-wide change notifications. The value is the
    /// current tree generation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Returns the children of `id` (`None` addresses the root),
    /// fetching them from the remote service on first expansion.
    ///
    /// Cached children are served without remote calls. Concurrent
    /// expansions of the same node may each trigger a fetch; there is
    /// no in-flight coalescing.
    pub async fn get_children(&self, id: Option<NodeId>) -> Vec<SchemaNode> {
        let target = id.unwrap_or(ROOT_ID);

        let (node, generation) = {
            let state = self.lock();
            let Some(node) = state.nodes.get(&target).cloned() else {
                warn!(id = %target, "expansion of unknown node");
                return Vec::new();
            };
            if let Some(ids) = state.children.get(&target) {
                return ids
                    .iter()
                    .filter_map(|child| state.nodes.get(child).cloned())
                    .collect();
            }
            (node, state.generation)
        };

        let entries = match self.fetch_entries(&node).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(node = %node.name, kind = %node.kind, error = %e,
                    "schema listing failed; returning empty children");
                return Vec::new();
            }
        };

        let path = node.child_scope();
        let mut state = self.lock();
        if state.generation != generation {
            // The tree was rebuilt while the fetch was in flight; the
            // result belongs to a discarded generation.
            debug!(node = %node.name, "discarding children from stale tree generation");
            return Vec::new();
        }

        let ids: Vec<NodeId> = entries
            .into_iter()
            .filter_map(|(kind, entry)| state.insert_child(target, kind, &path, entry))
            .collect();
        let children = ids
            .iter()
            .filter_map(|child| state.nodes.get(child).cloned())
            .collect();
        // A concurrent expansion may have cached this node first; drop
        // that batch (and any subtrees under it) from the table.
        let mut stale = state.children.insert(target, ids).unwrap_or_default();
        while let Some(old) = stale.pop() {
            state.nodes.remove(&old);
            if let Some(grandchildren) = state.children.remove(&old) {
                stale.extend(grandchildren);
            }
        }
        children
    }

    /// Discards the whole tree, re-seeds the root, and notifies
    /// subscribers. Coarse-grained by design: no partial refresh.
    pub fn refresh(&self) {
        let generation = {
            let mut state = self.lock();
            let next_id = state.next_id;
            let generation = state.generation + 1;
            *state = TreeState::seeded();
            state.next_id = next_id;
            state.generation = generation;
            generation
        };
        let _ = self.changes.send(generation);
        info!(generation, "schema tree refreshed");
    }

    /// Writes one block with the node's metadata to the output channel
    /// and brings the channel into view.
    pub fn display_info(&self, id: NodeId, output: &dyn OutputChannel) -> AppResult<()> {
        let node = self
            .node(id)
            .ok_or_else(|| AppError::NodeNotFound(id.to_string()))?;

        let mut block = format!("{} ({})", node.name, node.kind);
        if !node.path.is_empty() {
            block.push_str(&format!("\ndatabase: {}", node.path));
        }
        if let Some(detail) = &node.detail {
            block.push_str(&format!("\n{}", serde_json::to_string_pretty(detail)?));
        }
        output.append(&block);
        output.show();
        Ok(())
    }

    /// Resolves a slash-separated name path (for example
    /// `app/users`) by walking the tree, expanding as needed.
    pub async fn resolve_path(&self, path: &str) -> Option<SchemaNode> {
        let mut current = self.node(ROOT_ID)?;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self
                .get_children(Some(current.id))
                .await
                .into_iter()
                .find(|child| child.name == segment)?;
        }
        Some(current)
    }

    /// Lists the child entries for a node, tagged with their kind.
    async fn fetch_entries(&self, node: &SchemaNode) -> AppResult<Vec<(NodeKind, Value)>> {
        let scope_path = node.child_scope();
        let scope = (!scope_path.is_empty()).then_some(scope_path.as_str());

        match node.kind {
            NodeKind::Root => {
                let databases = self.client.list_databases(None).await?;
                Ok(tag(NodeKind::Database, databases))
            }
            NodeKind::Database => {
                let mut entries = tag(NodeKind::Collection, self.client.list_collections(scope).await?);
                entries.extend(tag(NodeKind::Index, self.client.list_indexes(scope).await?));
                entries.extend(tag(NodeKind::Function, self.client.list_functions(scope).await?));
                Ok(entries)
            }
            NodeKind::Collection => {
                let indexes = self.client.collection_indexes(scope, &node.name).await?;
                Ok(tag(NodeKind::Index, indexes))
            }
            // Leaves: cache an empty child list without a remote call.
            NodeKind::Index | NodeKind::Function => Ok(Vec::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TreeState> {
        self.state.lock().expect("schema tree state poisoned")
    }
}

fn tag(kind: NodeKind, entries: Vec<Value>) -> Vec<(NodeKind, Value)> {
    entries.into_iter().map(|entry| (kind, entry)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Semaphore;

    /// Client answering every listing with the same entries and
    /// counting remote calls.
    struct StubClient {
        entries: Vec<Value>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubClient {
        fn with_entries(entries: Vec<Value>) -> Self {
            Self {
                entries,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                entries: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn answer(&self) -> AppResult<Vec<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AppError::QueryFailed("unavailable".to_string()))
            } else {
                Ok(self.entries.clone())
            }
        }
    }

    #[async_trait]
    impl FaunaClient for StubClient {
        async fn query(&self, _scope: Option<&str>, _fql: &str) -> AppResult<Value> {
            self.answer().map(Value::Array)
        }

        async fn list_databases(&self, _scope: Option<&str>) -> AppResult<Vec<Value>> {
            self.answer()
        }

        async fn list_collections(&self, _scope: Option<&str>) -> AppResult<Vec<Value>> {
            self.answer()
        }

        async fn list_indexes(&self, _scope: Option<&str>) -> AppResult<Vec<Value>> {
            self.answer()
        }

        async fn list_functions(&self, _scope: Option<&str>) -> AppResult<Vec<Value>> {
            self.answer()
        }

        async fn collection_indexes(
            &self,
            _scope: Option<&str>,
            _collection: &str,
        ) -> AppResult<Vec<Value>> {
            self.answer()
        }
    }

    /// Client whose first `gated` database listings block until the
    /// test releases them, so fetches can be held in flight. Each
    /// listing answers with a distinct database name (`db0`, `db1`...).
    struct GatedClient {
        gated: usize,
        calls: AtomicUsize,
        started: Semaphore,
        gate: Semaphore,
    }

    impl GatedClient {
        fn new(gated: usize) -> Self {
            Self {
                gated,
                calls: AtomicUsize::new(0),
                started: Semaphore::new(0),
                gate: Semaphore::new(0),
            }
        }
    }

    #[async_trait]
    impl FaunaClient for GatedClient {
        async fn query(&self, _scope: Option<&str>, _fql: &str) -> AppResult<Value> {
            Ok(Value::Null)
        }

        async fn list_databases(&self, _scope: Option<&str>) -> AppResult<Vec<Value>> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            if idx < self.gated {
                self.started.add_permits(1);
                self.gate.acquire().await.expect("gate closed").forget();
            }
            Ok(vec![json!(format!("db{}", idx))])
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

    #[tokio::test]
    async fn test_refresh_discards_in_flight_fetch() {
        let client = Arc::new(GatedClient::new(1));
        let provider = Arc::new(SchemaTreeProvider::new(
            Arc::clone(&client) as Arc<dyn FaunaClient>
        ));

        let pending = {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.get_children(None).await })
        };
        client.started.acquire().await.unwrap().forget();

        // Rebuild the tree while the listing is still in flight.
        provider.refresh();
        client.gate.add_permits(1);

        let stale = pending.await.unwrap();
        assert!(stale.is_empty());

        // The stale completion cached nothing; the next expansion
        // refetches against the rebuilt tree.
        let children = provider.get_children(None).await;
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "db1");
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_double_fetch_leaves_no_orphan_nodes() {
        let client = Arc::new(GatedClient::new(2));
        let provider = Arc::new(SchemaTreeProvider::new(
            Arc::clone(&client) as Arc<dyn FaunaClient>
        ));

        let first = {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.get_children(None).await })
        };
        let second = {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.get_children(None).await })
        };
        client.started.acquire_many(2).await.unwrap().forget();
        client.gate.add_permits(2);

        let first = first.await.unwrap();
        let second = second.await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);

        // Whichever batch cached last wins; the other batch's nodes
        // are removed from the table instead of lingering until the
        // next refresh.
        let children = provider.get_children(None).await;
        assert_eq!(children.len(), 1);
        let survivor = children[0].id;
        for node in first.iter().chain(second.iter()) {
            if node.id == survivor {
                assert!(provider.node(node.id).is_some());
            } else {
                assert!(provider.node(node.id).is_none());
            }
        }
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_root_children_are_databases() {
        let client = Arc::new(StubClient::with_entries(vec![json!("app"), json!("crm")]));
        let provider = SchemaTreeProvider::new(client);

        let children = provider.get_children(None).await;
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|n| n.kind == NodeKind::Database));
        assert_eq!(children[0].name, "app");
    }

    #[tokio::test]
    async fn test_children_cached_until_refresh() {
        let client = Arc::new(StubClient::with_entries(vec![json!("app")]));
        let provider = SchemaTreeProvider::new(Arc::clone(&client) as Arc<dyn FaunaClient>);

        provider.get_children(None).await;
        provider.get_children(None).await;
        assert_eq!(client.calls(), 1);

        provider.refresh();
        provider.get_children(None).await;
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_listing_yields_empty_and_retries() {
        let client = Arc::new(StubClient::failing());
        let provider = SchemaTreeProvider::new(Arc::clone(&client) as Arc<dyn FaunaClient>);

        assert!(provider.get_children(None).await.is_empty());
        // Nothing was cached, so the next expansion calls out again.
        assert!(provider.get_children(None).await.is_empty());
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_database_children_cover_all_kinds() {
        let client = Arc::new(StubClient::with_entries(vec![json!("item")]));
        let provider = SchemaTreeProvider::new(client);

        let databases = provider.get_children(None).await;
        let children = provider.get_children(Some(databases[0].id)).await;

        let kinds: Vec<NodeKind> = children.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Collection, NodeKind::Index, NodeKind::Function]
        );
        assert!(children.iter().all(|n| n.path == databases[0].name));
    }

    #[tokio::test]
    async fn test_leaf_nodes_have_no_children_and_no_calls() {
        let client = Arc::new(StubClient::with_entries(vec![json!("item")]));
        let provider = SchemaTreeProvider::new(Arc::clone(&client) as Arc<dyn FaunaClient>);

        let databases = provider.get_children(None).await;
        let children = provider.get_children(Some(databases[0].id)).await;
        let index = children
            .iter()
            .find(|n| n.kind == NodeKind::Index)
            .cloned()
            .unwrap();

        let before = client.calls();
        assert!(provider.get_children(Some(index.id)).await.is_empty());
        assert_eq!(client.calls(), before);
    }

    #[tokio::test]
    async fn test_refresh_notifies_subscribers() {
        let client = Arc::new(StubClient::with_entries(vec![]));
        let provider = SchemaTreeProvider::new(client);
        let mut rx = provider.subscribe();

        assert_eq!(*rx.borrow(), 0);
        provider.refresh();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);
    }

    #[tokio::test]
    async fn test_display_info_writes_one_block() {
        let client = Arc::new(StubClient::with_entries(vec![json!("app")]));
        let provider = SchemaTreeProvider::new(client);
        let output = crate::output::BufferChannel::new();

        let databases = provider.get_children(None).await;
        provider.display_info(databases[0].id, &output).unwrap();

        let blocks = output.blocks();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("app"));
        assert!(blocks[0].contains("database"));
        assert!(output.was_shown());
    }

    #[tokio::test]
    async fn test_resolve_path_walks_segments() {
        let client = Arc::new(StubClient::with_entries(vec![json!("app")]));
        let provider = SchemaTreeProvider::new(client);

        let node = provider.resolve_path("app/app").await.unwrap();
        assert_eq!(node.kind, NodeKind::Collection);

        assert!(provider.resolve_path("missing").await.is_none());
    }
}
