//! In-memory reference backend
//!
//! Thread-safe via DashMap so multiple sessions can share one process-wide
//! instance. Useful as the default for tests and for sessions that opt out
//! of durability.

use crate::backend::{GraphBackend, StoreError};
use aqe_model::{Edge, EdgeId, Node, NodeId, SessionId};
use async_trait::async_trait;
use dashmap::DashMap;

/// DashMap-backed [`GraphBackend`]
#[derive(Debug, Default)]
pub struct MemoryBackend {
    nodes: DashMap<(SessionId, NodeId), Node>,
    edges: DashMap<(SessionId, EdgeId), Edge>,
}

impl MemoryBackend {
    /// Create an empty backend
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total stored nodes across sessions
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total stored edges across sessions
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[async_trait]
impl GraphBackend for MemoryBackend {
    async fn get_node(
        &self,
        session: &SessionId,
        id: &NodeId,
    ) -> Result<Option<Node>, StoreError> {
        Ok(self
            .nodes
            .get(&(session.clone(), id.clone()))
            .map(|entry| entry.value().clone()))
    }

    async fn put_node(&self, session: &SessionId, node: &Node) -> Result<(), StoreError> {
        self.nodes
            .insert((session.clone(), node.id.clone()), node.clone());
        Ok(())
    }

    async fn get_edge(
        &self,
        session: &SessionId,
        id: &EdgeId,
    ) -> Result<Option<Edge>, StoreError> {
        Ok(self
            .edges
            .get(&(session.clone(), id.clone()))
            .map(|entry| entry.value().clone()))
    }

    async fn put_edge(&self, session: &SessionId, edge: &Edge) -> Result<(), StoreError> {
        self.edges
            .insert((session.clone(), edge.id().clone()), edge.clone());
        Ok(())
    }

    async fn list_nodes(&self, session: &SessionId) -> Result<Vec<Node>, StoreError> {
        let mut nodes: Vec<Node> = self
            .nodes
            .iter()
            .filter(|entry| &entry.key().0 == session)
            .map(|entry| entry.value().clone())
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(nodes)
    }

    async fn list_edges(&self, session: &SessionId) -> Result<Vec<Edge>, StoreError> {
        let mut edges: Vec<Edge> = self
            .edges
            .iter()
            .filter(|entry| &entry.key().0 == session)
            .map(|entry| entry.value().clone())
            .collect();
        edges.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(edges)
    }

    async fn list_edges_by_target(
        &self,
        session: &SessionId,
        output: &NodeId,
    ) -> Result<Vec<Edge>, StoreError> {
        let mut edges: Vec<Edge> = self
            .edges
            .iter()
            .filter(|entry| &entry.key().0 == session && entry.value().target() == output)
            .map(|entry| entry.value().clone())
            .collect();
        edges.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqe_model::{EdgeType, Evidence, NodeKind};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn session() -> SessionId {
        SessionId::new("session-1")
    }

    fn node(kind: NodeKind, name: &str) -> Node {
        Node::new(kind, name).unwrap()
    }

    #[tokio::test]
    async fn node_put_then_get_roundtrips() {
        let backend = MemoryBackend::new();
        let n = node(NodeKind::Output, "Monthly forecast");

        backend.put_node(&session(), &n).await.unwrap();
        let found = backend.get_node(&session(), &n.id).await.unwrap();
        assert_eq!(found, Some(n));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let backend = MemoryBackend::new();
        let found = backend
            .get_node(&session(), &NodeId::new("node-missing"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn put_is_idempotent_overwrite_by_id() {
        let backend = MemoryBackend::new();
        let mut n = node(NodeKind::Tool, "CRM");

        backend.put_node(&session(), &n).await.unwrap();
        n.description = Some("sales pipeline system".to_string());
        backend.put_node(&session(), &n).await.unwrap();

        assert_eq!(backend.node_count(), 1);
        let found = backend.get_node(&session(), &n.id).await.unwrap().unwrap();
        assert_eq!(found.description.as_deref(), Some("sales pipeline system"));
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let backend = MemoryBackend::new();
        let n = node(NodeKind::Process, "Forecast review");

        backend.put_node(&session(), &n).await.unwrap();
        let other = SessionId::new("session-2");
        assert!(backend.get_node(&other, &n.id).await.unwrap().is_none());
        assert!(backend.list_nodes(&other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_edges_by_target_filters() {
        let backend = MemoryBackend::new();
        let out_a = NodeId::new("node-out-a");
        let out_b = NodeId::new("node-out-b");
        let src = NodeId::new("node-src");

        let mut edge_a = Edge::new(src.clone(), out_a.clone(), EdgeType::TeamExecution);
        edge_a.append_evidence(
            Evidence::new(3, 2, "missed handoffs", Utc::now(), "p1").unwrap(),
        );
        let edge_b = Edge::new(src, out_b, EdgeType::TeamExecution);

        backend.put_edge(&session(), &edge_a).await.unwrap();
        backend.put_edge(&session(), &edge_b).await.unwrap();

        let found = backend
            .list_edges_by_target(&session(), &out_a)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), edge_a.id());
        assert_eq!(found[0].evidence_count(), 1);
    }
}
