//! The abstract storage seam

use aqe_model::{Edge, EdgeId, Node, NodeId, SessionId};
use async_trait::async_trait;
use std::fmt::Debug;

/// Durable-store failures
///
/// A failed write aborts the owning mutation entirely; the graph store rolls
/// its in-memory state back and surfaces this error for the caller's retry
/// decision. Never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Backing store cannot be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A read completed but returned malformed data
    #[error("corrupt record for {key}: {detail}")]
    Corrupt {
        /// Session-scoped record key
        key: String,
        /// What failed to decode
        detail: String,
    },

    /// Write rejected by the backing store
    #[error("write failed: {0}")]
    WriteFailed(String),
}

/// Abstract persistence contract, keyed by session and node/edge id
///
/// Implementations must make `put_node`/`put_edge` idempotent by id so that
/// adapter-level retries are safe. List operations return records in a
/// stable order of the adapter's choosing; the engine re-derives all
/// computed state on load, so ordering only affects iteration determinism.
#[async_trait]
pub trait GraphBackend: Send + Sync + Debug {
    /// Fetch a node, `None` if absent
    async fn get_node(
        &self,
        session: &SessionId,
        id: &NodeId,
    ) -> Result<Option<Node>, StoreError>;

    /// Write a node (insert or full overwrite by id)
    async fn put_node(&self, session: &SessionId, node: &Node) -> Result<(), StoreError>;

    /// Fetch an edge, `None` if absent
    async fn get_edge(
        &self,
        session: &SessionId,
        id: &EdgeId,
    ) -> Result<Option<Edge>, StoreError>;

    /// Write an edge with its full evidence list (insert or overwrite by id)
    async fn put_edge(&self, session: &SessionId, edge: &Edge) -> Result<(), StoreError>;

    /// Enumerate all nodes of a session (for session load)
    async fn list_nodes(&self, session: &SessionId) -> Result<Vec<Node>, StoreError>;

    /// Enumerate all edges of a session (for session load)
    async fn list_edges(&self, session: &SessionId) -> Result<Vec<Edge>, StoreError>;

    /// Edges whose target is the given output
    async fn list_edges_by_target(
        &self,
        session: &SessionId,
        output: &NodeId,
    ) -> Result<Vec<Edge>, StoreError>;
}
