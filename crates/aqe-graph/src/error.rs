//! Error taxonomy for graph store operations
//!
//! Validation and not-found errors return synchronously to the caller; the
//! orchestration layer owns user-facing messaging. Persistence errors abort
//! the mutating operation with no partial in-memory state and are surfaced
//! for retry decisions. Conflicts are never auto-resolved; they wait for a
//! caller-driven merge.

use aqe_model::{EdgeId, EdgeType, ModelError, NodeId, NodeKind};
use aqe_store::StoreError;

/// Main graph store error type
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Malformed input (out-of-range score/tier, unknown edge type, ...)
    #[error("validation failed: {0}")]
    Validation(#[from] ModelError),

    /// Reference to an unknown node id
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Name lookup matched no active node
    #[error("no node named {0:?}")]
    NameNotFound(String),

    /// Reference to an unknown edge id
    #[error("edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// Edge was absorbed by a merge and no longer accepts evidence
    #[error("edge retired by merge: {0}")]
    EdgeRetired(EdgeId),

    /// Edge target is not an output node
    #[error("edge target must be an output: {id} is {kind}")]
    InvalidEdgeTarget {
        /// Offending target
        id: NodeId,
        /// Its actual kind
        kind: NodeKind,
    },

    /// Edge source kind does not match the edge type
    #[error("source {id} is {found}, but {edge_type} edges require {expected}")]
    SourceKindMismatch {
        /// Offending source
        id: NodeId,
        /// Its actual kind
        found: NodeKind,
        /// Requested edge type
        edge_type: EdgeType,
        /// Kind the edge type requires
        expected: NodeKind,
    },

    /// Inserting the dependency edge would close a cycle
    #[error("cyclic dependency: {path:?}")]
    CyclicDependency {
        /// Nodes along the would-be cycle, starting and ending at the source
        path: Vec<NodeId>,
    },

    /// Ambiguous entity reference pending explicit disambiguation
    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),

    /// Durable-store failure; the mutation was rolled back
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl GraphError {
    /// Whether retrying the same call can succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Whether the caller's input was rejected (as opposed to state errors)
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidEdgeTarget { .. }
                | Self::SourceKindMismatch { .. }
                | Self::CyclicDependency { .. }
        )
    }
}

/// Ambiguity that only an explicit caller decision can resolve
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    /// Several active nodes answer to the same normalized name
    #[error("ambiguous name {name:?}: candidates {candidates:?}")]
    AmbiguousName {
        /// The queried name
        name: String,
        /// All matching active nodes
        candidates: Vec<NodeId>,
    },

    /// A node cannot be flagged or merged against itself
    #[error("cannot relate node {0} to itself")]
    SelfReference(NodeId),

    /// Duplicate flags and merges require matching node kinds
    #[error("kind mismatch: {a} is {a_kind}, {b} is {b_kind}")]
    KindMismatch {
        a: NodeId,
        a_kind: NodeKind,
        b: NodeId,
        b_kind: NodeKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_is_the_only_retryable_class() {
        let err = GraphError::Persistence(StoreError::Unavailable("down".to_string()));
        assert!(err.is_retryable());
        assert!(!err.is_validation());

        let err = GraphError::NodeNotFound(NodeId::new("node-x"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn cycle_and_kind_errors_classify_as_validation() {
        let err = GraphError::CyclicDependency {
            path: vec![NodeId::new("a"), NodeId::new("b"), NodeId::new("a")],
        };
        assert!(err.is_validation());

        let err = GraphError::SourceKindMismatch {
            id: NodeId::new("node-x"),
            found: NodeKind::Tool,
            edge_type: EdgeType::TeamExecution,
            expected: NodeKind::People,
        };
        assert!(err.is_validation());
        assert!(err.to_string().contains("team_execution"));
    }

    #[test]
    fn model_errors_convert() {
        let err: GraphError = ModelError::ScoreOutOfRange(9).into();
        assert!(err.is_validation());
    }
}
