//! Model-level validation errors

/// Validation failures for model construction
///
/// All variants reject malformed input outright; values are never clamped
/// into range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Evidence score outside 1..=5
    #[error("score out of range: {0} (expected 1..=5)")]
    ScoreOutOfRange(u8),

    /// Evidence tier outside 1..=5
    #[error("tier out of range: {0} (expected 1..=5)")]
    TierOutOfRange(u8),

    /// Edge type string not in the known set
    #[error("unknown edge type: {0:?}")]
    UnknownEdgeType(String),

    /// Node kind string not in the known set
    #[error("unknown node kind: {0:?}")]
    UnknownNodeKind(String),

    /// Node name empty after trimming
    #[error("node name must not be empty")]
    EmptyNodeName,

    /// Evidence statement empty after trimming
    #[error("evidence statement must not be empty")]
    EmptyStatement,
}
