//! Graph nodes: outputs and contributing factors

use crate::error::ModelError;
use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification of a graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A measurable deliverable whose quality is being assessed
    Output,
    /// A system or piece of software contributing to an output
    Tool,
    /// A workflow or procedure contributing to an output
    Process,
    /// A team archetype contributing to an output
    People,
}

impl NodeKind {
    /// Stable string form used in persistence keys
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Output => "output",
            Self::Tool => "tool",
            Self::Process => "process",
            Self::People => "people",
        }
    }

    /// All node kinds, outputs first
    #[must_use]
    pub fn all() -> [NodeKind; 4] {
        [Self::Output, Self::Tool, Self::Process, Self::People]
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "output" => Ok(Self::Output),
            "tool" => Ok(Self::Tool),
            "process" => Ok(Self::Process),
            "people" => Ok(Self::People),
            other => Err(ModelError::UnknownNodeKind(other.to_string())),
        }
    }
}

/// Normalized form of a node name, used for idempotent lookup
///
/// Case and surrounding whitespace do not distinguish entities; the display
/// name keeps its original spelling.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// An output or contributing-factor node
///
/// Nodes are created on first reference and never deleted. A node absorbed
/// by an explicit merge is tombstoned via `merged_into` instead, preserving
/// the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identifier, unique within the session's graph
    pub id: NodeId,
    /// Node classification
    pub kind: NodeKind,
    /// Display name as first referenced
    pub name: String,
    /// Free-text hint for the external inference collaborator; never parsed
    /// by the engine
    pub description: Option<String>,
    /// Set when this node was absorbed by an explicit merge
    pub merged_into: Option<NodeId>,
    /// Unresolved "possible duplicate" relations, pending caller-driven merge
    #[serde(default)]
    pub possible_duplicates: Vec<NodeId>,
}

impl Node {
    /// Create a node with a freshly minted id
    ///
    /// # Errors
    /// Returns [`ModelError::EmptyNodeName`] if the name is blank.
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::EmptyNodeName);
        }
        Ok(Self {
            id: NodeId::generate(),
            kind,
            name,
            description: None,
            merged_into: None,
            possible_duplicates: Vec::new(),
        })
    }

    /// Whether this node was absorbed by a merge
    #[inline]
    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.merged_into.is_some()
    }

    /// Normalized lookup key for this node's name
    #[inline]
    #[must_use]
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_string_roundtrip() {
        for kind in NodeKind::all() {
            assert_eq!(kind.as_str().parse::<NodeKind>().unwrap(), kind);
        }
    }

    #[test]
    fn kind_rejects_unknown_string() {
        assert!(matches!(
            "widget".parse::<NodeKind>(),
            Err(ModelError::UnknownNodeKind(_))
        ));
    }

    #[test]
    fn node_rejects_blank_name() {
        assert_eq!(
            Node::new(NodeKind::Tool, "  "),
            Err(ModelError::EmptyNodeName)
        );
    }

    #[test]
    fn normalization_ignores_case_and_whitespace() {
        assert_eq!(normalize_name("  Monthly Forecast "), "monthly forecast");
    }

    #[test]
    fn fresh_node_is_not_merged() {
        let node = Node::new(NodeKind::Output, "Monthly forecast").unwrap();
        assert!(!node.is_merged());
        assert!(node.possible_duplicates.is_empty());
    }
}
