//! Typed edges and their derived scoring state
//!
//! An edge is uniquely keyed by (source, target, edge type). Its cached
//! score and confidence are always derived from the evidence list; callers
//! can only append evidence and install aggregation results, never set the
//! score directly.

use crate::error::ModelError;
use crate::evidence::Evidence;
use crate::id::{EdgeId, NodeId};
use crate::node::NodeKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of contribution an edge expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// How well the owning team executes
    TeamExecution,
    /// How capable the supporting systems are
    SystemCapabilities,
    /// How mature the surrounding process is
    ProcessMaturity,
    /// Quality of an upstream output this output depends on
    DependencyQuality,
}

impl EdgeType {
    /// Stable string form used in persistence keys and the wire contract
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TeamExecution => "team_execution",
            Self::SystemCapabilities => "system_capabilities",
            Self::ProcessMaturity => "process_maturity",
            Self::DependencyQuality => "dependency_quality",
        }
    }

    /// Node kind a source must have to carry this edge type
    #[inline]
    #[must_use]
    pub fn expected_source_kind(&self) -> NodeKind {
        match self {
            Self::TeamExecution => NodeKind::People,
            Self::SystemCapabilities => NodeKind::Tool,
            Self::ProcessMaturity => NodeKind::Process,
            Self::DependencyQuality => NodeKind::Output,
        }
    }

    /// Static root-cause label for bottleneck reporting
    ///
    /// Exposed to, but never interpreted by, the downstream recommendation
    /// collaborator.
    #[inline]
    #[must_use]
    pub fn root_cause_category(&self) -> &'static str {
        match self {
            Self::TeamExecution => "Execution Issue",
            Self::SystemCapabilities => "System Issue",
            Self::ProcessMaturity => "Process Issue",
            Self::DependencyQuality => "Dependency Issue",
        }
    }

    /// All edge types
    #[must_use]
    pub fn all() -> [EdgeType; 4] {
        [
            Self::TeamExecution,
            Self::SystemCapabilities,
            Self::ProcessMaturity,
            Self::DependencyQuality,
        ]
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team_execution" => Ok(Self::TeamExecution),
            "system_capabilities" => Ok(Self::SystemCapabilities),
            "process_maturity" => Ok(Self::ProcessMaturity),
            "dependency_quality" => Ok(Self::DependencyQuality),
            other => Err(ModelError::UnknownEdgeType(other.to_string())),
        }
    }
}

/// Natural key of an edge: (source, target, edge type)
///
/// Re-submitting evidence for an existing key appends to the existing edge
/// rather than creating a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: NodeId,
    pub target: NodeId,
    pub edge_type: EdgeType,
}

impl EdgeKey {
    /// Build an edge key
    #[inline]
    #[must_use]
    pub fn new(source: NodeId, target: NodeId, edge_type: EdgeType) -> Self {
        Self {
            source,
            target,
            edge_type,
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.edge_type, self.target)
    }
}

/// A directed, typed contribution from a factor node to an output
///
/// # Invariants
/// - `current_score` ∈ [1, 5] and `current_confidence` ∈ [0, 1], both always
///   the aggregator's output over the evidence list
/// - the evidence list is append-only and preserves submission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    id: EdgeId,
    source: NodeId,
    target: NodeId,
    edge_type: EdgeType,
    current_score: f64,
    current_confidence: f64,
    evidence: Vec<Evidence>,
    /// Set when a merge unioned this edge's evidence into a surviving edge;
    /// retired edges are excluded from queries but kept for audit
    #[serde(default)]
    retired: bool,
}

impl Edge {
    /// Create an edge with no evidence
    ///
    /// The caller (the graph store) must immediately install the empty-list
    /// aggregate so the cached values honor the derived-state invariant.
    #[must_use]
    pub fn new(source: NodeId, target: NodeId, edge_type: EdgeType) -> Self {
        Self {
            id: EdgeId::generate(),
            source,
            target,
            edge_type,
            current_score: 0.0,
            current_confidence: 0.0,
            evidence: Vec::new(),
            retired: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> &NodeId {
        &self.source
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> &NodeId {
        &self.target
    }

    #[inline]
    #[must_use]
    pub fn edge_type(&self) -> EdgeType {
        self.edge_type
    }

    /// Cached aggregated score, derived from the evidence list
    #[inline]
    #[must_use]
    pub fn current_score(&self) -> f64 {
        self.current_score
    }

    /// Cached aggregated confidence, derived from the evidence list
    #[inline]
    #[must_use]
    pub fn current_confidence(&self) -> f64 {
        self.current_confidence
    }

    /// Evidence in submission order
    #[inline]
    #[must_use]
    pub fn evidence(&self) -> &[Evidence] {
        &self.evidence
    }

    #[inline]
    #[must_use]
    pub fn evidence_count(&self) -> usize {
        self.evidence.len()
    }

    #[inline]
    #[must_use]
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// Natural key of this edge
    #[inline]
    #[must_use]
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.source.clone(), self.target.clone(), self.edge_type)
    }

    /// Append an evidence item, preserving submission order
    pub fn append_evidence(&mut self, evidence: Evidence) {
        self.evidence.push(evidence);
    }

    /// Install the aggregator's output as the cached derived values
    pub fn set_aggregate(&mut self, score: f64, confidence: f64) {
        self.current_score = score;
        self.current_confidence = confidence;
    }

    /// Mark this edge as absorbed by a merge
    pub fn retire(&mut self) {
        self.retired = true;
    }

    /// Replace the evidence list during a merge union
    ///
    /// Only the graph store's merge operation calls this; ordinary mutation
    /// goes through [`Edge::append_evidence`].
    pub fn replace_evidence_for_merge(&mut self, evidence: Vec<Evidence>) {
        self.evidence = evidence;
    }
}
