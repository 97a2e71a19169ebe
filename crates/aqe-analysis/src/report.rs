//! Serializable report types for the orchestration layer

use crate::quality::Severity;
use aqe_model::{EdgeType, NodeId};
use serde::{Deserialize, Serialize};

/// Per-edge scoring detail inside an output status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStatus {
    pub edge_type: EdgeType,
    /// Contributing source node
    pub source: NodeId,
    pub score: f64,
    pub confidence: f64,
    pub evidence_count: usize,
}

/// Current assessment state of one output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputStatus {
    pub output_id: NodeId,
    pub name: String,
    /// `None` until the output has at least one evidenced edge
    pub quality: Option<f64>,
    pub per_edge: Vec<EdgeStatus>,
}

/// One edge at the output's minimum score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckEntry {
    pub edge_type: EdgeType,
    /// Static mapping from the edge type; exposed to, never interpreted by,
    /// the recommendation collaborator
    pub root_cause_category: String,
    pub source: NodeId,
    pub score: f64,
}

/// What is limiting an output, relative to a required quality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckReport {
    pub output_id: NodeId,
    pub required_quality: f64,
    /// `None` when the output is unassessed; gap and severity follow suit
    pub quality: Option<f64>,
    pub gap: Option<f64>,
    pub severity: Option<Severity>,
    pub bottlenecks: Vec<BottleneckEntry>,
}

/// One entry of an output comparison, sorted worst-first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRanking {
    pub output_id: NodeId,
    pub name: String,
    pub quality: Option<f64>,
}
