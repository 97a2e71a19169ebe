//! Evidence ingestion contract
//!
//! Structured payload produced by the external NL-inference collaborator.
//! The engine only consumes this shape; tier classification, score
//! inference, and entity naming all happen upstream.

use crate::edge::EdgeType;
use crate::error::ModelError;
use crate::evidence::Evidence;
use crate::id::NodeId;
use crate::node::NodeKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a submission's evidence should land
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionTarget {
    /// Kind of the contributing source node
    pub source_kind: NodeKind,
    /// Name of the contributing source node (created on first reference)
    pub source_name: String,
    /// The assessed output; must already exist in the graph
    pub output_id: NodeId,
    /// Contribution kind
    pub edge_type: EdgeType,
}

/// One observation from the external inference collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSubmission {
    pub target: SubmissionTarget,
    /// Rating in 1..=5; validated, never clamped
    pub score: u8,
    /// Strength tier in 1..=5; validated, never clamped
    pub tier: u8,
    /// Opaque source statement
    pub statement: String,
    /// ISO-8601 observation time
    pub timestamp: DateTime<Utc>,
    /// Producer-assigned idempotency/audit key
    pub provenance_id: String,
}

impl EvidenceSubmission {
    /// Validate the raw score/tier and build the evidence record
    ///
    /// # Errors
    /// Returns [`ModelError`] for out-of-range score/tier or an empty
    /// statement.
    pub fn to_evidence(&self) -> Result<Evidence, ModelError> {
        Evidence::new(
            self.score,
            self.tier,
            self.statement.clone(),
            self.timestamp,
            self.provenance_id.clone(),
        )
    }
}
