//! AQE data model
//!
//! Core types for the evidence-weighted assessment graph:
//!
//! - [`Node`]: an output or contributing factor (tool, process, people)
//! - [`Edge`]: a typed, directed contribution of a factor to an output
//! - [`Evidence`]: an immutable, tiered observation attached to an edge
//! - [`EvidenceSubmission`]: the ingestion contract from the external
//!   inference collaborator
//!
//! # Invariants
//!
//! - Evidence score and tier are validated into 1..=5 at construction;
//!   out-of-range input is rejected, never clamped.
//! - An edge's cached score/confidence are derived state: they can only be
//!   written through [`Edge::set_aggregate`], and the evidence list can only
//!   grow through [`Edge::append_evidence`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod edge;
mod error;
mod evidence;
mod id;
mod node;
mod submission;

pub use edge::{Edge, EdgeKey, EdgeType};
pub use error::ModelError;
pub use evidence::{Evidence, EvidenceScore, EvidenceTier};
pub use id::{EdgeId, NodeId, SessionId};
pub use node::{normalize_name, Node, NodeKind};
pub use submission::{EvidenceSubmission, SubmissionTarget};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
