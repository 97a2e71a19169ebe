//! Quality calculation and bottleneck analysis
//!
//! An output's quality is the minimum of its incoming edges' aggregated
//! scores: one weak contributing factor caps the whole deliverable. The
//! bottleneck analyzer names the edge(s) at that minimum, sizes the gap to a
//! required quality, and exposes the static root-cause mapping for the
//! downstream recommendation collaborator.
//!
//! All functions here are total over well-typed input: absence of data is an
//! explicit `None`, never an error, so callers can distinguish "not yet
//! assessed" from "assessed as poor".

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod analyzer;
mod quality;
mod report;

pub use analyzer::Analyzer;
pub use quality::{gap, identify_bottlenecks, quality, Severity, SCORE_EPSILON};
pub use report::{BottleneckEntry, BottleneckReport, EdgeStatus, OutputRanking, OutputStatus};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
