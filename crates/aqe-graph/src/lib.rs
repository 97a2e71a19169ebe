//! AQE Graph Store
//!
//! Session-scoped owner of node/edge/evidence state and its durability.
//!
//! # Core Concepts
//!
//! - [`GraphStore`]: one instance per active assessment session; all
//!   mutating operations write through to the durable backend before
//!   committing in memory.
//! - Idempotent creation: nodes by (kind, normalized name), edges by
//!   (source, target, edge type). Re-submitting evidence for an existing
//!   edge key appends, never duplicates.
//! - Derived scoring: edge score/confidence are always the aggregator's
//!   output over the append-only evidence list, recomputed on every append
//!   and on session load.
//! - Explicit identity resolution: possible-duplicate flags and evidence-
//!   unioning merges, never silent overwrite.
//!
//! # Example
//!
//! ```rust,ignore
//! use aqe_graph::GraphStore;
//! use aqe_model::{EdgeType, Evidence, NodeKind, SessionId};
//! use aqe_store::MemoryBackend;
//! use std::sync::Arc;
//!
//! let mut store = GraphStore::new(SessionId::generate(), Arc::new(MemoryBackend::new()));
//! let output = store.get_or_create_node(NodeKind::Output, "Monthly forecast").await?;
//! let tool = store.get_or_create_node(NodeKind::Tool, "CRM").await?;
//! let edge = store.get_or_create_edge(&tool, &output, EdgeType::SystemCapabilities).await?;
//! let agg = store.add_evidence(&edge, evidence).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod merge;
mod store;

pub use error::{ConflictError, GraphError};
pub use store::GraphStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
