//! Persistence contract for assessment graphs
//!
//! The engine is agnostic to the concrete storage technology: it depends
//! only on [`GraphBackend`], an abstract key-value/document interface keyed
//! by session and node/edge id. Adapters own their retry policy; `put_*`
//! operations are idempotent by id (and evidence carries its producer's
//! `provenance_id`), so retried writes are safe.

#![warn(unreachable_pub)]

mod backend;
mod memory;

pub use backend::{GraphBackend, StoreError};
pub use memory::MemoryBackend;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
