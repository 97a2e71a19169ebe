//! Evidence aggregation
//!
//! Pure, deterministic mapping from an edge's evidence list to a
//! (score, confidence) pair using tiered weighting with Bayesian shrinkage
//! toward a neutral prior.
//!
//! # Algorithm
//!
//! - Per-item weight: `3^(tier - 1)`, so each tier step dominates the one
//!   below it roughly 3x.
//! - Weighted average rating: `WAR = Σ(score·weight) / Σ(weight)`.
//! - Confidence: `W / (W + C)` where `W = Σ(weight)` and `C` is the prior
//!   pseudo-count. Confidence depends only on accumulated weight mass, not
//!   on agreement, so it never decreases as evidence arrives.
//! - Final score: `confidence·WAR + (1 - confidence)·μ`.
//!
//! The numeric result is a commutative weighted sum, so it is independent of
//! evidence order; ordering matters only for audit display, which the graph
//! store preserves separately.

#![warn(unreachable_pub)]

mod aggregate;

pub use aggregate::{aggregate, EdgeAggregate, PRIOR_MEAN, PRIOR_WEIGHT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
