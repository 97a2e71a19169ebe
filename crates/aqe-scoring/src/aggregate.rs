//! Tier-weighted aggregation with shrinkage toward a neutral prior

use aqe_model::Evidence;
use serde::{Deserialize, Serialize};

/// Neutral prior mean for the 1-5 scale
///
/// Midpoint of the scale. With a single tier-3/score-2 item this yields
/// `9/19·2 + 10/19·2.5 ≈ 2.263`, matching the engine's reference examples.
pub const PRIOR_MEAN: f64 = 2.5;

/// Prior pseudo-count `C`: the weight mass at which confidence reaches 0.5
pub const PRIOR_WEIGHT: f64 = 10.0;

/// Aggregated scoring state of one edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeAggregate {
    /// Shrunk score in [1, 5]
    pub score: f64,
    /// Confidence in [0, 1), strictly increasing in accumulated weight
    pub confidence: f64,
    /// Total accumulated evidence weight `Σ 3^(tier-1)`
    pub total_weight: f64,
    /// Number of evidence items aggregated
    pub evidence_count: usize,
}

impl EdgeAggregate {
    /// Aggregate of an empty evidence list: the prior with zero confidence
    #[inline]
    #[must_use]
    pub fn prior() -> Self {
        Self {
            score: PRIOR_MEAN,
            confidence: 0.0,
            total_weight: 0.0,
            evidence_count: 0,
        }
    }
}

/// Aggregate an edge's evidence list into (score, confidence)
///
/// Total function: empty input yields the neutral prior with zero
/// confidence, never an error. The result is reproducible purely from the
/// evidence log and independent of item order.
#[must_use]
pub fn aggregate(evidence: &[Evidence]) -> EdgeAggregate {
    if evidence.is_empty() {
        return EdgeAggregate::prior();
    }

    let total_weight: f64 = evidence.iter().map(Evidence::weight).sum();
    let weighted_sum: f64 = evidence
        .iter()
        .map(|ev| ev.score.as_f64() * ev.weight())
        .sum();

    let war = weighted_sum / total_weight;
    let confidence = total_weight / (total_weight + PRIOR_WEIGHT);
    let score = confidence * war + (1.0 - confidence) * PRIOR_MEAN;

    EdgeAggregate {
        score,
        confidence,
        total_weight,
        evidence_count: evidence.len(),
    }
}
