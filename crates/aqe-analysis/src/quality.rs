//! MIN quality, tie detection, and gap severity

use aqe_model::Edge;
use serde::{Deserialize, Serialize};

/// Equality tolerance for MIN-tie detection
///
/// Scores come out of continuous aggregation, so exact float equality would
/// miss genuine ties.
pub const SCORE_EPSILON: f64 = 0.01;

/// Quality of an output: the minimum of its incoming edges' scores
///
/// `None` means "not yet assessed" (no incoming edges), deliberately
/// distinct from any numeric score, so callers never confuse an unassessed
/// output with a poor one.
#[must_use]
pub fn quality(incoming: &[&Edge]) -> Option<f64> {
    incoming
        .iter()
        .map(|e| e.current_score())
        .min_by(|a, b| a.total_cmp(b))
}

/// All incoming edges within [`SCORE_EPSILON`] of the output's quality
///
/// Multiple edges can share the minimum; every one of them is a candidate
/// bottleneck.
#[must_use]
pub fn identify_bottlenecks<'a>(incoming: &[&'a Edge]) -> Vec<&'a Edge> {
    let Some(min) = quality(incoming) else {
        return Vec::new();
    };
    incoming
        .iter()
        .filter(|e| (e.current_score() - min).abs() <= SCORE_EPSILON)
        .copied()
        .collect()
}

/// Gap from a required quality to the current one
#[inline]
#[must_use]
pub fn gap(required: f64, current: f64) -> f64 {
    required - current
}

/// Severity bucket for a quality gap
///
/// Boundaries are inclusive at each bucket's upper edge: a gap of exactly
/// 3.0 is `Significant`, not `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Requirement already met (gap <= 0)
    None,
    /// 0 < gap <= 1
    Minor,
    /// 1 < gap <= 2
    Moderate,
    /// 2 < gap <= 3
    Significant,
    /// gap > 3
    Critical,
}

impl Severity {
    /// Bucket a gap value
    #[must_use]
    pub fn from_gap(gap: f64) -> Self {
        if gap <= 0.0 {
            Self::None
        } else if gap <= 1.0 {
            Self::Minor
        } else if gap <= 2.0 {
            Self::Moderate
        } else if gap <= 3.0 {
            Self::Significant
        } else {
            Self::Critical
        }
    }

    /// Human-readable label
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Significant => "significant",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
