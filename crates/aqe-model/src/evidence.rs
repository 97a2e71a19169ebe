//! Evidence records and their validated value types
//!
//! Evidence is immutable and append-only: a user changing their mind is
//! modeled as a new evidence item, never a mutation of an old one. Every
//! computed edge score is therefore reproducible from the raw evidence log.

use crate::error::ModelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rating in 1..=5, validated at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct EvidenceScore(u8);

impl EvidenceScore {
    /// Validate a raw rating into range
    ///
    /// # Errors
    /// Returns [`ModelError::ScoreOutOfRange`] outside 1..=5.
    pub fn new(score: u8) -> Result<Self, ModelError> {
        if (1..=5).contains(&score) {
            Ok(Self(score))
        } else {
            Err(ModelError::ScoreOutOfRange(score))
        }
    }

    /// Raw rating value
    #[inline]
    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Rating as a float for aggregation
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        f64::from(self.0)
    }
}

impl TryFrom<u8> for EvidenceScore {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EvidenceScore> for u8 {
    fn from(value: EvidenceScore) -> Self {
        value.0
    }
}

impl fmt::Display for EvidenceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Evidence strength classification in 1..=5
///
/// Tier 1 is an inferred or vague statement; tier 5 is quantified and
/// example-backed. Each tier step weighs roughly 3x the one below it, so
/// later, stronger evidence naturally outweighs earlier weak evidence
/// without discarding history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct EvidenceTier(u8);

impl EvidenceTier {
    /// Validate a raw tier into range
    ///
    /// # Errors
    /// Returns [`ModelError::TierOutOfRange`] outside 1..=5.
    pub fn new(tier: u8) -> Result<Self, ModelError> {
        if (1..=5).contains(&tier) {
            Ok(Self(tier))
        } else {
            Err(ModelError::TierOutOfRange(tier))
        }
    }

    /// Raw tier value
    #[inline]
    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Aggregation weight: `3^(tier - 1)`, i.e. {1, 3, 9, 27, 81}
    #[inline]
    #[must_use]
    pub fn weight(&self) -> f64 {
        f64::from(3u32.pow(u32::from(self.0) - 1))
    }
}

impl TryFrom<u8> for EvidenceTier {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EvidenceTier> for u8 {
    fn from(value: EvidenceTier) -> Self {
        value.0
    }
}

impl fmt::Display for EvidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable, tiered observation attached to an edge
///
/// The statement is opaque to the engine; it is produced by the external
/// inference collaborator and kept only for audit and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Rating asserted by the observation
    pub score: EvidenceScore,
    /// Strength classification of the observation
    pub tier: EvidenceTier,
    /// Opaque source statement
    pub statement: String,
    /// When the observation was made
    pub timestamp: DateTime<Utc>,
    /// Idempotency/audit key assigned by the producer
    pub provenance_id: String,
}

impl Evidence {
    /// Build a validated evidence record from raw values
    ///
    /// # Errors
    /// Returns [`ModelError`] if score or tier is out of range or the
    /// statement is empty.
    pub fn new(
        score: u8,
        tier: u8,
        statement: impl Into<String>,
        timestamp: DateTime<Utc>,
        provenance_id: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let statement = statement.into();
        if statement.trim().is_empty() {
            return Err(ModelError::EmptyStatement);
        }
        Ok(Self {
            score: EvidenceScore::new(score)?,
            tier: EvidenceTier::new(tier)?,
            statement,
            timestamp,
            provenance_id: provenance_id.into(),
        })
    }

    /// Aggregation weight of this item, `3^(tier - 1)`
    #[inline]
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.tier.weight()
    }
}
