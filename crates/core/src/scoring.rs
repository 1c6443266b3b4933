//! Weighted aggregation and tier classification
//!
//! One abstraction serves every "weighted factors then thresholds" model in
//! KycShield: the KYC risk engine and the credit scorer each build a
//! [`WeightTable`] over their own factor keys and a [`TierTable`] over their
//! own tiers.
//!
//! ```text
//! factor scores ──► WeightTable::aggregate ──► 0..=100 ──► TierTable::classify ──► tier
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::error::{ScoringError, ScoringResult};

/// Tolerance used when checking that weights sum to 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Clamp a score into `[0, 100]`.
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Validated factor weights (non-negative, summing to 1.0)
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable<K> {
    weights: Vec<(K, f64)>,
}

impl<K: Ord + Clone + Display> WeightTable<K> {
    /// Build a weight table, rejecting empty, negative, duplicate or
    /// non-normalized weights.
    pub fn new(entries: impl IntoIterator<Item = (K, f64)>) -> ScoringResult<Self> {
        let weights: Vec<(K, f64)> = entries.into_iter().collect();
        if weights.is_empty() {
            return Err(ScoringError::EmptyWeights);
        }

        let mut seen = std::collections::BTreeSet::new();
        for (key, weight) in &weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ScoringError::InvalidWeight {
                    key: key.to_string(),
                    weight: *weight,
                });
            }
            if !seen.insert(key.clone()) {
                return Err(ScoringError::DuplicateKey(key.to_string()));
            }
        }

        let sum: f64 = weights.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringError::WeightSum(sum));
        }

        Ok(Self { weights })
    }

    /// Weight for a key, if present
    pub fn weight(&self, key: &K) -> Option<f64> {
        self.weights.iter().find(|(k, _)| k == key).map(|(_, w)| *w)
    }

    /// Sum of all weights (1.0 within tolerance)
    pub fn total(&self) -> f64 {
        self.weights.iter().map(|(_, w)| w).sum()
    }

    /// `round(Σ score × weight)`, clamped to `[0, 100]`.
    ///
    /// Every weighted key must have a finite score.
    pub fn aggregate(&self, scores: &BTreeMap<K, f64>) -> ScoringResult<f64> {
        let mut total = 0.0;
        for (key, weight) in &self.weights {
            let score = scores
                .get(key)
                .copied()
                .ok_or_else(|| ScoringError::MissingScore(key.to_string()))?;
            if !score.is_finite() {
                return Err(ScoringError::NonFiniteScore {
                    key: key.to_string(),
                    value: score,
                });
            }
            total += clamp_score(score) * weight;
        }

        Ok(clamp_score(total.round()))
    }
}

/// Ascending score bands mapped to tiers
///
/// Each entry is `(lower_bound, tier)`; a score belongs to the last tier
/// whose lower bound it reaches. Scores below the first bound fall into the
/// first tier.
#[derive(Debug, Clone, PartialEq)]
pub struct TierTable<T> {
    tiers: Vec<(f64, T)>,
}

impl<T: Copy> TierTable<T> {
    pub fn new(tiers: impl IntoIterator<Item = (f64, T)>) -> ScoringResult<Self> {
        let tiers: Vec<(f64, T)> = tiers.into_iter().collect();
        if tiers.is_empty() {
            return Err(ScoringError::EmptyTiers);
        }
        let ascending = tiers
            .windows(2)
            .all(|pair| pair[0].0.is_finite() && pair[0].0 < pair[1].0);
        if !ascending || !tiers[tiers.len() - 1].0.is_finite() {
            return Err(ScoringError::UnorderedTiers);
        }
        Ok(Self { tiers })
    }

    /// Classify a score. Total and monotone in `score`.
    pub fn classify(&self, score: f64) -> T {
        self.tiers
            .iter()
            .rev()
            .find(|(bound, _)| score >= *bound)
            .map(|(_, tier)| *tier)
            .unwrap_or(self.tiers[0].1)
    }

    /// Lower bound of a tier, if listed
    pub fn lower_bound(&self, tier: T) -> Option<f64>
    where
        T: PartialEq,
    {
        self.tiers.iter().find(|(_, t)| *t == tier).map(|(b, _)| *b)
    }
}
