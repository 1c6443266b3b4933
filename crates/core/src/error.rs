//! Scoring errors

use thiserror::Error;

/// Errors from weight tables, tier tables and aggregation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Weight table is empty")]
    EmptyWeights,

    #[error("Weight for {key} must be finite and non-negative, got {weight}")]
    InvalidWeight { key: String, weight: f64 },

    #[error("Weights must sum to 1.0, got {0}")]
    WeightSum(f64),

    #[error("Duplicate weight for {0}")]
    DuplicateKey(String),

    #[error("Tier table is empty")]
    EmptyTiers,

    #[error("Tier bounds must be strictly ascending")]
    UnorderedTiers,

    #[error("Missing score for {0}")]
    MissingScore(String),

    #[error("Score for {key} is not a finite number: {value}")]
    NonFiniteScore { key: String, value: f64 },
}

/// Result type for scoring operations
pub type ScoringResult<T> = Result<T, ScoringError>;
