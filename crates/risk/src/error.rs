//! Risk engine errors

use kycshield_core::ScoringError;
use kycshield_liveness::LivenessError;
use thiserror::Error;

/// Errors from the Risk Engine
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("Computation error in {factor}: {reason}")]
    Computation { factor: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("External service timeout after {0}ms")]
    ExternalServiceTimeout(u64),

    #[error("Liveness error: {0}")]
    Liveness(#[from] LivenessError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type for risk operations
pub type RiskResult<T> = Result<T, RiskError>;

impl RiskError {
    pub fn computation(factor: impl ToString, reason: impl Into<String>) -> Self {
        RiskError::Computation {
            factor: factor.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if this error came from an external collaborator
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            RiskError::ExternalService(_) | RiskError::ExternalServiceTimeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computation_error() {
        let err = RiskError::computation("document_quality", "OCR confidence is NaN");
        assert_eq!(
            err.to_string(),
            "Computation error in document_quality: OCR confidence is NaN"
        );
        assert!(!err.is_external());
    }

    #[test]
    fn test_timeout_error() {
        let err = RiskError::ExternalServiceTimeout(500);
        assert!(err.is_external());
        assert!(err.to_string().contains("500ms"));
    }

    #[test]
    fn test_from_scoring_error() {
        let err: RiskError = ScoringError::WeightSum(0.9).into();
        assert!(matches!(err, RiskError::Scoring(_)));
    }
}
