//! Liveness errors

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::challenge::ChallengeType;
use crate::session::SessionState;

/// Errors from liveness sessions and challenge processing
#[derive(Debug, Error)]
pub enum LivenessError {
    #[error("Challenge {challenge_type} needs at least {required} evidence samples, got {provided}")]
    InsufficientEvidence {
        challenge_type: ChallengeType,
        required: usize,
        provided: usize,
    },

    #[error("Parameters do not match challenge type {0}")]
    ParameterMismatch(ChallengeType),

    #[error("Session {session_id} expired at {expired_at}")]
    SessionExpired {
        session_id: String,
        expired_at: DateTime<Utc>,
    },

    #[error("Session {session_id} is already {state}")]
    SessionTerminal {
        session_id: String,
        state: SessionState,
    },

    #[error("Expected challenge {expected}, received {received}")]
    UnexpectedChallenge { expected: String, received: String },

    #[error("Session {0} has no active challenge")]
    NoActiveChallenge(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type for liveness operations
pub type LivenessResult<T> = Result<T, LivenessError>;

impl LivenessError {
    /// Check if this error means the session ran out of time
    pub fn is_expired(&self) -> bool {
        matches!(self, LivenessError::SessionExpired { .. })
    }

    /// Check if this error is a per-challenge validation failure
    pub fn is_challenge_validation(&self) -> bool {
        matches!(self, LivenessError::InsufficientEvidence { .. })
    }
}
