//! Liveness session state machine
//!
//! Challenges are answered strictly in order. The session clock starts when
//! the session is issued; nothing is accepted after `expires_at`.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::challenge::{Challenge, ChallengeType};
use crate::config::LivenessConfig;
use crate::error::{LivenessError, LivenessResult};
use crate::processor::{process_challenge, EvidenceFrame};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(tag = "state", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    /// Issued, no challenge answered yet
    Created,
    /// Waiting for the challenge at `index`
    Active { index: usize },
    /// Every challenge has a final result
    AwaitingEvaluation,
    Passed,
    Failed,
    Expired,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Passed | SessionState::Failed | SessionState::Expired
        )
    }
}

/// Final result of one challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeResult {
    pub challenge_id: String,
    pub challenge_type: ChallengeType,
    pub passed: bool,
    /// 0-100
    pub confidence: f64,
    /// Time from the challenge becoming active to its final attempt
    pub latency_ms: u64,
    pub attempts: u32,
    pub details: String,
}

/// Outcome of submitting evidence for the active challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Challenge passed; the session moved on
    Passed(ChallengeResult),
    /// Attempt failed but the challenge may be retried
    Retry {
        challenge_id: String,
        attempts_remaining: u32,
        reason: String,
    },
    /// Challenge failed for good; the session moved on
    Failed(ChallengeResult),
}

/// A timed challenge-response session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessSession {
    pub session_id: String,
    challenges: Vec<Challenge>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    state: SessionState,
    results: Vec<ChallengeResult>,
    /// When the current challenge became active
    active_since: DateTime<Utc>,
}

/// Generate a session with the default configuration, starting now.
pub fn generate_challenges() -> LivenessResult<LivenessSession> {
    LivenessSession::generate(&LivenessConfig::default(), &mut rand::thread_rng(), Utc::now())
}

impl LivenessSession {
    /// Pick `challenge_count` distinct challenge types uniformly at random.
    pub fn generate<R: Rng + ?Sized>(
        config: &LivenessConfig,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> LivenessResult<Self> {
        let catalog = ChallengeType::catalog();
        let challenges = catalog
            .choose_multiple(rng, config.challenge_count)
            .map(|t| Challenge::new(*t, config))
            .collect();

        Self::new(challenges, config, now)
    }

    /// Build a session over explicit challenges
    pub fn new(
        challenges: Vec<Challenge>,
        config: &LivenessConfig,
        now: DateTime<Utc>,
    ) -> LivenessResult<Self> {
        let lifetime = config.lifetime_for(challenges.len())?;
        let expires_at = now.checked_add_signed(lifetime).ok_or_else(|| {
            LivenessError::ConfigError(format!("session lifetime {} is out of range", lifetime))
        })?;
        let session_id = format!(
            "LIVE-{}",
            uuid::Uuid::new_v4().to_string()[..8].to_uppercase()
        );

        tracing::debug!(
            session_id = %session_id,
            challenges = challenges.len(),
            "Liveness session generated"
        );

        Ok(Self {
            session_id,
            challenges,
            created_at: now,
            expires_at,
            state: SessionState::Created,
            results: Vec::new(),
            active_since: now,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn results(&self) -> &[ChallengeResult] {
        &self.results
    }

    /// The challenge currently awaiting evidence
    pub fn current_challenge(&self) -> Option<&Challenge> {
        match self.state {
            SessionState::Created => self.challenges.first(),
            SessionState::Active { index } => self.challenges.get(index),
            _ => None,
        }
    }

    /// Strictly after `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Mark the session expired if `now` is past its deadline.
    ///
    /// Returns the `SessionExpired` error so callers can bail with `?`.
    pub fn check_expiry(&mut self, now: DateTime<Utc>) -> LivenessResult<()> {
        if self.state == SessionState::Expired || self.is_expired_at(now) {
            if !self.state.is_terminal() {
                tracing::warn!(session_id = %self.session_id, "Liveness session expired");
                self.state = SessionState::Expired;
            }
            if self.state == SessionState::Expired {
                return Err(LivenessError::SessionExpired {
                    session_id: self.session_id.clone(),
                    expired_at: self.expires_at,
                });
            }
        }
        Ok(())
    }

    /// Submit evidence for the active challenge.
    pub fn submit_challenge(
        &mut self,
        challenge_id: &str,
        frames: &[EvidenceFrame],
        now: DateTime<Utc>,
    ) -> LivenessResult<AttemptOutcome> {
        self.check_expiry(now)?;
        if self.state.is_terminal() {
            return Err(LivenessError::SessionTerminal {
                session_id: self.session_id.clone(),
                state: self.state,
            });
        }

        let index = match self.state {
            SessionState::Created => {
                self.state = SessionState::Active { index: 0 };
                0
            }
            SessionState::Active { index } => index,
            _ => return Err(LivenessError::NoActiveChallenge(self.session_id.clone())),
        };

        let latency_ms = (now - self.active_since).num_milliseconds().max(0) as u64;
        let challenge = self
            .challenges
            .get_mut(index)
            .ok_or_else(|| LivenessError::NoActiveChallenge(self.session_id.clone()))?;

        if challenge.id != challenge_id {
            return Err(LivenessError::UnexpectedChallenge {
                expected: challenge.id.clone(),
                received: challenge_id.to_string(),
            });
        }

        challenge.attempts += 1;

        let (passed, confidence, details) = if latency_ms > challenge.timeout_ms {
            (
                false,
                0.0,
                format!(
                    "Response after {}ms exceeded the {}ms timeout",
                    latency_ms, challenge.timeout_ms
                ),
            )
        } else {
            match process_challenge(challenge.challenge_type, frames, &challenge.parameters) {
                Ok(outcome) => (outcome.passed, outcome.confidence, outcome.details),
                Err(e) if e.is_challenge_validation() => (false, 0.0, e.to_string()),
                Err(e) => return Err(e),
            }
        };

        let timed_out = latency_ms > challenge.timeout_ms;
        if !passed && !timed_out && challenge.attempts_remaining() > 0 {
            tracing::debug!(
                session_id = %self.session_id,
                challenge = %challenge.challenge_type,
                attempts = challenge.attempts,
                "Challenge attempt failed, retry allowed"
            );
            return Ok(AttemptOutcome::Retry {
                challenge_id: challenge.id.clone(),
                attempts_remaining: challenge.attempts_remaining(),
                reason: details,
            });
        }

        challenge.completed = passed;
        let result = ChallengeResult {
            challenge_id: challenge.id.clone(),
            challenge_type: challenge.challenge_type,
            passed,
            confidence,
            latency_ms,
            attempts: challenge.attempts,
            details,
        };
        self.results.push(result.clone());
        self.advance(index, now);

        if passed {
            Ok(AttemptOutcome::Passed(result))
        } else {
            Ok(AttemptOutcome::Failed(result))
        }
    }

    fn advance(&mut self, index: usize, now: DateTime<Utc>) {
        if index + 1 < self.challenges.len() {
            self.state = SessionState::Active { index: index + 1 };
            self.active_since = now;
        } else {
            self.state = SessionState::AwaitingEvaluation;
        }
    }

    /// Record the verdict. Only the evaluator calls this.
    pub(crate) fn finish(&mut self, passed: bool) {
        self.state = if passed {
            SessionState::Passed
        } else {
            SessionState::Failed
        };
    }
}
