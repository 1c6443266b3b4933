//! Session evaluation - verdict, anti-spoofing score and flags

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use kycshield_core::{Flag, Severity};
use serde::{Deserialize, Serialize};

use crate::challenge::ChallengeType;
use crate::config::LivenessConfig;
use crate::error::{LivenessError, LivenessResult};
use crate::session::{ChallengeResult, LivenessSession, SessionState};

/// Baseline anti-spoofing score before any challenge evidence
const ANTI_SPOOFING_BASE: f64 = 50.0;

/// Scores derived from a set of challenge results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivenessScore {
    pub passed: bool,
    pub total_challenges: usize,
    pub completed_challenges: usize,
    pub failed_challenges: usize,
    /// Mean confidence over attempted challenges (0 when none)
    pub mean_confidence: f64,
    pub mean_latency_ms: f64,
    /// 0-100, higher = more likely a live person
    pub anti_spoofing_score: f64,
    pub challenge_types: Vec<ChallengeType>,
    pub flags: Vec<Flag>,
}

/// Verdict for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivenessEvaluation {
    pub session_id: String,
    pub state: SessionState,
    #[serde(flatten)]
    pub score: LivenessScore,
    pub evaluated_at: DateTime<Utc>,
}

impl LivenessEvaluation {
    pub fn passed(&self) -> bool {
        self.score.passed
    }
}

/// Score challenge results against `total` issued challenges.
///
/// Challenges without a result count as not completed.
pub fn score_results(
    total: usize,
    results: &[ChallengeResult],
    config: &LivenessConfig,
) -> LivenessScore {
    let completed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - completed;

    let mean = |values: Vec<f64>| {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    };
    let mean_confidence = mean(results.iter().map(|r| r.confidence).collect());
    let mean_latency_ms = mean(results.iter().map(|r| r.latency_ms as f64).collect());

    let passed = completed >= config.required_completions(total)
        && mean_confidence >= config.min_mean_confidence;

    let challenge_types: Vec<ChallengeType> = results
        .iter()
        .map(|r| r.challenge_type)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut anti_spoofing_score = ANTI_SPOOFING_BASE;
    for result in results {
        if result.passed {
            anti_spoofing_score += 0.4 * result.confidence;
        } else {
            anti_spoofing_score -= 10.0;
        }
    }
    anti_spoofing_score += 5.0 * challenge_types.len() as f64;
    let anti_spoofing_score = anti_spoofing_score.clamp(0.0, 100.0);

    let mut flags = Vec::new();
    if mean_confidence < config.low_confidence_threshold {
        flags.push(Flag::new(
            "low_confidence",
            Severity::Medium,
            format!("Mean challenge confidence {:.1} is low", mean_confidence),
        ));
    }
    if failed > 0 {
        flags.push(
            Flag::new(
                "failed_challenges",
                Severity::High,
                format!("{} of {} challenges failed", failed, total),
            )
            .with_details(
                results
                    .iter()
                    .filter(|r| !r.passed)
                    .map(|r| format!("{}: {}", r.challenge_type, r.details)),
            ),
        );
    }
    if mean_latency_ms > config.slow_latency_ms as f64 {
        flags.push(Flag::new(
            "slow_processing",
            Severity::Low,
            format!("Mean challenge latency {:.0}ms", mean_latency_ms),
        ));
    }

    LivenessScore {
        passed,
        total_challenges: total,
        completed_challenges: completed,
        failed_challenges: failed,
        mean_confidence,
        mean_latency_ms,
        anti_spoofing_score,
        challenge_types,
        flags,
    }
}

/// Evaluates sessions into terminal verdicts
#[derive(Debug, Clone, Default)]
pub struct LivenessEvaluator {
    config: LivenessConfig,
}

impl LivenessEvaluator {
    pub fn new(config: LivenessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LivenessConfig {
        &self.config
    }

    /// Evaluate a session at `now`.
    ///
    /// An expired session is rejected with [`LivenessError::SessionExpired`]
    /// and moves to `Expired`, whatever its challenge outcomes. A session
    /// that already has a verdict cannot be evaluated again.
    pub fn evaluate_session(
        &self,
        session: &mut LivenessSession,
        now: DateTime<Utc>,
    ) -> LivenessResult<LivenessEvaluation> {
        session.check_expiry(now)?;
        if session.state().is_terminal() {
            return Err(LivenessError::SessionTerminal {
                session_id: session.session_id.clone(),
                state: session.state(),
            });
        }

        let score = score_results(session.challenges().len(), session.results(), &self.config);
        session.finish(score.passed);

        tracing::info!(
            session_id = %session.session_id,
            passed = score.passed,
            mean_confidence = score.mean_confidence,
            anti_spoofing = score.anti_spoofing_score,
            "Liveness session evaluated"
        );

        Ok(LivenessEvaluation {
            session_id: session.session_id.clone(),
            state: session.state(),
            score,
            evaluated_at: now,
        })
    }

    /// Evaluate using the wall clock
    pub fn evaluate_session_now(
        &self,
        session: &mut LivenessSession,
    ) -> LivenessResult<LivenessEvaluation> {
        self.evaluate_session(session, Utc::now())
    }
}
