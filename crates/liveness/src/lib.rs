//! KycShield Liveness - challenge-response anti-spoofing
//!
//! A liveness session asks the applicant to perform a short random sequence
//! of actions (blink, smile, turn head) and scores the evidence measured by
//! an external vision collaborator. Only measurements reach this crate,
//! never imagery.
//!
//! ```text
//!  generate ──► Created ──► Active(0) ──► Active(1) ──► ... ──► AwaitingEvaluation
//!                   │            │                                   │
//!                   └────────────┴──── now > expires_at ──► Expired   ▼
//!                                                            Passed | Failed
//! ```
//!
//! ## Key Components
//!
//! - [`config::LivenessConfig`] - Timeouts, challenge parameters, pass thresholds
//! - [`challenge::ChallengeType`] - The fixed challenge catalog
//! - [`processor::process_challenge`] - Pure per-challenge scoring over evidence frames
//! - [`session::LivenessSession`] - The timed state machine
//! - [`evaluator::LivenessEvaluator`] - Pass/fail verdict, anti-spoofing score, flags

pub mod challenge;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod processor;
pub mod session;

pub use challenge::{Challenge, ChallengeParameters, ChallengeType};
pub use config::LivenessConfig;
pub use error::{LivenessError, LivenessResult};
pub use evaluator::{score_results, LivenessEvaluation, LivenessEvaluator, LivenessScore};
pub use processor::{process_challenge, ChallengeOutcome, EvidenceFrame};
pub use session::{
    generate_challenges, AttemptOutcome, ChallengeResult, LivenessSession, SessionState,
};
