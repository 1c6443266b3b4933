//! KycShield Risk Engine
//!
//! Turns the signals of one KYC submission into a risk assessment:
//!
//! ```text
//!                  ┌── document_quality ──┐
//!                  ├── identity_match ────┤
//! KycSubmission ───┼── liveness_score ────┼──► weighted score ──► tier ──► flags ──► decision
//!  (immutable)     ├── data_consistency ──┤      (join)
//!                  └── location_risk ─────┘
//! ```
//!
//! Upstream collaborators (face comparison, tamper detection, travel/IP
//! risk, credit bureau) sit behind traits in [`collaborators`]; the
//! [`enrich::SignalEnricher`] resolves their outputs before assessment so
//! the engine itself stays synchronous and pure.
//!
//! ## Key Components
//!
//! - [`config::RiskConfig`] - Weights, tiers, thresholds (not hardcoded)
//! - [`assessors`] - The five factor assessors
//! - [`scoring::KycScorer`] - Aggregation and classification
//! - [`flags::FlagGenerator`] / [`decision::DecisionPolicy`] - Explanations and outcome
//! - [`engine::RiskEngine`] - Main orchestrator
//! - [`lending::CreditScorer`] - Loan scoring over the same aggregator

pub mod assessors;
pub mod collaborators;
pub mod config;
pub mod decision;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod factor;
pub mod flags;
pub mod lending;
pub mod scoring;
pub mod signals;

pub use config::{FactorWeights, FailPolicy, FlagThreshold, FlagThresholds, RiskConfig, TierBounds};
pub use decision::{Decision, DecisionPolicy};
pub use engine::{RiskAssessment, RiskEngine};
pub use enrich::SignalEnricher;
pub use error::{RiskError, RiskResult};
pub use factor::{AssessmentContext, FactorAssessor, FactorScore, RiskFactor};
pub use flags::FlagGenerator;
pub use lending::{
    CreditAssessment, CreditFactor, CreditScorer, CreditWeights, EligibilityPolicy, LendingConfig,
    LoanApplication, LoanDecision,
};
pub use scoring::KycScorer;
pub use signals::{
    AdditionalData, DocumentSignal, FaceVerification, GeoLocation, KycSubmission,
    LivenessOutcome, QualityMetrics, TravelRisk, VideoSignals,
};

pub use kycshield_core::{Flag, RiskLevel, Severity};
