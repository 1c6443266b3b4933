//! KycShield Core - shared primitives
//!
//! This crate contains the building blocks used by every KycShield engine:
//! - [`similarity`]: edit-distance string similarity for field consistency checks
//! - [`flag`]: `Severity`, `RiskLevel` and explainable `Flag`s
//! - [`scoring`]: weighted aggregation and tier classification, shared by
//!   KYC risk scoring and credit scoring

pub mod error;
pub mod flag;
pub mod scoring;
pub mod similarity;

pub use error::{ScoringError, ScoringResult};
pub use flag::{Flag, RiskLevel, Severity};
pub use scoring::{clamp_score, TierTable, WeightTable};
pub use similarity::{edit_distance, string_similarity};
