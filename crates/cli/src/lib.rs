//! KycShield CLI - command orchestration
//!
//! Every command reads JSON input and returns a serializable result; the
//! binary prints it as pretty JSON.

pub mod commands;

pub use commands::{EnrichOptions, EvidenceFile, EvidenceSubmission, LivenessReport};
