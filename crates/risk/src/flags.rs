//! Flag generation from factor scores

use std::collections::BTreeMap;

use kycshield_core::{Flag, Severity};

use crate::config::FlagThresholds;
use crate::factor::{FactorScore, RiskFactor};

pub const POOR_DOCUMENT_QUALITY: &str = "poor_document_quality";
pub const IDENTITY_MISMATCH: &str = "identity_mismatch";
pub const LIVENESS_FAILED: &str = "liveness_failed";
pub const DATA_INCONSISTENCY: &str = "data_inconsistency";
pub const HIGH_RISK_LOCATION: &str = "high_risk_location";

/// Flag type, description, and `(base, escalated)` severities per factor
fn flag_rule(factor: RiskFactor) -> (&'static str, &'static str, Severity, Severity) {
    match factor {
        RiskFactor::DocumentQuality => (
            POOR_DOCUMENT_QUALITY,
            "Document quality is below acceptable levels",
            Severity::Medium,
            Severity::High,
        ),
        RiskFactor::IdentityMatch => (
            IDENTITY_MISMATCH,
            "Identity could not be matched to the documents",
            Severity::High,
            Severity::Critical,
        ),
        RiskFactor::LivenessScore => (
            LIVENESS_FAILED,
            "Liveness verification failed or is missing",
            Severity::High,
            Severity::Critical,
        ),
        RiskFactor::DataConsistency => (
            DATA_INCONSISTENCY,
            "Data is inconsistent across documents",
            Severity::High,
            Severity::Critical,
        ),
        RiskFactor::LocationRisk => (
            HIGH_RISK_LOCATION,
            "Submission originates from a high-risk location",
            Severity::Medium,
            Severity::High,
        ),
    }
}

/// Turns factor scores into severity-tagged flags
#[derive(Debug, Clone, Default)]
pub struct FlagGenerator {
    thresholds: FlagThresholds,
}

impl FlagGenerator {
    pub fn new(thresholds: FlagThresholds) -> Self {
        Self { thresholds }
    }

    /// One flag per factor whose score exceeds its trigger, in factor order.
    /// Each flag carries the factor's issues as details.
    pub fn generate(&self, factors: &BTreeMap<RiskFactor, FactorScore>) -> Vec<Flag> {
        factors
            .iter()
            .filter_map(|(factor, score)| {
                let threshold = self.thresholds.for_factor(*factor);
                if score.score <= threshold.trigger {
                    return None;
                }
                let (flag_type, description, base, escalated) = flag_rule(*factor);
                let severity = if score.score > threshold.escalate {
                    escalated
                } else {
                    base
                };
                Some(
                    Flag::new(flag_type, severity, description)
                        .with_details(score.issues.iter().cloned()),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn factors(scores: [f64; 5]) -> BTreeMap<RiskFactor, FactorScore> {
        RiskFactor::iter()
            .zip(scores)
            .map(|(f, s)| (f, FactorScore::new(s)))
            .collect()
    }

    #[test]
    fn test_no_flags_at_thresholds() {
        let flags = FlagGenerator::default().generate(&factors([60.0, 70.0, 50.0, 60.0, 60.0]));
        assert!(flags.is_empty());
    }

    #[test]
    fn test_base_severities() {
        let flags = FlagGenerator::default().generate(&factors([61.0, 71.0, 51.0, 61.0, 61.0]));
        let severities: Vec<(&str, Severity)> = flags
            .iter()
            .map(|f| (f.flag_type.as_str(), f.severity))
            .collect();

        assert_eq!(
            severities,
            vec![
                (POOR_DOCUMENT_QUALITY, Severity::Medium),
                (IDENTITY_MISMATCH, Severity::High),
                (LIVENESS_FAILED, Severity::High),
                (DATA_INCONSISTENCY, Severity::High),
                (HIGH_RISK_LOCATION, Severity::Medium),
            ]
        );
    }

    #[test]
    fn test_escalated_severities() {
        let flags = FlagGenerator::default().generate(&factors([81.0, 86.0, 76.0, 81.0, 81.0]));
        let severities: Vec<Severity> = flags.iter().map(|f| f.severity).collect();

        assert_eq!(
            severities,
            vec![
                Severity::High,
                Severity::Critical,
                Severity::Critical,
                Severity::Critical,
                Severity::High,
            ]
        );
    }

    #[test]
    fn test_details_carry_issues() {
        let mut scores = factors([0.0; 5]);
        scores.insert(
            RiskFactor::LivenessScore,
            FactorScore::new(80.0).with_issue("Liveness check not performed"),
        );

        let flags = FlagGenerator::default().generate(&scores);
        assert_eq!(flags.len(), 1);
        assert!(flags[0].is_critical());
        assert_eq!(flags[0].details, vec!["Liveness check not performed".to_string()]);
    }
}
