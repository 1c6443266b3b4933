//! Decision policy with lattice ordering
//!
//! `Accept < ManualReview < Reject`; when outcomes are combined the most
//! restrictive one wins.

use std::cmp::Ordering;

use kycshield_core::{Flag, RiskLevel};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::flags::POOR_DOCUMENT_QUALITY;

/// Final outcome of a KYC assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Decision {
    Accept = 1,
    ManualReview = 2,
    Reject = 3,
}

impl PartialOrd for Decision {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decision {
    fn cmp(&self, other: &Self) -> Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

/// Maps score, tier and flags to review requirement, actions and decision
#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    manual_review_score: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::new(70.0)
    }
}

impl DecisionPolicy {
    pub fn new(manual_review_score: f64) -> Self {
        Self { manual_review_score }
    }

    /// Review is required at the review score or on any critical flag
    pub fn requires_manual_review(&self, overall_score: f64, flags: &[Flag]) -> bool {
        overall_score >= self.manual_review_score || flags.iter().any(Flag::is_critical)
    }

    pub fn recommended_actions(&self, level: RiskLevel, flags: &[Flag]) -> Vec<String> {
        let mut actions = match level {
            RiskLevel::Critical => vec![
                "Immediate manual review",
                "Consider suspension",
                "Additional documentation required",
            ],
            RiskLevel::High => vec!["Manual review recommended"],
            RiskLevel::Medium => vec!["Additional verification checks"],
            RiskLevel::Low => vec!["Standard processing"],
        };
        if level == RiskLevel::Medium && flags.iter().any(|f| f.flag_type == POOR_DOCUMENT_QUALITY) {
            actions.push("Request clearer document images");
        }
        actions.iter().map(|a| a.to_string()).collect()
    }

    pub fn decide(&self, level: RiskLevel, requires_manual_review: bool, flags: &[Flag]) -> Decision {
        if level == RiskLevel::Critical && flags.iter().any(Flag::is_critical) {
            Decision::Reject
        } else if requires_manual_review {
            Decision::ManualReview
        } else {
            Decision::Accept
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kycshield_core::Severity;

    fn flag(flag_type: &str, severity: Severity) -> Flag {
        Flag::new(flag_type, severity, "test")
    }

    #[test]
    fn test_decision_ordering() {
        assert!(Decision::Accept < Decision::ManualReview);
        assert!(Decision::ManualReview < Decision::Reject);
        assert_eq!(
            [Decision::ManualReview, Decision::Accept].into_iter().max(),
            Some(Decision::ManualReview)
        );
    }

    #[test]
    fn test_manual_review_threshold() {
        let policy = DecisionPolicy::default();
        assert!(!policy.requires_manual_review(69.0, &[]));
        assert!(policy.requires_manual_review(70.0, &[]));
    }

    #[test]
    fn test_critical_flag_forces_review() {
        let policy = DecisionPolicy::default();
        let flags = vec![flag("liveness_failed", Severity::Critical)];
        assert!(policy.requires_manual_review(10.0, &flags));
        assert!(!policy.requires_manual_review(10.0, &[flag("identity_mismatch", Severity::High)]));
    }

    #[test]
    fn test_recommended_actions() {
        let policy = DecisionPolicy::default();

        assert_eq!(policy.recommended_actions(RiskLevel::Critical, &[]).len(), 3);
        assert_eq!(
            policy.recommended_actions(RiskLevel::High, &[]),
            vec!["Manual review recommended".to_string()]
        );
        assert_eq!(
            policy.recommended_actions(RiskLevel::Medium, &[flag(POOR_DOCUMENT_QUALITY, Severity::Medium)]),
            vec![
                "Additional verification checks".to_string(),
                "Request clearer document images".to_string()
            ]
        );
        assert_eq!(
            policy.recommended_actions(RiskLevel::Low, &[]),
            vec!["Standard processing".to_string()]
        );
    }

    #[test]
    fn test_decide() {
        let policy = DecisionPolicy::default();
        let critical = vec![flag("identity_mismatch", Severity::Critical)];

        assert_eq!(policy.decide(RiskLevel::Critical, true, &critical), Decision::Reject);
        assert_eq!(policy.decide(RiskLevel::Critical, true, &[]), Decision::ManualReview);
        assert_eq!(policy.decide(RiskLevel::Medium, true, &critical), Decision::ManualReview);
        assert_eq!(policy.decide(RiskLevel::Low, false, &[]), Decision::Accept);
    }
}
