//! Risk factors, factor scores and the assessor interface

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kycshield_core::clamp_score;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{RiskError, RiskResult};
use crate::signals::KycSubmission;

/// The five independent risk dimensions
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RiskFactor {
    DocumentQuality,
    IdentityMatch,
    LivenessScore,
    DataConsistency,
    LocationRisk,
}

/// One factor's score (0-100, higher = riskier) with its explanations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub score: f64,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub sub_metrics: BTreeMap<String, f64>,
}

impl FactorScore {
    /// A score, clamped into `[0, 100]`
    pub fn new(score: f64) -> Self {
        Self {
            score: clamp_score(score),
            issues: Vec::new(),
            sub_metrics: BTreeMap::new(),
        }
    }

    pub fn with_issue(mut self, issue: impl Into<String>) -> Self {
        self.issues.push(issue.into());
        self
    }

    pub fn with_issues(mut self, issues: impl IntoIterator<Item = String>) -> Self {
        self.issues.extend(issues);
        self
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.sub_metrics.insert(name.into(), value);
        self
    }
}

/// Per-assessment context handed to every assessor.
///
/// Carries the `tracing` span of the assessment call, so everything an
/// assessor logs is attributed to the submission being scored.
#[derive(Debug, Clone)]
pub struct AssessmentContext {
    pub submission_id: String,
    pub assessed_at: DateTime<Utc>,
    span: tracing::Span,
}

impl AssessmentContext {
    pub fn new(
        submission_id: impl Into<String>,
        assessed_at: DateTime<Utc>,
        span: tracing::Span,
    ) -> Self {
        Self {
            submission_id: submission_id.into(),
            assessed_at,
            span,
        }
    }

    /// Context with a fresh span (for tests and ad-hoc use)
    pub fn detached(submission_id: impl Into<String>) -> Self {
        let submission_id = submission_id.into();
        let span = tracing::info_span!("assess_factor", submission_id = %submission_id);
        Self::new(submission_id, Utc::now(), span)
    }

    pub fn span(&self) -> &tracing::Span {
        &self.span
    }
}

/// A pure scorer for one risk factor
///
/// Implementations must not hold mutable state: the engine may run all
/// five assessors concurrently over the same submission.
pub trait FactorAssessor: Send + Sync {
    fn factor(&self) -> RiskFactor;

    /// Score the submission.
    ///
    /// Missing inputs degrade to a conservative score with an issue; only
    /// malformed inputs (e.g. non-finite numbers) are errors.
    fn assess(&self, ctx: &AssessmentContext, submission: &KycSubmission)
        -> RiskResult<FactorScore>;
}

/// Reject NaN/infinite collaborator values
pub(crate) fn ensure_finite(factor: RiskFactor, what: &str, value: f64) -> RiskResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RiskError::computation(
            factor,
            format!("{} is not a finite number ({})", what, value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_factor_names() {
        let names: Vec<String> = RiskFactor::iter().map(|f| f.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "document_quality",
                "identity_match",
                "liveness_score",
                "data_consistency",
                "location_risk"
            ]
        );
    }

    #[test]
    fn test_factor_score_clamped() {
        assert_eq!(FactorScore::new(140.0).score, 100.0);
        assert_eq!(FactorScore::new(-3.0).score, 0.0);
    }

    #[test]
    fn test_factor_score_builders() {
        let score = FactorScore::new(30.0)
            .with_issue("insufficient documents")
            .with_metric("documents", 1.0);

        assert_eq!(score.issues, vec!["insufficient documents".to_string()]);
        assert_eq!(score.sub_metrics.get("documents"), Some(&1.0));
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite(RiskFactor::LocationRisk, "x", 3.0).unwrap(), 3.0);
        let err = ensure_finite(RiskFactor::LocationRisk, "travel score", f64::NAN).unwrap_err();
        assert!(err.to_string().contains("location_risk"));
    }
}
