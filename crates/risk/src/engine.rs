//! Risk Engine - Main orchestrator
//!
//! Runs the five factor assessors, joins their scores, and derives the
//! overall score, tier, flags and decision.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kycshield_core::{Flag, RiskLevel};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessors::default_assessors;
use crate::config::RiskConfig;
use crate::decision::{Decision, DecisionPolicy};
use crate::error::RiskResult;
use crate::factor::{AssessmentContext, FactorAssessor, FactorScore, RiskFactor};
use crate::flags::FlagGenerator;
use crate::scoring::KycScorer;
use crate::signals::KycSubmission;

/// Result of one risk assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub assessment_id: String,
    pub submission_id: String,
    pub user_id: String,
    /// Weighted overall score, 0-100
    pub overall_score: f64,
    pub risk_level: RiskLevel,
    /// Per-factor scores with their issues
    pub factors: BTreeMap<RiskFactor, FactorScore>,
    pub flags: Vec<Flag>,
    pub recommended_actions: Vec<String>,
    pub requires_manual_review: bool,
    pub decision: Decision,
    pub assessed_at: DateTime<Utc>,
}

impl RiskAssessment {
    pub fn has_flag(&self, flag_type: &str) -> bool {
        self.flags.iter().any(|f| f.flag_type == flag_type)
    }

    pub fn factor_score(&self, factor: RiskFactor) -> Option<f64> {
        self.factors.get(&factor).map(|f| f.score)
    }
}

/// Main Risk Engine
///
/// Orchestrates:
/// - Factor assessment (parallel on the rayon pool, or sequential)
/// - Weighted aggregation and tier classification
/// - Flag generation and the decision policy
pub struct RiskEngine {
    config: RiskConfig,
    assessors: BTreeMap<RiskFactor, Arc<dyn FactorAssessor>>,
    scorer: KycScorer,
    flags: FlagGenerator,
    policy: DecisionPolicy,
}

impl RiskEngine {
    /// Create an engine with the standard assessors
    pub fn new(config: RiskConfig) -> RiskResult<Self> {
        config.validate()?;
        let assessors = default_assessors(&config)
            .into_iter()
            .map(|a| (a.factor(), a))
            .collect();

        Ok(Self {
            scorer: KycScorer::new(&config)?,
            flags: FlagGenerator::new(config.flag_thresholds.clone()),
            policy: DecisionPolicy::new(config.manual_review_score),
            assessors,
            config,
        })
    }

    /// Replace the assessor for its factor
    pub fn with_assessor(mut self, assessor: Arc<dyn FactorAssessor>) -> Self {
        self.assessors.insert(assessor.factor(), assessor);
        self
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Assess one submission.
    ///
    /// Every factor must score successfully; an assessor error is logged and
    /// returned, never replaced with a default score.
    pub fn assess_risk(&self, submission: &KycSubmission) -> RiskResult<RiskAssessment> {
        let span = tracing::info_span!("assess_risk", submission_id = %submission.submission_id);
        let ctx = AssessmentContext::new(submission.submission_id.clone(), Utc::now(), span);
        let _entered = ctx.span().enter();

        let factors = self.assess_factors(&ctx, submission)?;

        let overall_score = self.scorer.aggregate(&factors).inspect_err(|e| {
            tracing::error!(error = %e, "aggregation failed");
        })?;
        let risk_level = self.scorer.classify(overall_score);
        let flags = self.flags.generate(&factors);
        let requires_manual_review = self.policy.requires_manual_review(overall_score, &flags);
        let recommended_actions = self.policy.recommended_actions(risk_level, &flags);
        let decision = self.policy.decide(risk_level, requires_manual_review, &flags);

        tracing::info!(
            overall_score,
            risk_level = %risk_level,
            flags = flags.len(),
            decision = %decision,
            "risk assessed"
        );

        Ok(RiskAssessment {
            assessment_id: format!("RISK-{}", Uuid::new_v4()),
            submission_id: submission.submission_id.clone(),
            user_id: submission.user_id.clone(),
            overall_score,
            risk_level,
            factors,
            flags,
            recommended_actions,
            requires_manual_review,
            decision,
            assessed_at: ctx.assessed_at,
        })
    }

    /// Run every assessor; the collect is the join point
    fn assess_factors(
        &self,
        ctx: &AssessmentContext,
        submission: &KycSubmission,
    ) -> RiskResult<BTreeMap<RiskFactor, FactorScore>> {
        let assessors: Vec<&Arc<dyn FactorAssessor>> = self.assessors.values().collect();
        let run = |assessor: &&Arc<dyn FactorAssessor>| {
            ctx.span().in_scope(|| run_assessor(assessor, ctx, submission))
        };

        let results: Vec<RiskResult<(RiskFactor, FactorScore)>> = if self.config.parallel_assessment {
            assessors.par_iter().map(run).collect()
        } else {
            assessors.iter().map(run).collect()
        };

        results.into_iter().collect()
    }
}

fn run_assessor(
    assessor: &Arc<dyn FactorAssessor>,
    ctx: &AssessmentContext,
    submission: &KycSubmission,
) -> RiskResult<(RiskFactor, FactorScore)> {
    let factor = assessor.factor();
    match assessor.assess(ctx, submission) {
        Ok(score) => {
            tracing::debug!(factor = %factor, score = score.score, "factor assessed");
            Ok((factor, score))
        }
        Err(e) => {
            tracing::error!(factor = %factor, error = %e, "factor assessment failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RiskError;
    use crate::signals::{DocumentSignal, FaceVerification, LivenessOutcome};

    struct BrokenAssessor;

    impl FactorAssessor for BrokenAssessor {
        fn factor(&self) -> RiskFactor {
            RiskFactor::LocationRisk
        }

        fn assess(&self, _ctx: &AssessmentContext, _submission: &KycSubmission) -> RiskResult<FactorScore> {
            Err(RiskError::computation(self.factor(), "geo lookup returned NaN"))
        }
    }

    struct FixedAssessor(RiskFactor, f64);

    impl FactorAssessor for FixedAssessor {
        fn factor(&self) -> RiskFactor {
            self.0
        }

        fn assess(&self, _ctx: &AssessmentContext, _submission: &KycSubmission) -> RiskResult<FactorScore> {
            Ok(FactorScore::new(self.1))
        }
    }

    fn clean_submission() -> KycSubmission {
        let doc = |id: &str, doc_type: &str| {
            DocumentSignal::new(id, doc_type, 98.0)
                .with_field("name", "Meera Iyer")
                .with_field("dob", "1992-08-30")
                .with_field("address", "7 Lake View Road, Chennai")
                .with_tampering_score(0.0)
        };
        KycSubmission::new("SUB-1", "USER-1")
            .with_document(doc("D1", "aadhaar"))
            .with_document(doc("D2", "pan"))
            .with_face_verification(FaceVerification {
                selfie_ref: None,
                face_match_confidence: Some(96.0),
                liveness: Some(LivenessOutcome {
                    passed: true,
                    confidence: 94.0,
                    ..LivenessOutcome::default()
                }),
            })
    }

    #[test]
    fn test_clean_submission_is_accepted() {
        let engine = RiskEngine::new(RiskConfig::default()).unwrap();
        let assessment = engine.assess_risk(&clean_submission()).unwrap();

        assert_eq!(assessment.factors.len(), 5);
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert_eq!(assessment.decision, Decision::Accept);
        assert!(!assessment.requires_manual_review);
        assert_eq!(assessment.recommended_actions, vec!["Standard processing".to_string()]);
        assert!(assessment.assessment_id.starts_with("RISK-"));
    }

    #[test]
    fn test_assessor_error_propagates() {
        let engine = RiskEngine::new(RiskConfig::default())
            .unwrap()
            .with_assessor(Arc::new(BrokenAssessor));

        let err = engine.assess_risk(&clean_submission()).unwrap_err();
        assert!(matches!(err, RiskError::Computation { ref factor, .. } if factor == "location_risk"));
    }

    #[test]
    fn test_critical_everything_is_rejected() {
        let mut engine = RiskEngine::new(RiskConfig::default()).unwrap();
        for factor in [
            RiskFactor::DocumentQuality,
            RiskFactor::IdentityMatch,
            RiskFactor::LivenessScore,
            RiskFactor::DataConsistency,
            RiskFactor::LocationRisk,
        ] {
            engine = engine.with_assessor(Arc::new(FixedAssessor(factor, 95.0)));
        }

        let assessment = engine.assess_risk(&clean_submission()).unwrap();
        assert_eq!(assessment.overall_score, 95.0);
        assert_eq!(assessment.risk_level, RiskLevel::Critical);
        assert_eq!(assessment.decision, Decision::Reject);
        assert_eq!(assessment.recommended_actions.len(), 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = RiskConfig::default();
        config.weights.location_risk = 0.5;
        assert!(matches!(RiskEngine::new(config), Err(RiskError::Config(_))));
    }

    #[test]
    fn test_serializes_factor_keys_as_names() {
        let engine = RiskEngine::new(RiskConfig::default()).unwrap();
        let assessment = engine.assess_risk(&clean_submission()).unwrap();
        let json = serde_json::to_value(&assessment).unwrap();

        assert!(json["factors"]["identity_match"]["score"].is_number());
        assert_eq!(json["decision"], "accept");
    }
}
