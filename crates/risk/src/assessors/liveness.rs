//! Liveness risk from the challenge-response outcome

use crate::error::RiskResult;
use crate::factor::{ensure_finite, AssessmentContext, FactorAssessor, FactorScore, RiskFactor};
use crate::signals::KycSubmission;

const NO_LIVENESS_RISK: f64 = 80.0;
const NOT_PASSED_PENALTY: f64 = 40.0;
const CONFIDENCE_FLOOR: f64 = 70.0;
const LOW_CONFIDENCE_PENALTY: f64 = 35.0;
const FAILED_CHALLENGE_PENALTY: f64 = 10.0;
const ANTI_SPOOFING_FLOOR: f64 = 60.0;
const ANTI_SPOOFING_PENALTY: f64 = 20.0;
const MOTION_PENALTY: f64 = 15.0;
const FACE_CONSISTENCY_PENALTY: f64 = 10.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct LivenessAssessor;

impl FactorAssessor for LivenessAssessor {
    fn factor(&self) -> RiskFactor {
        RiskFactor::LivenessScore
    }

    fn assess(&self, _ctx: &AssessmentContext, submission: &KycSubmission) -> RiskResult<FactorScore> {
        let Some(liveness) = submission.liveness() else {
            return Ok(FactorScore::new(NO_LIVENESS_RISK).with_issue("Liveness check not performed"));
        };

        let factor = self.factor();
        let mut risk = 0.0;
        let mut issues = Vec::new();

        if !liveness.passed {
            risk += NOT_PASSED_PENALTY;
            issues.push("Liveness check failed".to_string());
        }

        let confidence =
            ensure_finite(factor, "liveness confidence", liveness.confidence)?.clamp(0.0, 100.0);
        if confidence < CONFIDENCE_FLOOR {
            risk += LOW_CONFIDENCE_PENALTY * (CONFIDENCE_FLOOR - confidence) / CONFIDENCE_FLOOR;
            issues.push(format!("Low liveness confidence: {:.1}", confidence));
        }

        if liveness.failed_challenges > 0 {
            risk += FAILED_CHALLENGE_PENALTY * f64::from(liveness.failed_challenges);
            issues.push(format!("{} challenge(s) failed", liveness.failed_challenges));
        }

        if let Some(anti_spoofing) = liveness.anti_spoofing_score {
            if ensure_finite(factor, "anti-spoofing score", anti_spoofing)? < ANTI_SPOOFING_FLOOR {
                risk += ANTI_SPOOFING_PENALTY;
                issues.push("Possible spoofing attempt".to_string());
            }
        }

        if let Some(video) = liveness.video {
            if !video.natural_motion {
                risk += MOTION_PENALTY;
                issues.push("Unnatural motion detected".to_string());
            }
            if !video.face_consistent {
                risk += FACE_CONSISTENCY_PENALTY;
                issues.push("Face inconsistent across frames".to_string());
            }
        }

        Ok(FactorScore::new(risk)
            .with_issues(issues)
            .with_metric("confidence", confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{FaceVerification, LivenessOutcome, VideoSignals};

    fn assess_outcome(outcome: LivenessOutcome) -> FactorScore {
        let submission = KycSubmission::new("SUB-T", "U").with_face_verification(FaceVerification {
            liveness: Some(outcome),
            ..FaceVerification::default()
        });
        LivenessAssessor
            .assess(&AssessmentContext::detached("SUB-T"), &submission)
            .unwrap()
    }

    #[test]
    fn test_no_liveness() {
        let score = LivenessAssessor
            .assess(&AssessmentContext::detached("SUB-T"), &KycSubmission::new("SUB-T", "U"))
            .unwrap();
        assert_eq!(score.score, 80.0);
    }

    #[test]
    fn test_clean_pass() {
        let score = assess_outcome(LivenessOutcome {
            passed: true,
            confidence: 95.0,
            anti_spoofing_score: Some(90.0),
            ..LivenessOutcome::default()
        });
        assert_eq!(score.score, 0.0);
        assert!(score.issues.is_empty());
    }

    #[test]
    fn test_failed_session() {
        let score = assess_outcome(LivenessOutcome {
            passed: false,
            confidence: 35.0,
            failed_challenges: 2,
            anti_spoofing_score: Some(40.0),
            video: Some(VideoSignals {
                natural_motion: false,
                face_consistent: true,
            }),
        });
        // 40 + 17.5 + 20 + 20 + 15, clamped
        assert!((score.score - 100.0).abs() < 1e-9);
        assert_eq!(score.issues.len(), 5);
    }

    #[test]
    fn test_low_confidence_scales() {
        let score = assess_outcome(LivenessOutcome {
            passed: true,
            confidence: 56.0,
            ..LivenessOutcome::default()
        });
        // 35 * 14 / 70
        assert!((score.score - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_confidence_penalty_capped() {
        let score = assess_outcome(LivenessOutcome {
            passed: true,
            confidence: -50.0,
            ..LivenessOutcome::default()
        });
        assert_eq!(score.score, 35.0);
        assert_eq!(score.sub_metrics.get("confidence"), Some(&0.0));
    }
}
