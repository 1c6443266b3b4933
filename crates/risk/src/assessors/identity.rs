//! Identity match: face comparison, cross-document name agreement and the
//! mix of submitted document types

use std::collections::BTreeSet;

use crate::assessors::name_consistency;
use crate::error::RiskResult;
use crate::factor::{ensure_finite, AssessmentContext, FactorAssessor, FactorScore, RiskFactor};
use crate::signals::KycSubmission;

/// Document types accepted for identity verification
pub const ALLOWED_DOCUMENT_TYPES: [&str; 6] = [
    "aadhaar",
    "pan",
    "address",
    "passport",
    "voter_id",
    "driving_license",
];

/// Primary IDs; at least one is expected
const PRIMARY_DOCUMENT_TYPES: [&str; 2] = ["aadhaar", "pan"];

const NO_FACE_RISK: f64 = 80.0;
const NAME_WEIGHT: f64 = 0.2;
const DOCUMENT_TYPE_WEIGHT: f64 = 0.1;
const DISALLOWED_TYPE_PENALTY: f64 = 10.0;
const MISSING_PRIMARY_PENALTY: f64 = 15.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMatchAssessor;

fn document_type_risk(submission: &KycSubmission, issues: &mut Vec<String>) -> f64 {
    let types: BTreeSet<String> = submission
        .documents
        .iter()
        .map(|d| d.normalized_type())
        .collect();

    let mut risk = 0.0;
    for doc_type in &types {
        if !ALLOWED_DOCUMENT_TYPES.contains(&doc_type.as_str()) {
            risk += DISALLOWED_TYPE_PENALTY;
            issues.push(format!("Unsupported document type: {}", doc_type));
        }
    }
    if !PRIMARY_DOCUMENT_TYPES.iter().any(|t| types.contains(*t)) {
        risk += MISSING_PRIMARY_PENALTY;
        issues.push("Neither Aadhaar nor PAN provided".to_string());
    }
    f64::min(risk, 100.0)
}

impl FactorAssessor for IdentityMatchAssessor {
    fn factor(&self) -> RiskFactor {
        RiskFactor::IdentityMatch
    }

    fn assess(&self, _ctx: &AssessmentContext, submission: &KycSubmission) -> RiskResult<FactorScore> {
        let mut issues = Vec::new();

        let base = match submission.face_match_confidence() {
            Some(confidence) => {
                let confidence = ensure_finite(self.factor(), "face match confidence", confidence)?;
                100.0 - confidence.clamp(0.0, 100.0)
            }
            None => {
                issues.push("Face verification not performed".to_string());
                NO_FACE_RISK
            }
        };

        let names = name_consistency(submission);
        if names.is_mismatch() {
            issues.push("Name mismatch across documents".to_string());
        }
        let doc_type_risk = document_type_risk(submission, &mut issues);

        let score = base + NAME_WEIGHT * names.risk + DOCUMENT_TYPE_WEIGHT * doc_type_risk;
        Ok(FactorScore::new(score)
            .with_issues(issues)
            .with_metric("face_risk", base)
            .with_metric("name_consistency_risk", names.risk)
            .with_metric("document_type_risk", doc_type_risk))
    }
}
