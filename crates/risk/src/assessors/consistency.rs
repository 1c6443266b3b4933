//! Cross-document data consistency (name, date of birth, address)

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::assessors::{min_pairwise_similarity, name_consistency};
use crate::error::RiskResult;
use crate::factor::{AssessmentContext, FactorAssessor, FactorScore, RiskFactor};
use crate::signals::{DocumentSignal, KycSubmission};

const INSUFFICIENT_DOCUMENTS_RISK: f64 = 30.0;
const NAME_WEIGHT: f64 = 0.4;
const DOB_WEIGHT: f64 = 0.3;
const ADDRESS_WEIGHT: f64 = 0.3;
const DOB_MISMATCH_RISK: f64 = 50.0;
const ADDRESS_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Date formats seen on Indian identity documents
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, Copy, Default)]
pub struct DataConsistencyAssessor;

/// Parse a date in any accepted format; unparseable values compare verbatim
fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_lowercase())
}

impl FactorAssessor for DataConsistencyAssessor {
    fn factor(&self) -> RiskFactor {
        RiskFactor::DataConsistency
    }

    fn assess(&self, _ctx: &AssessmentContext, submission: &KycSubmission) -> RiskResult<FactorScore> {
        let documents: Vec<&DocumentSignal> = submission
            .documents
            .iter()
            .filter(|d| !d.extracted_fields.is_empty())
            .collect();

        if documents.len() < 2 {
            return Ok(FactorScore::new(INSUFFICIENT_DOCUMENTS_RISK)
                .with_issue("insufficient documents for consistency check")
                .with_metric("documents", documents.len() as f64));
        }

        let mut issues = Vec::new();

        let names = name_consistency(submission);
        if names.is_mismatch() {
            issues.push("Name mismatch across documents".to_string());
        }

        let dates: BTreeSet<String> = documents
            .iter()
            .filter_map(|d| d.date_of_birth())
            .map(normalize_date)
            .collect();
        let dob_risk = if dates.len() > 1 {
            issues.push("Date of birth mismatch across documents".to_string());
            DOB_MISMATCH_RISK
        } else {
            0.0
        };

        let addresses: Vec<&str> = documents.iter().filter_map(|d| d.address()).collect();
        let address_similarity = min_pairwise_similarity(&addresses);
        let address_risk = address_similarity.map_or(0.0, |s| (1.0 - s) * 100.0);
        if address_similarity.is_some_and(|s| s < ADDRESS_SIMILARITY_THRESHOLD) {
            issues.push("Address mismatch across documents".to_string());
        }

        let score = NAME_WEIGHT * names.risk + DOB_WEIGHT * dob_risk + ADDRESS_WEIGHT * address_risk;
        Ok(FactorScore::new(score)
            .with_issues(issues)
            .with_metric("name_risk", names.risk)
            .with_metric("dob_risk", dob_risk)
            .with_metric("address_risk", address_risk))
    }
}
