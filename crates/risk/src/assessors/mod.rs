//! The five factor assessors
//!
//! Each assessor is a pure function of the submission. They share nothing
//! but the similarity primitive and the name-consistency helper below.

mod consistency;
mod document;
mod identity;
mod liveness;
mod location;

pub use consistency::DataConsistencyAssessor;
pub use document::DocumentQualityAssessor;
pub use identity::IdentityMatchAssessor;
pub use liveness::LivenessAssessor;
pub use location::LocationAssessor;

use std::sync::Arc;

use kycshield_core::string_similarity;

use crate::config::RiskConfig;
use crate::factor::FactorAssessor;
use crate::signals::KycSubmission;

/// Similarity below which two document names raise an issue
pub const NAME_SIMILARITY_THRESHOLD: f64 = 0.8;

/// The standard assessor set, one per factor
pub fn default_assessors(config: &RiskConfig) -> Vec<Arc<dyn FactorAssessor>> {
    vec![
        Arc::new(DocumentQualityAssessor),
        Arc::new(IdentityMatchAssessor),
        Arc::new(LivenessAssessor),
        Arc::new(DataConsistencyAssessor),
        Arc::new(LocationAssessor::from_config(config)),
    ]
}

/// Lowest similarity over all pairs; `None` with fewer than two values
pub(crate) fn min_pairwise_similarity(values: &[&str]) -> Option<f64> {
    let mut min: Option<f64> = None;
    for (i, a) in values.iter().enumerate() {
        for b in &values[i + 1..] {
            let similarity = string_similarity(a, b);
            min = Some(min.map_or(similarity, |m| m.min(similarity)));
        }
    }
    min
}

/// Name agreement across documents
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct NameConsistency {
    /// `(1 - min similarity) * 100`, 0 when fewer than two names
    pub risk: f64,
    pub min_similarity: Option<f64>,
}

impl NameConsistency {
    pub fn is_mismatch(&self) -> bool {
        self.min_similarity
            .is_some_and(|s| s < NAME_SIMILARITY_THRESHOLD)
    }
}

pub(crate) fn name_consistency(submission: &KycSubmission) -> NameConsistency {
    let names: Vec<&str> = submission.documents.iter().filter_map(|d| d.name()).collect();
    let min_similarity = min_pairwise_similarity(&names);
    NameConsistency {
        risk: min_similarity.map_or(0.0, |s| (1.0 - s) * 100.0),
        min_similarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::DocumentSignal;

    #[test]
    fn test_min_pairwise_similarity() {
        assert_eq!(min_pairwise_similarity(&[]), None);
        assert_eq!(min_pairwise_similarity(&["abc"]), None);
        assert_eq!(min_pairwise_similarity(&["abc", "ABC", "a b c"]), Some(1.0));

        let min = min_pairwise_similarity(&["abcd", "abcd", "abcx"]).unwrap();
        assert!((min - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_name_consistency() {
        let submission = KycSubmission::new("SUB-1", "U-1")
            .with_document(DocumentSignal::new("D1", "aadhaar", 90.0).with_field("name", "Rahul Verma"))
            .with_document(DocumentSignal::new("D2", "pan", 90.0).with_field("name", "RAHUL VERMA"));

        let consistency = name_consistency(&submission);
        assert_eq!(consistency.risk, 0.0);
        assert!(!consistency.is_mismatch());
    }

    #[test]
    fn test_single_name_has_no_risk() {
        let submission = KycSubmission::new("SUB-1", "U-1")
            .with_document(DocumentSignal::new("D1", "aadhaar", 90.0).with_field("name", "Rahul"));

        let consistency = name_consistency(&submission);
        assert_eq!(consistency.risk, 0.0);
        assert_eq!(consistency.min_similarity, None);
    }

    #[test]
    fn test_default_assessors_cover_every_factor() {
        use crate::factor::RiskFactor;
        use strum::IntoEnumIterator;

        let assessors = default_assessors(&RiskConfig::default());
        let factors: Vec<RiskFactor> = assessors.iter().map(|a| a.factor()).collect();
        assert_eq!(factors, RiskFactor::iter().collect::<Vec<_>>());
    }
}
