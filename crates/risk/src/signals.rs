//! Signal bundle consumed by the assessors
//!
//! Everything here is collaborator output (OCR, quality metrics, face
//! comparison, liveness, geolocation). The engine reads it once per
//! assessment and never modifies it.

use std::collections::BTreeMap;

use kycshield_liveness::LivenessEvaluation;
use serde::{Deserialize, Serialize};

/// Extracted-field key for the holder's name
pub const FIELD_NAME: &str = "name";
/// Extracted-field keys accepted for date of birth
pub const FIELD_DOB: [&str; 2] = ["dob", "date_of_birth"];
/// Extracted-field key for the address
pub const FIELD_ADDRESS: &str = "address";

/// One KYC submission's signals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KycSubmission {
    pub submission_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub documents: Vec<DocumentSignal>,
    #[serde(default)]
    pub face_verification: Option<FaceVerification>,
    #[serde(default)]
    pub additional_data: AdditionalData,
}

impl KycSubmission {
    pub fn new(submission_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            submission_id: submission_id.into(),
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn with_document(mut self, document: DocumentSignal) -> Self {
        self.documents.push(document);
        self
    }

    pub fn with_face_verification(mut self, face: FaceVerification) -> Self {
        self.face_verification = Some(face);
        self
    }

    pub fn with_additional_data(mut self, data: AdditionalData) -> Self {
        self.additional_data = data;
        self
    }

    /// Liveness outcome, if a liveness session was performed
    pub fn liveness(&self) -> Option<&LivenessOutcome> {
        self.face_verification.as_ref()?.liveness.as_ref()
    }

    /// Face match confidence, if a face comparison was performed
    pub fn face_match_confidence(&self) -> Option<f64> {
        self.face_verification.as_ref()?.face_match_confidence
    }
}

/// A submitted identity document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSignal {
    pub document_id: String,
    /// e.g. `aadhaar`, `pan`, `passport`
    pub doc_type: String,
    /// OCR confidence, 0-100
    pub ocr_confidence: f64,
    #[serde(default)]
    pub extracted_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub quality_metrics: QualityMetrics,
    /// External tamper-detection score, 0-20
    #[serde(default)]
    pub tampering_score: Option<f64>,
}

impl DocumentSignal {
    pub fn new(
        document_id: impl Into<String>,
        doc_type: impl Into<String>,
        ocr_confidence: f64,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            doc_type: doc_type.into(),
            ocr_confidence,
            ..Self::default()
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extracted_fields.insert(key.into(), value.into());
        self
    }

    pub fn with_quality(mut self, metrics: QualityMetrics) -> Self {
        self.quality_metrics = metrics;
        self
    }

    pub fn with_tampering_score(mut self, score: f64) -> Self {
        self.tampering_score = Some(score);
        self
    }

    /// Lowercased, trimmed document type
    pub fn normalized_type(&self) -> String {
        self.doc_type.trim().to_lowercase()
    }

    /// Non-empty extracted field
    pub fn field(&self, key: &str) -> Option<&str> {
        self.extracted_fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.field(FIELD_NAME)
    }

    pub fn date_of_birth(&self) -> Option<&str> {
        FIELD_DOB.iter().find_map(|key| self.field(key))
    }

    pub fn address(&self) -> Option<&str> {
        self.field(FIELD_ADDRESS)
    }
}

/// Image quality metrics, each 0-100. Missing metrics are not penalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    #[serde(default)]
    pub blur: Option<f64>,
    #[serde(default)]
    pub glare: Option<f64>,
    #[serde(default)]
    pub brightness: Option<f64>,
}

/// Selfie-side verification results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceVerification {
    /// Reference to the captured selfie, used by the face comparer
    #[serde(default)]
    pub selfie_ref: Option<String>,
    /// Selfie-to-document match confidence, 0-100
    #[serde(default)]
    pub face_match_confidence: Option<f64>,
    #[serde(default)]
    pub liveness: Option<LivenessOutcome>,
}

/// Liveness result as consumed by the risk engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LivenessOutcome {
    pub passed: bool,
    /// Mean challenge confidence, 0-100
    pub confidence: f64,
    #[serde(default)]
    pub failed_challenges: u32,
    #[serde(default)]
    pub anti_spoofing_score: Option<f64>,
    #[serde(default)]
    pub video: Option<VideoSignals>,
}

impl From<&LivenessEvaluation> for LivenessOutcome {
    fn from(evaluation: &LivenessEvaluation) -> Self {
        Self {
            passed: evaluation.passed(),
            confidence: evaluation.score.mean_confidence,
            failed_challenges: evaluation.score.failed_challenges as u32,
            anti_spoofing_score: Some(evaluation.score.anti_spoofing_score),
            video: None,
        }
    }
}

/// Video-level liveness signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSignals {
    pub natural_motion: bool,
    pub face_consistent: bool,
}

/// Network and location context of the submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalData {
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    #[serde(default)]
    pub previous_locations: Vec<GeoLocation>,
    /// External travel/IP risk; summed into the location factor
    #[serde(default)]
    pub travel_risk: Option<TravelRisk>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// ISO country code
    pub country: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl GeoLocation {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            region: None,
            city: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// Travel/IP risk from the external provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelRisk {
    pub score: f64,
    #[serde(default)]
    pub issues: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_fields() {
        let doc = DocumentSignal::new("DOC-1", " Aadhaar ", 92.0)
            .with_field("name", "Priya Sharma")
            .with_field("date_of_birth", "1990-04-12")
            .with_field("address", "   ");

        assert_eq!(doc.normalized_type(), "aadhaar");
        assert_eq!(doc.name(), Some("Priya Sharma"));
        assert_eq!(doc.date_of_birth(), Some("1990-04-12"));
        assert_eq!(doc.address(), None);
    }

    #[test]
    fn test_submission_accessors() {
        let submission = KycSubmission::new("SUB-1", "USER-1").with_face_verification(
            FaceVerification {
                selfie_ref: None,
                face_match_confidence: Some(88.0),
                liveness: Some(LivenessOutcome {
                    passed: true,
                    confidence: 90.0,
                    ..LivenessOutcome::default()
                }),
            },
        );

        assert_eq!(submission.face_match_confidence(), Some(88.0));
        assert!(submission.liveness().unwrap().passed);
    }

    #[test]
    fn test_minimal_json() {
        let json = r#"{
            "submission_id": "SUB-9",
            "documents": [{ "document_id": "D1", "doc_type": "pan", "ocr_confidence": 80 }]
        }"#;
        let submission: KycSubmission = serde_json::from_str(json).unwrap();

        assert_eq!(submission.documents.len(), 1);
        assert!(submission.face_verification.is_none());
        assert!(submission.documents[0].quality_metrics.blur.is_none());
    }
}
