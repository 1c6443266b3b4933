//! Document quality: OCR confidence, image quality and tampering

use crate::error::RiskResult;
use crate::factor::{ensure_finite, AssessmentContext, FactorAssessor, FactorScore, RiskFactor};
use crate::signals::{DocumentSignal, KycSubmission};

const OCR_WEIGHT: f64 = 0.4;
const QUALITY_WEIGHT: f64 = 0.3;
const TAMPERING_WEIGHT: f64 = 0.3;

const BLUR_THRESHOLD: f64 = 50.0;
const BLUR_PENALTY: f64 = 20.0;
const GLARE_THRESHOLD: f64 = 70.0;
const GLARE_PENALTY: f64 = 15.0;
const BRIGHTNESS_RANGE: (f64, f64) = (30.0, 70.0);
const BRIGHTNESS_PENALTY: f64 = 10.0;

/// Upper end of the tamper-detection scale
const MAX_TAMPERING: f64 = 20.0;

/// Scores OCR confidence, image quality and tampering, averaged over documents
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentQualityAssessor;

impl DocumentQualityAssessor {
    fn assess_document(&self, doc: &DocumentSignal, issues: &mut Vec<String>) -> RiskResult<f64> {
        let factor = RiskFactor::DocumentQuality;
        let ocr = ensure_finite(factor, "OCR confidence", doc.ocr_confidence)?;

        let mut quality = 0.0;
        let metrics = &doc.quality_metrics;
        if let Some(blur) = metrics.blur {
            if ensure_finite(factor, "blur", blur)? < BLUR_THRESHOLD {
                quality += BLUR_PENALTY;
                issues.push(format!("Document {}: image is blurry", doc.document_id));
            }
        }
        if let Some(glare) = metrics.glare {
            if ensure_finite(factor, "glare", glare)? > GLARE_THRESHOLD {
                quality += GLARE_PENALTY;
                issues.push(format!("Document {}: excessive glare", doc.document_id));
            }
        }
        if let Some(brightness) = metrics.brightness {
            let brightness = ensure_finite(factor, "brightness", brightness)?;
            if brightness < BRIGHTNESS_RANGE.0 || brightness > BRIGHTNESS_RANGE.1 {
                quality += BRIGHTNESS_PENALTY;
                issues.push(format!("Document {}: poor lighting", doc.document_id));
            }
        }

        let tampering = match doc.tampering_score {
            Some(score) => ensure_finite(factor, "tampering score", score)?.clamp(0.0, MAX_TAMPERING),
            None => {
                issues.push(format!(
                    "Document {}: tampering was not checked",
                    doc.document_id
                ));
                0.0
            }
        };

        Ok(OCR_WEIGHT * (100.0 - ocr) + QUALITY_WEIGHT * quality + TAMPERING_WEIGHT * tampering)
    }
}

impl FactorAssessor for DocumentQualityAssessor {
    fn factor(&self) -> RiskFactor {
        RiskFactor::DocumentQuality
    }

    fn assess(&self, ctx: &AssessmentContext, submission: &KycSubmission) -> RiskResult<FactorScore> {
        if submission.documents.is_empty() {
            tracing::debug!(submission_id = %ctx.submission_id, "no documents to assess");
            return Ok(FactorScore::new(100.0).with_issue("No documents provided."));
        }

        let mut issues = Vec::new();
        let mut total = 0.0;
        for doc in &submission.documents {
            total += self.assess_document(doc, &mut issues)?;
        }
        let count = submission.documents.len() as f64;

        Ok(FactorScore::new(total / count)
            .with_issues(issues)
            .with_metric("documents", count))
    }
}
