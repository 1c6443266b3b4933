//! Signal enrichment from external collaborators
//!
//! Fills values the submission is missing (tampering scores, face match
//! confidence, travel risk) before the synchronous engine runs. Values the
//! caller already supplied are never overwritten.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::collaborators::{FaceComparer, TamperDetector, TravelRiskProvider};
use crate::config::{FailPolicy, RiskConfig};
use crate::error::{RiskError, RiskResult};
use crate::signals::KycSubmission;

/// Resolves collaborator outputs into a submission
pub struct SignalEnricher {
    face_comparer: Option<Arc<dyn FaceComparer>>,
    tamper_detector: Option<Arc<dyn TamperDetector>>,
    travel_risk: Option<Arc<dyn TravelRiskProvider>>,
    timeout: Duration,
    fail_policy: FailPolicy,
}

impl SignalEnricher {
    /// Enricher with no collaborators registered
    pub fn new(config: &RiskConfig) -> Self {
        Self {
            face_comparer: None,
            tamper_detector: None,
            travel_risk: None,
            timeout: config.external_timeout(),
            fail_policy: config.external_fail_policy,
        }
    }

    pub fn with_face_comparer(mut self, comparer: Arc<dyn FaceComparer>) -> Self {
        self.face_comparer = Some(comparer);
        self
    }

    pub fn with_tamper_detector(mut self, detector: Arc<dyn TamperDetector>) -> Self {
        self.tamper_detector = Some(detector);
        self
    }

    pub fn with_travel_risk(mut self, provider: Arc<dyn TravelRiskProvider>) -> Self {
        self.travel_risk = Some(provider);
        self
    }

    /// Fill missing collaborator values.
    ///
    /// Under [`FailPolicy::FailClosed`] the first failure or timeout aborts
    /// enrichment; under [`FailPolicy::FailOpen`] the value stays missing and
    /// the assessor scores it conservatively.
    pub async fn enrich(&self, mut submission: KycSubmission) -> RiskResult<KycSubmission> {
        let submission_id = submission.submission_id.clone();

        if let Some(detector) = &self.tamper_detector {
            for doc in submission.documents.iter_mut() {
                if doc.tampering_score.is_some() {
                    continue;
                }
                let result = self.call("tamper_detector", detector.tampering_score(doc)).await?;
                doc.tampering_score = result;
            }
        }

        if let Some(comparer) = &self.face_comparer {
            let document_id = submission.documents.first().map(|d| d.document_id.clone());
            if let (Some(face), Some(document_id)) =
                (submission.face_verification.as_mut(), document_id)
            {
                if face.face_match_confidence.is_none() {
                    if let Some(selfie_ref) = face.selfie_ref.clone() {
                        face.face_match_confidence = self
                            .call("face_comparer", comparer.compare(&selfie_ref, &document_id))
                            .await?;
                    }
                }
            }
        }

        if let Some(provider) = &self.travel_risk {
            if submission.additional_data.travel_risk.is_none() {
                let result = self
                    .call("travel_risk", provider.assess(&submission.additional_data))
                    .await?;
                submission.additional_data.travel_risk = result;
            }
        }

        tracing::debug!(submission_id = %submission_id, "submission enriched");
        Ok(submission)
    }

    /// Run one collaborator call under the timeout and fail policy
    async fn call<T>(
        &self,
        collaborator: &str,
        fut: impl Future<Output = RiskResult<T>>,
    ) -> RiskResult<Option<T>> {
        let result = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(RiskError::ExternalServiceTimeout(self.timeout.as_millis() as u64)),
        };

        match (result, self.fail_policy) {
            (Ok(value), _) => Ok(Some(value)),
            (Err(e), FailPolicy::FailClosed) => {
                tracing::error!(collaborator, error = %e, "collaborator call failed");
                Err(e)
            }
            (Err(e), FailPolicy::FailOpen) => {
                tracing::warn!(collaborator, error = %e, "collaborator call failed, leaving value missing");
                Ok(None)
            }
        }
    }
}
