//! Deterministic collaborator doubles
//!
//! Fixed answers for tests and offline CLI runs.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use crate::collaborators::{CreditBureau, FaceComparer, TamperDetector, TravelRiskProvider};
use crate::error::{RiskError, RiskResult};
use crate::signals::{AdditionalData, DocumentSignal, TravelRisk};

/// Face comparer returning a fixed confidence
#[derive(Debug, Clone, Copy)]
pub struct StaticFaceComparer {
    confidence: f64,
}

impl StaticFaceComparer {
    pub fn new(confidence: f64) -> Self {
        Self { confidence }
    }
}

#[async_trait]
impl FaceComparer for StaticFaceComparer {
    async fn compare(&self, _selfie_ref: &str, _document_id: &str) -> RiskResult<f64> {
        Ok(self.confidence)
    }
}

/// Tamper detector returning a fixed score for every document
#[derive(Debug, Clone, Copy)]
pub struct StaticTamperDetector {
    score: f64,
}

impl StaticTamperDetector {
    pub fn new(score: f64) -> Self {
        Self { score }
    }
}

impl Default for StaticTamperDetector {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[async_trait]
impl TamperDetector for StaticTamperDetector {
    async fn tampering_score(&self, _document: &DocumentSignal) -> RiskResult<f64> {
        Ok(self.score)
    }
}

/// Travel risk provider returning a fixed assessment
#[derive(Debug, Clone, Default)]
pub struct StaticTravelRisk {
    risk: TravelRisk,
}

impl StaticTravelRisk {
    pub fn new(risk: TravelRisk) -> Self {
        Self { risk }
    }
}

#[async_trait]
impl TravelRiskProvider for StaticTravelRisk {
    async fn assess(&self, _data: &AdditionalData) -> RiskResult<TravelRisk> {
        Ok(self.risk.clone())
    }
}

/// Credit bureau with programmable scores
pub struct StaticCreditBureau {
    scores: RwLock<HashMap<String, u16>>,
}

impl StaticCreditBureau {
    pub fn new() -> Self {
        Self {
            scores: RwLock::new(HashMap::new()),
        }
    }

    pub fn set_score(&self, applicant_id: &str, score: u16) {
        let mut scores = self.scores.write().unwrap();
        scores.insert(applicant_id.to_string(), score);
    }
}

impl Default for StaticCreditBureau {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CreditBureau for StaticCreditBureau {
    async fn credit_score(&self, applicant_id: &str) -> RiskResult<u16> {
        let scores = self.scores.read().unwrap();
        scores.get(applicant_id).copied().ok_or_else(|| {
            RiskError::ExternalService(format!("no bureau record for {}", applicant_id))
        })
    }
}

/// Every call fails (for fail-open/fail-closed tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingCollaborator;

impl FailingCollaborator {
    fn error() -> RiskError {
        RiskError::ExternalService("collaborator unavailable".to_string())
    }
}

#[async_trait]
impl FaceComparer for FailingCollaborator {
    async fn compare(&self, _selfie_ref: &str, _document_id: &str) -> RiskResult<f64> {
        Err(Self::error())
    }
}

#[async_trait]
impl TamperDetector for FailingCollaborator {
    async fn tampering_score(&self, _document: &DocumentSignal) -> RiskResult<f64> {
        Err(Self::error())
    }
}

#[async_trait]
impl TravelRiskProvider for FailingCollaborator {
    async fn assess(&self, _data: &AdditionalData) -> RiskResult<TravelRisk> {
        Err(Self::error())
    }
}

#[async_trait]
impl CreditBureau for FailingCollaborator {
    async fn credit_score(&self, _applicant_id: &str) -> RiskResult<u16> {
        Err(Self::error())
    }
}

/// Answers correctly but only after a delay (for timeout tests)
#[derive(Debug, Clone, Copy)]
pub struct SlowCollaborator {
    delay: Duration,
}

impl SlowCollaborator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl FaceComparer for SlowCollaborator {
    async fn compare(&self, _selfie_ref: &str, _document_id: &str) -> RiskResult<f64> {
        tokio::time::sleep(self.delay).await;
        Ok(100.0)
    }
}

#[async_trait]
impl TravelRiskProvider for SlowCollaborator {
    async fn assess(&self, _data: &AdditionalData) -> RiskResult<TravelRisk> {
        tokio::time::sleep(self.delay).await;
        Ok(TravelRisk::default())
    }
}
