//! External collaborator boundaries
//!
//! Face comparison, tamper detection, travel/IP risk and the credit bureau
//! are remote services. The engine never calls them directly: the
//! [`SignalEnricher`](crate::enrich::SignalEnricher) resolves their outputs
//! into the submission before assessment.

pub mod mock;

use async_trait::async_trait;

use crate::error::RiskResult;
use crate::signals::{AdditionalData, DocumentSignal, TravelRisk};

/// Compares a selfie with the portrait on an identity document
#[async_trait]
pub trait FaceComparer: Send + Sync {
    /// Match confidence, 0-100
    async fn compare(&self, selfie_ref: &str, document_id: &str) -> RiskResult<f64>;
}

/// Detects tampering on a document image
#[async_trait]
pub trait TamperDetector: Send + Sync {
    /// Tampering score, 0-20 (higher = more likely tampered)
    async fn tampering_score(&self, document: &DocumentSignal) -> RiskResult<f64>;
}

/// Travel and IP reputation risk
#[async_trait]
pub trait TravelRiskProvider: Send + Sync {
    async fn assess(&self, data: &AdditionalData) -> RiskResult<TravelRisk>;
}

/// Credit bureau lookup
#[async_trait]
pub trait CreditBureau: Send + Sync {
    /// Bureau score, 300-900
    async fn credit_score(&self, applicant_id: &str) -> RiskResult<u16>;
}
