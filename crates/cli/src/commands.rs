//! CLI commands

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use kycshield_liveness::{
    AttemptOutcome, EvidenceFrame, LivenessConfig, LivenessEvaluation, LivenessEvaluator,
    LivenessSession,
};
use kycshield_risk::collaborators::mock::{
    StaticCreditBureau, StaticFaceComparer, StaticTamperDetector, StaticTravelRisk,
};
use kycshield_risk::{
    CreditAssessment, CreditScorer, KycSubmission, LendingConfig, LoanApplication, RiskAssessment,
    RiskConfig, RiskEngine, SignalEnricher,
};

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Offline collaborator doubles for `assess --enrich`
#[derive(Debug, Clone, Default)]
pub struct EnrichOptions {
    /// Fixed face match confidence for submissions with a selfie but no score
    pub face_confidence: Option<f64>,
}

/// Assess a KYC submission file
pub async fn assess(
    input: &Path,
    config: Option<&Path>,
    enrich: Option<EnrichOptions>,
) -> anyhow::Result<RiskAssessment> {
    let config = match config {
        Some(path) => RiskConfig::from_file(path)?,
        None => RiskConfig::default(),
    };
    let mut submission: KycSubmission = read_json(input)?;

    if let Some(options) = enrich {
        let mut enricher = SignalEnricher::new(&config)
            .with_tamper_detector(Arc::new(StaticTamperDetector::default()))
            .with_travel_risk(Arc::new(StaticTravelRisk::default()));
        if let Some(confidence) = options.face_confidence {
            enricher = enricher.with_face_comparer(Arc::new(StaticFaceComparer::new(confidence)));
        }
        submission = enricher.enrich(submission).await?;
    }

    let engine = RiskEngine::new(config)?;
    Ok(engine.assess_risk(&submission)?)
}

/// Issue a new liveness session
pub fn liveness_session(
    config: Option<&Path>,
    seed: Option<u64>,
    now: DateTime<Utc>,
) -> anyhow::Result<LivenessSession> {
    let config = match config {
        Some(path) => LivenessConfig::from_file(path)?,
        None => LivenessConfig::default(),
    };
    let session = match seed {
        Some(seed) => LivenessSession::generate(&config, &mut StdRng::seed_from_u64(seed), now)?,
        None => LivenessSession::generate(&config, &mut rand::thread_rng(), now)?,
    };
    Ok(session)
}

/// Evidence for one attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceSubmission {
    pub challenge_id: String,
    pub frames: Vec<EvidenceFrame>,
    /// Defaults to the current time
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Evidence file for `liveness-evaluate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceFile {
    pub submissions: Vec<EvidenceSubmission>,
    /// Defaults to the current time
    #[serde(default)]
    pub evaluated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessReport {
    pub attempts: Vec<AttemptOutcome>,
    pub evaluation: LivenessEvaluation,
}

/// Replay evidence against a session and evaluate it
pub fn liveness_evaluate(
    session_file: &Path,
    evidence_file: &Path,
    config: Option<&Path>,
) -> anyhow::Result<LivenessReport> {
    let config = match config {
        Some(path) => LivenessConfig::from_file(path)?,
        None => LivenessConfig::default(),
    };
    let mut session: LivenessSession = read_json(session_file)?;
    let evidence: EvidenceFile = read_json(evidence_file)?;

    let mut attempts = Vec::with_capacity(evidence.submissions.len());
    for submission in &evidence.submissions {
        let now = submission.submitted_at.unwrap_or_else(Utc::now);
        let outcome = session
            .submit_challenge(&submission.challenge_id, &submission.frames, now)
            .with_context(|| format!("challenge {} rejected", submission.challenge_id))?;
        attempts.push(outcome);
    }

    let evaluator = LivenessEvaluator::new(config);
    let evaluation = match evidence.evaluated_at {
        Some(at) => evaluator.evaluate_session(&mut session, at)?,
        None => evaluator.evaluate_session_now(&mut session)?,
    };

    Ok(LivenessReport {
        attempts,
        evaluation,
    })
}

/// Score a loan application file
pub async fn loan(
    input: &Path,
    config: Option<&Path>,
    bureau_score: Option<u16>,
) -> anyhow::Result<CreditAssessment> {
    let config = match config {
        Some(path) => LendingConfig::from_file(path)?,
        None => LendingConfig::default(),
    };
    let application: LoanApplication = read_json(input)?;
    let scorer = CreditScorer::new(config)?;

    let assessment = match bureau_score {
        Some(score) => {
            let bureau = StaticCreditBureau::new();
            bureau.set_score(&application.applicant_id, score);
            scorer.score_with_bureau(&application, &bureau).await?
        }
        None => scorer.score(&application)?,
    };
    Ok(assessment)
}
