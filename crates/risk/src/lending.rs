//! Credit (loan) scoring
//!
//! Reuses the KYC aggregation model: five credit factors, a validated
//! [`WeightTable`] and a [`TierTable`] over loan decisions. Eligibility
//! limits are hard rules applied on top of the weighted score.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kycshield_core::{clamp_score, RiskLevel, TierTable, WeightTable};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::collaborators::CreditBureau;
use crate::error::{RiskError, RiskResult};

/// Lowest and highest bureau scores
pub const CREDIT_SCORE_RANGE: (u16, u16) = (300, 900);

/// Risk assigned when the applicant has no bureau record
const NO_CREDIT_HISTORY_RISK: f64 = 70.0;

/// Years of employment considered fully stable
const STABLE_EMPLOYMENT_YEARS: f64 = 5.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CreditFactor {
    CreditHistory,
    DebtToIncome,
    LoanToIncome,
    EmploymentStability,
    KycRisk,
}

/// Loan outcome; ordered `Approve < Review < Reject`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoanDecision {
    Approve = 1,
    Review = 2,
    Reject = 3,
}

impl PartialOrd for LoanDecision {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LoanDecision {
    fn cmp(&self, other: &Self) -> Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

/// A loan request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub applicant_id: String,
    /// Bureau score; fetched from the bureau when missing
    #[serde(default)]
    pub credit_score: Option<u16>,
    pub monthly_income: Decimal,
    #[serde(default)]
    pub monthly_obligations: Decimal,
    pub requested_amount: Decimal,
    pub tenure_months: u32,
    #[serde(default)]
    pub employment_years: f64,
    /// Outcome of the applicant's KYC assessment
    #[serde(default)]
    pub kyc_risk_level: RiskLevel,
}

/// Credit factor weights; must sum to 1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditWeights {
    pub credit_history: f64,
    pub debt_to_income: f64,
    pub loan_to_income: f64,
    pub employment_stability: f64,
    pub kyc_risk: f64,
}

impl Default for CreditWeights {
    fn default() -> Self {
        Self {
            credit_history: 0.35,
            debt_to_income: 0.25,
            loan_to_income: 0.15,
            employment_stability: 0.10,
            kyc_risk: 0.15,
        }
    }
}

/// Hard eligibility limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityPolicy {
    pub min_credit_score: u16,
    /// Maximum (obligations + new instalment) / income
    pub max_debt_to_income: Decimal,
    /// Maximum requested amount / annual income
    pub max_loan_to_annual_income: Decimal,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            min_credit_score: 650,
            max_debt_to_income: Decimal::new(6, 1), // 0.6
            max_loan_to_annual_income: Decimal::from(5),
        }
    }
}

/// Configuration for the credit scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingConfig {
    #[serde(default)]
    pub weights: CreditWeights,

    #[serde(default)]
    pub policy: EligibilityPolicy,

    /// Score at or above which a loan goes to review
    #[serde(default = "default_review_score")]
    pub review_score: f64,

    /// Score at or above which a loan is rejected
    #[serde(default = "default_reject_score")]
    pub reject_score: f64,
}

fn default_review_score() -> f64 {
    40.0
}

fn default_reject_score() -> f64 {
    70.0
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            weights: CreditWeights::default(),
            policy: EligibilityPolicy::default(),
            review_score: default_review_score(),
            reject_score: default_reject_score(),
        }
    }
}

impl LendingConfig {
    pub fn from_file(path: &std::path::Path) -> RiskResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RiskResult<()> {
        self.weight_table()?;
        self.tier_table()?;
        if self.policy.max_debt_to_income <= Decimal::ZERO
            || self.policy.max_loan_to_annual_income <= Decimal::ZERO
        {
            return Err(RiskError::Config(
                "eligibility ratios must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn weight_table(&self) -> RiskResult<WeightTable<CreditFactor>> {
        let w = &self.weights;
        WeightTable::new([
            (CreditFactor::CreditHistory, w.credit_history),
            (CreditFactor::DebtToIncome, w.debt_to_income),
            (CreditFactor::LoanToIncome, w.loan_to_income),
            (CreditFactor::EmploymentStability, w.employment_stability),
            (CreditFactor::KycRisk, w.kyc_risk),
        ])
        .map_err(|e| RiskError::Config(e.to_string()))
    }

    fn tier_table(&self) -> RiskResult<TierTable<LoanDecision>> {
        TierTable::new([
            (0.0, LoanDecision::Approve),
            (self.review_score, LoanDecision::Review),
            (self.reject_score, LoanDecision::Reject),
        ])
        .map_err(|e| RiskError::Config(e.to_string()))
    }
}

/// Result of scoring one loan application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAssessment {
    pub applicant_id: String,
    /// Weighted risk, 0-100
    pub score: f64,
    pub factors: BTreeMap<CreditFactor, f64>,
    pub debt_to_income: Decimal,
    pub loan_to_annual_income: Decimal,
    pub decision: LoanDecision,
    pub reasons: Vec<String>,
    pub assessed_at: DateTime<Utc>,
}

/// Scores loan applications
#[derive(Debug, Clone)]
pub struct CreditScorer {
    config: LendingConfig,
    weights: WeightTable<CreditFactor>,
    tiers: TierTable<LoanDecision>,
}

fn ratio(numerator: Decimal, denominator: Decimal, what: &str) -> RiskResult<Decimal> {
    if denominator.is_zero() {
        return Err(RiskError::computation(
            "lending",
            format!("{} has a zero denominator", what),
        ));
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| RiskError::computation("lending", format!("{} overflowed", what)))
}

fn to_f64(value: Decimal, what: &str) -> RiskResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| RiskError::computation("lending", format!("{} is not representable", what)))
}

fn kyc_risk(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Low => 0.0,
        RiskLevel::Medium => 40.0,
        RiskLevel::High => 70.0,
        RiskLevel::Critical => 100.0,
    }
}

impl CreditScorer {
    pub fn new(config: LendingConfig) -> RiskResult<Self> {
        config.validate()?;
        Ok(Self {
            weights: config.weight_table()?,
            tiers: config.tier_table()?,
            config,
        })
    }

    pub fn config(&self) -> &LendingConfig {
        &self.config
    }

    /// Score an application using the credit score it carries
    pub fn score(&self, application: &LoanApplication) -> RiskResult<CreditAssessment> {
        if application.monthly_income <= Decimal::ZERO {
            return Err(RiskError::computation(
                "lending",
                "monthly income must be positive",
            ));
        }
        if application.tenure_months == 0 {
            return Err(RiskError::computation("lending", "tenure must be positive"));
        }

        let policy = &self.config.policy;
        let mut reasons = Vec::new();
        let mut floor = LoanDecision::Approve;

        let instalment = ratio(
            application.requested_amount,
            Decimal::from(application.tenure_months),
            "instalment",
        )?;
        let monthly_debt = application
            .monthly_obligations
            .checked_add(instalment)
            .ok_or_else(|| RiskError::computation("lending", "monthly debt overflowed"))?;
        let annual_income = application
            .monthly_income
            .checked_mul(Decimal::from(12))
            .ok_or_else(|| RiskError::computation("lending", "annual income overflowed"))?;
        let debt_to_income = ratio(monthly_debt, application.monthly_income, "debt-to-income")?;
        let loan_to_annual_income =
            ratio(application.requested_amount, annual_income, "loan-to-income")?;

        let credit_history = match application.credit_score {
            Some(score) => {
                let (low, high) = CREDIT_SCORE_RANGE;
                let clamped = score.clamp(low, high);
                if score < policy.min_credit_score {
                    reasons.push(format!(
                        "Credit score {} below minimum {}",
                        score, policy.min_credit_score
                    ));
                    floor = floor.max(LoanDecision::Reject);
                }
                f64::from(high - clamped) / f64::from(high - low) * 100.0
            }
            None => {
                reasons.push("No credit history".to_string());
                floor = floor.max(LoanDecision::Review);
                NO_CREDIT_HISTORY_RISK
            }
        };

        if debt_to_income > policy.max_debt_to_income {
            reasons.push(format!(
                "Debt-to-income {} exceeds {}",
                debt_to_income.round_dp(2),
                policy.max_debt_to_income
            ));
            floor = floor.max(LoanDecision::Reject);
        }
        if loan_to_annual_income > policy.max_loan_to_annual_income {
            reasons.push(format!(
                "Loan-to-income {} exceeds {}",
                loan_to_annual_income.round_dp(2),
                policy.max_loan_to_annual_income
            ));
            floor = floor.max(LoanDecision::Reject);
        }
        if application.kyc_risk_level == RiskLevel::Critical {
            reasons.push("KYC risk is critical".to_string());
            floor = floor.max(LoanDecision::Reject);
        }

        let dti_risk = to_f64(
            ratio(debt_to_income, policy.max_debt_to_income, "debt-to-income")?,
            "debt-to-income",
        )? * 100.0;
        let lti_risk = to_f64(
            ratio(
                loan_to_annual_income,
                policy.max_loan_to_annual_income,
                "loan-to-income",
            )?,
            "loan-to-income",
        )? * 100.0;
        let employment_years = if application.employment_years.is_finite() {
            application.employment_years.max(0.0)
        } else {
            return Err(RiskError::computation(
                "lending",
                "employment years is not a finite number",
            ));
        };
        let employment_risk =
            (STABLE_EMPLOYMENT_YEARS - employment_years).max(0.0) / STABLE_EMPLOYMENT_YEARS * 100.0;

        let factors: BTreeMap<CreditFactor, f64> = [
            (CreditFactor::CreditHistory, credit_history),
            (CreditFactor::DebtToIncome, clamp_score(dti_risk)),
            (CreditFactor::LoanToIncome, clamp_score(lti_risk)),
            (CreditFactor::EmploymentStability, employment_risk),
            (CreditFactor::KycRisk, kyc_risk(application.kyc_risk_level)),
        ]
        .into_iter()
        .collect();

        let score = self.weights.aggregate(&factors)?;
        let decision = self.tiers.classify(score).max(floor);

        tracing::info!(
            applicant_id = %application.applicant_id,
            score,
            decision = %decision,
            "loan scored"
        );

        Ok(CreditAssessment {
            applicant_id: application.applicant_id.clone(),
            score,
            factors,
            debt_to_income,
            loan_to_annual_income,
            decision,
            reasons,
            assessed_at: Utc::now(),
        })
    }

    /// Fetch a missing credit score from the bureau, then score
    pub async fn score_with_bureau(
        &self,
        application: &LoanApplication,
        bureau: &dyn CreditBureau,
    ) -> RiskResult<CreditAssessment> {
        if application.credit_score.is_some() {
            return self.score(application);
        }
        let credit_score = bureau.credit_score(&application.applicant_id).await?;
        let application = LoanApplication {
            credit_score: Some(credit_score),
            ..application.clone()
        };
        self.score(&application)
    }
}
