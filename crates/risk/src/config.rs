//! Risk engine configuration with configurable thresholds
//!
//! Weights, tier bounds, flag thresholds and region lists are loaded from
//! JSON with per-field defaults. The defaults are the production policy.

use std::time::Duration;

use kycshield_core::{RiskLevel, TierTable, WeightTable};
use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};
use crate::factor::RiskFactor;

/// Configuration for the Risk Engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    // === Aggregation ===
    #[serde(default)]
    pub weights: FactorWeights,

    #[serde(default)]
    pub tiers: TierBounds,

    // === Flags & decision ===
    #[serde(default)]
    pub flag_thresholds: FlagThresholds,

    /// Overall score at or above which manual review is required
    #[serde(default = "default_manual_review_score")]
    pub manual_review_score: f64,

    // === Location ===
    /// Country or region codes treated as high risk (case-insensitive)
    #[serde(default = "default_high_risk_regions")]
    pub high_risk_regions: Vec<String>,

    #[serde(default = "default_location_base_risk")]
    pub location_base_risk: f64,

    #[serde(default = "default_high_risk_region_penalty")]
    pub high_risk_region_penalty: f64,

    // === External Services ===
    /// Timeout for collaborator calls during enrichment
    #[serde(default = "default_external_timeout_ms")]
    pub external_timeout_ms: u64,

    /// Policy when a collaborator fails
    #[serde(default)]
    pub external_fail_policy: FailPolicy,

    // === Execution ===
    /// Run the five assessors on the rayon pool
    #[serde(default = "default_parallel_assessment")]
    pub parallel_assessment: bool,
}

/// Factor weights; must sum to 1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub document_quality: f64,
    pub identity_match: f64,
    pub liveness_score: f64,
    pub data_consistency: f64,
    pub location_risk: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            document_quality: 0.25,
            identity_match: 0.30,
            liveness_score: 0.20,
            data_consistency: 0.15,
            location_risk: 0.10,
        }
    }
}

/// Lower bounds of the medium/high/critical tiers (low starts at 0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierBounds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for TierBounds {
    fn default() -> Self {
        Self {
            medium: 40.0,
            high: 60.0,
            critical: 80.0,
        }
    }
}

/// A flag fires above `trigger` and escalates above `escalate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlagThreshold {
    pub trigger: f64,
    pub escalate: f64,
}

impl FlagThreshold {
    pub const fn new(trigger: f64, escalate: f64) -> Self {
        Self { trigger, escalate }
    }
}

/// Per-factor flag thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagThresholds {
    pub document_quality: FlagThreshold,
    pub identity_match: FlagThreshold,
    pub liveness_score: FlagThreshold,
    pub data_consistency: FlagThreshold,
    pub location_risk: FlagThreshold,
}

impl Default for FlagThresholds {
    fn default() -> Self {
        Self {
            document_quality: FlagThreshold::new(60.0, 80.0),
            identity_match: FlagThreshold::new(70.0, 85.0),
            liveness_score: FlagThreshold::new(50.0, 75.0),
            data_consistency: FlagThreshold::new(60.0, 80.0),
            location_risk: FlagThreshold::new(60.0, 80.0),
        }
    }
}

impl FlagThresholds {
    pub fn for_factor(&self, factor: RiskFactor) -> FlagThreshold {
        match factor {
            RiskFactor::DocumentQuality => self.document_quality,
            RiskFactor::IdentityMatch => self.identity_match,
            RiskFactor::LivenessScore => self.liveness_score,
            RiskFactor::DataConsistency => self.data_consistency,
            RiskFactor::LocationRisk => self.location_risk,
        }
    }
}

/// Policy when an external collaborator fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailPolicy {
    /// Abort enrichment with an error (DEFAULT)
    #[default]
    FailClosed,

    /// Leave the signal missing; the assessor scores it conservatively
    FailOpen,
}

fn default_manual_review_score() -> f64 {
    70.0
}

fn default_high_risk_regions() -> Vec<String> {
    vec!["KP".to_string(), "IR".to_string(), "MM".to_string()]
}

fn default_location_base_risk() -> f64 {
    20.0
}

fn default_high_risk_region_penalty() -> f64 {
    30.0
}

fn default_external_timeout_ms() -> u64 {
    500
}

fn default_parallel_assessment() -> bool {
    true
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            weights: FactorWeights::default(),
            tiers: TierBounds::default(),
            flag_thresholds: FlagThresholds::default(),
            manual_review_score: default_manual_review_score(),
            high_risk_regions: default_high_risk_regions(),
            location_base_risk: default_location_base_risk(),
            high_risk_region_penalty: default_high_risk_region_penalty(),
            external_timeout_ms: default_external_timeout_ms(),
            external_fail_policy: FailPolicy::default(),
            parallel_assessment: default_parallel_assessment(),
        }
    }
}

impl RiskConfig {
    /// Load and validate configuration from a JSON file
    pub fn from_file(path: &std::path::Path) -> RiskResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the weight and tier tables are well formed
    pub fn validate(&self) -> RiskResult<()> {
        self.weight_table()?;
        self.tier_table()?;
        for (factor, threshold) in [
            (RiskFactor::DocumentQuality, self.flag_thresholds.document_quality),
            (RiskFactor::IdentityMatch, self.flag_thresholds.identity_match),
            (RiskFactor::LivenessScore, self.flag_thresholds.liveness_score),
            (RiskFactor::DataConsistency, self.flag_thresholds.data_consistency),
            (RiskFactor::LocationRisk, self.flag_thresholds.location_risk),
        ] {
            if threshold.escalate < threshold.trigger {
                return Err(RiskError::Config(format!(
                    "flag threshold for {} escalates below its trigger",
                    factor
                )));
            }
        }
        Ok(())
    }

    /// Factor weights as a validated table
    pub fn weight_table(&self) -> RiskResult<WeightTable<RiskFactor>> {
        let w = &self.weights;
        WeightTable::new([
            (RiskFactor::DocumentQuality, w.document_quality),
            (RiskFactor::IdentityMatch, w.identity_match),
            (RiskFactor::LivenessScore, w.liveness_score),
            (RiskFactor::DataConsistency, w.data_consistency),
            (RiskFactor::LocationRisk, w.location_risk),
        ])
        .map_err(|e| RiskError::Config(e.to_string()))
    }

    /// Tier bounds as a validated table
    pub fn tier_table(&self) -> RiskResult<TierTable<RiskLevel>> {
        TierTable::new([
            (0.0, RiskLevel::Low),
            (self.tiers.medium, RiskLevel::Medium),
            (self.tiers.high, RiskLevel::High),
            (self.tiers.critical, RiskLevel::Critical),
        ])
        .map_err(|e| RiskError::Config(e.to_string()))
    }

    /// Get external timeout as Duration
    pub fn external_timeout(&self) -> Duration {
        Duration::from_millis(self.external_timeout_ms)
    }
}
