//! KYC aggregation: the five factor scores into one overall score and tier

use std::collections::BTreeMap;

use kycshield_core::{RiskLevel, TierTable, WeightTable};

use crate::config::RiskConfig;
use crate::error::{RiskError, RiskResult};
use crate::factor::{FactorScore, RiskFactor};

/// Weighted aggregator and tier classifier for KYC factors
#[derive(Debug, Clone)]
pub struct KycScorer {
    weights: WeightTable<RiskFactor>,
    tiers: TierTable<RiskLevel>,
}

impl KycScorer {
    pub fn new(config: &RiskConfig) -> RiskResult<Self> {
        Ok(Self {
            weights: config.weight_table()?,
            tiers: config.tier_table()?,
        })
    }

    /// `round(Σ score × weight)`; every factor must be present
    pub fn aggregate(&self, factors: &BTreeMap<RiskFactor, FactorScore>) -> RiskResult<f64> {
        let scores: BTreeMap<RiskFactor, f64> =
            factors.iter().map(|(factor, s)| (*factor, s.score)).collect();
        self.weights
            .aggregate(&scores)
            .map_err(|e| RiskError::computation("aggregate", e.to_string()))
    }

    pub fn classify(&self, overall_score: f64) -> RiskLevel {
        self.tiers.classify(overall_score)
    }

    pub fn weight(&self, factor: RiskFactor) -> Option<f64> {
        self.weights.weight(&factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn uniform(score: f64) -> BTreeMap<RiskFactor, FactorScore> {
        RiskFactor::iter().map(|f| (f, FactorScore::new(score))).collect()
    }

    #[test]
    fn test_uniform_scores() {
        let scorer = KycScorer::new(&RiskConfig::default()).unwrap();
        assert_eq!(scorer.aggregate(&uniform(55.0)).unwrap(), 55.0);
        assert_eq!(scorer.classify(55.0), RiskLevel::Medium);
    }

    #[test]
    fn test_weighted_sum_rounds() {
        let scorer = KycScorer::new(&RiskConfig::default()).unwrap();
        let mut factors = uniform(0.0);
        factors.insert(RiskFactor::IdentityMatch, FactorScore::new(81.5));

        // 81.5 * 0.30 = 24.45
        assert_eq!(scorer.aggregate(&factors).unwrap(), 24.0);
    }

    #[test]
    fn test_missing_factor_is_a_computation_error() {
        let scorer = KycScorer::new(&RiskConfig::default()).unwrap();
        let mut factors = uniform(10.0);
        factors.remove(&RiskFactor::LocationRisk);

        assert!(matches!(
            scorer.aggregate(&factors),
            Err(RiskError::Computation { .. })
        ));
    }

    #[test]
    fn test_tier_boundaries() {
        let scorer = KycScorer::new(&RiskConfig::default()).unwrap();
        assert_eq!(scorer.classify(39.0), RiskLevel::Low);
        assert_eq!(scorer.classify(40.0), RiskLevel::Medium);
        assert_eq!(scorer.classify(60.0), RiskLevel::High);
        assert_eq!(scorer.classify(80.0), RiskLevel::Critical);
    }

    #[test]
    fn test_weight_lookup() {
        let scorer = KycScorer::new(&RiskConfig::default()).unwrap();
        assert_eq!(scorer.weight(RiskFactor::IdentityMatch), Some(0.30));
    }
}
