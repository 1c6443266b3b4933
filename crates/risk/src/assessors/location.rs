//! Location risk: base risk, high-risk regions and external travel/IP risk

use crate::config::RiskConfig;
use crate::error::RiskResult;
use crate::factor::{ensure_finite, AssessmentContext, FactorAssessor, FactorScore, RiskFactor};
use crate::signals::{GeoLocation, KycSubmission};

#[derive(Debug, Clone)]
pub struct LocationAssessor {
    base_risk: f64,
    region_penalty: f64,
    high_risk_regions: Vec<String>,
}

impl LocationAssessor {
    pub fn new(base_risk: f64, region_penalty: f64, high_risk_regions: Vec<String>) -> Self {
        Self {
            base_risk,
            region_penalty,
            high_risk_regions,
        }
    }

    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(
            config.location_base_risk,
            config.high_risk_region_penalty,
            config.high_risk_regions.clone(),
        )
    }

    fn is_high_risk(&self, location: &GeoLocation) -> bool {
        let matches = |code: &str| {
            self.high_risk_regions
                .iter()
                .any(|r| r.trim().eq_ignore_ascii_case(code.trim()))
        };
        matches(location.country.as_str()) || location.region.as_deref().is_some_and(matches)
    }
}

impl FactorAssessor for LocationAssessor {
    fn factor(&self) -> RiskFactor {
        RiskFactor::LocationRisk
    }

    fn assess(&self, ctx: &AssessmentContext, submission: &KycSubmission) -> RiskResult<FactorScore> {
        let data = &submission.additional_data;
        let mut risk = self.base_risk;
        let mut issues = Vec::new();

        match &data.location {
            Some(location) if self.is_high_risk(location) => {
                risk += self.region_penalty;
                issues.push(format!("High-risk location: {}", location.country));
            }
            Some(_) => {}
            None => issues.push("Location unknown".to_string()),
        }

        if let Some(travel) = &data.travel_risk {
            let score = ensure_finite(self.factor(), "travel risk score", travel.score)?;
            tracing::debug!(submission_id = %ctx.submission_id, score, "travel risk applied");
            risk += score;
            issues.extend(travel.issues.iter().cloned());
        }

        Ok(FactorScore::new(risk).with_issues(issues))
    }
}
