//! Severity, risk tiers and explainable flags
//!
//! Both enums are ordered from least to most severe so that callers can
//! take the `max()` of a set of flags, the same way decisions escalate.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{Display, EnumIter, EnumString};

/// Flag severity - ordered from lowest to highest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

/// Risk tier derived from a 0-100 score
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RiskLevel {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl PartialOrd for RiskLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RiskLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Low
    }
}

/// A discrete, severity-tagged explanation attached to an assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    /// Machine-readable type (e.g. `identity_mismatch`)
    #[serde(rename = "type")]
    pub flag_type: String,
    pub severity: Severity,
    /// Human-readable summary
    pub description: String,
    /// Supporting issues
    #[serde(default)]
    pub details: Vec<String>,
}

impl Flag {
    pub fn new(
        flag_type: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            flag_type: flag_type.into(),
            severity,
            description: description.into(),
            details: Vec::new(),
        }
    }

    /// Attach supporting details
    pub fn with_details(mut self, details: impl IntoIterator<Item = String>) -> Self {
        self.details.extend(details);
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(Severity::Critical.to_string(), "critical");
        assert_eq!(RiskLevel::from_str("medium").unwrap(), RiskLevel::Medium);
    }

    #[test]
    fn test_flag_serialization_uses_type_key() {
        let flag = Flag::new("identity_mismatch", Severity::High, "Face does not match")
            .with_details(vec!["Face match confidence 20".to_string()]);
        let json = serde_json::to_string(&flag).unwrap();

        assert!(json.contains("\"type\":\"identity_mismatch\""));
        assert!(json.contains("\"severity\":\"high\""));

        let parsed: Flag = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, flag);
    }

    #[test]
    fn test_highest_severity() {
        let flags = vec![
            Flag::new("a", Severity::Low, "a"),
            Flag::new("b", Severity::Critical, "b"),
            Flag::new("c", Severity::High, "c"),
        ];
        let highest = flags.iter().map(|f| f.severity).max();
        assert_eq!(highest, Some(Severity::Critical));
        assert!(flags[1].is_critical());
    }
}
