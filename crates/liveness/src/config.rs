//! Liveness configuration
//!
//! Timeouts and challenge parameters are tunable from a JSON file; every
//! field has a default so partial files are accepted.

use serde::{Deserialize, Serialize};

use crate::error::{LivenessError, LivenessResult};

/// Number of challenge types in the catalog
const CATALOG_SIZE: usize = 5;

/// Upper bound on the per-challenge timeout (10 minutes)
const MAX_CHALLENGE_TIMEOUT_MS: u64 = 600_000;

/// Upper bound on the session buffer (1 hour)
const MAX_SESSION_BUFFER_MS: u64 = 3_600_000;

/// Configuration for liveness sessions and their evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivenessConfig {
    // === Session shape ===
    /// Distinct challenges per session
    #[serde(default = "default_challenge_count")]
    pub challenge_count: usize,

    /// Time allowed per challenge (ms)
    #[serde(default = "default_challenge_timeout_ms")]
    pub challenge_timeout_ms: u64,

    /// Extra time added to the session lifetime (ms)
    #[serde(default = "default_session_buffer_ms")]
    pub session_buffer_ms: u64,

    /// Attempts allowed per challenge
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    // === Challenge parameters ===
    #[serde(default = "default_head_turn_angle_deg")]
    pub head_turn_angle_deg: f64,

    #[serde(default = "default_head_turn_tolerance_deg")]
    pub head_turn_tolerance_deg: f64,

    #[serde(default = "default_min_blinks")]
    pub min_blinks: u32,

    #[serde(default = "default_blink_window_ms")]
    pub blink_window_ms: u64,

    #[serde(default = "default_min_smile_intensity")]
    pub min_smile_intensity: f64,

    #[serde(default = "default_smile_hold_ms")]
    pub smile_hold_ms: u64,

    #[serde(default = "default_head_movement_range_deg")]
    pub head_movement_range_deg: f64,

    #[serde(default = "default_head_movement_direction_changes")]
    pub head_movement_direction_changes: u32,

    // === Evaluation ===
    /// Fraction of challenges that must be completed
    #[serde(default = "default_pass_ratio")]
    pub pass_ratio: f64,

    /// Minimum mean confidence to pass
    #[serde(default = "default_min_mean_confidence")]
    pub min_mean_confidence: f64,

    /// Mean confidence below which `low_confidence` is flagged
    #[serde(default = "default_low_confidence_threshold")]
    pub low_confidence_threshold: f64,

    /// Mean latency above which `slow_processing` is flagged (ms)
    #[serde(default = "default_slow_latency_ms")]
    pub slow_latency_ms: u64,
}

fn default_challenge_count() -> usize {
    3
}

fn default_challenge_timeout_ms() -> u64 {
    5_000
}

fn default_session_buffer_ms() -> u64 {
    15_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_head_turn_angle_deg() -> f64 {
    30.0
}

fn default_head_turn_tolerance_deg() -> f64 {
    15.0
}

fn default_min_blinks() -> u32 {
    2
}

fn default_blink_window_ms() -> u64 {
    2_000
}

fn default_min_smile_intensity() -> f64 {
    0.6
}

fn default_smile_hold_ms() -> u64 {
    1_000
}

fn default_head_movement_range_deg() -> f64 {
    20.0
}

fn default_head_movement_direction_changes() -> u32 {
    1
}

fn default_pass_ratio() -> f64 {
    0.8
}

fn default_min_mean_confidence() -> f64 {
    70.0
}

fn default_low_confidence_threshold() -> f64 {
    60.0
}

fn default_slow_latency_ms() -> u64 {
    10_000
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            challenge_count: default_challenge_count(),
            challenge_timeout_ms: default_challenge_timeout_ms(),
            session_buffer_ms: default_session_buffer_ms(),
            max_attempts: default_max_attempts(),
            head_turn_angle_deg: default_head_turn_angle_deg(),
            head_turn_tolerance_deg: default_head_turn_tolerance_deg(),
            min_blinks: default_min_blinks(),
            blink_window_ms: default_blink_window_ms(),
            min_smile_intensity: default_min_smile_intensity(),
            smile_hold_ms: default_smile_hold_ms(),
            head_movement_range_deg: default_head_movement_range_deg(),
            head_movement_direction_changes: default_head_movement_direction_changes(),
            pass_ratio: default_pass_ratio(),
            min_mean_confidence: default_min_mean_confidence(),
            low_confidence_threshold: default_low_confidence_threshold(),
            slow_latency_ms: default_slow_latency_ms(),
        }
    }
}

impl LivenessConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &std::path::Path) -> LivenessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> LivenessResult<()> {
        if self.challenge_count == 0 || self.challenge_count > CATALOG_SIZE {
            return Err(LivenessError::ConfigError(format!(
                "challenge_count must be between 1 and {}, got {}",
                CATALOG_SIZE, self.challenge_count
            )));
        }
        if self.challenge_timeout_ms == 0 || self.challenge_timeout_ms > MAX_CHALLENGE_TIMEOUT_MS {
            return Err(LivenessError::ConfigError(format!(
                "challenge_timeout_ms must be between 1 and {}, got {}",
                MAX_CHALLENGE_TIMEOUT_MS, self.challenge_timeout_ms
            )));
        }
        if self.session_buffer_ms > MAX_SESSION_BUFFER_MS {
            return Err(LivenessError::ConfigError(format!(
                "session_buffer_ms must be at most {}, got {}",
                MAX_SESSION_BUFFER_MS, self.session_buffer_ms
            )));
        }
        if self.max_attempts == 0 {
            return Err(LivenessError::ConfigError(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if !(self.pass_ratio > 0.0 && self.pass_ratio <= 1.0) {
            return Err(LivenessError::ConfigError(format!(
                "pass_ratio must be in (0, 1], got {}",
                self.pass_ratio
            )));
        }
        if !(self.head_turn_angle_deg > 0.0
            && self.head_turn_tolerance_deg > 0.0
            && self.head_movement_range_deg > 0.0)
        {
            return Err(LivenessError::ConfigError(
                "head turn angle and angle tolerances must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.min_smile_intensity) {
            return Err(LivenessError::ConfigError(format!(
                "min_smile_intensity must be in [0, 1), got {}",
                self.min_smile_intensity
            )));
        }
        if self.min_blinks == 0 || self.smile_hold_ms == 0 {
            return Err(LivenessError::ConfigError(
                "min_blinks and smile_hold_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Session lifetime: one timeout per challenge plus the buffer
    pub fn session_lifetime(&self) -> LivenessResult<chrono::Duration> {
        self.lifetime_for(self.challenge_count)
    }

    /// Lifetime of a session holding `challenges` challenges
    pub fn lifetime_for(&self, challenges: usize) -> LivenessResult<chrono::Duration> {
        let overflow = || {
            LivenessError::ConfigError(format!(
                "session lifetime overflows for {} challenges of {}ms plus {}ms",
                challenges, self.challenge_timeout_ms, self.session_buffer_ms
            ))
        };
        let total_ms = u64::try_from(challenges)
            .ok()
            .and_then(|n| n.checked_mul(self.challenge_timeout_ms))
            .and_then(|ms| ms.checked_add(self.session_buffer_ms))
            .ok_or_else(overflow)?;
        let total_ms = i64::try_from(total_ms).map_err(|_| overflow())?;
        chrono::Duration::try_milliseconds(total_ms).ok_or_else(overflow)
    }

    /// Completed challenges required for `total` challenges
    pub fn required_completions(&self, total: usize) -> usize {
        (self.pass_ratio * total as f64).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = LivenessConfig::default();

        assert_eq!(config.challenge_count, 3);
        assert_eq!(config.challenge_timeout_ms, 5_000);
        assert_eq!(config.session_buffer_ms, 15_000);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.min_blinks, 2);
        assert_eq!(config.pass_ratio, 0.8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_lifetime() {
        let config = LivenessConfig::default();
        // 3 x 5000ms + 15000ms
        assert_eq!(
            config.session_lifetime().unwrap(),
            chrono::Duration::milliseconds(30_000)
        );
    }

    #[test]
    fn test_validate_bounds_timeouts() {
        let huge_timeout = LivenessConfig {
            challenge_timeout_ms: u64::MAX / 2,
            ..LivenessConfig::default()
        };
        assert!(matches!(huge_timeout.validate(), Err(LivenessError::ConfigError(_))));

        let huge_buffer = LivenessConfig {
            session_buffer_ms: u64::MAX,
            ..LivenessConfig::default()
        };
        assert!(matches!(huge_buffer.validate(), Err(LivenessError::ConfigError(_))));

        let backwards_turn = LivenessConfig {
            head_turn_angle_deg: -30.0,
            ..LivenessConfig::default()
        };
        assert!(backwards_turn.validate().is_err());

        let zero_timeout = LivenessConfig {
            challenge_timeout_ms: 0,
            ..LivenessConfig::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_lifetime_overflow_is_an_error() {
        let config = LivenessConfig {
            challenge_timeout_ms: u64::MAX / 2,
            ..LivenessConfig::default()
        };
        assert!(matches!(config.lifetime_for(3), Err(LivenessError::ConfigError(_))));

        let config = LivenessConfig {
            session_buffer_ms: u64::MAX,
            ..LivenessConfig::default()
        };
        assert!(config.session_lifetime().is_err());
    }

    #[test]
    fn test_required_completions() {
        let config = LivenessConfig::default();
        assert_eq!(config.required_completions(3), 3);
        assert_eq!(config.required_completions(5), 4);
        assert_eq!(config.required_completions(1), 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "challenge_timeout_ms": 8000 }"#;
        let config: LivenessConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.challenge_timeout_ms, 8_000);
        assert_eq!(config.challenge_count, 3);
    }

    #[test]
    fn test_validate_rejects_oversized_session() {
        let config = LivenessConfig {
            challenge_count: 6,
            ..LivenessConfig::default()
        };
        assert!(matches!(config.validate(), Err(LivenessError::ConfigError(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_attempts": 1 }}"#).unwrap();

        let config = LivenessConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_attempts, 1);
    }
}
