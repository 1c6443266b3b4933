//! Challenge catalog and per-type parameters

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::config::LivenessConfig;

/// Challenge types
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChallengeType {
    Blink,
    Smile,
    HeadTurnLeft,
    HeadTurnRight,
    HeadMovement,
}

impl ChallengeType {
    /// The full catalog, in declaration order
    pub fn catalog() -> Vec<ChallengeType> {
        ChallengeType::iter().collect()
    }

    /// Prompt shown to the applicant
    pub fn instruction(&self) -> &'static str {
        match self {
            ChallengeType::Blink => "Please blink your eyes twice",
            ChallengeType::Smile => "Please smile and hold it",
            ChallengeType::HeadTurnLeft => "Please turn your head to the left",
            ChallengeType::HeadTurnRight => "Please turn your head to the right",
            ChallengeType::HeadMovement => "Please move your head slowly from side to side",
        }
    }

    /// Minimum evidence samples carrying the measurement this type needs
    pub fn min_samples(&self) -> usize {
        match self {
            ChallengeType::Blink => 3,
            ChallengeType::Smile => 3,
            ChallengeType::HeadTurnLeft | ChallengeType::HeadTurnRight => 3,
            ChallengeType::HeadMovement => 5,
        }
    }
}

/// Type-specific pass parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChallengeParameters {
    /// At least `min_blinks` blinks inside any `window_ms` window
    Blink { min_blinks: u32, window_ms: u64 },

    /// Smile intensity of at least `min_intensity` held for `hold_ms`
    Smile { min_intensity: f64, hold_ms: u64 },

    /// Peak yaw within `tolerance_deg` of `target_angle_deg` (negative = left)
    HeadTurn {
        target_angle_deg: f64,
        tolerance_deg: f64,
    },

    /// Yaw sweep of at least `min_range_deg` with direction changes
    HeadMovement {
        min_range_deg: f64,
        min_direction_changes: u32,
    },
}

impl ChallengeParameters {
    /// Parameters for a challenge type under the given configuration
    pub fn for_type(challenge_type: ChallengeType, config: &LivenessConfig) -> Self {
        match challenge_type {
            ChallengeType::Blink => ChallengeParameters::Blink {
                min_blinks: config.min_blinks,
                window_ms: config.blink_window_ms,
            },
            ChallengeType::Smile => ChallengeParameters::Smile {
                min_intensity: config.min_smile_intensity,
                hold_ms: config.smile_hold_ms,
            },
            ChallengeType::HeadTurnLeft => ChallengeParameters::HeadTurn {
                target_angle_deg: -config.head_turn_angle_deg,
                tolerance_deg: config.head_turn_tolerance_deg,
            },
            ChallengeType::HeadTurnRight => ChallengeParameters::HeadTurn {
                target_angle_deg: config.head_turn_angle_deg,
                tolerance_deg: config.head_turn_tolerance_deg,
            },
            ChallengeType::HeadMovement => ChallengeParameters::HeadMovement {
                min_range_deg: config.head_movement_range_deg,
                min_direction_changes: config.head_movement_direction_changes,
            },
        }
    }

    /// Whether these parameters can drive the given challenge type.
    ///
    /// Head turns must point the requested way: a negative target for left,
    /// a positive one for right.
    pub fn matches(&self, challenge_type: ChallengeType) -> bool {
        match (self, challenge_type) {
            (ChallengeParameters::HeadTurn { target_angle_deg, .. }, ChallengeType::HeadTurnLeft) => {
                *target_angle_deg < 0.0
            }
            (ChallengeParameters::HeadTurn { target_angle_deg, .. }, ChallengeType::HeadTurnRight) => {
                *target_angle_deg > 0.0
            }
            (ChallengeParameters::Blink { .. }, ChallengeType::Blink)
            | (ChallengeParameters::Smile { .. }, ChallengeType::Smile)
            | (ChallengeParameters::HeadMovement { .. }, ChallengeType::HeadMovement) => true,
            _ => false,
        }
    }
}

/// A single challenge within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub challenge_type: ChallengeType,
    pub instruction: String,
    pub parameters: ChallengeParameters,
    pub timeout_ms: u64,
    pub attempts: u32,
    pub max_attempts: u32,
    pub completed: bool,
}

impl Challenge {
    pub fn new(challenge_type: ChallengeType, config: &LivenessConfig) -> Self {
        Self {
            id: format!("CHL-{}", &uuid::Uuid::new_v4().simple().to_string()[..12]),
            challenge_type,
            instruction: challenge_type.instruction().to_string(),
            parameters: ChallengeParameters::for_type(challenge_type, config),
            timeout_ms: config.challenge_timeout_ms,
            attempts: 0,
            max_attempts: config.max_attempts,
            completed: false,
        }
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }
}
