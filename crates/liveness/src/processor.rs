//! Per-challenge scoring over evidence frames
//!
//! Evidence frames are measurements produced by the vision collaborator
//! (yaw estimate, eyes-closed state, smile intensity) at a timestamp.
//! Scoring is a pure function of the frames and the challenge parameters.
//!
//! Confidence is on a 0-100 scale. A passing challenge always scores at
//! least 70; the further the evidence is from the target, the lower it goes.

use serde::{Deserialize, Serialize};

use crate::challenge::{ChallengeParameters, ChallengeType};
use crate::error::{LivenessError, LivenessResult};

/// Confidence floor for a passing challenge
const PASS_CONFIDENCE: f64 = 70.0;

/// Yaw changes smaller than this are treated as jitter (degrees)
const YAW_JITTER_DEG: f64 = 1.0;

/// One frame's worth of measurements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceFrame {
    /// Milliseconds since the challenge was shown
    pub timestamp_ms: u64,
    /// Head yaw in degrees (negative = left)
    #[serde(default)]
    pub yaw_deg: Option<f64>,
    #[serde(default)]
    pub eyes_closed: Option<bool>,
    /// Smile intensity in `[0, 1]`
    #[serde(default)]
    pub smile_intensity: Option<f64>,
}

impl EvidenceFrame {
    pub fn yaw(timestamp_ms: u64, yaw_deg: f64) -> Self {
        Self {
            timestamp_ms,
            yaw_deg: Some(yaw_deg),
            ..Self::default()
        }
    }

    pub fn eyes(timestamp_ms: u64, closed: bool) -> Self {
        Self {
            timestamp_ms,
            eyes_closed: Some(closed),
            ..Self::default()
        }
    }

    pub fn smile(timestamp_ms: u64, intensity: f64) -> Self {
        Self {
            timestamp_ms,
            smile_intensity: Some(intensity),
            ..Self::default()
        }
    }
}

/// Result of scoring one challenge attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeOutcome {
    pub passed: bool,
    /// 0-100
    pub confidence: f64,
    pub details: String,
}

/// Score one challenge attempt.
///
/// Fails with [`LivenessError::InsufficientEvidence`] when fewer frames carry
/// the needed measurement than the type requires, and with
/// [`LivenessError::ParameterMismatch`] when `parameters` belong to another type.
pub fn process_challenge(
    challenge_type: ChallengeType,
    frames: &[EvidenceFrame],
    parameters: &ChallengeParameters,
) -> LivenessResult<ChallengeOutcome> {
    if !parameters.matches(challenge_type) {
        return Err(LivenessError::ParameterMismatch(challenge_type));
    }

    let mut frames: Vec<&EvidenceFrame> = frames.iter().collect();
    frames.sort_by_key(|f| f.timestamp_ms);

    let outcome = match parameters {
        ChallengeParameters::HeadTurn {
            target_angle_deg,
            tolerance_deg,
        } => {
            let yaws = samples(challenge_type, &frames, |f| f.yaw_deg)?;
            head_turn(&yaws, *target_angle_deg, *tolerance_deg)
        }
        ChallengeParameters::Blink {
            min_blinks,
            window_ms,
        } => {
            let eyes = samples(challenge_type, &frames, |f| f.eyes_closed)?;
            blink(&eyes, *min_blinks, *window_ms)
        }
        ChallengeParameters::Smile {
            min_intensity,
            hold_ms,
        } => {
            let intensities = samples(challenge_type, &frames, |f| f.smile_intensity)?;
            smile(&intensities, *min_intensity, *hold_ms)
        }
        ChallengeParameters::HeadMovement {
            min_range_deg,
            min_direction_changes,
        } => {
            let yaws = samples(challenge_type, &frames, |f| f.yaw_deg)?;
            head_movement(&yaws, *min_range_deg, *min_direction_changes)
        }
    };

    Ok(outcome)
}

/// Extract `(timestamp, value)` pairs for one measurement, enforcing the minimum.
fn samples<T>(
    challenge_type: ChallengeType,
    frames: &[&EvidenceFrame],
    measure: impl Fn(&EvidenceFrame) -> Option<T>,
) -> LivenessResult<Vec<(u64, T)>> {
    let values: Vec<(u64, T)> = frames
        .iter()
        .filter_map(|f| measure(f).map(|v| (f.timestamp_ms, v)))
        .collect();

    let required = challenge_type.min_samples();
    if values.len() < required {
        return Err(LivenessError::InsufficientEvidence {
            challenge_type,
            required,
            provided: values.len(),
        });
    }
    Ok(values)
}

fn head_turn(yaws: &[(u64, f64)], target: f64, tolerance: f64) -> ChallengeOutcome {
    // Peak excursion towards the target side
    let detected = if target < 0.0 {
        yaws.iter().map(|(_, y)| *y).fold(f64::INFINITY, f64::min)
    } else {
        yaws.iter().map(|(_, y)| *y).fold(f64::NEG_INFINITY, f64::max)
    };

    let distance = (detected - target).abs();
    let passed = distance <= tolerance;
    let confidence = (100.0 - distance / tolerance * 30.0).clamp(0.0, 100.0);

    ChallengeOutcome {
        passed,
        confidence,
        details: format!(
            "Detected head angle {:.1}° vs target {:.1}° (tolerance {:.1}°)",
            detected, target, tolerance
        ),
    }
}

fn blink(eyes: &[(u64, bool)], min_blinks: u32, window_ms: u64) -> ChallengeOutcome {
    // A blink starts on an open -> closed transition
    let onsets: Vec<u64> = eyes
        .windows(2)
        .filter(|pair| !pair[0].1 && pair[1].1)
        .map(|pair| pair[1].0)
        .collect();

    let best_in_window = onsets
        .iter()
        .enumerate()
        .map(|(i, start)| {
            onsets[i..]
                .iter()
                .take_while(|t| **t - start <= window_ms)
                .count()
        })
        .max()
        .unwrap_or(0) as u32;

    let passed = best_in_window >= min_blinks;
    let confidence = if passed {
        (PASS_CONFIDENCE + 15.0 * (best_in_window - min_blinks) as f64).min(100.0)
    } else {
        PASS_CONFIDENCE / 2.0 * best_in_window as f64 / min_blinks as f64
    };

    ChallengeOutcome {
        passed,
        confidence,
        details: format!(
            "Detected {} blink(s) within {}ms (required {})",
            best_in_window, window_ms, min_blinks
        ),
    }
}

fn smile(intensities: &[(u64, f64)], min_intensity: f64, hold_ms: u64) -> ChallengeOutcome {
    // Longest contiguous run above the threshold
    let mut best_hold = 0u64;
    let mut best_mean = 0.0;
    let mut run: Vec<(u64, f64)> = Vec::new();

    for sample in intensities.iter().copied().chain(std::iter::once((0, f64::NAN))) {
        if sample.1 >= min_intensity {
            run.push(sample);
            continue;
        }
        if let (Some(first), Some(last)) = (run.first(), run.last()) {
            let held = last.0 - first.0;
            if held >= best_hold {
                best_hold = held;
                best_mean = run.iter().map(|(_, v)| v).sum::<f64>() / run.len() as f64;
            }
        }
        run.clear();
    }

    let passed = best_hold >= hold_ms;
    let confidence = if passed {
        let headroom = ((best_mean - min_intensity) / (1.0 - min_intensity)).clamp(0.0, 1.0);
        PASS_CONFIDENCE + 30.0 * headroom
    } else {
        PASS_CONFIDENCE * (best_hold as f64 / hold_ms as f64).min(1.0)
    };

    ChallengeOutcome {
        passed,
        confidence,
        details: format!(
            "Smile held {}ms at intensity >= {:.2} (required {}ms)",
            best_hold, min_intensity, hold_ms
        ),
    }
}

fn head_movement(yaws: &[(u64, f64)], min_range: f64, min_changes: u32) -> ChallengeOutcome {
    let (min_yaw, max_yaw) = yaws
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| {
            (lo.min(*y), hi.max(*y))
        });
    let range = max_yaw - min_yaw;

    let mut changes = 0u32;
    let mut last_direction = 0.0f64;
    for pair in yaws.windows(2) {
        let delta = pair[1].1 - pair[0].1;
        if delta.abs() < YAW_JITTER_DEG {
            continue;
        }
        let direction = delta.signum();
        if last_direction != 0.0 && direction != last_direction {
            changes += 1;
        }
        last_direction = direction;
    }

    let passed = range >= min_range && changes >= min_changes;
    let confidence = if passed {
        PASS_CONFIDENCE + 30.0 * ((range - min_range) / min_range).min(1.0)
    } else {
        let coverage = (range / min_range).min(1.0);
        let sweep = if changes >= min_changes { 1.0 } else { 0.5 };
        PASS_CONFIDENCE * coverage * sweep
    };

    ChallengeOutcome {
        passed,
        confidence,
        details: format!(
            "Head moved over {:.1}° with {} direction change(s) (required {:.1}°, {})",
            range, changes, min_range, min_changes
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LivenessConfig;

    fn params(challenge_type: ChallengeType) -> ChallengeParameters {
        ChallengeParameters::for_type(challenge_type, &LivenessConfig::default())
    }

    fn yaw_frames(yaws: &[f64]) -> Vec<EvidenceFrame> {
        yaws.iter()
            .enumerate()
            .map(|(i, y)| EvidenceFrame::yaw(i as u64 * 100, *y))
            .collect()
    }

    #[test]
    fn test_head_turn_left_on_target() {
        let frames = yaw_frames(&[0.0, -12.0, -25.0, -31.0, -20.0]);
        let outcome =
            process_challenge(ChallengeType::HeadTurnLeft, &frames, &params(ChallengeType::HeadTurnLeft))
                .unwrap();

        assert!(outcome.passed);
        // |-31 - -30| = 1 -> 100 - 2 = 98
        assert!((outcome.confidence - 98.0).abs() < 1e-9);
    }

    #[test]
    fn test_head_turn_at_tolerance_edge_passes() {
        let frames = yaw_frames(&[0.0, 8.0, 15.0]);
        let outcome = process_challenge(
            ChallengeType::HeadTurnRight,
            &frames,
            &params(ChallengeType::HeadTurnRight),
        )
        .unwrap();

        assert!(outcome.passed);
        assert!((outcome.confidence - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_head_turn_wrong_direction_fails() {
        let frames = yaw_frames(&[0.0, 10.0, 28.0]);
        let outcome =
            process_challenge(ChallengeType::HeadTurnLeft, &frames, &params(ChallengeType::HeadTurnLeft))
                .unwrap();

        assert!(!outcome.passed);
        assert!(outcome.confidence < 70.0);
    }

    #[test]
    fn test_insufficient_evidence() {
        let frames = yaw_frames(&[0.0, -30.0]);
        let err =
            process_challenge(ChallengeType::HeadTurnLeft, &frames, &params(ChallengeType::HeadTurnLeft))
                .unwrap_err();

        assert!(matches!(
            err,
            LivenessError::InsufficientEvidence {
                required: 3,
                provided: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_frames_without_measurement_do_not_count() {
        // Smile frames carry no eye state
        let frames = vec![
            EvidenceFrame::smile(0, 0.9),
            EvidenceFrame::smile(100, 0.9),
            EvidenceFrame::eyes(200, false),
            EvidenceFrame::smile(300, 0.9),
        ];
        let err = process_challenge(ChallengeType::Blink, &frames, &params(ChallengeType::Blink))
            .unwrap_err();
        assert!(err.is_challenge_validation());
    }

    #[test]
    fn test_parameter_mismatch() {
        let frames = yaw_frames(&[0.0, 10.0, 20.0]);
        let err = process_challenge(ChallengeType::Blink, &frames, &params(ChallengeType::Smile))
            .unwrap_err();
        assert!(matches!(err, LivenessError::ParameterMismatch(ChallengeType::Blink)));
    }

    #[test]
    fn test_left_turn_rejects_right_turn_parameters() {
        let frames = yaw_frames(&[0.0, 15.0, 30.0]);
        let err = process_challenge(
            ChallengeType::HeadTurnLeft,
            &frames,
            &params(ChallengeType::HeadTurnRight),
        )
        .unwrap_err();
        assert!(matches!(err, LivenessError::ParameterMismatch(ChallengeType::HeadTurnLeft)));
    }

    #[test]
    fn test_two_blinks_within_window() {
        let frames = vec![
            EvidenceFrame::eyes(0, false),
            EvidenceFrame::eyes(300, true),
            EvidenceFrame::eyes(500, false),
            EvidenceFrame::eyes(900, true),
            EvidenceFrame::eyes(1_100, false),
        ];
        let outcome =
            process_challenge(ChallengeType::Blink, &frames, &params(ChallengeType::Blink)).unwrap();

        assert!(outcome.passed);
        assert!((outcome.confidence - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_blinks_too_far_apart() {
        let frames = vec![
            EvidenceFrame::eyes(0, false),
            EvidenceFrame::eyes(100, true),
            EvidenceFrame::eyes(200, false),
            EvidenceFrame::eyes(2_500, true),
            EvidenceFrame::eyes(2_600, false),
        ];
        let outcome =
            process_challenge(ChallengeType::Blink, &frames, &params(ChallengeType::Blink)).unwrap();

        assert!(!outcome.passed);
        assert!(outcome.confidence < 70.0);
        assert!(outcome.details.contains("1 blink"));
    }

    #[test]
    fn test_unsorted_frames_are_ordered() {
        let frames = vec![
            EvidenceFrame::eyes(900, true),
            EvidenceFrame::eyes(0, false),
            EvidenceFrame::eyes(500, false),
            EvidenceFrame::eyes(300, true),
        ];
        let outcome =
            process_challenge(ChallengeType::Blink, &frames, &params(ChallengeType::Blink)).unwrap();
        assert!(outcome.passed);
    }

    #[test]
    fn test_smile_held() {
        let frames = vec![
            EvidenceFrame::smile(0, 0.2),
            EvidenceFrame::smile(200, 0.8),
            EvidenceFrame::smile(700, 0.8),
            EvidenceFrame::smile(1_300, 0.8),
            EvidenceFrame::smile(1_500, 0.3),
        ];
        let outcome =
            process_challenge(ChallengeType::Smile, &frames, &params(ChallengeType::Smile)).unwrap();

        assert!(outcome.passed);
        // headroom (0.8 - 0.6) / 0.4 = 0.5 -> 85
        assert!((outcome.confidence - 85.0).abs() < 1e-9);
    }

    #[test]
    fn test_smile_too_short() {
        let frames = vec![
            EvidenceFrame::smile(0, 0.7),
            EvidenceFrame::smile(500, 0.7),
            EvidenceFrame::smile(600, 0.1),
        ];
        let outcome =
            process_challenge(ChallengeType::Smile, &frames, &params(ChallengeType::Smile)).unwrap();

        assert!(!outcome.passed);
        assert!((outcome.confidence - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_head_movement_sweep() {
        let frames = yaw_frames(&[0.0, -12.0, -15.0, 0.0, 12.0, 5.0]);
        let outcome = process_challenge(
            ChallengeType::HeadMovement,
            &frames,
            &params(ChallengeType::HeadMovement),
        )
        .unwrap();

        assert!(outcome.passed);
        assert!(outcome.confidence >= 70.0);
    }

    #[test]
    fn test_head_movement_without_direction_change() {
        let frames = yaw_frames(&[0.0, 5.0, 10.0, 20.0, 30.0]);
        let outcome = process_challenge(
            ChallengeType::HeadMovement,
            &frames,
            &params(ChallengeType::HeadMovement),
        )
        .unwrap();

        assert!(!outcome.passed);
        assert!((outcome.confidence - 35.0).abs() < 1e-9);
    }
}
