//! Signal conditioning: noisy finger distance in, stable control value out.
//!
//! Three steps per frame with a detected hand:
//!
//! 1. exponential smoothing of the raw distance,
//! 2. clamped linear mapping of the smoothed distance into [0, 1],
//! 3. exponential smoothing of that value (volume pipeline only).
//!
//! The filter state is an explicit [`SmoothingState`] value that goes in and
//! comes back out, so the conditioner holds no hidden state of its own.

use crate::error::{HandvolError, Result};

/// Cross-frame filter state. Starts at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmoothingState {
    pub prev_distance: f64,
    pub prev_control: f64,
}

/// One step of a first-order IIR low-pass: `alpha * prev + (1 - alpha) * input`.
pub fn smooth(alpha: f64, prev: f64, input: f64) -> f64 {
    alpha * prev + (1.0 - alpha) * input
}

/// Operating range of finger separation, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceRange {
    min: f64,
    max: f64,
}

impl DistanceRange {
    /// Returns an error unless `max > min` (both finite).
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(HandvolError::ConfigInvalidValue {
                key: "mapping".to_string(),
                message: format!("distances must be finite, got {}..{}", min, max),
            });
        }
        if max <= min {
            return Err(HandvolError::ConfigInvalidValue {
                key: "mapping.max_distance".to_string(),
                message: format!(
                    "must be greater than mapping.min_distance ({} <= {})",
                    max, min
                ),
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Map `distance` linearly onto [0, 1], clamping outside the range.
    pub fn normalize(&self, distance: f64) -> f64 {
        ((distance - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

fn check_alpha(key: &str, alpha: f64) -> Result<f64> {
    if (0.0..1.0).contains(&alpha) {
        Ok(alpha)
    } else {
        Err(HandvolError::ConfigInvalidValue {
            key: key.to_string(),
            message: format!("must be in [0, 1), got {}", alpha),
        })
    }
}

/// Validated conditioner settings.
///
/// Only constructible through [`ConditionerConfig::new`], so an invalid
/// distance range is rejected at startup rather than on the first frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionerConfig {
    distance_alpha: f64,
    /// `None` disables the control smoothing stage (measure pipeline).
    control_alpha: Option<f64>,
    range: DistanceRange,
}

impl ConditionerConfig {
    pub fn new(distance_alpha: f64, control_alpha: Option<f64>, range: DistanceRange) -> Result<Self> {
        Ok(Self {
            distance_alpha: check_alpha("smoothing.distance_alpha", distance_alpha)?,
            control_alpha: control_alpha
                .map(|a| check_alpha("smoothing.control_alpha", a))
                .transpose()?,
            range,
        })
    }

    pub fn distance_alpha(&self) -> f64 {
        self.distance_alpha
    }

    pub fn control_alpha(&self) -> Option<f64> {
        self.control_alpha
    }

    pub fn range(&self) -> DistanceRange {
        self.range
    }
}

/// Per-frame conditioner output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditioned {
    pub smoothed_distance: f64,
    /// Smoothed distance mapped onto [0, 1].
    pub norm: f64,
    /// Value handed to the actuator; equals `norm` without control smoothing.
    pub control: f64,
}

/// Run the conditioner on one raw distance.
///
/// Deterministic: the same state and input always give the same output.
pub fn condition(
    config: &ConditionerConfig,
    state: SmoothingState,
    raw_distance: f64,
) -> (SmoothingState, Conditioned) {
    let smoothed_distance = smooth(config.distance_alpha, state.prev_distance, raw_distance);
    let norm = config.range.normalize(smoothed_distance);

    let (control, prev_control) = match config.control_alpha {
        Some(alpha) => {
            let control = smooth(alpha, state.prev_control, norm);
            (control, control)
        }
        None => (norm, state.prev_control),
    };

    (
        SmoothingState {
            prev_distance: smoothed_distance,
            prev_control,
        },
        Conditioned {
            smoothed_distance,
            norm,
            control,
        },
    )
}
