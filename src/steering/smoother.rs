// src/steering/smoother.rs

use serde::{Deserialize, Serialize};

/// Exponential smoothing of the steering command.
///
/// Written as `previous + alpha * (raw - previous)`, which equals
/// `previous * (1 - alpha) + raw * alpha` and returns `previous` bit-for-bit
/// when `raw == previous`.
#[inline]
pub fn smooth(previous: f32, raw: f32, alpha: f32) -> f32 {
    previous + alpha * (raw - previous)
}

/// Allowed steering range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringBounds {
    pub min: f32,
    pub max: f32,
}

impl SteeringBounds {
    pub fn new(min: f32, max: f32) -> Self {
        debug_assert!(min <= max);
        Self { min, max }
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min.max(0.0).min(self.max);
        }
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for SteeringBounds {
    fn default() -> Self {
        Self {
            min: -0.3,
            max: 0.3,
        }
    }
}

/// Smoothing followed by clamping, the last step before a command goes out.
#[derive(Debug, Clone, Copy)]
pub struct SteeringSmoother {
    alpha: f32,
}

impl SteeringSmoother {
    pub fn new(alpha: f32) -> Self {
        Self { alpha }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn apply(&self, previous: f32, raw: f32, bounds: &SteeringBounds) -> f32 {
        bounds.clamp(smooth(previous, raw, self.alpha))
    }
}
