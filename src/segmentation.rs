// src/segmentation.rs
//
// HSV range segmentation of cone markers.
//
// Works on the 8-bit HSV convention used by camera tooling:
//   H: 0-179 (degrees / 2), S: 0-255, V: 0-255
// so thresholds tuned with the usual trackbar tools can be pasted into the
// config unchanged.

use crate::mask::Mask;
use crate::types::Frame;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// PUBLIC TYPES
// ============================================================================

/// Inclusive per-channel HSV bounds for one marker color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorThreshold {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorThreshold {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }

    /// False when some channel has lower > upper (nothing can ever match).
    pub fn is_satisfiable(&self) -> bool {
        (0..3).all(|c| self.lower[c] <= self.upper[c])
    }
}

// ============================================================================
// HSV CONVERSION
// ============================================================================

/// Convert RGB to 8-bit HSV.
/// Returns [H: 0-179, S: 0-255, V: 0-255].
#[inline]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as i32, g as i32, b as i32);

    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v == 0 {
        0
    } else {
        (255.0 * diff as f32 / v as f32).round() as i32
    };

    let h = if diff == 0 {
        0
    } else {
        let sector = if v == r {
            g - b
        } else if v == g {
            b - r + 2 * diff
        } else {
            r - g + 4 * diff
        };
        // 60° per sector, halved to fit a byte
        let h = (30.0 * sector as f32 / diff as f32).round() as i32;
        h.rem_euclid(180)
    };

    [h as u8, s as u8, v as u8]
}

// ============================================================================
// SEGMENTER
// ============================================================================

/// Turns a color frame region into a binary mask for one marker color.
///
/// Holds only its threshold; segmenting two colors uses two independent
/// segmenters, so no state is shared between the calls.
#[derive(Debug, Clone)]
pub struct MarkerSegmenter {
    threshold: ColorThreshold,
}

impl MarkerSegmenter {
    pub fn new(threshold: ColorThreshold) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> &ColorThreshold {
        &self.threshold
    }

    /// Replace the threshold (runtime tuning).
    pub fn reconfigure(&mut self, threshold: ColorThreshold) {
        debug!(
            "Segmenter threshold {:?}..={:?} -> {:?}..={:?}",
            self.threshold.lower, self.threshold.upper, threshold.lower, threshold.upper
        );
        self.threshold = threshold;
    }

    /// Set (255) every sample whose HSV value falls inside the threshold.
    pub fn segment(&self, frame: &Frame) -> Mask {
        let mut mask = Mask::new(frame.width, frame.height);
        if frame.is_empty() {
            return mask;
        }

        for y in 0..frame.height {
            for x in 0..frame.width {
                let [r, g, b] = frame.rgb(x, y);
                if self.threshold.contains(rgb_to_hsv(r, g, b)) {
                    mask.set(x, y, Mask::ON);
                }
            }
        }

        mask
    }
}

// ============================================================================
// TESTS
// ============================================================================
