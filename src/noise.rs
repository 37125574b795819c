// src/noise.rs
//
// Mask cleanup: blur -> (re-binarize) -> erode -> dilate.
//
// Blurring first merges near-adjacent speckle and closes small gaps inside a
// cone blob, the erosion then drops anything thinner than the structuring
// element and the dilation grows surviving blobs back to their size.

use crate::mask::Mask;
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{dilate, erode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Odd blur kernel size (5 = 5x5)
    pub blur_kernel: usize,
    /// Samples at or above this value after the blur are set, the rest cleared.
    /// `None` keeps the blurred grey levels.
    pub binarize_threshold: Option<u8>,
    /// Odd size of the structuring element
    pub morph_kernel: usize,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            binarize_threshold: Some(128),
            morph_kernel: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoiseFilter {
    /// `None` for a 1x1 kernel
    sigma: Option<f32>,
    binarize_threshold: Option<u8>,
    /// L1 radius: 3x3 gives the cross-shaped ellipse
    radius: u8,
}

impl NoiseFilter {
    pub fn new(config: &NoiseConfig) -> Self {
        Self {
            sigma: kernel_sigma(config.blur_kernel),
            binarize_threshold: config.binarize_threshold,
            radius: (config.morph_kernel / 2).min(u8::MAX as usize) as u8,
        }
    }

    pub fn filter(&self, mask: &Mask) -> Mask {
        if mask.is_empty() {
            return mask.clone();
        }

        let mut image = match self.sigma {
            Some(sigma) => gaussian_blur_f32(mask.as_image(), sigma),
            None => mask.as_image().clone(),
        };
        if let Some(level) = self.binarize_threshold {
            // `threshold` keeps samples strictly above its argument
            image = threshold(&image, level.saturating_sub(1), ThresholdType::Binary);
        }

        let eroded = erode(&image, Norm::L1, self.radius);
        Mask::from_image(dilate(&eroded, Norm::L1, self.radius))
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new(&NoiseConfig::default())
    }
}

/// Gaussian sigma for an odd kernel size, as derived for `ksize`-only blurs
/// (5 -> 1.1).
fn kernel_sigma(size: usize) -> Option<f32> {
    if size <= 1 {
        return None;
    }
    Some(0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8)
}
