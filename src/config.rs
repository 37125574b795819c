// src/config.rs

use crate::types::{Config, MarkerColor};
use anyhow::{ensure, Context, Result};
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path))?;
        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file {}", path))?;
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for color in [MarkerColor::Blue, MarkerColor::Yellow] {
            let spec = self.markers.spec(color);
            ensure!(
                spec.threshold.is_satisfiable(),
                "{} threshold has a lower bound above its upper bound",
                color.as_str()
            );
            let filter = &spec.contour_filter;
            ensure!(
                filter.min_area >= 0.0 && filter.min_area <= filter.max_area,
                "{} contour area range [{}, {}] is invalid",
                color.as_str(),
                filter.min_area,
                filter.max_area
            );
            if let Some(aspect) = &filter.aspect_ratio {
                ensure!(
                    aspect.min > 0.0 && aspect.min <= aspect.max,
                    "{} aspect ratio range [{}, {}] is invalid",
                    color.as_str(),
                    aspect.min,
                    aspect.max
                );
            }
        }

        ensure!(
            self.noise.blur_kernel % 2 == 1 && self.noise.morph_kernel % 2 == 1,
            "noise kernels must have odd sizes"
        );
        ensure!(
            self.noise.morph_kernel / 2 <= u8::MAX as usize,
            "noise.morph_kernel must be at most 511"
        );
        ensure!(
            self.noise.binarize_threshold != Some(0),
            "noise.binarize_threshold must be positive or null"
        );
        ensure!(
            (0.0..1.0).contains(&self.region.roi_top_ratio),
            "region.roi_top_ratio must be in [0, 1)"
        );
        ensure!(
            self.direction.top_crop_ratio > 0.0 && self.direction.top_crop_ratio <= 1.0,
            "direction.top_crop_ratio must be in (0, 1]"
        );
        ensure!(
            self.direction.interval_frames > 0,
            "direction.interval_frames must be positive"
        );

        let steering = &self.steering;
        ensure!(
            (0.0..=1.0).contains(&steering.smoothing_alpha),
            "steering.smoothing_alpha must be in [0, 1]"
        );
        ensure!(
            steering.min_steering <= steering.max_steering,
            "steering.min_steering ({}) exceeds steering.max_steering ({})",
            steering.min_steering,
            steering.max_steering
        );
        let m = &steering.magnitudes;
        ensure!(
            m.mild >= 0.0 && m.sharp >= 0.0 && m.sharpest >= 0.0,
            "steering.magnitudes must not be negative"
        );
        ensure!(
            steering.closest_cone.scale.is_finite(),
            "steering.closest_cone.scale must be finite"
        );
        ensure!(self.source.fps > 0.0, "source.fps must be positive");
        ensure!(
            self.output.tolerance >= 0.0,
            "output.tolerance must not be negative"
        );

        Ok(())
    }
}
