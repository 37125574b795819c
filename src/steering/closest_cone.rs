// src/steering/closest_cone.rs
//
// Secondary steering estimate from the bearing of the nearest cone of each
// color, seen from the vehicle (bottom-center of the region). Used as the
// alternate command while the lap direction is unresolved.

use crate::types::Point2;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosestConeConfig {
    /// Offer the estimate as the alternate command when none is supplied
    pub enabled: bool,
    /// Command for a bearing of half a turn
    pub scale: f32,
}

impl Default for ClosestConeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClosestConeEstimator {
    scale: f32,
}

impl ClosestConeEstimator {
    pub fn new(config: &ClosestConeConfig) -> Self {
        Self {
            scale: config.scale,
        }
    }

    /// Point nearest to `origin`; the first one wins ties.
    pub fn closest(points: &[Point2], origin: Point2) -> Option<Point2> {
        points.iter().copied().fold(None, |best, p| match best {
            Some(b) if origin.distance(&b) <= origin.distance(&p) => Some(b),
            _ => Some(p),
        })
    }

    /// Steering from per-contour centroids in a `width` x `height` region.
    ///
    /// With both colors visible the command is the angle between the two
    /// bearings, with one color its bearing alone; `None` when no cone is seen.
    /// Not clamped.
    pub fn estimate(
        &self,
        blue: &[Point2],
        yellow: &[Point2],
        width: f32,
        height: f32,
    ) -> Option<f32> {
        let origin = Point2::new(width / 2.0, height);
        let bearing = |p: Point2| (p.y - origin.y).atan2(p.x - origin.x);

        let angle = match (Self::closest(blue, origin), Self::closest(yellow, origin)) {
            (Some(b), Some(y)) => bearing(y) - bearing(b),
            (Some(b), None) => bearing(b),
            (None, Some(y)) => bearing(y),
            (None, None) => return None,
        };

        let steering = angle / PI * self.scale;
        debug!("Closest-cone bearing {:.3} rad -> {:.4}", angle, steering);
        Some(steering)
    }
}

impl Default for ClosestConeEstimator {
    fn default() -> Self {
        Self::new(&ClosestConeConfig::default())
    }
}
