// src/pipeline/frame_context.rs
//
// Everything the pipeline concluded about one frame. Built once at the end
// of `process_frame`, read by the logger and the metrics.

use crate::steering::SteeringDecision;
use crate::types::{Centroid, MarkerColor, Point2, TrackDirection};
use serde::Serialize;

/// Result of running one marker color through segmentation, denoising,
/// contour extraction and centroid estimation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerObservation {
    pub color: MarkerColor,
    /// Contours that passed the filter
    pub contour_count: usize,
    pub centroid: Centroid,
    /// Centroid of each kept contour, region coordinates
    pub contour_centroids: Vec<Point2>,
}

impl MarkerObservation {
    pub fn detected(&self) -> bool {
        self.centroid.valid
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameContext {
    pub frame_id: u64,
    pub timestamp_us: i64,
    /// Direction after this frame's (optional) classification
    pub direction: TrackDirection,
    pub direction_checked: bool,
    pub blue: MarkerObservation,
    pub yellow: MarkerObservation,
    /// Alternate command offered to the decision, external or closest-cone
    pub alternate: Option<f32>,
    pub decision: SteeringDecision,
    /// Mid-lane points, region coordinates
    pub path: Vec<Point2>,
}

impl FrameContext {
    pub fn steering(&self) -> f32 {
        self.decision.command
    }

    pub fn markers_detected(&self) -> usize {
        self.blue.detected() as usize + self.yellow.detected() as usize
    }
}
