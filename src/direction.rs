// src/direction.rs
//
// Lap direction from the side on which the designated marker shows up.
//
// Curvature changes slowly compared to the frame rate, so the classifier is
// driven by a scheduler: every frame during warm-up, then every N frames.
// Ambiguous frames never overwrite an earlier verdict.

use crate::contours::ContourExtractor;
use crate::noise::NoiseFilter;
use crate::segmentation::{ColorThreshold, MarkerSegmenter};
use crate::types::{DirectionConfig, Frame, MarkerSpec, TrackDirection};
use tracing::{debug, info};

/// Designated-marker presence in each half of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfPresence {
    pub left: bool,
    pub right: bool,
}

impl HalfPresence {
    /// Apply the transition rule to `previous`.
    pub fn resolve(&self, previous: TrackDirection) -> TrackDirection {
        match (self.left, self.right) {
            (true, false) => TrackDirection::Clockwise,
            (false, true) => TrackDirection::CounterClockwise,
            _ => previous,
        }
    }
}

pub struct DirectionClassifier {
    segmenter: MarkerSegmenter,
    noise: NoiseFilter,
    extractor: ContourExtractor,
    top_crop_ratio: f32,
}

impl DirectionClassifier {
    pub fn new(marker: &MarkerSpec, noise: NoiseFilter, top_crop_ratio: f32) -> Self {
        Self {
            segmenter: MarkerSegmenter::new(marker.threshold),
            noise,
            extractor: ContourExtractor::new(marker.contour_filter.clone()),
            top_crop_ratio,
        }
    }

    pub fn observe(&self, frame: &Frame) -> HalfPresence {
        let half_width = frame.width / 2;
        let height = (frame.height as f32 * self.top_crop_ratio) as usize;

        let left = frame.region(0, 0, half_width, height);
        let right = frame.region(half_width, 0, half_width, height);

        HalfPresence {
            left: self.has_marker(&left),
            right: self.has_marker(&right),
        }
    }

    pub fn classify(&self, frame: &Frame, previous: TrackDirection) -> TrackDirection {
        let presence = self.observe(frame);
        let direction = presence.resolve(previous);

        if direction != previous {
            info!(
                "🧭 Track direction {} -> {} (marker left={}, right={})",
                previous.as_str(),
                direction.as_str(),
                presence.left,
                presence.right
            );
        } else {
            debug!(
                "Track direction kept at {} (marker left={}, right={})",
                direction.as_str(),
                presence.left,
                presence.right
            );
        }
        direction
    }

    pub fn reconfigure(&mut self, threshold: ColorThreshold) {
        self.segmenter.reconfigure(threshold);
    }

    fn has_marker(&self, half: &Frame) -> bool {
        let mask = self.noise.filter(&self.segmenter.segment(half));
        self.extractor.has_significant_contours(&mask)
    }
}

// ============================================================================
// SCHEDULING
// ============================================================================

/// Decides on which frames the classifier runs.
#[derive(Debug, Clone)]
pub struct DirectionScheduler {
    interval_frames: u64,
    warmup_frames: u64,
    runs: u64,
}

impl DirectionScheduler {
    pub fn new(config: &DirectionConfig) -> Self {
        Self {
            interval_frames: config.interval_frames.max(1),
            warmup_frames: config.warmup_frames,
            runs: 0,
        }
    }

    /// `frame_index` counts from 0.
    pub fn should_classify(&mut self, frame_index: u64) -> bool {
        let run = frame_index < self.warmup_frames || frame_index % self.interval_frames == 0;
        if run {
            self.runs += 1;
        }
        run
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }
}
