// src/pipeline/orchestrator.rs
//
// Owns one instance of every stage plus the only state that outlives a
// frame: the lap direction and the previous steering command.
//
//   frame ─┬─ (scheduled) DirectionClassifier ──────────────┐
//          └─ ROI ─ segment ─ denoise ─ contours ─ centroid ─┴─ decision ─ command

use super::frame_context::{FrameContext, MarkerObservation};
use super::metrics::PipelineMetrics;
use crate::centroid::{contour_centroid, CentroidEstimator};
use crate::contours::ContourExtractor;
use crate::direction::{DirectionClassifier, DirectionScheduler};
use crate::noise::NoiseFilter;
use crate::path_planner::PathPlanner;
use crate::segmentation::{ColorThreshold, MarkerSegmenter};
use crate::steering::{
    ClosestConeEstimator, ProximityReading, SteeringBounds, SteeringDecision,
    SteeringDecisionEngine, SteeringInput,
};
use crate::types::{Config, Frame, MarkerColor, MarkerSpec, RegionConfig, TrackDirection};
use std::time::Instant;
use tracing::debug;

/// Inputs that come from outside the camera for one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalInputs {
    /// Steering estimate from another controller (e.g. a learned model).
    /// Takes precedence over the closest-cone estimate.
    pub alternate: Option<f32>,
    pub proximity: Option<ProximityReading>,
}

/// Segmenter + extractor for one marker color.
struct MarkerDetector {
    color: MarkerColor,
    segmenter: MarkerSegmenter,
    extractor: ContourExtractor,
}

impl MarkerDetector {
    fn new(color: MarkerColor, spec: &MarkerSpec) -> Self {
        Self {
            color,
            segmenter: MarkerSegmenter::new(spec.threshold),
            extractor: ContourExtractor::new(spec.contour_filter.clone()),
        }
    }
}

pub struct SteeringPipeline {
    blue: MarkerDetector,
    yellow: MarkerDetector,
    noise: NoiseFilter,
    estimator: CentroidEstimator,
    classifier: DirectionClassifier,
    designated: MarkerColor,
    scheduler: DirectionScheduler,
    engine: SteeringDecisionEngine,
    /// `None` when disabled in the config
    closest_cone: Option<ClosestConeEstimator>,
    planner: PathPlanner,
    region: RegionConfig,
    bounds: SteeringBounds,

    direction: TrackDirection,
    previous: f32,
    frame_index: u64,
    metrics: PipelineMetrics,
}

impl SteeringPipeline {
    pub fn new(config: &Config) -> Self {
        let noise = NoiseFilter::new(&config.noise);
        let designated = config.markers.spec(config.direction.designated_marker);

        Self {
            blue: MarkerDetector::new(MarkerColor::Blue, &config.markers.blue),
            yellow: MarkerDetector::new(MarkerColor::Yellow, &config.markers.yellow),
            classifier: DirectionClassifier::new(
                designated,
                noise.clone(),
                config.direction.top_crop_ratio,
            ),
            designated: config.direction.designated_marker,
            noise,
            estimator: CentroidEstimator::new(),
            scheduler: DirectionScheduler::new(&config.direction),
            engine: SteeringDecisionEngine::new(&config.steering, &config.proximity),
            closest_cone: config
                .steering
                .closest_cone
                .enabled
                .then(|| ClosestConeEstimator::new(&config.steering.closest_cone)),
            planner: PathPlanner::new(),
            region: config.region.clone(),
            bounds: config.steering.bounds(),
            direction: config.direction.initial,
            previous: 0.0,
            frame_index: 0,
            metrics: PipelineMetrics::new(),
        }
    }

    // ========================================================================
    // STATELESS OPERATIONS
    // ========================================================================

    /// New steering command from the blue (A) and yellow (B) regions.
    ///
    /// Both regions are expected to cover the same horizontal extent; zone
    /// boundaries come from the width of `marker_a_region`.
    pub fn compute_steering(
        &self,
        marker_a_region: &Frame,
        marker_b_region: &Frame,
        previous_steering: f32,
        track_direction: TrackDirection,
        max_steering: f32,
        min_steering: f32,
    ) -> f32 {
        let blue = self.observe(&self.blue, marker_a_region);
        let yellow = self.observe(&self.yellow, marker_b_region);

        let input = SteeringInput::new(
            blue.centroid,
            yellow.centroid,
            marker_a_region.width as f32,
            previous_steering,
            track_direction,
        )
        .with_bounds(SteeringBounds::new(min_steering, max_steering));

        self.engine.decide(&input).command
    }

    pub fn classify_direction(
        &self,
        frame: &Frame,
        previous_direction: TrackDirection,
    ) -> TrackDirection {
        self.classifier.classify(frame, previous_direction)
    }

    /// Marker observation of one color inside `region`.
    pub fn analyze_marker(&self, color: MarkerColor, region: &Frame) -> MarkerObservation {
        match color {
            MarkerColor::Blue => self.observe(&self.blue, region),
            MarkerColor::Yellow => self.observe(&self.yellow, region),
        }
    }

    fn observe(&self, detector: &MarkerDetector, region: &Frame) -> MarkerObservation {
        let fallback = CentroidEstimator::region_center(region.width, region.height);

        let mask = self.noise.filter(&detector.segmenter.segment(region));
        let kept_rows = region.height.saturating_sub(self.region.foreground_crop_px);
        let mask = mask.crop(0, 0, mask.width(), kept_rows);

        let contours = detector.extractor.extract(&mask);
        let centroid = self.estimator.estimate(&contours, fallback);
        let points = contours.iter().filter_map(contour_centroid).collect();

        debug!(
            "{}: {} contour(s), centroid ({:.1}, {:.1}) valid={}",
            detector.color.as_str(),
            contours.len(),
            centroid.x,
            centroid.y,
            centroid.valid
        );

        MarkerObservation {
            color: detector.color,
            contour_count: contours.len(),
            centroid,
            contour_centroids: points,
        }
    }

    /// Lower part of the frame searched for markers.
    pub fn region_of_interest(&self, frame: &Frame) -> Frame {
        let top = (frame.height as f32 * self.region.roi_top_ratio) as usize;
        frame.region(0, top, frame.width, frame.height.saturating_sub(top))
    }

    // ========================================================================
    // PER-FRAME LOOP
    // ========================================================================

    pub fn process_frame(&mut self, frame: &Frame, inputs: ExternalInputs) -> FrameContext {
        let started = Instant::now();
        let frame_id = self.frame_index;
        self.frame_index += 1;

        let direction_checked = self.scheduler.should_classify(frame_id);
        if direction_checked {
            let direction = self.classify_direction(frame, self.direction);
            self.metrics.record_classification(self.direction, direction);
            self.direction = direction;
        }

        let roi = self.region_of_interest(frame);
        let blue = self.observe(&self.blue, &roi);
        let yellow = self.observe(&self.yellow, &roi);

        let alternate = inputs
            .alternate
            .or_else(|| self.closest_cone_steering(&blue, &yellow, &roi));

        let input = SteeringInput::new(
            blue.centroid,
            yellow.centroid,
            roi.width as f32,
            self.previous,
            self.direction,
        )
        .with_bounds(self.bounds)
        .with_alternate(alternate)
        .with_proximity(inputs.proximity);
        let decision: SteeringDecision = self.engine.decide(&input);
        self.previous = decision.command;

        let path = self.planner.plan(&blue.contour_centroids, &yellow.contour_centroids);

        self.metrics.record_frame(&blue, &yellow, &decision, started.elapsed());

        FrameContext {
            frame_id,
            timestamp_us: frame.timestamp_us,
            direction: self.direction,
            direction_checked,
            blue,
            yellow,
            alternate,
            decision,
            path,
        }
    }

    /// Bearing-based estimate from the nearest cones in the region of interest.
    fn closest_cone_steering(
        &self,
        blue: &MarkerObservation,
        yellow: &MarkerObservation,
        roi: &Frame,
    ) -> Option<f32> {
        self.closest_cone.as_ref()?.estimate(
            &blue.contour_centroids,
            &yellow.contour_centroids,
            roi.width as f32,
            roi.height as f32,
        )
    }

    // ========================================================================
    // STATE
    // ========================================================================

    pub fn direction(&self) -> TrackDirection {
        self.direction
    }

    pub fn previous_steering(&self) -> f32 {
        self.previous
    }

    pub fn frames_processed(&self) -> u64 {
        self.frame_index
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Replace the color threshold of one marker.
    pub fn reconfigure(&mut self, color: MarkerColor, threshold: ColorThreshold) {
        if color == self.designated {
            self.classifier.reconfigure(threshold);
        }
        match color {
            MarkerColor::Blue => self.blue.segmenter.reconfigure(threshold),
            MarkerColor::Yellow => self.yellow.segmenter.reconfigure(threshold),
        }
    }
}
