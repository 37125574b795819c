// src/pipeline/metrics.rs
//
// Per-run counters and timing. Summarised to JSON at the end of a run.

use super::frame_context::MarkerObservation;
use crate::steering::{DecisionSource, SteeringDecision};
use crate::types::TrackDirection;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub total_frames: u64,
    pub frames_with_blue: u64,
    pub frames_with_yellow: u64,
    pub zone_decisions: u64,
    pub unadjusted_decisions: u64,
    pub alternate_decisions: u64,
    pub proximity_decisions: u64,
    pub rule_hits: BTreeMap<&'static str, u64>,
    pub classifier_runs: u64,
    pub direction_changes: u64,
    pub last_frame_us: u64,
    pub total_frame_us: u64,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: 0,
            frames_with_blue: 0,
            frames_with_yellow: 0,
            zone_decisions: 0,
            unadjusted_decisions: 0,
            alternate_decisions: 0,
            proximity_decisions: 0,
            rule_hits: BTreeMap::new(),
            classifier_runs: 0,
            direction_changes: 0,
            last_frame_us: 0,
            total_frame_us: 0,
            started_at: Instant::now(),
        }
    }

    pub fn record_classification(&mut self, before: TrackDirection, after: TrackDirection) {
        self.classifier_runs += 1;
        if before != after {
            self.direction_changes += 1;
        }
    }

    pub fn record_frame(
        &mut self,
        blue: &MarkerObservation,
        yellow: &MarkerObservation,
        decision: &SteeringDecision,
        elapsed: Duration,
    ) {
        self.total_frames += 1;
        if blue.detected() {
            self.frames_with_blue += 1;
        }
        if yellow.detected() {
            self.frames_with_yellow += 1;
        }

        match decision.source {
            DecisionSource::ZoneRule(class) => {
                self.zone_decisions += 1;
                *self.rule_hits.entry(class.label()).or_insert(0) += 1;
            }
            DecisionSource::NoAdjustment => self.unadjusted_decisions += 1,
            DecisionSource::Alternate => self.alternate_decisions += 1,
            DecisionSource::Proximity => self.proximity_decisions += 1,
        }

        let us = elapsed.as_micros() as u64;
        self.last_frame_us = us;
        self.total_frame_us += us;
    }

    pub fn fps(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            self.total_frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames,
            fps: self.fps(),
            frames_with_blue: self.frames_with_blue,
            frames_with_yellow: self.frames_with_yellow,
            zone_decisions: self.zone_decisions,
            unadjusted_decisions: self.unadjusted_decisions,
            alternate_decisions: self.alternate_decisions,
            proximity_decisions: self.proximity_decisions,
            rule_hits: self
                .rule_hits
                .iter()
                .map(|(label, count)| (label.to_string(), *count))
                .collect(),
            classifier_runs: self.classifier_runs,
            direction_changes: self.direction_changes,
            last_frame_us: self.last_frame_us,
            avg_frame_us: self.total_frame_us / self.total_frames.max(1),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub fps: f64,
    pub frames_with_blue: u64,
    pub frames_with_yellow: u64,
    pub zone_decisions: u64,
    pub unadjusted_decisions: u64,
    pub alternate_decisions: u64,
    pub proximity_decisions: u64,
    pub rule_hits: BTreeMap<String, u64>,
    pub classifier_runs: u64,
    pub direction_changes: u64,
    pub last_frame_us: u64,
    pub avg_frame_us: u64,
    pub elapsed_secs: f64,
}
