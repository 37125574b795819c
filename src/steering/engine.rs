// src/steering/engine.rs
//
// Turns the two marker centroids into a bounded steering command.

use super::closest_cone::ClosestConeConfig;
use super::smoother::{SteeringBounds, SteeringSmoother};
use super::zones::{SteeringClass, SteeringMagnitudes, ZoneTable, Zones};
use crate::types::{Centroid, MarkerColor, TrackDirection};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Weight of the new raw value in the exponential smoothing
    pub smoothing_alpha: f32,
    pub min_steering: f32,
    pub max_steering: f32,
    pub magnitudes: SteeringMagnitudes,
    /// Direction assumed while the classifier has not decided yet
    pub fallback_direction: TrackDirection,
    pub closest_cone: ClosestConeConfig,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: 0.1,
            min_steering: -0.3,
            max_steering: 0.3,
            magnitudes: SteeringMagnitudes::default(),
            fallback_direction: TrackDirection::CounterClockwise,
            closest_cone: ClosestConeConfig::default(),
        }
    }
}

impl SteeringConfig {
    pub fn bounds(&self) -> SteeringBounds {
        SteeringBounds::new(self.min_steering, self.max_steering)
    }
}

/// Nudge applied from side distance sensors when no marker is visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Readings below this count as "obstacle close on that side"
    pub threshold: f64,
    pub nudge: f32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0075,
            nudge: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityReading {
    pub left: f64,
    pub right: f64,
}

// ============================================================================
// DECISIONS
// ============================================================================

/// Everything one decision depends on.
#[derive(Debug, Clone, Copy)]
pub struct SteeringInput {
    pub blue: Centroid,
    pub yellow: Centroid,
    /// Width of the region the centroids were measured in
    pub width: f32,
    pub previous: f32,
    pub direction: TrackDirection,
    pub bounds: SteeringBounds,
    pub alternate: Option<f32>,
    pub proximity: Option<ProximityReading>,
}

impl SteeringInput {
    pub fn new(
        blue: Centroid,
        yellow: Centroid,
        width: f32,
        previous: f32,
        direction: TrackDirection,
    ) -> Self {
        Self {
            blue,
            yellow,
            width,
            previous,
            direction,
            bounds: SteeringBounds::default(),
            alternate: None,
            proximity: None,
        }
    }

    pub fn with_bounds(mut self, bounds: SteeringBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_alternate(mut self, alternate: Option<f32>) -> Self {
        self.alternate = alternate;
        self
    }

    pub fn with_proximity(mut self, proximity: Option<ProximityReading>) -> Self {
        self.proximity = proximity;
        self
    }

    fn any_marker(&self) -> bool {
        self.blue.valid || self.yellow.valid
    }

    fn centroid(&self, color: MarkerColor) -> &Centroid {
        match color {
            MarkerColor::Blue => &self.blue,
            MarkerColor::Yellow => &self.yellow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DecisionSource {
    ZoneRule(SteeringClass),
    /// No rule matched and nothing else applied
    NoAdjustment,
    Alternate,
    Proximity,
}

impl DecisionSource {
    pub fn label(&self) -> &'static str {
        match self {
            DecisionSource::ZoneRule(class) => class.label(),
            DecisionSource::NoAdjustment => "no_adjustment",
            DecisionSource::Alternate => "alternate",
            DecisionSource::Proximity => "proximity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SteeringDecision {
    pub source: DecisionSource,
    /// Raw table value before smoothing, when a rule matched
    pub raw: Option<f32>,
    pub command: f32,
    /// Direction the table was evaluated with
    pub direction: TrackDirection,
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct SteeringDecisionEngine {
    table: ZoneTable,
    magnitudes: SteeringMagnitudes,
    smoother: SteeringSmoother,
    fallback_direction: TrackDirection,
    proximity: ProximityConfig,
}

impl SteeringDecisionEngine {
    pub fn new(config: &SteeringConfig, proximity: &ProximityConfig) -> Self {
        Self {
            table: ZoneTable::canonical(),
            magnitudes: config.magnitudes,
            smoother: SteeringSmoother::new(config.smoothing_alpha),
            fallback_direction: config.fallback_direction,
            proximity: proximity.clone(),
        }
    }

    /// Direction the table is evaluated with.
    pub fn effective_direction(&self, direction: TrackDirection) -> TrackDirection {
        match direction {
            TrackDirection::Unknown => match self.fallback_direction {
                TrackDirection::Unknown => TrackDirection::CounterClockwise,
                fallback => fallback,
            },
            known => known,
        }
    }

    /// Rule-table class for a centroid pair, `None` when nothing matches.
    pub fn classify(
        &self,
        blue: &Centroid,
        yellow: &Centroid,
        width: f32,
        direction: TrackDirection,
    ) -> Option<SteeringClass> {
        let direction = self.effective_direction(direction);
        let inner_color = direction.inner_marker().unwrap_or(MarkerColor::Yellow);
        let (inner, outer) = match inner_color {
            MarkerColor::Blue => (blue, yellow),
            MarkerColor::Yellow => (yellow, blue),
        };

        let detected = |c: &Centroid| if c.valid { Some(c.x) } else { None };
        self.table
            .evaluate(detected(inner), detected(outer), &Zones::new(width))
            .map(|rule| rule.class)
    }

    pub fn raw_steering(&self, class: SteeringClass) -> f32 {
        self.magnitudes.value(class)
    }

    pub fn decide(&self, input: &SteeringInput) -> SteeringDecision {
        let direction = self.effective_direction(input.direction);

        if let Some(alternate) = input.alternate {
            let substitute = input.direction == TrackDirection::Unknown
                || (input.direction == TrackDirection::CounterClockwise && !input.any_marker());
            if substitute {
                let command = input.bounds.clamp(alternate);
                debug!("Alternate steering {:.4} -> {:.4}", alternate, command);
                return SteeringDecision {
                    source: DecisionSource::Alternate,
                    raw: None,
                    command,
                    direction,
                };
            }
        }

        if let Some(class) = self.classify(
            input.centroid(MarkerColor::Blue),
            input.centroid(MarkerColor::Yellow),
            input.width,
            direction,
        ) {
            let raw = self.raw_steering(class);
            let command = self.smoother.apply(input.previous, raw, &input.bounds);
            debug!(
                "Zone rule {} (raw {:.3}): {:.4} -> {:.4}",
                class.label(),
                raw,
                input.previous,
                command
            );
            return SteeringDecision {
                source: DecisionSource::ZoneRule(class),
                raw: Some(raw),
                command,
                direction,
            };
        }

        if !input.any_marker() {
            let nudged = input
                .proximity
                .and_then(|r| self.proximity_nudge(input.previous, r, &input.bounds));
            if let Some(command) = nudged {
                debug!("Proximity override: {:.4} -> {:.4}", input.previous, command);
                return SteeringDecision {
                    source: DecisionSource::Proximity,
                    raw: None,
                    command,
                    direction,
                };
            }
        }

        SteeringDecision {
            source: DecisionSource::NoAdjustment,
            raw: None,
            command: input.previous,
            direction,
        }
    }

    fn proximity_nudge(
        &self,
        previous: f32,
        reading: ProximityReading,
        bounds: &SteeringBounds,
    ) -> Option<f32> {
        if reading.left < self.proximity.threshold {
            Some(bounds.clamp(previous + self.proximity.nudge))
        } else if reading.right < self.proximity.threshold {
            Some(bounds.clamp(previous - self.proximity.nudge))
        } else {
            None
        }
    }
}

impl Default for SteeringDecisionEngine {
    fn default() -> Self {
        Self::new(&SteeringConfig::default(), &ProximityConfig::default())
    }
}
