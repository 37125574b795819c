// src/steering/mod.rs

pub mod closest_cone;
pub mod engine;
pub mod smoother;
pub mod zones;

pub use closest_cone::{ClosestConeConfig, ClosestConeEstimator};
pub use engine::{
    DecisionSource, ProximityConfig, ProximityReading, SteeringConfig, SteeringDecision,
    SteeringDecisionEngine, SteeringInput,
};
pub use smoother::{smooth, SteeringBounds, SteeringSmoother};
pub use zones::{Magnitude, SteeringClass, SteeringMagnitudes, ZoneTable, Zones};
