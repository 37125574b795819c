// src/pipeline/mod.rs

pub mod frame_context;
pub mod metrics;
pub mod orchestrator;

pub use frame_context::{FrameContext, MarkerObservation};
pub use metrics::{MetricsSummary, PipelineMetrics};
pub use orchestrator::{ExternalInputs, SteeringPipeline};
