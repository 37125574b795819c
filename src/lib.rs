// src/lib.rs

pub mod centroid;
pub mod config;
pub mod contours;
pub mod direction;
pub mod frame_source;
pub mod mask;
pub mod noise;
pub mod path_planner;
pub mod pipeline;
pub mod segmentation;
pub mod steering;
pub mod steering_log;
pub mod types;

pub use centroid::CentroidEstimator;
pub use contours::{Contour, ContourExtractor, ContourFilter};
pub use direction::{DirectionClassifier, DirectionScheduler};
pub use mask::Mask;
pub use noise::{NoiseConfig, NoiseFilter};
pub use pipeline::{ExternalInputs, FrameContext, SteeringPipeline};
pub use segmentation::{ColorThreshold, MarkerSegmenter};
pub use steering::{SteeringDecision, SteeringDecisionEngine};
pub use types::{Centroid, Config, Frame, MarkerColor, PixelFormat, Point2, TrackDirection};
