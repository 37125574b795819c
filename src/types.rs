// src/types.rs

use crate::contours::ContourFilter;
use crate::noise::NoiseConfig;
use crate::segmentation::ColorThreshold;
use crate::steering::{ProximityConfig, SteeringConfig};
use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub markers: MarkersConfig,
    pub noise: NoiseConfig,
    pub region: RegionConfig,
    pub direction: DirectionConfig,
    pub steering: SteeringConfig,
    pub proximity: ProximityConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkersConfig {
    pub blue: MarkerSpec,
    pub yellow: MarkerSpec,
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self {
            blue: MarkerSpec {
                threshold: ColorThreshold::new([90, 44, 43], [135, 255, 255]),
                contour_filter: ContourFilter::area_only(130.0, 1000.0),
            },
            yellow: MarkerSpec {
                threshold: ColorThreshold::new([15, 42, 46], [30, 255, 255]),
                contour_filter: ContourFilter::with_aspect(130.0, 1000.0, 0.5, 2.0),
            },
        }
    }
}

impl MarkersConfig {
    pub fn spec(&self, color: MarkerColor) -> &MarkerSpec {
        match color {
            MarkerColor::Blue => &self.blue,
            MarkerColor::Yellow => &self.yellow,
        }
    }
}

/// Everything needed to detect one marker color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub threshold: ColorThreshold,
    pub contour_filter: ContourFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Fraction of the frame height above the analysed region
    /// (0.5 = only the lower half of the frame is searched for markers)
    pub roi_top_ratio: f32,
    /// Rows removed from the bottom of the region before contour extraction
    /// (vehicle body / immediate foreground)
    pub foreground_crop_px: usize,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            roi_top_ratio: 0.5,
            foreground_crop_px: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionConfig {
    /// Marker whose left/right presence decides the lap direction
    pub designated_marker: MarkerColor,
    /// Fraction of the frame height (from the top) inspected by the classifier
    pub top_crop_ratio: f32,
    /// Run the classifier every N frames once warmed up
    pub interval_frames: u64,
    /// Run the classifier on every frame during the first N frames
    pub warmup_frames: u64,
    pub initial: TrackDirection,
}

impl Default for DirectionConfig {
    fn default() -> Self {
        Self {
            designated_marker: MarkerColor::Yellow,
            top_crop_ratio: 0.8,
            interval_frames: 15,
            warmup_frames: 30,
            initial: TrackDirection::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub input_dir: String,
    pub fps: f64,
    /// Expected frame size; frames of any other size are skipped
    pub width: Option<usize>,
    pub height: Option<usize>,
    /// Optional JSON object mapping image file stem -> observed steering
    pub ground_truth: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            input_dir: "frames".to_string(),
            fps: 30.0,
            width: None,
            height: None,
            ground_truth: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub steering_log: String,
    /// Optional JSON-lines dump of every frame's context
    pub frame_log: Option<String>,
    /// Relative band around ground truth counted as agreement
    pub tolerance: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            steering_log: "steering_angles.csv".to_string(),
            frame_log: None,
            tolerance: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// FRAMES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    Rgb8,
    Bgr8,
    /// 4-channel camera buffer layout (shared-memory ARGB frames)
    Bgra8,
}

impl PixelFormat {
    pub fn channels(&self) -> usize {
        match self {
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 3,
            PixelFormat::Bgra8 => 4,
        }
    }
}

/// One camera frame. Row-major, `channels()` bytes per pixel.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    pub timestamp_us: i64,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: usize, height: usize, format: PixelFormat) -> Self {
        debug_assert_eq!(data.len(), width * height * format.channels());
        Self {
            data,
            width,
            height,
            format,
            timestamp_us: 0,
        }
    }

    pub fn with_timestamp(mut self, timestamp_us: i64) -> Self {
        self.timestamp_us = timestamp_us;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGB triple at (x, y) regardless of the stored layout.
    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * self.width + x) * self.format.channels();
        let p = &self.data[idx..idx + 3];
        match self.format {
            PixelFormat::Rgb8 => [p[0], p[1], p[2]],
            PixelFormat::Bgr8 | PixelFormat::Bgra8 => [p[2], p[1], p[0]],
        }
    }

    /// Copy out a rectangular region, clipped to the frame.
    pub fn region(&self, x: usize, y: usize, width: usize, height: usize) -> Frame {
        let x0 = x.min(self.width);
        let y0 = y.min(self.height);
        let w = width.min(self.width - x0);
        let h = height.min(self.height - y0);
        let ch = self.format.channels();

        let mut data = Vec::with_capacity(w * h * ch);
        for row in y0..y0 + h {
            let start = (row * self.width + x0) * ch;
            data.extend_from_slice(&self.data[start..start + w * ch]);
        }

        Frame {
            data,
            width: w,
            height: h,
            format: self.format,
            timestamp_us: self.timestamp_us,
        }
    }
}

// ============================================================================
// GEOMETRY AND STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Representative marker position for one frame region.
/// `valid == false` means no contour qualified and the point is the region center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Centroid {
    pub x: f32,
    pub y: f32,
    pub valid: bool,
}

impl Centroid {
    pub fn detected(x: f32, y: f32) -> Self {
        Self { x, y, valid: true }
    }

    pub fn fallback(center: Point2) -> Self {
        Self {
            x: center.x,
            y: center.y,
            valid: false,
        }
    }

    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    /// Marker A
    Blue,
    /// Marker B
    Yellow,
}

impl MarkerColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerColor::Blue => "BLUE",
            MarkerColor::Yellow => "YELLOW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackDirection {
    Clockwise,
    CounterClockwise,
    Unknown,
}

impl TrackDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackDirection::Clockwise => "CLOCKWISE",
            TrackDirection::CounterClockwise => "COUNTER_CLOCKWISE",
            TrackDirection::Unknown => "UNKNOWN",
        }
    }

    /// Marker expected along the left edge of the lane for this lap direction.
    pub fn inner_marker(&self) -> Option<MarkerColor> {
        match self {
            TrackDirection::Clockwise => Some(MarkerColor::Blue),
            TrackDirection::CounterClockwise => Some(MarkerColor::Yellow),
            TrackDirection::Unknown => None,
        }
    }
}

impl Default for TrackDirection {
    fn default() -> Self {
        TrackDirection::Unknown
    }
}
