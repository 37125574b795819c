// src/frame_source.rs

use crate::steering::ProximityReading;
use crate::types::{Frame, PixelFormat, SourceConfig};
use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// One decoded frame plus what the source knows about it.
#[derive(Debug, Clone)]
pub struct SourceFrame {
    pub frame: Frame,
    pub path: PathBuf,
    /// Steering recorded for this frame, when a ground-truth map was given
    pub ground_truth: Option<f32>,
    /// Side distance readings recorded with the frame
    pub proximity: Option<ProximityReading>,
}

/// What the ground-truth file records for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameRecord {
    pub steering: Option<f32>,
    pub proximity: Option<ProximityReading>,
}

/// A ground-truth entry is either the bare steering value or an object that
/// may also carry both side distance readings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordEntry {
    Steering(f32),
    Detailed {
        #[serde(default)]
        steering: Option<f32>,
        #[serde(default)]
        ir_left: Option<f64>,
        #[serde(default)]
        ir_right: Option<f64>,
    },
}

impl From<RecordEntry> for FrameRecord {
    fn from(entry: RecordEntry) -> Self {
        match entry {
            RecordEntry::Steering(steering) => FrameRecord {
                steering: Some(steering),
                proximity: None,
            },
            RecordEntry::Detailed {
                steering,
                ir_left,
                ir_right,
            } => FrameRecord {
                steering,
                proximity: ir_left
                    .zip(ir_right)
                    .map(|(left, right)| ProximityReading { left, right }),
            },
        }
    }
}

pub trait FrameSource {
    /// `Ok(None)` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<SourceFrame>>;
}

/// Reads a directory of still images as a frame sequence, in path order.
pub struct ImageSequenceSource {
    files: Vec<PathBuf>,
    cursor: usize,
    fps: f64,
    expected_size: (Option<usize>, Option<usize>),
    records: HashMap<String, FrameRecord>,
    skipped: usize,
}

impl ImageSequenceSource {
    pub fn open(config: &SourceConfig) -> Result<Self> {
        let files = find_image_files(Path::new(&config.input_dir))?;
        let records = match &config.ground_truth {
            Some(path) => load_ground_truth(Path::new(path))?,
            None => HashMap::new(),
        };

        info!(
            "📂 {} image(s) in {} ({} ground-truth entries)",
            files.len(),
            config.input_dir,
            records.len()
        );

        Ok(Self {
            files,
            cursor: 0,
            fps: config.fps,
            expected_size: (config.width, config.height),
            records,
            skipped: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Frames dropped because they could not be decoded or had the wrong size.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn timestamp_us(&self, index: usize) -> i64 {
        (index as f64 * 1_000_000.0 / self.fps).round() as i64
    }

    fn decode(&self, path: &Path) -> Result<Frame> {
        let image = image::open(path)
            .with_context(|| format!("Failed to decode {}", path.display()))?
            .to_rgb8();
        let (width, height) = (image.width() as usize, image.height() as usize);

        let (expected_w, expected_h) = self.expected_size;
        ensure!(
            expected_w.map_or(true, |w| w == width) && expected_h.map_or(true, |h| h == height),
            "{} is {}x{}, expected {}x{}",
            path.display(),
            width,
            height,
            expected_w.map_or("*".to_string(), |w| w.to_string()),
            expected_h.map_or("*".to_string(), |h| h.to_string())
        );

        Ok(Frame::new(image.into_raw(), width, height, PixelFormat::Rgb8))
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<SourceFrame>> {
        while self.cursor < self.files.len() {
            let index = self.cursor;
            self.cursor += 1;
            let path = self.files[index].clone();

            let frame = match self.decode(&path) {
                Ok(frame) => frame.with_timestamp(self.timestamp_us(index)),
                Err(e) => {
                    warn!("Skipping frame: {:#}", e);
                    self.skipped += 1;
                    continue;
                }
            };

            let record = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|stem| self.records.get(stem).copied())
                .unwrap_or_default();

            return Ok(Some(SourceFrame {
                frame,
                path,
                ground_truth: record.steering,
                proximity: record.proximity,
            }));
        }
        Ok(None)
    }
}

/// Image files under `dir`, sorted by path.
pub fn find_image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    ensure!(dir.is_dir(), "Input directory {} does not exist", dir.display());

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();

    files.sort();
    Ok(files)
}

/// JSON object mapping file stem -> recorded steering, or -> `{"steering",
/// "ir_left", "ir_right"}` with every key optional.
pub fn load_ground_truth(path: &Path) -> Result<HashMap<String, FrameRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ground truth {}", path.display()))?;
    let entries: HashMap<String, RecordEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse ground truth {}", path.display()))?;
    Ok(entries.into_iter().map(|(stem, entry)| (stem, entry.into())).collect())
}
