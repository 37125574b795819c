// src/steering_log.rs
//
// Flat per-frame record of steering decisions, plus agreement with recorded
// (ground-truth) steering.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CSV_HEADER: &str = "timestamp_us,steering,ground_truth,within_tolerance";

/// `value` lies within `tolerance` (relative) of `ground_truth`.
/// The band is ordered, so negative ground truth works.
pub fn within_tolerance(value: f32, ground_truth: f32, tolerance: f32) -> bool {
    let a = ground_truth * (1.0 - tolerance);
    let b = ground_truth * (1.0 + tolerance);
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    value >= lo && value <= hi
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AccuracyTally {
    pub entries: u64,
    pub hits: u64,
}

impl AccuracyTally {
    pub fn record(&mut self, within: bool) {
        self.entries += 1;
        if within {
            self.hits += 1;
        }
    }

    /// `None` before the first entry.
    pub fn percentage(&self) -> Option<f64> {
        if self.entries == 0 {
            None
        } else {
            Some(100.0 * self.hits as f64 / self.entries as f64)
        }
    }
}

pub struct SteeringLog<W: Write> {
    writer: W,
    tolerance: f32,
    tally: AccuracyTally,
}

impl SteeringLog<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>, tolerance: f32) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        Self::new(BufWriter::new(file), tolerance)
    }
}

impl<W: Write> SteeringLog<W> {
    pub fn new(mut writer: W, tolerance: f32) -> Result<Self> {
        writeln!(writer, "{}", CSV_HEADER)?;
        Ok(Self {
            writer,
            tolerance,
            tally: AccuracyTally::default(),
        })
    }

    /// Append one row. Returns the tolerance verdict when ground truth is known.
    pub fn record(
        &mut self,
        timestamp_us: i64,
        steering: f32,
        ground_truth: Option<f32>,
    ) -> Result<Option<bool>> {
        let within = ground_truth.map(|gt| within_tolerance(steering, gt, self.tolerance));
        if let Some(hit) = within {
            self.tally.record(hit);
        }

        let gt = ground_truth.map(|v| v.to_string()).unwrap_or_default();
        let flag = within.map(|v| v.to_string()).unwrap_or_default();
        writeln!(self.writer, "{},{},{},{}", timestamp_us, steering, gt, flag)?;
        Ok(within)
    }

    pub fn tally(&self) -> AccuracyTally {
        self.tally
    }

    pub fn finish(mut self) -> Result<(W, AccuracyTally)> {
        self.writer.flush()?;
        Ok((self.writer, self.tally))
    }
}
