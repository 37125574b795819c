// src/main.rs

use anyhow::{Context, Result};
use cone_steering::frame_source::{FrameSource, ImageSequenceSource};
use cone_steering::pipeline::{ExternalInputs, SteeringPipeline};
use cone_steering::steering_log::SteeringLog;
use cone_steering::types::Config;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.yaml";
const PROGRESS_EVERY: u64 = 100;

fn config_path() -> String {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CONE_STEERING_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string())
}

fn main() -> Result<()> {
    let path = config_path();
    let config = Config::load(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cone_steering={}", config.logging.level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🚗 Cone steering starting");
    info!("✓ Configuration loaded from {}", path);
    info!(
        "Steering: alpha={:.2}, bounds=[{:.3}, {:.3}], fallback direction {}, closest-cone {}",
        config.steering.smoothing_alpha,
        config.steering.min_steering,
        config.steering.max_steering,
        config.steering.fallback_direction.as_str(),
        if config.steering.closest_cone.enabled { "on" } else { "off" }
    );

    let mut source = ImageSequenceSource::open(&config.source)?;
    if source.is_empty() {
        warn!("No frames found in {}", config.source.input_dir);
        return Ok(());
    }

    let mut pipeline = SteeringPipeline::new(&config);
    let mut steering_log =
        SteeringLog::create(&config.output.steering_log, config.output.tolerance)?;
    info!("💾 Steering log: {}", config.output.steering_log);

    let mut frame_log = match &config.output.frame_log {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path))?;
            info!("💾 Frame log: {}", path);
            Some(BufWriter::new(file))
        }
        None => None,
    };

    while let Some(item) = source.next_frame()? {
        // No external controller here; the pipeline supplies its closest-cone estimate
        let inputs = ExternalInputs {
            alternate: None,
            proximity: item.proximity,
        };
        let ctx = pipeline.process_frame(&item.frame, inputs);

        steering_log.record(ctx.timestamp_us, ctx.steering(), item.ground_truth)?;
        if let Some(writer) = frame_log.as_mut() {
            writeln!(writer, "{}", serde_json::to_string(&ctx)?)?;
        }

        debug!(
            "Frame {} ({}): {} -> {:.4}",
            ctx.frame_id,
            item.path.display(),
            ctx.decision.source.label(),
            ctx.steering()
        );

        if (ctx.frame_id + 1) % PROGRESS_EVERY == 0 {
            info!(
                "Progress: {}/{} frames, direction {}, steering {:.4}",
                ctx.frame_id + 1,
                source.len(),
                ctx.direction.as_str(),
                ctx.steering()
            );
        }
    }

    if let Some(mut writer) = frame_log {
        writer.flush()?;
    }
    let (_, tally) = steering_log.finish()?;

    let summary = pipeline.metrics().summary();
    info!("\n✓ Run complete");
    info!("  Frames processed: {}", summary.total_frames);
    info!("  Frames skipped: {}", source.skipped());
    info!("  Final direction: {}", pipeline.direction().as_str());
    match tally.percentage() {
        Some(pct) => info!(
            "  🎯 Within {:.0}% of ground truth: {}/{} ({:.1}%)",
            config.output.tolerance * 100.0,
            tally.hits,
            tally.entries,
            pct
        ),
        None => info!("  No ground truth available"),
    }
    info!("📊 Metrics: {}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
