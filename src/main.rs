// src/main.rs

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use balltrack_rs::integration::{
    DetectionFilter, ImageSequence, ImageSequenceWriter, ReplayDetector, TrackerPipeline, run_batch, write_csv_path,
};
use balltrack_rs::{Config, FrameRecord, TrackSession};

/// Track a ball through recorded detections and write per-frame positions.
#[derive(Debug, Parser)]
#[command(name = "balltrack", version, about)]
struct Args {
    /// JSON-lines detections, one object per frame
    #[arg(long, required_unless_present = "input_dir")]
    detections: Option<PathBuf>,

    /// Output CSV (frame_index, x_centroid, y_centroid, visibility_flag)
    #[arg(long, required_unless_present = "input_dir")]
    csv: Option<PathBuf>,

    /// Batch input: one subdirectory per video with frames and detections.jsonl
    #[arg(long, requires = "output_dir", conflicts_with_all = ["detections", "csv", "frames"])]
    input_dir: Option<PathBuf>,

    /// Batch output root for results/ and annotations/
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Directory of input frames to annotate
    #[arg(long, requires = "output_frames")]
    frames: Option<PathBuf>,

    /// Directory for annotated frames
    #[arg(long)]
    output_frames: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frames to process when no frame directory is given
    #[arg(long)]
    frame_count: Option<u64>,

    #[arg(long)]
    speed_limit: Option<f64>,

    #[arg(long)]
    max_gap: Option<u64>,

    #[arg(long)]
    confidence: Option<f32>,

    #[arg(long)]
    target_class: Option<usize>,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(speed_limit) = args.speed_limit {
        config.tracker.speed_limit = speed_limit;
    }
    if let Some(max_gap) = args.max_gap {
        config.tracker.max_gap = max_gap;
    }
    if let Some(confidence) = args.confidence {
        config.detector.confidence_threshold = confidence;
    }
    if let Some(target_class) = args.target_class {
        config.detector.target_class = target_class;
    }

    config.validate()?;
    Ok(config)
}

fn track_detections_only(
    mut replay: ReplayDetector,
    filter: &DetectionFilter,
    config: &Config,
    frame_count: u64,
) -> Vec<FrameRecord> {
    let mut session = TrackSession::new(config.tracker.clone());
    for _ in 0..frame_count {
        session.update(&filter.apply(replay.next_detections()));
    }

    let summary = session.summary();
    info!(
        frames = summary.frames,
        detected = summary.detected,
        interpolated = summary.interpolated,
        lost = summary.lost,
        "tracking session finished"
    );
    session.finish()
}

fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("balltrack_rs=info,balltrack=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(
        speed_limit = config.tracker.speed_limit,
        max_gap = config.tracker.max_gap,
        confidence = config.detector.confidence_threshold,
        target_class = config.detector.target_class,
        "configuration loaded"
    );

    if let (Some(input_dir), Some(output_dir)) = (&args.input_dir, &args.output_dir) {
        let report = run_batch(input_dir, output_dir, &config)
            .with_context(|| format!("batch over {}", input_dir.display()))?;
        for failure in &report.failed {
            error!(video = %failure.name, error = %failure.error, "video failed");
        }
        if !report.is_success() {
            bail!("{} of {} videos failed", report.failed.len(), report.failed.len() + report.processed.len());
        }
        return Ok(());
    }

    let (Some(detections), Some(csv)) = (&args.detections, &args.csv) else {
        bail!("--detections and --csv are required without --input-dir");
    };

    let replay = ReplayDetector::open(detections)
        .with_context(|| format!("reading detections from {}", detections.display()))?;
    let filter = DetectionFilter::new(&config.detector);

    let records = match (&args.frames, &args.output_frames) {
        (Some(frames_dir), Some(output_dir)) => {
            let mut source = ImageSequence::open(frames_dir)?;
            let mut sink = ImageSequenceWriter::create(output_dir)?;
            info!(frames = source.len(), input = %frames_dir.display(), "processing frames");
            TrackerPipeline::new(replay, filter, config.tracker.clone()).run(&mut source, &mut sink)?
        }
        _ => {
            let frame_count = args.frame_count.unwrap_or_else(|| replay.frame_count());
            info!(frame_count, "processing detections without frames");
            track_detections_only(replay, &filter, &config, frame_count)
        }
    };

    write_csv_path(&records, csv).with_context(|| format!("writing {}", csv.display()))?;
    info!(rows = records.len(), output = %csv.display(), "CSV written");

    Ok(())
}
