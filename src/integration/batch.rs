//! Batch mode: one tracking run per video directory.
//!
//! ```text
//! input/
//!   rally_01/  000001.png 000002.png ... detections.jsonl
//!   rally_02/  ...
//! output/
//!   results/tracked_rally_01/frame_000000.png ...
//!   annotations/rally_01.csv
//! ```
//!
//! Every video gets its own [`TrackerPipeline`] and therefore its own
//! session. A video that cannot be read is reported and skipped; the rest
//! of the batch still runs.

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::frames::frame_order_key;
use super::{
    DetectionFilter, ImageSequence, ImageSequenceWriter, PipelineError, ReplayDetector, TrackerPipeline,
    write_csv_path,
};
use crate::config::Config;
use crate::error::{Result, TrackError};
use crate::tracker::SessionSummary;

/// Detections file expected inside each video directory.
pub const DETECTIONS_FILE: &str = "detections.jsonl";

/// One video directory found under the batch input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoJob {
    pub name: String,
    pub dir: PathBuf,
}

impl VideoJob {
    pub fn detections_path(&self) -> PathBuf {
        self.dir.join(DETECTIONS_FILE)
    }

    pub fn annotated_dir(&self, output_dir: &Path) -> PathBuf {
        output_dir.join("results").join(format!("tracked_{}", self.name))
    }

    pub fn csv_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join("annotations").join(format!("{}.csv", self.name))
    }
}

/// Outputs of a video that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoReport {
    pub name: String,
    pub summary: SessionSummary,
    pub csv: PathBuf,
    pub annotated: PathBuf,
}

/// A video that could not be processed.
#[derive(Debug)]
pub struct VideoFailure {
    pub name: String,
    pub error: TrackError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<VideoReport>,
    pub failed: Vec<VideoFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// List the video subdirectories of `input_dir` in natural name order.
///
/// A missing input directory, or one without subdirectories, is an error.
pub fn discover_videos(input_dir: impl AsRef<Path>) -> Result<Vec<VideoJob>> {
    let input_dir = input_dir.as_ref();
    let entries = std::fs::read_dir(input_dir)
        .map_err(|err| TrackError::FrameSource(format!("{}: {err}", input_dir.display())))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    if dirs.is_empty() {
        return Err(TrackError::FrameSource(format!(
            "{}: no video directories found",
            input_dir.display()
        )));
    }
    dirs.sort_by_cached_key(|path| frame_order_key(path));

    Ok(dirs
        .into_iter()
        .map(|dir| VideoJob {
            name: dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            dir,
        })
        .collect())
}

/// Track every video under `input_dir`, writing results into `output_dir`.
///
/// Only discovery failures abort the batch; per-video errors land in
/// [`BatchReport::failed`].
pub fn run_batch(input_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>, config: &Config) -> Result<BatchReport> {
    let output_dir = output_dir.as_ref();
    let jobs = discover_videos(input_dir)?;
    info!(videos = jobs.len(), output = %output_dir.display(), "batch started");

    let mut report = BatchReport::default();
    for job in jobs {
        match run_video(&job, output_dir, config) {
            Ok(video) => report.processed.push(video),
            Err(error) => {
                warn!(video = %job.name, %error, "video skipped");
                report.failed.push(VideoFailure { name: job.name, error });
            }
        }
    }

    info!(
        processed = report.processed.len(),
        failed = report.failed.len(),
        "batch finished"
    );
    Ok(report)
}

/// Run one video through a fresh pipeline.
///
/// Inputs are opened before any output is created, so an unreadable video
/// leaves nothing behind.
pub fn run_video(job: &VideoJob, output_dir: &Path, config: &Config) -> Result<VideoReport> {
    let mut source = ImageSequence::open(&job.dir)?;
    let replay = ReplayDetector::open(job.detections_path())?;

    let annotated = job.annotated_dir(output_dir);
    let csv = job.csv_path(output_dir);
    let mut sink = ImageSequenceWriter::create(&annotated)?;
    info!(video = %job.name, frames = source.len(), "processing video");

    let pipeline = TrackerPipeline::new(replay, DetectionFilter::new(&config.detector), config.tracker.clone());
    let records = pipeline
        .run(&mut source, &mut sink)
        .map_err(|err: PipelineError<Infallible>| match err {
            PipelineError::Detector(never) => match never {},
            PipelineError::Track(err) => err,
        })?;
    write_csv_path(&records, &csv)?;

    Ok(VideoReport {
        name: job.name.clone(),
        summary: SessionSummary::from_records(&records),
        csv,
        annotated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    const RALLY: &str = r#"
{"frame_index": 0, "boxes": [{"x1": 10, "y1": 10, "x2": 20, "y2": 20, "confidence": 0.8}]}
{"frame_index": 1, "boxes": [{"x1": 14, "y1": 10, "x2": 24, "y2": 20, "confidence": 0.8}]}
"#;

    fn write_video(root: &Path, name: &str, frames: usize, detections: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        for i in 0..frames {
            RgbImage::new(32, 32).save(dir.join(format!("{}.png", i + 1))).unwrap();
        }
        std::fs::write(dir.join(DETECTIONS_FILE), detections).unwrap();
    }

    #[test]
    fn test_each_video_gets_its_own_outputs() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_video(input.path(), "rally_a", 3, RALLY);
        write_video(input.path(), "rally_b", 2, "");

        let report = run_batch(input.path(), output.path(), &Config::default()).unwrap();
        assert!(report.is_success());
        assert_eq!(report.processed.len(), 2);

        let a = &report.processed[0];
        assert_eq!(a.name, "rally_a");
        assert_eq!(a.summary.frames, 3);
        assert_eq!(a.summary.detected, 2);
        assert_eq!(a.csv, output.path().join("annotations/rally_a.csv"));
        assert_eq!(std::fs::read_dir(&a.annotated).unwrap().count(), 3);
        let csv = std::fs::read_to_string(&a.csv).unwrap();
        assert!(csv.starts_with("frame_index,x_centroid,y_centroid,visibility_flag\n0,15.0,15.0,1\n1,19.0,15.0,1\n"));

        // no state leaks from rally_a into rally_b
        let b = &report.processed[1];
        assert_eq!(b.summary.detected, 0);
        assert_eq!(b.summary.lost, 2);
        assert!(output.path().join("results/tracked_rally_b/frame_000001.png").is_file());
    }

    #[test]
    fn test_unreadable_video_is_reported_and_skipped() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_video(input.path(), "clip_1", 2, RALLY);
        write_video(input.path(), "clip_2", 2, "{not json\n");
        write_video(input.path(), "clip_3", 0, RALLY);
        write_video(input.path(), "clip_10", 2, RALLY);

        let report = run_batch(input.path(), output.path(), &Config::default()).unwrap();
        assert!(!report.is_success());

        let processed: Vec<&str> = report.processed.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(processed, vec!["clip_1", "clip_10"]);

        let failed: Vec<&str> = report.failed.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(failed, vec!["clip_2", "clip_3"]);
        assert!(matches!(report.failed[0].error, TrackError::ReplayFormat { line: 1, .. }));
        assert!(matches!(report.failed[1].error, TrackError::FrameSource(_)));

        for name in ["clip_2", "clip_3"] {
            assert!(!output.path().join(format!("annotations/{name}.csv")).exists());
            assert!(!output.path().join(format!("results/tracked_{name}")).exists());
        }
        assert!(output.path().join("annotations/clip_10.csv").is_file());
    }

    #[test]
    fn test_videos_are_ordered_naturally() {
        let input = tempfile::tempdir().unwrap();
        for name in ["set10", "set2", "set1"] {
            std::fs::create_dir(input.path().join(name)).unwrap();
        }
        std::fs::write(input.path().join("README.txt"), "ignored").unwrap();

        let names: Vec<String> = discover_videos(input.path())
            .unwrap()
            .into_iter()
            .map(|job| job.name)
            .collect();
        assert_eq!(names, vec!["set1", "set2", "set10"]);
    }

    #[test]
    fn test_missing_or_empty_input_is_fatal() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        assert!(run_batch(input.path().join("nope"), output.path(), &Config::default()).is_err());
        assert!(run_batch(input.path(), output.path(), &Config::default()).is_err());
        assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
    }
}
