//! Collaborators around the tracking core: detectors, frame I/O, overlay
//! rendering, CSV export, the pipeline that ties them together and batch
//! runs over many videos.

mod batch;
mod builder;
mod detector;
mod export;
mod frames;
mod overlay;
mod pipeline;
mod replay;

pub use batch::{BatchReport, DETECTIONS_FILE, VideoFailure, VideoJob, VideoReport, discover_videos, run_batch, run_video};
pub use builder::DetectionBuilder;
pub use detector::{DetectionFilter, DetectionSource, DetectorConfig};
pub use export::{write_csv, write_csv_path};
pub use frames::{FrameSink, FrameSource, ImageSequence, ImageSequenceWriter};
pub use overlay::{OverlayRenderer, OverlayStyle};
pub use pipeline::{PipelineError, TrackerPipeline};
pub use replay::ReplayDetector;

#[cfg(feature = "burn-backend")]
mod burn_backend;

#[cfg(feature = "burn-backend")]
pub use burn_backend::{BurnDetector, BurnDetectorError, BurnModel, RawDetection};
