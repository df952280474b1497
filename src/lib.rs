//! Single-ball trajectory tracking over per-frame detector output.
//!
//! A [`TrackSession`] takes each frame's candidate boxes, accepts at most one
//! of them through a distance-over-time gate, fills short gaps by
//! constant-velocity extrapolation, and emits one [`FrameRecord`] per frame.
//! The [`integration`] module wires sessions to detectors, image sequences,
//! the trajectory overlay and CSV export.

pub mod config;
pub mod error;
pub mod integration;
pub mod tracker;

pub use config::Config;
pub use error::{Result, TrackError};
pub use integration::{DetectionSource, DetectorConfig, TrackerPipeline};
pub use tracker::{Detection, FrameRecord, FrameStatus, History, TrackPoint, TrackSession, TrackerConfig};
