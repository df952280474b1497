//! Error types shared by the tracker and its integrations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised outside the tracking core.
///
/// A missed or rejected ball is never an error; it is reported through
/// [`FrameStatus`](crate::tracker::FrameStatus) on the frame record.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame source unavailable: {0}")]
    FrameSource(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("track point frame {next} does not follow frame {previous}")]
    NonMonotonicFrame { previous: u64, next: u64 },

    #[error("track point at frame {frame_index} has a non-finite position")]
    NonFiniteTrackPoint { frame_index: u64 },

    #[error("{}:{line}: {message}", .path.display())]
    ReplayFormat {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, TrackError>;
