//! Replays detections recorded by an offline detector run.
//!
//! The input is JSON lines, one object per frame:
//!
//! ```text
//! {"frame_index": 0, "boxes": [{"x1": 10, "y1": 10, "x2": 20, "y2": 20, "confidence": 0.8, "class": 0}]}
//! ```
//!
//! Frames that never appear have no detections. Boxes are kept in file
//! order, which is taken to be the detector's rank order.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::DetectionSource;
use crate::error::{Result, TrackError};
use crate::tracker::Detection;

#[derive(Debug, Deserialize)]
struct ReplayBox {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    confidence: f32,
    #[serde(rename = "class", default)]
    class_id: usize,
}

#[derive(Debug, Deserialize)]
struct ReplayFrame {
    frame_index: u64,
    #[serde(default)]
    boxes: Vec<ReplayBox>,
}

/// A [`DetectionSource`] that hands back pre-recorded detections in frame order.
#[derive(Debug, Clone, Default)]
pub struct ReplayDetector {
    frames: BTreeMap<u64, Vec<Detection>>,
    frame_count: u64,
    cursor: u64,
}

impl ReplayDetector {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    pub fn from_jsonl(content: &str) -> Result<Self> {
        Self::parse(content, Path::new("<memory>"))
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut frames = BTreeMap::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let frame: ReplayFrame =
                serde_json::from_str(line).map_err(|err| TrackError::ReplayFormat {
                    path: PathBuf::from(path),
                    line: idx + 1,
                    message: err.to_string(),
                })?;
            let detections = frame
                .boxes
                .into_iter()
                .map(|b| Detection::new(b.x1, b.y1, b.x2, b.y2, b.confidence).with_class(b.class_id));
            frames
                .entry(frame.frame_index)
                .or_insert_with(Vec::new)
                .extend(detections);
        }

        let frame_count = frames.keys().next_back().map_or(0, |last| last + 1);
        Ok(Self {
            frames,
            frame_count,
            cursor: 0,
        })
    }

    /// One past the highest frame index in the recording.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Detections for the next frame, advancing the cursor.
    pub fn next_detections(&mut self) -> Vec<Detection> {
        let detections = self.frames.remove(&self.cursor).unwrap_or_default();
        self.cursor += 1;
        detections
    }
}

impl DetectionSource for ReplayDetector {
    type Error = Infallible;

    fn detect(
        &mut self,
        _input: &[u8],
        _width: u32,
        _height: u32,
    ) -> std::result::Result<Vec<Detection>, Self::Error> {
        Ok(self.next_detections())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDING: &str = r#"
{"frame_index": 0, "boxes": [{"x1": 10, "y1": 10, "x2": 20, "y2": 20, "confidence": 0.8, "class": 0}]}

{"frame_index": 2, "boxes": [{"x1": 30, "y1": 10, "x2": 40, "y2": 20, "confidence": 0.7}, {"x1": 0, "y1": 0, "x2": 5, "y2": 5, "confidence": 0.2, "class": 1}]}
"#;

    #[test]
    fn test_replays_in_frame_order() {
        let mut replay = ReplayDetector::from_jsonl(RECORDING).unwrap();
        assert_eq!(replay.frame_count(), 3);

        let first = replay.detect(&[], 0, 0).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].center(), nalgebra::Point2::new(15.0, 15.0));

        assert!(replay.detect(&[], 0, 0).unwrap().is_empty());

        let third = replay.next_detections();
        assert_eq!(third.len(), 2);
        assert_eq!(third[0].score, 0.7);
        assert_eq!(third[1].class_id, 1);

        assert!(replay.next_detections().is_empty());
    }

    #[test]
    fn test_reports_bad_line() {
        let err = ReplayDetector::from_jsonl("{\"frame_index\": 0}\nnot json\n").unwrap_err();
        match err {
            TrackError::ReplayFormat { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_empty_recording() {
        let replay = ReplayDetector::from_jsonl("").unwrap();
        assert_eq!(replay.frame_count(), 0);
    }
}
