//! Trait for object detection inference backends, plus candidate filtering.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, TrackError};
use crate::tracker::Detection;

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any ball detector to the tracker.
/// Detections must come back ordered by confidence, best first.
///
/// # Example
///
/// ```ignore
/// use balltrack_rs::{DetectionSource, Detection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data and return detections.
    ///
    /// # Arguments
    /// * `input` - Packed RGB8 frame bytes
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> std::result::Result<Vec<Detection>, Self::Error>;
}

/// Detector-side settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum confidence a box needs to be considered
    pub confidence_threshold: f32,
    /// Square input size the model runs at
    pub inference_size: u32,
    /// The only class id that is tracked
    pub target_class: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.15,
            inference_size: 512,
            target_class: 0,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(TrackError::InvalidConfig(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.inference_size == 0 {
            return Err(TrackError::InvalidConfig("inference_size must be positive".into()));
        }
        Ok(())
    }
}

/// Drops boxes of the wrong class, below threshold, or degenerate.
///
/// Survivors keep the detector's rank order.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionFilter {
    confidence_threshold: f32,
    target_class: usize,
}

impl DetectionFilter {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            target_class: config.target_class,
        }
    }

    pub fn apply(&self, detections: Vec<Detection>) -> Vec<Detection> {
        detections
            .into_iter()
            .filter(|det| {
                if det.bbox.is_degenerate() {
                    warn!(bbox = ?det.bbox, score = det.score, "skipping degenerate detection");
                    return false;
                }
                det.class_id == self.target_class && det.score >= self.confidence_threshold
            })
            .collect()
    }
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self::new(&DetectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keeps_rank_order() {
        let filter = DetectionFilter::default();
        let dets = vec![
            Detection::new(0.0, 0.0, 10.0, 10.0, 0.9),
            Detection::new(0.0, 0.0, 10.0, 10.0, 0.1),
            Detection::new(20.0, 20.0, 30.0, 30.0, 0.5),
        ];

        let kept = filter.apply(dets);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, 0.9);
        assert_eq!(kept[1].score, 0.5);
    }

    #[test]
    fn test_filter_drops_other_classes_and_degenerate_boxes() {
        let filter = DetectionFilter::new(&DetectorConfig {
            target_class: 1,
            ..DetectorConfig::default()
        });
        let dets = vec![
            Detection::new(0.0, 0.0, 10.0, 10.0, 0.9),
            Detection::new(5.0, 5.0, 5.0, 15.0, 0.9).with_class(1),
            Detection::new(0.0, 0.0, 10.0, 10.0, 0.4).with_class(1),
        ];

        let kept = filter.apply(dets);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.4);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let filter = DetectionFilter::default();
        let kept = filter.apply(vec![Detection::new(0.0, 0.0, 1.0, 1.0, 0.15)]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_detector_config_validation() {
        assert!(DetectorConfig::default().validate().is_ok());
        let bad = DetectorConfig {
            confidence_threshold: 1.5,
            ..DetectorConfig::default()
        };
        assert!(bad.validate().is_err());
        let bad = DetectorConfig {
            inference_size: 0,
            ..DetectorConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
