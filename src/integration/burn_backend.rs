//! Burn inference backend for ball detection.
//!
//! `BurnDetector` implements `DetectionSource` for detection models built
//! with the Burn framework. Frames are resized to the model's square input,
//! raw outputs are thresholded, restricted to the target class, scaled back
//! to frame coordinates and sorted by confidence so the tracker sees the
//! best box first.
//!
//! # Example
//!
//! ```ignore
//! use balltrack_rs::integration::{BurnDetector, BurnModel, DetectorConfig};
//! use burn::backend::NdArray;
//!
//! struct BallNet { /* ... */ }
//!
//! impl BurnModel<NdArray> for BallNet {
//!     fn forward(&self, input: burn::tensor::Tensor<NdArray, 4>) -> Vec<RawDetection> {
//!         // Run inference
//!     }
//! }
//!
//! let detector = BurnDetector::new(BallNet::load("ball.bin"), Default::default())
//!     .with_config(&DetectorConfig::default());
//! ```

use burn::prelude::*;
use burn::tensor::Tensor;
use image::RgbImage;
use image::imageops::{self, FilterType};
use thiserror::Error;

use super::{DetectionBuilder, DetectionSource, DetectorConfig};
use crate::tracker::Detection;

/// Error type for Burn detection failures.
#[derive(Debug, Clone, Error)]
pub enum BurnDetectorError {
    #[error("invalid input: expected {expected} bytes for {width}x{height} RGB, got {got}")]
    InvalidInputDimensions {
        expected: usize,
        got: usize,
        width: u32,
        height: u32,
    },
}

/// Raw detection output from the model.
#[derive(Debug, Clone)]
pub struct RawDetection {
    /// Bounding box: [x1, y1, x2, y2] or [cx, cy, w, h] depending on model
    pub bbox: [f32; 4],
    /// Confidence score
    pub score: f32,
    /// Class ID
    pub class_id: usize,
}

/// Trait for Burn-based detection models.
pub trait BurnModel<B: Backend>: Send + Sync {
    /// Run forward pass on an input tensor of shape [batch, channels, height, width].
    fn forward(&self, input: Tensor<B, 4>) -> Vec<RawDetection>;

    /// Whether bbox output is in XYWH format (vs TLBR).
    fn bbox_is_xywh(&self) -> bool {
        true
    }
}

/// Burn-based ball detector implementing `DetectionSource`.
pub struct BurnDetector<B: Backend, M: BurnModel<B>> {
    model: M,
    device: B::Device,
    conf_threshold: f32,
    target_class: usize,
    input_size: u32,
}

impl<B: Backend, M: BurnModel<B>> BurnDetector<B, M> {
    /// Create a new Burn detector with the given model and device.
    pub fn new(model: M, device: B::Device) -> Self {
        let config = DetectorConfig::default();
        Self {
            model,
            device,
            conf_threshold: config.confidence_threshold,
            target_class: config.target_class,
            input_size: config.inference_size,
        }
    }

    /// Apply threshold, class and inference size from `config`.
    pub fn with_config(mut self, config: &DetectorConfig) -> Self {
        self.conf_threshold = config.confidence_threshold;
        self.target_class = config.target_class;
        self.input_size = config.inference_size;
        self
    }

    /// Convert packed RGB8 bytes to a normalised [1, 3, S, S] tensor,
    /// resizing to the model's input size `S` when needed.
    pub fn preprocess(&self, input: &[u8], width: u32, height: u32) -> Result<Tensor<B, 4>, BurnDetectorError> {
        let expected = width as usize * height as usize * 3;
        let invalid = BurnDetectorError::InvalidInputDimensions {
            expected,
            got: input.len(),
            width,
            height,
        };
        if expected == 0 || input.len() != expected {
            return Err(invalid);
        }
        let frame = RgbImage::from_raw(width, height, input.to_vec()).ok_or(invalid)?;

        let size = self.input_size;
        let frame = if (width, height) == (size, size) {
            frame
        } else {
            imageops::resize(&frame, size, size, FilterType::Triangle)
        };

        // HWC interleaved -> CHW planar, scaled to [0, 1]
        let plane = (size * size) as usize;
        let mut data = vec![0.0f32; plane * 3];
        for (i, px) in frame.pixels().enumerate() {
            for (c, &v) in px.0.iter().enumerate() {
                data[c * plane + i] = v as f32 / 255.0;
            }
        }

        Ok(Tensor::<B, 1>::from_floats(data.as_slice(), &self.device).reshape([
            1,
            3,
            size as usize,
            size as usize,
        ]))
    }

    /// Filter raw model outputs, map them from model space into a
    /// `width` x `height` frame and order them best first.
    fn postprocess(&self, raw_detections: Vec<RawDetection>, width: u32, height: u32) -> Vec<Detection> {
        let sx = width as f32 / self.input_size as f32;
        let sy = height as f32 / self.input_size as f32;

        let mut detections: Vec<Detection> = raw_detections
            .into_iter()
            .filter(|d| d.score >= self.conf_threshold && d.class_id == self.target_class)
            .map(|d| {
                let [a, b, c, e] = d.bbox;
                let builder = DetectionBuilder::new().score(d.score).class_id(d.class_id);
                if self.model.bbox_is_xywh() {
                    builder.xywh(a * sx, b * sy, c * sx, e * sy).build()
                } else {
                    builder.tlbr(a * sx, b * sy, c * sx, e * sy).build()
                }
            })
            .collect();
        detections.sort_by(|a, b| b.score.total_cmp(&a.score));
        detections
    }
}

impl<B: Backend, M: BurnModel<B>> DetectionSource for BurnDetector<B, M> {
    type Error = BurnDetectorError;

    fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
        let tensor = self.preprocess(input, width, height)?;
        let raw_detections = self.model.forward(tensor);
        Ok(self.postprocess(raw_detections, width, height))
    }
}

#[cfg(all(test, feature = "burn-backend"))]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use std::sync::Mutex;

    struct FixedModel {
        outputs: Vec<RawDetection>,
        xywh: bool,
        seen_dims: Mutex<Vec<[usize; 4]>>,
    }

    impl FixedModel {
        fn new(outputs: Vec<RawDetection>, xywh: bool) -> Self {
            Self {
                outputs,
                xywh,
                seen_dims: Mutex::new(Vec::new()),
            }
        }
    }

    impl BurnModel<NdArray> for FixedModel {
        fn forward(&self, input: Tensor<NdArray, 4>) -> Vec<RawDetection> {
            if let Ok(mut seen) = self.seen_dims.lock() {
                seen.push(input.dims());
            }
            self.outputs.clone()
        }

        fn bbox_is_xywh(&self) -> bool {
            self.xywh
        }
    }

    fn raw(bbox: [f32; 4], score: f32, class_id: usize) -> RawDetection {
        RawDetection { bbox, score, class_id }
    }

    fn config() -> DetectorConfig {
        DetectorConfig {
            inference_size: 64,
            ..DetectorConfig::default()
        }
    }

    #[test]
    fn test_full_resolution_frame_is_resized_and_boxes_rescaled() {
        let model = FixedModel::new(
            vec![
                raw([10.0, 10.0, 12.0, 14.0], 0.4, 0),
                raw([20.0, 20.0, 22.0, 22.0], 0.9, 0),
                raw([0.0, 0.0, 5.0, 5.0], 0.95, 1),
                raw([30.0, 30.0, 32.0, 32.0], 0.05, 0),
            ],
            false,
        );
        let mut detector = BurnDetector::<NdArray, _>::new(model, Default::default()).with_config(&config());

        let frame = vec![128u8; 128 * 32 * 3];
        let dets = detector.detect(&frame, 128, 32).unwrap();

        assert_eq!(detector.model.seen_dims.lock().unwrap().as_slice(), &[[1, 3, 64, 64]]);
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].score, 0.9);
        assert_eq!(dets[0].bbox.to_tlbr(), [40.0, 10.0, 44.0, 11.0]);
        assert_eq!(dets[1].bbox.to_tlbr(), [20.0, 5.0, 24.0, 7.0]);
    }

    #[test]
    fn test_xywh_output_is_rescaled() {
        let model = FixedModel::new(vec![raw([32.0, 32.0, 4.0, 4.0], 0.8, 0)], true);
        let mut detector = BurnDetector::<NdArray, _>::new(model, Default::default()).with_config(&config());

        let dets = detector.detect(&vec![0u8; 256 * 128 * 3], 256, 128).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].center(), nalgebra::Point2::new(128.0, 64.0));
    }

    #[test]
    fn test_model_sized_frame_passes_through() {
        let model = FixedModel::new(vec![raw([1.0, 2.0, 3.0, 4.0], 0.5, 0)], false);
        let mut detector = BurnDetector::<NdArray, _>::new(model, Default::default()).with_config(&config());

        let dets = detector.detect(&vec![0u8; 64 * 64 * 3], 64, 64).unwrap();
        assert_eq!(dets[0].bbox.to_tlbr(), [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_rejects_mismatched_buffer() {
        let model = FixedModel::new(Vec::new(), false);
        let mut detector = BurnDetector::<NdArray, _>::new(model, Default::default()).with_config(&config());

        let err = detector.detect(&[0u8; 10], 64, 64).unwrap_err();
        assert!(matches!(err, BurnDetectorError::InvalidInputDimensions { got: 10, .. }));
    }
}
