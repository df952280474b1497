//! TrackerPipeline for combining detection, tracking and overlay output.

use image::RgbImage;
use thiserror::Error;
use tracing::info;

use crate::error::TrackError;
use crate::tracker::{FrameRecord, TrackSession, TrackerConfig};

use super::{DetectionFilter, DetectionSource, FrameSink, FrameSource, OverlayRenderer};

/// Failure while running a whole video through the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    #[error("detector failed: {0}")]
    Detector(E),
    #[error(transparent)]
    Track(#[from] TrackError),
}

/// Runs detection, gating and overlay drawing for one video.
///
/// Owns a fresh [`TrackSession`]; create one pipeline per video.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    filter: DetectionFilter,
    session: TrackSession,
    renderer: OverlayRenderer,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    /// Create a new tracking pipeline with the given detector, filter and tracker config.
    pub fn new(detector: D, filter: DetectionFilter, config: TrackerConfig) -> Self {
        Self {
            detector,
            filter,
            session: TrackSession::new(config),
            renderer: OverlayRenderer::default(),
        }
    }

    /// Create a new tracking pipeline with default configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self::new(detector, DetectionFilter::default(), TrackerConfig::default())
    }

    pub fn with_renderer(mut self, renderer: OverlayRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Detect, track and annotate a single frame in place.
    pub fn process_frame(&mut self, frame: &mut RgbImage) -> Result<FrameRecord, D::Error> {
        let (width, height) = frame.dimensions();
        let detections = self.detector.detect(frame.as_raw(), width, height)?;
        let record = self.session.update(&self.filter.apply(detections));
        self.renderer.draw(frame, &record);
        Ok(record)
    }

    /// Drive the pipeline until `source` is exhausted, writing every
    /// annotated frame to `sink`. Returns one record per frame.
    pub fn run<S, K>(mut self, source: &mut S, sink: &mut K) -> Result<Vec<FrameRecord>, PipelineError<D::Error>>
    where
        S: FrameSource,
        K: FrameSink,
    {
        info!("tracking session started");
        while let Some(mut frame) = source.next_frame()? {
            self.process_frame(&mut frame)
                .map_err(PipelineError::Detector)?;
            sink.write_frame(&frame)?;
        }
        sink.finish()?;

        let summary = self.session.summary();
        info!(
            frames = summary.frames,
            detected = summary.detected,
            interpolated = summary.interpolated,
            lost = summary.lost,
            "tracking session finished"
        );
        Ok(self.session.finish())
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying session.
    pub fn session(&self) -> &TrackSession {
        &self.session
    }
}
