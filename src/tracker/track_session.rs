//! Per-video tracking session: selection, gating, gap filling and records.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TrackError};
use crate::tracker::gate::{DetectionGate, GateDecision};
use crate::tracker::history::{History, TrackPoint};
use crate::tracker::interpolator::GapInterpolator;
use crate::tracker::record::FrameRecord;
use crate::tracker::selection::{Detection, SelectionPolicy};
use crate::tracker::track_state::{FrameStatus, TrackState};

/// Configuration for a [`TrackSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Largest plausible ball displacement per frame, in pixels
    pub speed_limit: f64,
    /// Gap length (frames) at which interpolation stops
    pub max_gap: u64,
    pub selection: SelectionPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            speed_limit: 300.0,
            max_gap: 5,
            selection: SelectionPolicy::RankZero,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.speed_limit.is_finite() || self.speed_limit <= 0.0 {
            return Err(TrackError::InvalidConfig(format!(
                "speed_limit must be a positive number, got {}",
                self.speed_limit
            )));
        }
        if self.max_gap == 0 {
            return Err(TrackError::InvalidConfig("max_gap must be at least 1".into()));
        }
        if let SelectionPolicy::NearestToLast { top_k: 0 } = self.selection {
            return Err(TrackError::InvalidConfig("selection top_k must be at least 1".into()));
        }
        Ok(())
    }
}

/// Frame counts by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: usize,
    pub detected: usize,
    pub interpolated: usize,
    pub lost: usize,
}

impl SessionSummary {
    /// Tally `records` by status.
    pub fn from_records(records: &[FrameRecord]) -> Self {
        records
            .iter()
            .fold(SessionSummary::default(), |mut summary, record| {
                summary.frames += 1;
                match record.status {
                    FrameStatus::Detected => summary.detected += 1,
                    FrameStatus::Interpolated => summary.interpolated += 1,
                    FrameStatus::Lost => summary.lost += 1,
                }
                summary
            })
    }
}

/// Tracks one ball through one video.
///
/// Feed it one frame's detections at a time with [`TrackSession::update`];
/// frame indices are assigned densely from zero. Sessions share nothing, so
/// videos can be processed in parallel with one session each.
#[derive(Debug, Clone)]
pub struct TrackSession {
    history: History,
    records: Vec<FrameRecord>,
    frame_index: u64,
    gate: DetectionGate,
    interpolator: GapInterpolator,
    selection: SelectionPolicy,
}

impl TrackSession {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            history: History::new(),
            records: Vec::new(),
            frame_index: 0,
            gate: DetectionGate::new(config.speed_limit),
            interpolator: GapInterpolator::new(config.max_gap),
            selection: config.selection,
        }
    }

    /// Process the next frame's candidates, in detector rank order.
    pub fn update(&mut self, detections: &[Detection]) -> FrameRecord {
        let frame_index = self.frame_index;
        self.frame_index += 1;

        let candidate = self
            .selection
            .select(detections, &self.history)
            .map(Detection::center);

        let record = match self.gate.evaluate(candidate, &self.history, frame_index) {
            GateDecision::Accepted(position) => {
                self.history
                    .push(TrackPoint::new(frame_index, position.x, position.y));
                FrameRecord::detected(frame_index, position)
            }
            GateDecision::NoCandidate | GateDecision::Rejected { .. } => {
                match self.interpolator.predict(&self.history, frame_index) {
                    Some(predicted) => FrameRecord::interpolated(frame_index, predicted),
                    None => FrameRecord::lost(frame_index),
                }
            }
        };

        debug!(frame_index, status = ?record.status, history_len = self.history.len(), "frame processed");
        self.records.push(record);
        record
    }

    pub fn state(&self) -> TrackState {
        if self.history.is_empty() {
            TrackState::Bootstrap
        } else {
            TrackState::Tracking
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn records(&self) -> &[FrameRecord] {
        &self.records
    }

    /// Index the next call to [`TrackSession::update`] will be assigned.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_records(&self.records)
    }

    /// End the session, keeping only its records.
    pub fn finish(self) -> Vec<FrameRecord> {
        self.records
    }
}

impl Default for TrackSession {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}
