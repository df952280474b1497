//! Distance-over-elapsed-time plausibility gate.

use nalgebra::Point2;
use tracing::debug;

use crate::tracker::history::History;

/// Outcome of gating one frame's candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// The candidate is the ball; the caller appends it to the history.
    Accepted(Point2<f64>),
    /// No candidate was offered this frame.
    NoCandidate,
    /// The candidate moved further than `limit` pixels allow.
    Rejected { distance: f64, limit: f64 },
}

impl GateDecision {
    pub fn accepted(&self) -> Option<Point2<f64>> {
        match self {
            GateDecision::Accepted(position) => Some(*position),
            _ => None,
        }
    }
}

/// Rejects candidates implausibly far from the last genuine detection.
///
/// The acceptance radius is `speed_limit * frames_elapsed` and is not
/// capped: after a long gap almost anything is accepted again, which can
/// latch onto a different object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionGate {
    speed_limit: f64,
}

impl DetectionGate {
    pub fn new(speed_limit: f64) -> Self {
        Self { speed_limit }
    }

    pub fn speed_limit(&self) -> f64 {
        self.speed_limit
    }

    /// Acceptance radius in pixels for a candidate `frames_elapsed` after
    /// the last track point.
    pub fn acceptance_radius(&self, frames_elapsed: u64) -> f64 {
        self.speed_limit * frames_elapsed as f64
    }

    /// Decide whether `candidate`, seen at `frame_index`, is the ball.
    ///
    /// Pure: the history is only read.
    pub fn evaluate(&self, candidate: Option<Point2<f64>>, history: &History, frame_index: u64) -> GateDecision {
        let Some(candidate) = candidate.filter(|p| p.x.is_finite() && p.y.is_finite()) else {
            return GateDecision::NoCandidate;
        };

        let Some(last) = history.last() else {
            debug!(frame_index, x = candidate.x, y = candidate.y, "bootstrap detection accepted");
            return GateDecision::Accepted(candidate);
        };

        let distance = nalgebra::distance(&candidate, &last.position);
        let limit = self.acceptance_radius(frame_index.saturating_sub(last.frame_index));

        if distance < limit {
            debug!(frame_index, distance, limit, "detection accepted");
            GateDecision::Accepted(candidate)
        } else {
            debug!(frame_index, distance, limit, "detection rejected");
            GateDecision::Rejected { distance, limit }
        }
    }
}

impl Default for DetectionGate {
    fn default() -> Self {
        Self::new(300.0)
    }
}
