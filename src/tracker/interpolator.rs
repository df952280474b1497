//! Constant-velocity gap filling for frames without an accepted detection.

use nalgebra::Point2;
use tracing::debug;

use crate::tracker::history::History;

/// Predicts a display-only position from the last two track points.
///
/// Predictions never feed back into the history, so every frame of a gap
/// extrapolates from the same last genuine detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapInterpolator {
    max_gap: u64,
}

impl GapInterpolator {
    pub fn new(max_gap: u64) -> Self {
        Self { max_gap }
    }

    pub fn max_gap(&self) -> u64 {
        self.max_gap
    }

    /// Estimated ball position at `frame_index`, or `None` when the history
    /// holds fewer than two points or the gap has reached `max_gap`.
    pub fn predict(&self, history: &History, frame_index: u64) -> Option<Point2<f64>> {
        let (prev, last) = history.last_two()?;

        let frames_lost = frame_index.saturating_sub(last.frame_index);
        if frames_lost >= self.max_gap {
            debug!(frame_index, frames_lost, max_gap = self.max_gap, "gap too long, ball lost");
            return None;
        }

        // History indices strictly increase, so the span is at least one frame.
        let span = last.frame_index.saturating_sub(prev.frame_index).max(1) as f64;
        let velocity = (last.position - prev.position) / span;
        let predicted = last.position + velocity * frames_lost as f64;

        debug!(
            frame_index,
            frames_lost,
            x = predicted.x,
            y = predicted.y,
            "interpolated position"
        );
        Some(predicted)
    }
}

impl Default for GapInterpolator {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::history::TrackPoint;

    fn moving_right() -> History {
        History::from_points([TrackPoint::new(5, 0.0, 0.0), TrackPoint::new(6, 10.0, 0.0)]).unwrap()
    }

    #[test]
    fn test_predicts_one_step() {
        let interp = GapInterpolator::default();
        assert_eq!(interp.predict(&moving_right(), 7), Some(Point2::new(20.0, 0.0)));
    }

    #[test]
    fn test_predicts_from_same_anchor_across_gap() {
        let interp = GapInterpolator::default();
        let history = moving_right();
        assert_eq!(interp.predict(&history, 9), Some(Point2::new(40.0, 0.0)));
        assert_eq!(interp.predict(&history, 10), Some(Point2::new(50.0, 0.0)));
    }

    #[test]
    fn test_gap_bound() {
        let interp = GapInterpolator::default();
        assert!(interp.predict(&moving_right(), 11).is_none());
        assert!(interp.predict(&moving_right(), 40).is_none());
    }

    #[test]
    fn test_velocity_uses_frame_span() {
        let history =
            History::from_points([TrackPoint::new(0, 0.0, 0.0), TrackPoint::new(4, 40.0, -20.0)]).unwrap();
        let interp = GapInterpolator::default();
        assert_eq!(interp.predict(&history, 6), Some(Point2::new(60.0, -30.0)));
    }

    #[test]
    fn test_needs_two_points() {
        let interp = GapInterpolator::default();
        let single = History::from_points([TrackPoint::new(10, 100.0, 100.0)]).unwrap();
        assert!(interp.predict(&single, 11).is_none());
        assert!(interp.predict(&History::new(), 0).is_none());
    }
}
