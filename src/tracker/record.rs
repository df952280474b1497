//! Per-frame output of a tracking session.

use nalgebra::Point2;

use crate::tracker::track_state::FrameStatus;

/// Coordinate reported for frames whose position is unknown.
pub const UNKNOWN_COORDINATE: f64 = -1.0;

/// One record per processed frame, in frame order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRecord {
    pub frame_index: u64,
    /// Detected or interpolated position; `None` when lost
    pub position: Option<Point2<f64>>,
    pub status: FrameStatus,
}

impl FrameRecord {
    pub fn detected(frame_index: u64, position: Point2<f64>) -> Self {
        Self {
            frame_index,
            position: Some(position),
            status: FrameStatus::Detected,
        }
    }

    pub fn interpolated(frame_index: u64, position: Point2<f64>) -> Self {
        Self {
            frame_index,
            position: Some(position),
            status: FrameStatus::Interpolated,
        }
    }

    pub fn lost(frame_index: u64) -> Self {
        Self {
            frame_index,
            position: None,
            status: FrameStatus::Lost,
        }
    }

    /// Only accepted detections count as visible.
    #[inline]
    pub fn visible(&self) -> bool {
        self.status == FrameStatus::Detected
    }

    /// X coordinate, or [`UNKNOWN_COORDINATE`].
    pub fn x(&self) -> f64 {
        self.position.map_or(UNKNOWN_COORDINATE, |p| p.x)
    }

    /// Y coordinate, or [`UNKNOWN_COORDINATE`].
    pub fn y(&self) -> f64 {
        self.position.map_or(UNKNOWN_COORDINATE, |p| p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_follows_status() {
        assert!(FrameRecord::detected(0, Point2::new(1.0, 2.0)).visible());
        assert!(!FrameRecord::interpolated(1, Point2::new(1.0, 2.0)).visible());
        assert!(!FrameRecord::lost(2).visible());
    }

    #[test]
    fn test_sentinel_for_lost() {
        let record = FrameRecord::lost(11);
        assert_eq!((record.x(), record.y()), (-1.0, -1.0));

        let record = FrameRecord::interpolated(7, Point2::new(20.0, 0.0));
        assert_eq!((record.x(), record.y()), (20.0, 0.0));
    }
}
