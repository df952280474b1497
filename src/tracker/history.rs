//! Append-only record of genuinely detected ball positions.

use nalgebra::Point2;

use crate::error::{Result, TrackError};

/// A detection that passed the gate, pinned to the frame it was seen in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub frame_index: u64,
    pub position: Point2<f64>,
}

impl TrackPoint {
    pub fn new(frame_index: u64, x: f64, y: f64) -> Self {
        Self {
            frame_index,
            position: Point2::new(x, y),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite() && self.position.y.is_finite()
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.position.y
    }
}

/// Ordered track points for one session.
///
/// Frame indices strictly increase and points are never edited or removed
/// once appended. Interpolated positions are never stored here, so gating
/// always measures from the last genuine detection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    points: Vec<TrackPoint>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from existing points, rejecting out-of-order frames.
    pub fn from_points(points: impl IntoIterator<Item = TrackPoint>) -> Result<Self> {
        let mut history = Self::new();
        for point in points {
            history.try_push(point)?;
        }
        Ok(history)
    }

    /// Append a finite point whose frame index must follow the last one.
    pub fn try_push(&mut self, point: TrackPoint) -> Result<()> {
        if !point.is_finite() {
            return Err(TrackError::NonFiniteTrackPoint {
                frame_index: point.frame_index,
            });
        }
        if let Some(last) = self.last() {
            if point.frame_index <= last.frame_index {
                return Err(TrackError::NonMonotonicFrame {
                    previous: last.frame_index,
                    next: point.frame_index,
                });
            }
        }
        self.points.push(point);
        Ok(())
    }

    /// Append for callers that already own the frame counter.
    pub(crate) fn push(&mut self, point: TrackPoint) {
        debug_assert!(point.is_finite());
        debug_assert!(self.last().is_none_or(|last| last.frame_index < point.frame_index));
        self.points.push(point);
    }

    pub fn last(&self) -> Option<&TrackPoint> {
        self.points.last()
    }

    /// The two most recent points as `(previous, last)`.
    pub fn last_two(&self) -> Option<(&TrackPoint, &TrackPoint)> {
        match self.points.as_slice() {
            [.., prev, last] => Some((prev, last)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackPoint> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[TrackPoint] {
        &self.points
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a TrackPoint;
    type IntoIter = std::slice::Iter<'a, TrackPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_in_order() {
        let mut history = History::new();
        assert!(history.is_empty());
        assert!(history.last_two().is_none());

        history.try_push(TrackPoint::new(5, 0.0, 0.0)).unwrap();
        assert!(history.last_two().is_none());

        history.try_push(TrackPoint::new(6, 10.0, 0.0)).unwrap();
        let (prev, last) = history.last_two().unwrap();
        assert_eq!(prev.frame_index, 5);
        assert_eq!(last.frame_index, 6);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_rejects_repeated_or_older_frames() {
        let mut history = History::from_points([TrackPoint::new(3, 1.0, 1.0)]).unwrap();

        let err = history.try_push(TrackPoint::new(3, 2.0, 2.0)).unwrap_err();
        assert!(matches!(
            err,
            TrackError::NonMonotonicFrame {
                previous: 3,
                next: 3
            }
        ));
        assert!(history.try_push(TrackPoint::new(1, 2.0, 2.0)).is_err());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_rejects_non_finite_points() {
        let mut history = History::new();
        let err = history.try_push(TrackPoint::new(0, f64::NAN, 15.0)).unwrap_err();
        assert!(matches!(err, TrackError::NonFiniteTrackPoint { frame_index: 0 }));
        assert!(history.try_push(TrackPoint::new(1, 3.0, f64::INFINITY)).is_err());
        assert!(history.is_empty());
    }

    #[test]
    fn test_from_points_validates_order() {
        let result = History::from_points([TrackPoint::new(4, 0.0, 0.0), TrackPoint::new(2, 0.0, 0.0)]);
        assert!(result.is_err());
    }
}
