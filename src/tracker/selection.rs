//! Detector candidates and the policy that picks one per frame.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::tracker::history::History;
use crate::tracker::rect::Rect;

/// Detection input for the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box in TLWH form, built from the detector's TLBR output
    pub bbox: Rect,
    /// Detection confidence score
    pub score: f32,
    /// Detector class id
    pub class_id: usize,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            score,
            class_id: 0,
        }
    }

    pub fn from_rect(bbox: Rect, score: f32) -> Self {
        Self {
            bbox,
            score,
            class_id: 0,
        }
    }

    pub fn with_class(mut self, class_id: usize) -> Self {
        self.class_id = class_id;
        self
    }

    /// Box midpoint used as the ball position.
    pub fn center(&self) -> Point2<f64> {
        let (cx, cy) = self.bbox.center();
        Point2::new(cx, cy)
    }

    /// A box that can locate the ball: finite and with positive area.
    pub fn is_usable(&self) -> bool {
        !self.bbox.is_degenerate()
    }
}

/// How a single candidate is chosen from a frame's detections.
///
/// The detector returns its highest-confidence box first, so `RankZero`
/// trusts that ordering. When several plausible boxes show up it degrades
/// to "trust rank 0"; `NearestToLast` is the alternative for cluttered
/// scenes. Degenerate boxes are skipped and never count as a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    #[default]
    RankZero,
    /// Among the first `top_k` candidates, the one nearest the last track
    /// point. Falls back to rank 0 while the history is empty.
    NearestToLast { top_k: usize },
}

impl SelectionPolicy {
    pub fn select<'a>(&self, candidates: &'a [Detection], history: &History) -> Option<&'a Detection> {
        let mut usable = candidates.iter().filter(|det| det.is_usable());
        match *self {
            SelectionPolicy::RankZero => usable.next(),
            SelectionPolicy::NearestToLast { top_k } => {
                let Some(last) = history.last() else {
                    return usable.next();
                };
                // `min_by` keeps the first of equal elements, so ties go to the higher rank.
                usable.take(top_k.max(1)).min_by(|a, b| {
                    let da = nalgebra::distance(&a.center(), &last.position);
                    let db = nalgebra::distance(&b.center(), &last.position);
                    da.total_cmp(&db)
                })
            }
        }
    }
}
