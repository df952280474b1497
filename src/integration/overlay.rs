//! Trajectory overlay drawn onto each output frame.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use nalgebra::Point2;

use crate::tracker::{FrameRecord, FrameStatus};

/// Marker and trail appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub detected_color: Rgb<u8>,
    pub detected_radius: i32,
    pub predicted_color: Rgb<u8>,
    pub predicted_radius: i32,
    pub trail_color: Rgb<u8>,
    pub trail_thickness: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            detected_color: Rgb([0, 255, 0]),
            detected_radius: 6,
            predicted_color: Rgb([255, 255, 0]),
            predicted_radius: 4,
            trail_color: Rgb([255, 0, 0]),
            trail_thickness: 2,
        }
    }
}

/// Accumulates the trail across frames and paints it over the current marker.
///
/// The trail joins every record that carries a position, interpolated ones
/// included; lost frames are skipped rather than breaking the line.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
    trail: Vec<Point2<f64>>,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            style,
            trail: Vec::new(),
        }
    }

    pub fn trail(&self) -> &[Point2<f64>] {
        &self.trail
    }

    /// Record `record` in the trail and draw the overlay onto `frame`.
    pub fn draw(&mut self, frame: &mut RgbImage, record: &FrameRecord) {
        // Marker first, trail on top.
        if let Some(position) = record.position {
            self.trail.push(position);
            let center = (position.x.round() as i32, position.y.round() as i32);
            match record.status {
                FrameStatus::Detected => draw_filled_circle_mut(
                    frame,
                    center,
                    self.style.detected_radius,
                    self.style.detected_color,
                ),
                FrameStatus::Interpolated => draw_filled_circle_mut(
                    frame,
                    center,
                    self.style.predicted_radius,
                    self.style.predicted_color,
                ),
                FrameStatus::Lost => {}
            }
        }

        for segment in self.trail.windows(2) {
            self.draw_thick_line(frame, segment[0], segment[1]);
        }
    }

    fn draw_thick_line(&self, frame: &mut RgbImage, from: Point2<f64>, to: Point2<f64>) {
        // Parallel 1px segments offset along the normal.
        let direction = to - from;
        let length = direction.norm();
        let normal = if length > f64::EPSILON {
            nalgebra::Vector2::new(-direction.y, direction.x) / length
        } else {
            nalgebra::Vector2::zeros()
        };

        let thickness = self.style.trail_thickness.max(1);
        for i in 0..thickness {
            let offset = normal * (i as f64 - (thickness - 1) as f64 / 2.0);
            let start = from + offset;
            let end = to + offset;
            draw_line_segment_mut(
                frame,
                (start.x as f32, start.y as f32),
                (end.x as f32, end.y as f32),
                self.style.trail_color,
            );
        }
    }
}
