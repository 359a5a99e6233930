//! Planar geometry shared by the car model and lap detector

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::heading_vector;

/// Position and heading (radians) of a car
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub heading: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self { x, y, heading }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn forward(&self) -> Vec2 {
        heading_vector(self.heading)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.heading.is_finite()
    }

    /// Points sampled on the outline of a `width` x `length` box centred on
    /// the pose, long side along the heading: 4 corners + 4 edge midpoints.
    pub fn outline_samples(&self, width: f32, length: f32) -> [Vec2; 8] {
        let center = self.position();
        let fwd = self.forward() * (length / 2.0);
        let side = self.forward().perp() * (width / 2.0);
        [
            center + fwd + side,
            center + fwd - side,
            center - fwd + side,
            center - fwd - side,
            center + fwd,
            center - fwd,
            center + side,
            center - side,
        ]
    }
}

/// A fixed line segment on the map (finish or decoy line)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Vec2,
    pub end: Vec2,
}

impl Line {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    pub fn from_points(start: (f32, f32), end: (f32, f32)) -> Self {
        Self::new(Vec2::new(start.0, start.1), Vec2::new(end.0, end.1))
    }

    /// Whether the motion `from -> to` crosses this line.
    ///
    /// The side test is half-open: a point exactly on the line belongs to the
    /// positive side, so resting on the line and then leaving never produces
    /// a second crossing.
    pub fn crossed_by(&self, from: Vec2, to: Vec2) -> bool {
        let side_from = orient(self.start, self.end, from) >= 0.0;
        let side_to = orient(self.start, self.end, to) >= 0.0;
        if side_from == side_to {
            return false;
        }

        // Line endpoints must straddle (or touch) the motion segment
        let a = orient(from, to, self.start);
        let b = orient(from, to, self.end);
        a * b <= 0.0
    }
}

/// Twice the signed area of triangle (a, b, p)
#[inline]
fn orient(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}
