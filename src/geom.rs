//! Geometry primitives: normalized points, bounding boxes, and containment tests.
//!
//! All coordinates live in the normalized unit square: a position is a
//! fraction (0–1) of the container's width or height, independent of pixel
//! size. `Bounds` is top-left-origin. The full unit square doubles as the
//! "unknown / undetermined" sentinel for shapes whose extent could not be
//! computed — never an empty box, which would silently reject every point.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

/// A point in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box in normalized coordinates, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Bounds {
    /// The full unit square: the sentinel for "extent unknown".
    pub const UNIT: Self = Self { x: 0.0, y: 0.0, w: 1.0, h: 1.0 };

    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Inclusive containment test on all four edges.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// Tight box around a vertex list. An empty list yields [`Bounds::UNIT`].
    #[must_use]
    pub fn around(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::UNIT;
        };
        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Self { x: min_x, y: min_y, w: max_x - min_x, h: max_y - min_y }
    }
}

/// Even-odd (ray casting) point-in-polygon test.
///
/// The polygon is implicitly closed: the last vertex connects back to the
/// first. A horizontal ray is cast rightward from `p`; each edge whose
/// y-span strictly straddles `p.y` toggles the inside flag when its
/// x-intercept at that height lies to the right of `p`. Exactly-horizontal
/// edges never satisfy the straddle test, so the intercept division is
/// never by zero. Boundary behavior is unspecified but deterministic.
#[must_use]
pub fn point_in_polygon(p: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[j];
        if (a.y > p.y) != (b.y > p.y) {
            let intercept = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < intercept {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
