//! Outline tracing: raster alpha mask to a simplified closed polygon.
//!
//! The pipeline runs marching squares over a zero-padded working grid
//! (sub-pixel edge interpolation, saddle cases emitting two segments),
//! stitches the segment soup into loops by quantized endpoint matching,
//! keeps the loop with the largest absolute signed area (the outer
//! silhouette), normalizes back to the unit square, and simplifies with
//! Ramer–Douglas–Peucker. Every failure mode — empty mask, zero dims,
//! fewer than three traced points — degrades to an empty point list,
//! which callers read as "no outline available".

#[cfg(test)]
#[path = "contour_test.rs"]
mod contour_test;

use std::collections::HashMap;

use crate::alpha::AlphaMask;
use crate::consts::{
    CATMULL_ROM_TENSION, MIN_OUTLINE_POINTS, OUTLINE_EPSILON, OUTLINE_WORKING_SIZE,
    STITCH_QUANTIZE,
};
use crate::geom::Point;

/// A cubic bezier segment of a smoothed outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    /// Segment start.
    pub from: Point,
    /// First control point.
    pub ctrl1: Point,
    /// Second control point.
    pub ctrl2: Point,
    /// Segment end.
    pub to: Point,
}

/// Trace the outer silhouette of an alpha mask as a simplified closed
/// polygon in normalized coordinates. Empty when no outline exists.
#[must_use]
pub fn trace_outline(mask: &AlphaMask, threshold: u8) -> Vec<Point> {
    let working = mask.downscale(OUTLINE_WORKING_SIZE);
    if working.is_empty() {
        return Vec::new();
    }
    let segments = march(&working, threshold);
    let Some(loop_points) = largest_loop(segments) else {
        return Vec::new();
    };
    #[allow(clippy::cast_precision_loss)]
    let (w, h) = (working.width() as f64, working.height() as f64);
    let normalized: Vec<Point> = loop_points
        .into_iter()
        .map(|p| Point::new((p.x / w).clamp(0.0, 1.0), (p.y / h).clamp(0.0, 1.0)))
        .collect();
    if normalized.len() < MIN_OUTLINE_POINTS {
        return Vec::new();
    }
    let simplified = simplify_closed(&normalized, OUTLINE_EPSILON);
    if simplified.len() < MIN_OUTLINE_POINTS {
        normalized
    } else {
        simplified
    }
}

/// Convert a closed outline into a cyclic chain of cubic beziers via
/// Catmull-Rom tangents (standard 1/6 scale). Fewer than three points
/// yields no curve.
#[must_use]
pub fn smooth_outline(points: &[Point]) -> Vec<CubicBezier> {
    let n = points.len();
    if n < MIN_OUTLINE_POINTS {
        return Vec::new();
    }
    let mut curves = Vec::with_capacity(n);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let from = points[i];
        let to = points[(i + 1) % n];
        let next = points[(i + 2) % n];
        let ctrl1 = Point::new(
            from.x + (to.x - prev.x) * CATMULL_ROM_TENSION,
            from.y + (to.y - prev.y) * CATMULL_ROM_TENSION,
        );
        let ctrl2 = Point::new(
            to.x - (next.x - from.x) * CATMULL_ROM_TENSION,
            to.y - (next.y - from.y) * CATMULL_ROM_TENSION,
        );
        curves.push(CubicBezier { from, ctrl1, ctrl2, to });
    }
    curves
}

// =============================================================
// Marching squares
// =============================================================

/// Scalar field sample from the zero-padded grid. Sample `(i, j)` sits at
/// position `(i - 0.5, j - 0.5)` in working-pixel units, so padding samples
/// lie half a pixel outside the mask and the traced isoline hugs its rim.
fn field(mask: &AlphaMask, i: usize, j: usize) -> f64 {
    if i == 0 || j == 0 || i > mask.width() || j > mask.height() {
        0.0
    } else {
        f64::from(mask.get(i - 1, j - 1))
    }
}

#[allow(clippy::cast_precision_loss)]
fn march(mask: &AlphaMask, threshold: u8) -> Vec<(Point, Point)> {
    let iso = f64::from(threshold);
    let (w, h) = (mask.width(), mask.height());
    let mut segments = Vec::new();

    for cy in 0..=h {
        for cx in 0..=w {
            let tl = field(mask, cx, cy);
            let tr = field(mask, cx + 1, cy);
            let br = field(mask, cx + 1, cy + 1);
            let bl = field(mask, cx, cy + 1);

            let case = u8::from(tl > iso)
                | (u8::from(tr > iso) << 1)
                | (u8::from(br > iso) << 2)
                | (u8::from(bl > iso) << 3);
            if case == 0 || case == 15 {
                continue;
            }

            // Corner positions of this cell in working-pixel units.
            let x0 = cx as f64 - 0.5;
            let y0 = cy as f64 - 0.5;
            let x1 = x0 + 1.0;
            let y1 = y0 + 1.0;

            let top = interpolate(tl, tr, iso, Point::new(x0, y0), Point::new(x1, y0));
            let right = interpolate(tr, br, iso, Point::new(x1, y0), Point::new(x1, y1));
            let bottom = interpolate(bl, br, iso, Point::new(x0, y1), Point::new(x1, y1));
            let left = interpolate(tl, bl, iso, Point::new(x0, y0), Point::new(x0, y1));

            // Fixed case table; 5 and 10 are the two-segment saddles.
            match case {
                1 => segments.push((left, top)),
                2 => segments.push((top, right)),
                3 => segments.push((left, right)),
                4 => segments.push((right, bottom)),
                5 => {
                    segments.push((left, top));
                    segments.push((right, bottom));
                }
                6 => segments.push((top, bottom)),
                7 => segments.push((left, bottom)),
                8 => segments.push((bottom, left)),
                9 => segments.push((bottom, top)),
                10 => {
                    segments.push((top, left));
                    segments.push((bottom, right));
                }
                11 => segments.push((bottom, right)),
                12 => segments.push((right, left)),
                13 => segments.push((right, top)),
                _ => segments.push((top, left)), // 14
            }
        }
    }
    segments
}

/// Linear interpolation of the iso crossing along one cell edge.
fn interpolate(v1: f64, v2: f64, iso: f64, p1: Point, p2: Point) -> Point {
    if (v2 - v1).abs() < f64::EPSILON {
        return Point::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0);
    }
    let t = ((iso - v1) / (v2 - v1)).clamp(0.0, 1.0);
    Point::new(p1.x + t * (p2.x - p1.x), p1.y + t * (p2.y - p1.y))
}

// =============================================================
// Loop stitching
// =============================================================

/// Quantized endpoint key; avoids float mismatch when matching coincident
/// segment endpoints emitted by neighboring cells.
fn quantize(p: Point) -> (i64, i64) {
    #[allow(clippy::cast_possible_truncation)]
    ((p.x * STITCH_QUANTIZE).round() as i64, (p.y * STITCH_QUANTIZE).round() as i64)
}

/// Stitch the segment soup into chains and return the one enclosing the
/// largest absolute signed area. Interior noise loops are discarded along
/// the way.
fn largest_loop(segments: Vec<(Point, Point)>) -> Option<Vec<Point>> {
    if segments.is_empty() {
        return None;
    }
    // Endpoint key -> indices of segments touching that endpoint.
    let mut by_end: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (idx, (a, b)) in segments.iter().enumerate() {
        by_end.entry(quantize(*a)).or_default().push(idx);
        by_end.entry(quantize(*b)).or_default().push(idx);
    }

    let mut used = vec![false; segments.len()];
    let mut best: Option<(f64, Vec<Point>)> = None;

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (a, b) = segments[start];
        let start_key = quantize(a);
        let mut chain = vec![a, b];
        let mut cursor = quantize(b);

        while cursor != start_key {
            let Some(next_idx) = by_end
                .get(&cursor)
                .into_iter()
                .flatten()
                .copied()
                .find(|&i| !used[i])
            else {
                break;
            };
            used[next_idx] = true;
            let (p, q) = segments[next_idx];
            let next = if quantize(p) == cursor { q } else { p };
            chain.push(next);
            cursor = quantize(next);
        }

        if cursor == start_key && chain.len() > MIN_OUTLINE_POINTS {
            chain.pop(); // drop the duplicated closing point
            let area = signed_area(&chain).abs();
            if best.as_ref().is_none_or(|(best_area, _)| area > *best_area) {
                best = Some((area, chain));
            }
        }
    }
    best.map(|(_, chain)| chain)
}

/// Shoelace signed area of a closed polygon.
fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < MIN_OUTLINE_POINTS {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

// =============================================================
// Simplification
// =============================================================

/// Ramer–Douglas–Peucker on an open polyline.
#[must_use]
pub fn simplify(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_idx = 0;
    for (i, p) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let dist = perpendicular_distance(*p, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        let mut left = simplify(&points[..=max_idx], epsilon);
        let right = simplify(&points[max_idx..], epsilon);
        left.pop(); // shared junction point
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// RDP for a *closed* contour: the ring is temporarily opened by
/// duplicating the first point at the end, so the seam is not artificially
/// pinned as two fixed endpoints, then the duplicate is dropped again.
#[must_use]
pub fn simplify_closed(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 4 {
        return points.to_vec();
    }
    let mut opened = points.to_vec();
    opened.push(points[0]);
    let mut simplified = simplify(&opened, epsilon);
    simplified.pop();
    simplified
}

/// Distance from `p` to the segment `(a, b)`, clamped to the segment.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq < f64::EPSILON {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    let proj_x = a.x + t * dx;
    let proj_y = a.y + t * dy;
    ((p.x - proj_x).powi(2) + (p.y - proj_y).powi(2)).sqrt()
}
