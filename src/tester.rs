//! Per-shape hit-test strategies: one tester per live region.
//!
//! Every variant answers the same two questions — `bounds()` and
//! `hit_test(point)` — and every `hit_test` runs the cheap bounding-box
//! rejection before its precise test, the raster variant included (no
//! alpha-buffer indexing for points the box already excludes).
//!
//! Raster testers are built unprepared: they answer with the unit-square
//! sentinel and miss every point until the host delivers decoded pixels.
//! A failed decode parks them in that degraded state permanently — one
//! unreadable cutout image must never take down its siblings.

#[cfg(test)]
#[path = "tester_test.rs"]
mod tester_test;

use crate::alpha::{AlphaMask, RgbaPixels};
use crate::contour;
use crate::geom::{Bounds, Point, point_in_polygon};
use crate::region::RegionDef;

/// A hit-test strategy for one region. Closed set, match-dispatched.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionTester {
    /// Alpha-masked raster cutout.
    Raster(RasterTester),
    /// Axis-aligned rectangle.
    Rect(RectTester),
    /// Arbitrary polygon.
    Polygon(PolygonTester),
    /// Aspect-corrected circle.
    Circle(CircleTester),
}

impl RegionTester {
    /// Build the tester matching a region definition.
    ///
    /// `viewport` is the container size in pixels, used only for circle
    /// aspect correction. Raster testers come back unprepared; the caller
    /// is responsible for requesting a decode when [`Self::pending_source`]
    /// reports one.
    #[must_use]
    pub fn build(def: &RegionDef, viewport: (f64, f64), threshold: u8) -> Self {
        match def {
            RegionDef::Image { source_url, .. } => {
                Self::Raster(RasterTester::new(source_url.clone(), threshold))
            }
            RegionDef::Bbox { bounds, .. } => Self::Rect(RectTester { bounds: *bounds }),
            RegionDef::Polygon { points, .. } => Self::Polygon(PolygonTester::new(points.clone())),
            RegionDef::Circle { center, radius, .. } => {
                Self::Circle(CircleTester::new(*center, *radius, viewport))
            }
        }
    }

    /// The tester's current normalized bounding box.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Raster(t) => t.bounds(),
            Self::Rect(t) => t.bounds,
            Self::Polygon(t) => t.bounds,
            Self::Circle(t) => t.bounds,
        }
    }

    /// Whether the normalized point is inside this region.
    #[must_use]
    pub fn hit_test(&self, p: Point) -> bool {
        match self {
            Self::Raster(t) => t.hit_test(p),
            Self::Rect(t) => t.bounds.contains(p),
            Self::Polygon(t) => t.bounds.contains(p) && point_in_polygon(p, &t.points),
            Self::Circle(t) => t.hit_test(p),
        }
    }

    /// The image URL still awaiting a decode, if this is an unprepared
    /// raster tester.
    #[must_use]
    pub fn pending_source(&self) -> Option<&str> {
        match self {
            Self::Raster(t) if matches!(t.state, RasterState::Pending) => Some(&t.source_url),
            _ => None,
        }
    }

    /// Traced outline of a prepared raster region, if one exists.
    #[must_use]
    pub fn outline(&self) -> Option<&[Point]> {
        match self {
            Self::Raster(RasterTester { state: RasterState::Ready { outline, .. }, .. }) => {
                Some(outline)
            }
            _ => None,
        }
    }

    /// React to a container resize. Only circles depend on the viewport;
    /// nothing else is touched, so raster prepares are never restarted by
    /// a resize.
    pub fn set_viewport(&mut self, viewport: (f64, f64)) {
        if let Self::Circle(t) = self {
            t.recompute(viewport);
        }
    }
}

// =============================================================
// Raster
// =============================================================

/// Lifecycle of the raster tester's decoded data.
#[derive(Debug, Clone, PartialEq)]
enum RasterState {
    /// Waiting for the host to deliver pixels.
    Pending,
    /// Decoded and queryable.
    Ready {
        mask: AlphaMask,
        bounds: Bounds,
        outline: Vec<Point>,
    },
    /// Decode failed; permanently degraded to always-miss.
    Failed,
}

/// Hit tester for an alpha-masked raster cutout.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterTester {
    source_url: String,
    threshold: u8,
    state: RasterState,
}

impl RasterTester {
    fn new(source_url: String, threshold: u8) -> Self {
        Self { source_url, threshold, state: RasterState::Pending }
    }

    fn bounds(&self) -> Bounds {
        match &self.state {
            RasterState::Ready { bounds, .. } => *bounds,
            RasterState::Pending | RasterState::Failed => Bounds::UNIT,
        }
    }

    fn hit_test(&self, p: Point) -> bool {
        let RasterState::Ready { mask, bounds, .. } = &self.state else {
            return false;
        };
        bounds.contains(p) && mask.sample(p.x, p.y, self.threshold)
    }

    /// Install decoded pixels: extract the alpha channel, compute tight
    /// bounds, and trace the outline once. An unusable buffer (zero-size,
    /// short) leaves an empty mask, which keeps the unit-sentinel bounds
    /// and an always-miss hit test.
    pub fn install_pixels(&mut self, pixels: &RgbaPixels) {
        let mask = AlphaMask::from_rgba(&pixels.data, pixels.width, pixels.height);
        if mask.is_empty() {
            self.state = RasterState::Failed;
            return;
        }
        let bounds = mask.bounds(self.threshold);
        let outline = contour::trace_outline(&mask, self.threshold);
        self.state = RasterState::Ready { mask, bounds, outline };
    }

    /// Record a failed decode. The tester stays queryable and misses
    /// everything.
    pub fn mark_failed(&mut self) {
        self.state = RasterState::Failed;
    }
}

// =============================================================
// Rect
// =============================================================

/// Hit tester for an axis-aligned rectangle; the box is the whole test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectTester {
    bounds: Bounds,
}

// =============================================================
// Polygon
// =============================================================

/// Hit tester for an arbitrary polygon: bbox pre-check plus ray casting.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonTester {
    points: Vec<Point>,
    bounds: Bounds,
}

impl PolygonTester {
    fn new(points: Vec<Point>) -> Self {
        let bounds = Bounds::around(&points);
        Self { points, bounds }
    }
}

// =============================================================
// Circle
// =============================================================

/// Hit tester for a circle whose radius is normalized against the shorter
/// viewport side, so the region stays visually circular at any aspect
/// ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleTester {
    center: Point,
    radius: f64,
    rx: f64,
    ry: f64,
    bounds: Bounds,
}

impl CircleTester {
    fn new(center: Point, radius: f64, viewport: (f64, f64)) -> Self {
        let mut tester = Self { center, radius, rx: 0.0, ry: 0.0, bounds: Bounds::UNIT };
        tester.recompute(viewport);
        tester
    }

    /// Recompute the aspect-corrected radii and bounds. A non-positive
    /// radius or viewport degrades to always-miss with sentinel bounds,
    /// never a NaN or a division by zero.
    fn recompute(&mut self, (vw, vh): (f64, f64)) {
        if self.radius <= 0.0 || vw <= 0.0 || vh <= 0.0 {
            self.rx = 0.0;
            self.ry = 0.0;
            self.bounds = Bounds::UNIT;
            return;
        }
        let shorter = vw.min(vh);
        self.rx = self.radius * shorter / vw;
        self.ry = self.radius * shorter / vh;
        self.bounds = Bounds::new(
            self.center.x - self.rx,
            self.center.y - self.ry,
            self.rx * 2.0,
            self.ry * 2.0,
        );
    }

    fn hit_test(&self, p: Point) -> bool {
        if self.rx <= 0.0 || self.ry <= 0.0 || !self.bounds.contains(p) {
            return false;
        }
        let dx = (p.x - self.center.x) / self.rx;
        let dy = (p.y - self.center.y) / self.ry;
        dx * dx + dy * dy <= 1.0
    }
}
