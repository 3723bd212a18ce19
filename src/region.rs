//! Region definitions: the wire-facing description of an interactive cutout.
//!
//! The presentation layer declares regions over a base image; each carries a
//! caller-chosen string id (unique among live regions) and one of a closed
//! set of shapes. All shape coordinates are normalized to the unit square.
//! Definitions arrive as JSON (`type`-tagged, lowercase), and structural
//! equality between two definitions is what the registry uses to treat a
//! re-registration as a no-op.

#[cfg(test)]
#[path = "region_test.rs"]
mod region_test;

use serde::{Deserialize, Serialize};

use crate::geom::{Bounds, Point};

/// Caller-supplied unique identifier for a region.
pub type RegionId = String;

/// A region declaration as supplied by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegionDef {
    /// Free-form raster cutout: a same-dimension transparent image whose
    /// opaque pixels define the hit area.
    Image {
        /// Unique region id.
        id: RegionId,
        /// Optional human-readable label.
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// URL of the cutout image to decode.
        source_url: String,
    },
    /// Axis-aligned rectangle in normalized units, top-left origin.
    Bbox {
        /// Unique region id.
        id: RegionId,
        /// Optional human-readable label.
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// The rectangle itself.
        bounds: Bounds,
    },
    /// Arbitrary polygon: ordered normalized vertices, implicitly closed.
    Polygon {
        /// Unique region id.
        id: RegionId,
        /// Optional human-readable label.
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Vertex list; the last point connects back to the first.
        points: Vec<Point>,
    },
    /// Circle with a radius normalized against the shorter viewport side,
    /// so it stays visually circular under non-square aspect ratios.
    Circle {
        /// Unique region id.
        id: RegionId,
        /// Optional human-readable label.
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Center in normalized coordinates.
        center: Point,
        /// Radius as a fraction of `min(viewport_w, viewport_h)`.
        radius: f64,
    },
}

impl RegionDef {
    /// The region's id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Image { id, .. }
            | Self::Bbox { id, .. }
            | Self::Polygon { id, .. }
            | Self::Circle { id, .. } => id,
        }
    }

    /// The region's label, if declared.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Image { label, .. }
            | Self::Bbox { label, .. }
            | Self::Polygon { label, .. }
            | Self::Circle { label, .. } => label.as_deref(),
        }
    }
}
