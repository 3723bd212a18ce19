//! Region registry: owns the live tester set and answers point queries.
//!
//! Registration order is paint order is hit-test priority: `query_at` walks
//! the set in reverse so the topmost (last-registered) region wins. Any
//! change to the declared set rebuilds testers into a *staging* set that is
//! only swapped in once every outstanding image decode has resolved — a
//! query never observes a mix of old and new testers, and the previous set
//! stays authoritative while decodes are in flight.
//!
//! Decoding is host-driven: `sync_regions` hands back [`DecodeRequest`]s,
//! the host decodes and calls [`RegionRegistry::complete_decode`] with the
//! ticket. Tickets carry the rebuild generation, so completions for
//! regions that were unregistered (or a registry that was cleared) in the
//! meantime are recognized as stale and dropped without touching state.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use thiserror::Error;

use crate::alpha::RgbaPixels;
use crate::geom::{Bounds, Point};
use crate::region::{RegionDef, RegionId};
use crate::tester::RegionTester;

/// Why the host could not deliver pixels for a raster region.
///
/// Both variants degrade the affected region to always-miss; neither is
/// ever propagated past the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The image could not be loaded or decoded.
    #[error("image decode failed: {0}")]
    Decode(String),
    /// Pixels decoded but could not be read back (cross-origin tainting).
    #[error("pixel data unreadable: {0}")]
    PixelAccess(String),
}

/// Opaque handle tying a decode completion to the rebuild that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeTicket {
    generation: u64,
    region_id: RegionId,
}

impl DecodeTicket {
    /// The region this ticket belongs to.
    #[must_use]
    pub fn region_id(&self) -> &str {
        &self.region_id
    }
}

/// Work order for the host: decode `source_url` and report back with the
/// ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeRequest {
    /// Handle to pass back into [`RegionRegistry::complete_decode`].
    pub ticket: DecodeTicket,
    /// URL of the image to decode.
    pub source_url: String,
}

/// A published region: its definition and its ready tester.
struct LiveEntry {
    def: RegionDef,
    tester: RegionTester,
}

/// One slot of a rebuild in progress.
enum StagingEntry {
    /// Definition unchanged; the live tester is adopted as-is at publish.
    ReuseLive { def: RegionDef },
    /// Fresh raster awaiting its decode.
    Pending { def: RegionDef, tester: RegionTester, ticket: DecodeTicket },
    /// Ready to publish (non-raster, or raster whose decode resolved).
    Ready { def: RegionDef, tester: RegionTester },
}

impl StagingEntry {
    fn def(&self) -> &RegionDef {
        match self {
            Self::ReuseLive { def } | Self::Pending { def, .. } | Self::Ready { def, .. } => def,
        }
    }
}

/// Ordered collection of regions with atomically-published hit testers.
pub struct RegionRegistry {
    threshold: u8,
    viewport: (f64, f64),
    generation: u64,
    live: Vec<LiveEntry>,
    staging: Option<Vec<StagingEntry>>,
}

impl RegionRegistry {
    /// Create an empty registry.
    ///
    /// `threshold` is the alpha cutoff for raster regions; `viewport` is
    /// the container size in pixels (circle aspect correction).
    #[must_use]
    pub fn new(threshold: u8, viewport: (f64, f64)) -> Self {
        Self { threshold, viewport, generation: 0, live: Vec::new(), staging: None }
    }

    /// Replace the declared region set.
    ///
    /// Definitions structurally identical to a live (or still-staging) one
    /// are reused: same tester instance, no bounds recompute, no decode
    /// restart. Duplicate ids within `defs` resolve last-wins. The
    /// returned requests must each be answered via [`Self::complete_decode`]
    /// before the rebuilt set is published; with none outstanding the swap
    /// happens before this call returns.
    pub fn sync_regions(&mut self, defs: Vec<RegionDef>) -> Vec<DecodeRequest> {
        let defs = dedupe_last_wins(defs);
        let mut carried = self.staging.take().unwrap_or_default();
        self.generation += 1;

        let mut entries = Vec::with_capacity(defs.len());
        let mut requests = Vec::new();
        for def in defs {
            if self.live.iter().any(|e| e.def == def) {
                entries.push(StagingEntry::ReuseLive { def });
            } else if let Some(pos) = carried.iter().position(|e| *e.def() == def) {
                // In-flight or completed staging work survives unchanged,
                // original ticket included: no decode restart.
                entries.push(carried.swap_remove(pos));
            } else {
                let tester = RegionTester::build(&def, self.viewport, self.threshold);
                if let Some(url) = tester.pending_source() {
                    let ticket = DecodeTicket {
                        generation: self.generation,
                        region_id: def.id().to_string(),
                    };
                    requests.push(DecodeRequest {
                        ticket: ticket.clone(),
                        source_url: url.to_string(),
                    });
                    entries.push(StagingEntry::Pending { def, tester, ticket });
                } else {
                    entries.push(StagingEntry::Ready { def, tester });
                }
            }
        }
        self.staging = Some(entries);
        self.try_publish();
        requests
    }

    /// Deliver the outcome of a requested decode.
    ///
    /// A ticket whose rebuild was superseded — the region was redefined,
    /// unregistered, or the registry cleared — no longer matches any
    /// staging slot and is dropped without touching published state.
    pub fn complete_decode(&mut self, ticket: &DecodeTicket, result: Result<RgbaPixels, DecodeError>) {
        let slot = self.staging.as_mut().and_then(|entries| {
            entries.iter_mut().find(
                |e| matches!(e, StagingEntry::Pending { ticket: t, .. } if t == ticket),
            )
        });
        let Some(slot) = slot else {
            tracing::debug!(region = %ticket.region_id, "dropping stale decode completion");
            return;
        };
        let StagingEntry::Pending { def, tester, .. } =
            std::mem::replace(slot, StagingEntry::ReuseLive { def: placeholder() })
        else {
            return;
        };
        let mut tester = tester;
        if let RegionTester::Raster(raster) = &mut tester {
            match result {
                Ok(pixels) => raster.install_pixels(&pixels),
                Err(err) => {
                    tracing::warn!(region = %def.id(), error = %err, "raster region degraded to always-miss");
                    raster.mark_failed();
                }
            }
        }
        *slot = StagingEntry::Ready { def, tester };
        self.try_publish();
    }

    /// Topmost region under the normalized point, if any.
    #[must_use]
    pub fn query_at(&self, p: Point) -> Option<&str> {
        self.live
            .iter()
            .rev()
            .find(|entry| entry.tester.hit_test(p))
            .map(|entry| entry.def.id())
    }

    /// Published bounding boxes, keyed by region id, in registration order.
    #[must_use]
    pub fn bounds_map(&self) -> Vec<(&str, Bounds)> {
        self.live.iter().map(|e| (e.def.id(), e.tester.bounds())).collect()
    }

    /// Traced outline of a published raster region, if available.
    #[must_use]
    pub fn outline(&self, id: &str) -> Option<&[Point]> {
        self.live
            .iter()
            .find(|e| e.def.id() == id)
            .and_then(|e| e.tester.outline())
    }

    /// Number of published regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no regions are published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Container resize: patch viewport-dependent testers in place. No
    /// rebuild, no decode restart.
    pub fn set_viewport(&mut self, viewport: (f64, f64)) {
        self.viewport = viewport;
        for entry in &mut self.live {
            entry.tester.set_viewport(viewport);
        }
        for entry in self.staging.iter_mut().flatten() {
            if let StagingEntry::Pending { tester, .. } | StagingEntry::Ready { tester, .. } = entry {
                tester.set_viewport(viewport);
            }
        }
    }

    /// Dispose every tester and invalidate outstanding tickets.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.live.clear();
        self.staging = None;
    }

    /// Swap the staging set in once nothing in it is still pending.
    fn try_publish(&mut self) {
        let pending = self
            .staging
            .iter()
            .flatten()
            .any(|e| matches!(e, StagingEntry::Pending { .. }));
        if pending {
            return;
        }
        let Some(entries) = self.staging.take() else {
            return;
        };
        let mut old = std::mem::take(&mut self.live);
        let mut live = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                StagingEntry::ReuseLive { def } => {
                    if let Some(pos) = old.iter().position(|e| e.def.id() == def.id()) {
                        live.push(old.swap_remove(pos));
                    }
                }
                StagingEntry::Pending { def, tester, .. }
                | StagingEntry::Ready { def, tester } => live.push(LiveEntry { def, tester }),
            }
        }
        self.live = live;
        tracing::debug!(regions = self.live.len(), "published rebuilt tester set");
    }
}

/// Keep only the last occurrence of each id, preserving the order of those
/// last occurrences (duplicate registration resolves last-wins).
fn dedupe_last_wins(defs: Vec<RegionDef>) -> Vec<RegionDef> {
    let mut kept: Vec<RegionDef> = Vec::with_capacity(defs.len());
    for def in defs {
        kept.retain(|existing| existing.id() != def.id());
        kept.push(def);
    }
    kept
}

/// Throwaway value for the brief slot swap in `complete_decode`.
fn placeholder() -> RegionDef {
    RegionDef::Bbox { id: String::new(), label: None, bounds: Bounds::UNIT }
}
