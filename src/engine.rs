//! Viewer engine: the single entry point the host wires events into.
//!
//! `ViewerCore` owns the region registry and the pointer state machine and
//! contains no browser dependencies, so the full event flow is testable
//! natively. The host feeds it pointer events in client pixels, region
//! declarations, and decode results; every handler returns the [`Effect`]s
//! the host must carry out (decode an image, arm a hover-clear timer,
//! repaint). Asynchrony lives entirely on the host side of that exchange —
//! the core itself runs synchronously inside each event handler.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use serde::Deserialize;

use crate::alpha::RgbaPixels;
use crate::consts::{DEFAULT_ALPHA_THRESHOLD, DEFAULT_HOVER_CLEAR_MS};
use crate::contour::{CubicBezier, smooth_outline};
use crate::geom::{Bounds, Point};
use crate::pointer::{ClearToken, PointerState};
use crate::region::RegionDef;
use crate::registry::{DecodeError, DecodeTicket, RegionRegistry};

/// Caller-tunable knobs, deserializable from host-supplied JSON.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Alpha cutoff (0–255): raster pixels strictly above it are solid.
    pub alpha_threshold: u8,
    /// Delay before a lost hover is cleared, in milliseconds.
    pub hover_clear_ms: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            hover_clear_ms: DEFAULT_HOVER_CLEAR_MS,
        }
    }
}

/// The container's on-screen rectangle in client pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ContainerRect {
    /// Left edge in client coordinates.
    pub left: f64,
    /// Top edge in client coordinates.
    pub top: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

/// Work returned from event handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Decode `source_url` and report back via
    /// [`ViewerCore::complete_decode`] with the ticket.
    DecodeImage {
        /// Completion handle.
        ticket: DecodeTicket,
        /// URL of the cutout image.
        source_url: String,
    },
    /// Arm a one-shot timer; after `delay_ms`, call
    /// [`ViewerCore::on_hover_clear_elapsed`] with the token. A timer that
    /// fires after being superseded is harmless — the token check ignores
    /// it — so the host never needs to cancel anything.
    ScheduleHoverClear {
        /// Token to hand back when the timer fires.
        token: ClearToken,
        /// Delay in milliseconds.
        delay_ms: u32,
    },
    /// Hover, selection, or bounds changed; repaint.
    RenderNeeded,
}

/// Core viewer state: regions, hit testing, and pointer interaction.
pub struct ViewerCore {
    config: ViewerConfig,
    container: ContainerRect,
    registry: RegionRegistry,
    pointer: PointerState,
    /// Last declared definitions, re-synced on re-enable.
    defs: Vec<RegionDef>,
    enabled: bool,
}

impl ViewerCore {
    /// Create an enabled viewer with the given configuration and no
    /// regions. The container rect starts zero-sized; until
    /// [`Self::set_container`] is called every pointer position normalizes
    /// to "no position".
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            registry: RegionRegistry::new(config.alpha_threshold, (0.0, 0.0)),
            pointer: PointerState::new(),
            config,
            container: ContainerRect::default(),
            defs: Vec::new(),
            enabled: true,
        }
    }

    // --- Data inputs ---

    /// Declare the current region set, replacing the previous one.
    pub fn set_regions(&mut self, defs: Vec<RegionDef>) -> Vec<Effect> {
        self.defs = defs;
        if !self.enabled {
            return Vec::new();
        }
        let mut effects = self.sync_registry();
        effects.push(Effect::RenderNeeded);
        effects
    }

    /// Deliver a decode result the host produced for a
    /// [`Effect::DecodeImage`] request.
    pub fn complete_decode(
        &mut self,
        ticket: &DecodeTicket,
        result: Result<RgbaPixels, DecodeError>,
    ) -> Vec<Effect> {
        self.registry.complete_decode(ticket, result);
        vec![Effect::RenderNeeded]
    }

    /// Update the container's on-screen rectangle (position and size).
    ///
    /// Circle testers are aspect-corrected against the viewport, so a
    /// resize can move their published bounds; when any bounds actually
    /// moved the host gets a repaint hint.
    pub fn set_container(&mut self, container: ContainerRect) -> Vec<Effect> {
        self.container = container;
        let before = self.bounds_snapshot();
        self.registry.set_viewport((container.width, container.height));
        if self.bounds_snapshot() == before {
            Vec::new()
        } else {
            vec![Effect::RenderNeeded]
        }
    }

    /// Enable or disable the viewer.
    ///
    /// Disabling tears every tester down, drops hover and selection, and
    /// invalidates outstanding decode tickets and hover-clear tokens — no
    /// stale state survives a disable/enable cycle. Re-enabling re-syncs
    /// the last declared set with fresh decodes.
    pub fn set_enabled(&mut self, enabled: bool) -> Vec<Effect> {
        if enabled == self.enabled {
            return Vec::new();
        }
        self.enabled = enabled;
        let mut effects = if enabled {
            self.sync_registry()
        } else {
            self.registry.clear();
            self.pointer.reset();
            Vec::new()
        };
        effects.push(Effect::RenderNeeded);
        effects
    }

    // --- Pointer events (client pixels) ---

    /// Pointer moved. `overlay_region` names the region whose auxiliary
    /// overlay the event target belongs to, when it belongs to one — the
    /// carve-out that keeps hover alive while the pointer crosses UI
    /// anchored above the hovered region.
    pub fn on_pointer_move(&mut self, client: Point, overlay_region: Option<&str>) -> Vec<Effect> {
        if !self.enabled {
            return Vec::new();
        }
        let before = self.interaction_snapshot();
        let mut effects = Vec::new();
        let hit = self
            .normalize(client)
            .and_then(|pos| self.registry.query_at(pos))
            .map(str::to_string);
        match hit {
            Some(id) => self.pointer.on_hit(&id),
            None => {
                let over_hovered = match (overlay_region, self.pointer.hovered()) {
                    (Some(overlay), Some(hovered)) => overlay == hovered,
                    _ => false,
                };
                if let Some(token) = self.pointer.on_miss(over_hovered) {
                    effects.push(Effect::ScheduleHoverClear {
                        token,
                        delay_ms: self.config.hover_clear_ms,
                    });
                }
            }
        }
        if self.interaction_snapshot() != before {
            effects.push(Effect::RenderNeeded);
        }
        effects
    }

    /// Pointer left the container.
    pub fn on_pointer_leave(&mut self) -> Vec<Effect> {
        if !self.enabled {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if let Some(token) = self.pointer.on_miss(false) {
            effects.push(Effect::ScheduleHoverClear {
                token,
                delay_ms: self.config.hover_clear_ms,
            });
        }
        effects
    }

    /// Click: lock, unlock, or clear the selection depending on what is
    /// under the pointer.
    pub fn on_click(&mut self, client: Point) -> Vec<Effect> {
        if !self.enabled {
            return Vec::new();
        }
        let before = self.interaction_snapshot();
        let hit = self
            .normalize(client)
            .and_then(|pos| self.registry.query_at(pos))
            .map(str::to_string);
        self.pointer.on_click(hit.as_deref());
        if self.interaction_snapshot() == before {
            Vec::new()
        } else {
            vec![Effect::RenderNeeded]
        }
    }

    /// A hover-clear timer fired. Stale tokens change nothing.
    pub fn on_hover_clear_elapsed(&mut self, token: ClearToken) -> Vec<Effect> {
        if self.enabled && self.pointer.on_clear_elapsed(token) {
            vec![Effect::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Queries ---

    /// The currently hovered region id.
    #[must_use]
    pub fn hovered_id(&self) -> Option<&str> {
        self.pointer.hovered()
    }

    /// The click-locked region id.
    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.pointer.selected()
    }

    /// The selection when one exists, the hover otherwise.
    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.pointer.active()
    }

    /// Published bounding boxes, keyed by region id, in registration order.
    #[must_use]
    pub fn bounds_map(&self) -> Vec<(&str, Bounds)> {
        self.registry.bounds_map()
    }

    /// Traced outline of a prepared raster region.
    #[must_use]
    pub fn outline(&self, id: &str) -> Option<&[Point]> {
        self.registry.outline(id)
    }

    /// Smoothed outline of a prepared raster region as cubic beziers.
    #[must_use]
    pub fn smoothed_outline(&self, id: &str) -> Vec<CubicBezier> {
        self.registry.outline(id).map(smooth_outline).unwrap_or_default()
    }

    /// Ad hoc point query in normalized coordinates, topmost region first.
    #[must_use]
    pub fn query_at(&self, pos: Point) -> Option<&str> {
        self.registry.query_at(pos)
    }

    // --- Internals ---

    /// Re-sync the registry from the declared set and map decode requests
    /// to effects.
    fn sync_registry(&mut self) -> Vec<Effect> {
        self.registry
            .sync_regions(self.defs.clone())
            .into_iter()
            .map(|req| Effect::DecodeImage { ticket: req.ticket, source_url: req.source_url })
            .collect()
    }

    /// Normalize a client-pixel position against the container rect.
    /// Outside the container (or before a container is known) there is no
    /// position.
    fn normalize(&self, client: Point) -> Option<Point> {
        if self.container.width <= 0.0 || self.container.height <= 0.0 {
            return None;
        }
        let nx = (client.x - self.container.left) / self.container.width;
        let ny = (client.y - self.container.top) / self.container.height;
        if (0.0..=1.0).contains(&nx) && (0.0..=1.0).contains(&ny) {
            Some(Point::new(nx, ny))
        } else {
            None
        }
    }

    /// Published bounds, for resize change detection.
    fn bounds_snapshot(&self) -> Vec<Bounds> {
        self.registry.bounds_map().into_iter().map(|(_, b)| b).collect()
    }

    /// Owned snapshot of the interaction state, for change detection.
    fn interaction_snapshot(&self) -> (Option<String>, Option<String>) {
        (
            self.pointer.hovered().map(str::to_string),
            self.pointer.selected().map(str::to_string),
        )
    }
}

impl Default for ViewerCore {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
