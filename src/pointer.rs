//! Pointer interaction state: hover, selection, and the debounced hover
//! clear.
//!
//! `hovered` and `selected` are independent: a click locks the selection in
//! place, and hover keeps tracking the pointer underneath it. The derived
//! active id is the selection when one exists, the hover otherwise.
//!
//! Hover is acquired immediately but *lost* only after a delay: losing the
//! hit schedules a clear and hands the caller a [`ClearToken`] to fire
//! after the configured delay. Any superseding event (re-entry, overlay
//! crossing, reset) drops the pending token, so a timer that fires late is
//! recognized as stale and ignored. Scheduling while a clear is already
//! pending is a no-op — the pending timer is never extended.

#[cfg(test)]
#[path = "pointer_test.rs"]
mod pointer_test;

use crate::region::RegionId;

/// Handle identifying one scheduled hover clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearToken(u64);

/// Hover/selection state machine. One per viewer instance.
#[derive(Debug, Default)]
pub struct PointerState {
    hovered: Option<RegionId>,
    selected: Option<RegionId>,
    pending_clear: Option<ClearToken>,
    next_token: u64,
}

impl PointerState {
    /// Create an idle state: nothing hovered, nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The region currently hovered, if any.
    #[must_use]
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// The region locked by a click, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selection when one exists, the hover otherwise.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.selected.as_deref().or(self.hovered.as_deref())
    }

    /// Whether a hover clear is currently scheduled.
    #[must_use]
    pub fn clear_pending(&self) -> bool {
        self.pending_clear.is_some()
    }

    /// The pointer landed on a region: hover it immediately and drop any
    /// pending clear.
    pub fn on_hit(&mut self, id: &str) {
        self.pending_clear = None;
        if self.hovered.as_deref() != Some(id) {
            self.hovered = Some(id.to_string());
        }
    }

    /// The pointer found no region.
    ///
    /// `over_hovered_overlay` marks the carve-out case: the pointer sits on
    /// auxiliary UI anchored to the currently-hovered region, so the hover
    /// must survive (and any pending clear is dropped). Otherwise a clear
    /// is scheduled — unless one already is — and the caller receives the
    /// token to fire after the configured delay.
    pub fn on_miss(&mut self, over_hovered_overlay: bool) -> Option<ClearToken> {
        if over_hovered_overlay {
            self.pending_clear = None;
            return None;
        }
        if self.hovered.is_none() || self.pending_clear.is_some() {
            return None;
        }
        self.next_token += 1;
        let token = ClearToken(self.next_token);
        self.pending_clear = Some(token);
        Some(token)
    }

    /// A scheduled clear fired. Applies only when the token is still the
    /// pending one; a stale token (superseded by re-entry or reset) is
    /// ignored. Returns whether the hover was cleared.
    pub fn on_clear_elapsed(&mut self, token: ClearToken) -> bool {
        if self.pending_clear != Some(token) {
            return false;
        }
        self.pending_clear = None;
        self.hovered = None;
        true
    }

    /// A click resolved against the region set: a hit on a new region locks
    /// it, a hit on the already-selected region unlocks it, and a click on
    /// empty space clears the selection.
    pub fn on_click(&mut self, hit: Option<&str>) {
        match hit {
            Some(id) if self.selected.as_deref() != Some(id) => {
                self.selected = Some(id.to_string());
            }
            _ => self.selected = None,
        }
    }

    /// Drop all state and invalidate any pending clear. Used when the
    /// viewer is disabled or torn down — nothing survives into re-enable.
    pub fn reset(&mut self) {
        self.hovered = None;
        self.selected = None;
        self.pending_clear = None;
    }
}
