use super::*;

// =============================================================
// Defaults
// =============================================================

#[test]
fn new_state_is_idle() {
    let state = PointerState::new();
    assert_eq!(state.hovered(), None);
    assert_eq!(state.selected(), None);
    assert_eq!(state.active(), None);
    assert!(!state.clear_pending());
}

// =============================================================
// Hover acquisition
// =============================================================

#[test]
fn hit_sets_hover_immediately() {
    let mut state = PointerState::new();
    state.on_hit("a");
    assert_eq!(state.hovered(), Some("a"));
    assert_eq!(state.active(), Some("a"));
}

#[test]
fn hit_replaces_previous_hover() {
    let mut state = PointerState::new();
    state.on_hit("a");
    state.on_hit("b");
    assert_eq!(state.hovered(), Some("b"));
}

#[test]
fn hit_cancels_a_pending_clear() {
    let mut state = PointerState::new();
    state.on_hit("a");
    let token = state.on_miss(false).expect("clear scheduled");
    state.on_hit("a");
    assert!(!state.clear_pending());
    // The late-firing timer is stale and must change nothing.
    assert!(!state.on_clear_elapsed(token));
    assert_eq!(state.hovered(), Some("a"));
}

// =============================================================
// Debounced hover loss
// =============================================================

#[test]
fn miss_schedules_a_clear_once() {
    let mut state = PointerState::new();
    state.on_hit("a");
    let first = state.on_miss(false);
    assert!(first.is_some());
    // Already pending: no new token, no timer extension.
    assert_eq!(state.on_miss(false), None);
    assert_eq!(state.hovered(), Some("a"), "hover survives until the timer fires");
}

#[test]
fn miss_without_hover_schedules_nothing() {
    let mut state = PointerState::new();
    assert_eq!(state.on_miss(false), None);
}

#[test]
fn elapsed_clear_drops_the_hover() {
    let mut state = PointerState::new();
    state.on_hit("a");
    let token = state.on_miss(false).expect("clear scheduled");
    assert!(state.on_clear_elapsed(token));
    assert_eq!(state.hovered(), None);
    assert!(!state.clear_pending());
}

#[test]
fn stale_token_is_ignored() {
    let mut state = PointerState::new();
    state.on_hit("a");
    let old = state.on_miss(false).expect("clear scheduled");
    state.on_hit("b");
    let new = state.on_miss(false).expect("clear scheduled");
    assert!(!state.on_clear_elapsed(old));
    assert_eq!(state.hovered(), Some("b"));
    assert!(state.on_clear_elapsed(new));
    assert_eq!(state.hovered(), None);
}

#[test]
fn reentry_within_delay_never_drops_hover() {
    let mut state = PointerState::new();
    state.on_hit("a");
    let token = state.on_miss(false).expect("clear scheduled");
    // Pointer returns before the delay elapses.
    state.on_hit("a");
    assert_eq!(state.hovered(), Some("a"));
    assert!(!state.on_clear_elapsed(token));
    assert_eq!(state.hovered(), Some("a"));
}

// =============================================================
// Overlay carve-out
// =============================================================

#[test]
fn miss_over_hovered_overlay_keeps_hover_and_cancels_clear() {
    let mut state = PointerState::new();
    state.on_hit("a");
    let token = state.on_miss(false).expect("clear scheduled");
    assert_eq!(state.on_miss(true), None);
    assert!(!state.clear_pending());
    assert!(!state.on_clear_elapsed(token));
    assert_eq!(state.hovered(), Some("a"));
}

// =============================================================
// Click-to-lock / unlock
// =============================================================

#[test]
fn click_on_region_locks_selection() {
    let mut state = PointerState::new();
    state.on_click(Some("a"));
    assert_eq!(state.selected(), Some("a"));
    assert_eq!(state.active(), Some("a"));
}

#[test]
fn click_on_selected_region_unlocks() {
    let mut state = PointerState::new();
    state.on_click(Some("a"));
    state.on_click(Some("a"));
    assert_eq!(state.selected(), None);
}

#[test]
fn click_on_other_region_replaces_selection() {
    let mut state = PointerState::new();
    state.on_click(Some("a"));
    state.on_click(Some("b"));
    assert_eq!(state.selected(), Some("b"));
}

#[test]
fn click_on_empty_space_clears_selection() {
    let mut state = PointerState::new();
    state.on_click(Some("a"));
    state.on_click(None);
    assert_eq!(state.selected(), None);
}

#[test]
fn selection_persists_while_hover_moves_away() {
    let mut state = PointerState::new();
    state.on_hit("a");
    state.on_click(Some("a"));
    let token = state.on_miss(false).expect("clear scheduled");
    assert!(state.on_clear_elapsed(token));
    assert_eq!(state.hovered(), None);
    assert_eq!(state.selected(), Some("a"));
    assert_eq!(state.active(), Some("a"));
}

#[test]
fn full_lock_unlock_sequence() {
    let mut state = PointerState::new();
    // Move onto region A.
    state.on_hit("a");
    assert_eq!((state.hovered(), state.selected(), state.active()), (Some("a"), None, Some("a")));
    // Click: locked.
    state.on_click(Some("a"));
    assert_eq!((state.hovered(), state.selected(), state.active()), (Some("a"), Some("a"), Some("a")));
    // Move off without clicking: hover clears after the delay, active stays.
    let token = state.on_miss(false).expect("clear scheduled");
    assert!(state.on_clear_elapsed(token));
    assert_eq!((state.hovered(), state.selected(), state.active()), (None, Some("a"), Some("a")));
    // Click on empty space: selection clears, active follows hover.
    state.on_click(None);
    assert_eq!((state.hovered(), state.selected(), state.active()), (None, None, None));
}

// =============================================================
// Reset
// =============================================================

#[test]
fn reset_drops_everything_and_invalidates_tokens() {
    let mut state = PointerState::new();
    state.on_hit("a");
    state.on_click(Some("a"));
    let token = state.on_miss(false).expect("clear scheduled");
    state.reset();
    assert_eq!(state.hovered(), None);
    assert_eq!(state.selected(), None);
    assert!(!state.clear_pending());
    assert!(!state.on_clear_elapsed(token));
}

#[test]
fn tokens_are_unique_across_schedules() {
    let mut state = PointerState::new();
    state.on_hit("a");
    let first = state.on_miss(false).expect("clear scheduled");
    state.on_hit("a");
    let second = state.on_miss(false).expect("clear scheduled");
    assert_ne!(first, second);
}
