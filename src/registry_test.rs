use super::*;

const VIEWPORT: (f64, f64) = (400.0, 400.0);

fn registry() -> RegionRegistry {
    RegionRegistry::new(30, VIEWPORT)
}

fn bbox(id: &str, x: f64, y: f64, w: f64, h: f64) -> RegionDef {
    RegionDef::Bbox { id: id.into(), label: None, bounds: Bounds::new(x, y, w, h) }
}

fn image(id: &str, url: &str) -> RegionDef {
    RegionDef::Image { id: id.into(), label: None, source_url: url.into() }
}

/// Fully opaque RGBA buffer.
fn opaque_pixels(w: usize, h: usize) -> RgbaPixels {
    RgbaPixels { data: vec![255; w * h * 4], width: w, height: h }
}

// =============================================================
// Synchronous shapes
// =============================================================

#[test]
fn empty_registry_answers_nothing() {
    let reg = registry();
    assert!(reg.is_empty());
    assert_eq!(reg.query_at(Point::new(0.5, 0.5)), None);
    assert!(reg.bounds_map().is_empty());
}

#[test]
fn non_raster_sync_publishes_immediately() {
    let mut reg = registry();
    let requests = reg.sync_regions(vec![bbox("a", 0.0, 0.0, 0.5, 0.5)]);
    assert!(requests.is_empty());
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.query_at(Point::new(0.25, 0.25)), Some("a"));
}

#[test]
fn query_misses_outside_every_region() {
    let mut reg = registry();
    reg.sync_regions(vec![bbox("a", 0.0, 0.0, 0.3, 0.3)]);
    assert_eq!(reg.query_at(Point::new(0.9, 0.9)), None);
}

#[test]
fn overlapping_regions_resolve_topmost_last_registered() {
    let mut reg = registry();
    reg.sync_regions(vec![
        bbox("under", 0.0, 0.0, 1.0, 1.0),
        bbox("over", 0.25, 0.25, 0.5, 0.5),
    ]);
    assert_eq!(reg.query_at(Point::new(0.5, 0.5)), Some("over"));
    assert_eq!(reg.query_at(Point::new(0.1, 0.1)), Some("under"));
}

#[test]
fn bounds_map_preserves_registration_order() {
    let mut reg = registry();
    reg.sync_regions(vec![
        bbox("first", 0.0, 0.0, 0.1, 0.1),
        bbox("second", 0.5, 0.5, 0.2, 0.2),
    ]);
    let map = reg.bounds_map();
    assert_eq!(map.len(), 2);
    assert_eq!(map[0], ("first", Bounds::new(0.0, 0.0, 0.1, 0.1)));
    assert_eq!(map[1], ("second", Bounds::new(0.5, 0.5, 0.2, 0.2)));
}

#[test]
fn duplicate_ids_resolve_last_wins() {
    let mut reg = registry();
    reg.sync_regions(vec![
        bbox("dup", 0.0, 0.0, 0.2, 0.2),
        bbox("other", 0.4, 0.4, 0.2, 0.2),
        bbox("dup", 0.7, 0.7, 0.2, 0.2),
    ]);
    assert_eq!(reg.len(), 2);
    assert_eq!(reg.query_at(Point::new(0.1, 0.1)), None);
    assert_eq!(reg.query_at(Point::new(0.8, 0.8)), Some("dup"));
}

// =============================================================
// Async raster prepare
// =============================================================

#[test]
fn raster_sync_requests_a_decode_and_defers_publish() {
    let mut reg = registry();
    let requests = reg.sync_regions(vec![image("cat", "cat.png")]);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].source_url, "cat.png");
    assert_eq!(requests[0].ticket.region_id(), "cat");
    // Nothing published until the decode resolves.
    assert!(reg.is_empty());
}

#[test]
fn completing_the_decode_publishes_the_set() {
    let mut reg = registry();
    let requests = reg.sync_regions(vec![image("cat", "cat.png")]);
    reg.complete_decode(&requests[0].ticket, Ok(opaque_pixels(4, 4)));
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.query_at(Point::new(0.5, 0.5)), Some("cat"));
}

#[test]
fn previous_set_stays_authoritative_during_rebuild() {
    let mut reg = registry();
    reg.sync_regions(vec![bbox("old", 0.0, 0.0, 1.0, 1.0)]);
    let requests = reg.sync_regions(vec![image("new", "new.png")]);
    // Rebuild outstanding: queries still answer from the old set.
    assert_eq!(reg.query_at(Point::new(0.5, 0.5)), Some("old"));
    reg.complete_decode(&requests[0].ticket, Ok(opaque_pixels(4, 4)));
    assert_eq!(reg.query_at(Point::new(0.5, 0.5)), Some("new"));
}

#[test]
fn mixed_set_publishes_only_after_the_last_decode() {
    let mut reg = registry();
    let requests = reg.sync_regions(vec![
        image("a", "a.png"),
        bbox("b", 0.0, 0.0, 0.5, 0.5),
        image("c", "c.png"),
    ]);
    assert_eq!(requests.len(), 2);
    reg.complete_decode(&requests[0].ticket, Ok(opaque_pixels(4, 4)));
    assert!(reg.is_empty(), "one decode still outstanding");
    reg.complete_decode(&requests[1].ticket, Ok(opaque_pixels(4, 4)));
    assert_eq!(reg.len(), 3);
}

#[test]
fn decode_failure_degrades_only_the_affected_region() {
    let mut reg = registry();
    let requests = reg.sync_regions(vec![
        image("broken", "broken.png"),
        bbox("solid", 0.0, 0.0, 0.4, 0.4),
    ]);
    reg.complete_decode(
        &requests[0].ticket,
        Err(DecodeError::PixelAccess("tainted canvas".into())),
    );
    assert_eq!(reg.len(), 2);
    // The broken raster never hits; its sibling is unaffected.
    assert_eq!(reg.query_at(Point::new(0.2, 0.2)), Some("solid"));
    assert_eq!(reg.query_at(Point::new(0.8, 0.8)), None);
    // Sentinel bounds for the undetermined region.
    assert_eq!(reg.bounds_map()[0], ("broken", Bounds::UNIT));
}

#[test]
fn stale_ticket_after_unregister_is_dropped() {
    let mut reg = registry();
    let requests = reg.sync_regions(vec![image("gone", "gone.png")]);
    reg.sync_regions(vec![]);
    reg.complete_decode(&requests[0].ticket, Ok(opaque_pixels(4, 4)));
    assert!(reg.is_empty());
    assert!(reg.bounds_map().is_empty());
}

#[test]
fn stale_ticket_after_clear_is_dropped() {
    let mut reg = registry();
    let requests = reg.sync_regions(vec![image("gone", "gone.png")]);
    reg.clear();
    reg.complete_decode(&requests[0].ticket, Ok(opaque_pixels(4, 4)));
    assert!(reg.is_empty());
}

#[test]
fn outline_available_after_successful_decode() {
    let mut reg = registry();
    let requests = reg.sync_regions(vec![image("cat", "cat.png")]);
    let mut pixels = RgbaPixels { data: vec![0; 20 * 20 * 4], width: 20, height: 20 };
    for y in 5..15 {
        for x in 5..15 {
            pixels.data[(y * 20 + x) * 4 + 3] = 255;
        }
    }
    reg.complete_decode(&requests[0].ticket, Ok(pixels));
    let outline = reg.outline("cat").expect("outline");
    assert!(outline.len() >= 3);
    assert_eq!(reg.outline("missing"), None);
}

// =============================================================
// Redefinition no-op
// =============================================================

#[test]
fn identical_redefinition_issues_no_new_decode() {
    let mut reg = registry();
    let first = reg.sync_regions(vec![image("cat", "cat.png")]);
    reg.complete_decode(&first[0].ticket, Ok(opaque_pixels(4, 4)));
    let second = reg.sync_regions(vec![image("cat", "cat.png")]);
    assert!(second.is_empty(), "identical redefinition must not restart the decode");
    assert_eq!(reg.query_at(Point::new(0.5, 0.5)), Some("cat"));
}

#[test]
fn identical_redefinition_mid_decode_keeps_the_original_ticket() {
    let mut reg = registry();
    let first = reg.sync_regions(vec![image("cat", "cat.png")]);
    let second = reg.sync_regions(vec![image("cat", "cat.png")]);
    assert!(second.is_empty());
    // The original in-flight decode still lands.
    reg.complete_decode(&first[0].ticket, Ok(opaque_pixels(4, 4)));
    assert_eq!(reg.query_at(Point::new(0.5, 0.5)), Some("cat"));
}

#[test]
fn changed_source_url_rebuilds_and_redecodes() {
    let mut reg = registry();
    let first = reg.sync_regions(vec![image("cat", "cat.png")]);
    reg.complete_decode(&first[0].ticket, Ok(opaque_pixels(4, 4)));
    let second = reg.sync_regions(vec![image("cat", "cat-v2.png")]);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].source_url, "cat-v2.png");
}

#[test]
fn reused_region_keeps_its_prepared_state_across_sibling_changes() {
    let mut reg = registry();
    let first = reg.sync_regions(vec![image("cat", "cat.png")]);
    reg.complete_decode(&first[0].ticket, Ok(opaque_pixels(4, 4)));
    // Add a sibling; the cat's tester must not be rebuilt.
    let second = reg.sync_regions(vec![
        image("cat", "cat.png"),
        bbox("dog", 0.0, 0.0, 0.1, 0.1),
    ]);
    assert!(second.is_empty());
    assert_eq!(reg.len(), 2);
    assert_eq!(reg.query_at(Point::new(0.5, 0.5)), Some("cat"));
}

// =============================================================
// Viewport and teardown
// =============================================================

#[test]
fn set_viewport_repositions_circle_bounds() {
    let mut reg = registry();
    reg.sync_regions(vec![RegionDef::Circle {
        id: "c".into(),
        label: None,
        center: Point::new(0.5, 0.5),
        radius: 0.2,
    }]);
    assert_eq!(reg.bounds_map()[0].1, Bounds::new(0.3, 0.3, 0.4, 0.4));
    reg.set_viewport((800.0, 400.0));
    assert_eq!(reg.bounds_map()[0].1, Bounds::new(0.4, 0.3, 0.2, 0.4));
}

#[test]
fn set_viewport_does_not_restart_decodes() {
    let mut reg = registry();
    let requests = reg.sync_regions(vec![image("cat", "cat.png")]);
    reg.set_viewport((800.0, 600.0));
    // The original ticket is still the one that publishes.
    reg.complete_decode(&requests[0].ticket, Ok(opaque_pixels(4, 4)));
    assert_eq!(reg.len(), 1);
}

#[test]
fn clear_disposes_everything() {
    let mut reg = registry();
    reg.sync_regions(vec![bbox("a", 0.0, 0.0, 1.0, 1.0)]);
    reg.clear();
    assert!(reg.is_empty());
    assert_eq!(reg.query_at(Point::new(0.5, 0.5)), None);
}
