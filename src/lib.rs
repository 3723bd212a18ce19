//! Geometry and hit-testing engine for interactive image cutouts.
//!
//! This crate is compiled to WebAssembly and runs in the browser. Given a
//! base image and a set of declared regions — alpha-masked cutout images,
//! rectangles, polygons, circles — it answers "which region is under the
//! pointer", tracks hover and click-locked selection, and produces traced
//! outlines for highlight rendering. The host JavaScript layer is
//! responsible only for wiring DOM events into [`engine::ViewerCore`] and
//! carrying out the [`engine::Effect`]s it returns (decoding images, arming
//! timers, repainting).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::ViewerCore`] and host effects |
//! | [`region`] | Region definitions as declared by the host |
//! | [`registry`] | Tester registry with atomic rebuild on redefinition |
//! | [`tester`] | Per-shape hit testers built from definitions |
//! | [`pointer`] | Hover/selection state machine with debounced clearing |
//! | [`alpha`] | Alpha mask extraction and sampling |
//! | [`contour`] | Outline tracing, simplification, and smoothing |
//! | [`geom`] | Points, bounds, and polygon containment |
//! | [`decode`] | DOM-side pixel extraction (the only web-sys user) |
//! | [`consts`] | Shared numeric constants (thresholds, delays, etc.) |

pub mod alpha;
pub mod consts;
pub mod contour;
pub mod decode;
pub mod engine;
pub mod geom;
pub mod pointer;
pub mod region;
pub mod registry;
pub mod tester;
