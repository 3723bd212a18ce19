//! Shared numeric constants for the cutout engine.

// ── Hit-testing ─────────────────────────────────────────────────

/// Default alpha threshold: pixels strictly above this count as opaque.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 30;

/// Default delay before a lost hover is actually cleared, in milliseconds.
pub const DEFAULT_HOVER_CLEAR_MS: u32 = 150;

// ── Contour tracing ─────────────────────────────────────────────

/// Cap on the longer dimension of the working grid used for outline tracing.
pub const OUTLINE_WORKING_SIZE: usize = 256;

/// Ramer–Douglas–Peucker epsilon in normalized units.
pub const OUTLINE_EPSILON: f64 = 0.0025;

/// Catmull-Rom tangent scale for cubic-bezier conversion.
pub const CATMULL_ROM_TENSION: f64 = 1.0 / 6.0;

/// Minimum vertex count for a usable outline polygon.
pub const MIN_OUTLINE_POINTS: usize = 3;

/// Quantization scale for matching marching-squares segment endpoints.
pub const STITCH_QUANTIZE: f64 = 1024.0;
