//! Alpha mask: per-pixel opacity extracted from decoded RGBA data.
//!
//! Retaining one byte per pixel instead of the full RGBA buffer keeps the
//! per-region memory cost at a quarter of the decoded image and turns every
//! hit-test lookup into a single indexed read. The mask is row-major with
//! `y * width + x` addressing throughout.

#[cfg(test)]
#[path = "alpha_test.rs"]
mod alpha_test;

use crate::geom::Bounds;

/// A decoded image: RGBA bytes (4 per pixel, row-major) plus dimensions.
///
/// Produced by the host's decode facility (the browser path lives in
/// [`crate::decode`]); constructible directly so native hosts and tests can
/// bypass the browser entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaPixels {
    /// Raw RGBA bytes, `4 * width * height` long.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

/// One-byte-per-pixel opacity buffer at source resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlphaMask {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl AlphaMask {
    /// Extract the alpha channel from a decoded RGBA buffer (4 bytes per
    /// pixel, row-major).
    ///
    /// A buffer whose length does not match `4 * width * height` degrades
    /// to an empty mask rather than indexing out of range.
    #[must_use]
    pub fn from_rgba(rgba: &[u8], width: usize, height: usize) -> Self {
        let pixels = width * height;
        if width == 0 || height == 0 || rgba.len() < pixels * 4 {
            return Self::default();
        }
        let data = (0..pixels).map(|i| rgba[i * 4 + 3]).collect();
        Self { data, width, height }
    }

    /// Build a mask directly from opacity bytes. Length mismatches degrade
    /// to an empty mask.
    #[must_use]
    pub fn from_bytes(data: Vec<u8>, width: usize, height: usize) -> Self {
        if width == 0 || height == 0 || data.len() != width * height {
            return Self::default();
        }
        Self { data, width, height }
    }

    /// Width in pixels (0 for an empty mask).
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels (0 for an empty mask).
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the mask holds no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw opacity byte at `(x, y)`, 0 when out of range.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.data[y * self.width + x]
        } else {
            0
        }
    }

    /// Whether the pixel under the normalized position is strictly above
    /// the threshold. Positions outside [0,1]² are transparent.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn sample(&self, nx: f64, ny: f64, threshold: u8) -> bool {
        if self.is_empty() || !(0.0..=1.0).contains(&nx) || !(0.0..=1.0).contains(&ny) {
            return false;
        }
        let x = ((nx * self.width as f64) as usize).min(self.width - 1);
        let y = ((ny * self.height as f64) as usize).min(self.height - 1);
        self.data[y * self.width + x] > threshold
    }

    /// Tight normalized bounding box of pixels strictly above `threshold`.
    ///
    /// Single full-buffer scan. The right/bottom edges are `(max + 1) / dim`
    /// so a single qualifying pixel still yields a box with positive area.
    /// When nothing qualifies the result is the [`Bounds::UNIT`] sentinel —
    /// an empty box here would make every later bbox pre-check reject the
    /// region outright.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bounds(&self, threshold: u8) -> Bounds {
        if self.is_empty() {
            return Bounds::UNIT;
        }
        let mut min_x = self.width;
        let mut min_y = self.height;
        let mut max_x = 0usize;
        let mut max_y = 0usize;
        let mut any = false;
        for y in 0..self.height {
            let row = y * self.width;
            for x in 0..self.width {
                if self.data[row + x] > threshold {
                    any = true;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }
        if !any {
            return Bounds::UNIT;
        }
        let (w, h) = (self.width as f64, self.height as f64);
        Bounds::new(
            min_x as f64 / w,
            min_y as f64 / h,
            (max_x + 1 - min_x) as f64 / w,
            (max_y + 1 - min_y) as f64 / h,
        )
    }

    /// Nearest-neighbor reduction capping the longer dimension at `max_dim`.
    ///
    /// Returns a clone when the mask already fits; the working grid for
    /// outline tracing must be resolution-independent of the source image.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn downscale(&self, max_dim: usize) -> Self {
        if self.is_empty() || max_dim == 0 {
            return Self::default();
        }
        let longer = self.width.max(self.height);
        if longer <= max_dim {
            return self.clone();
        }
        let scale = max_dim as f64 / longer as f64;
        let out_w = ((self.width as f64 * scale).round() as usize).max(1);
        let out_h = ((self.height as f64 * scale).round() as usize).max(1);
        let mut data = Vec::with_capacity(out_w * out_h);
        for y in 0..out_h {
            let src_y = (y * self.height / out_h).min(self.height - 1);
            for x in 0..out_w {
                let src_x = (x * self.width / out_w).min(self.width - 1);
                data.push(self.data[src_y * self.width + src_x]);
            }
        }
        Self { data, width: out_w, height: out_h }
    }
}
