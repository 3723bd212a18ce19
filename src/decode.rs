//! Image decoding: reads RGBA pixels out of a loaded image element.
//!
//! This module is the only place that touches the DOM. The host resolves an
//! [`crate::engine::Effect::DecodeImage`] request by loading the image,
//! calling [`decode_image`] once it is complete, and handing the result to
//! [`crate::engine::ViewerCore::complete_decode`]. Everything else in the
//! crate works on the plain [`RgbaPixels`] buffer produced here.
//!
//! Pixels are extracted by drawing the element onto an offscreen canvas and
//! reading it back. A cross-origin image without CORS headers taints that
//! canvas, which makes the readback throw; that case surfaces as
//! [`DecodeError::PixelAccess`] rather than a decode failure so callers can
//! tell "bad image" and "blocked image" apart.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::alpha::RgbaPixels;
use crate::registry::DecodeError;

/// Extract the RGBA pixel buffer from a fully loaded image element.
///
/// The caller must only invoke this after the element's `load` event; an
/// incomplete image has zero natural dimensions and decodes as an empty
/// buffer, which the registry treats as a failed preparation.
///
/// # Errors
///
/// [`DecodeError::Decode`] when the offscreen canvas cannot be set up or
/// drawn into, [`DecodeError::PixelAccess`] when the readback is blocked
/// (tainted canvas).
#[allow(clippy::cast_possible_truncation)]
pub fn decode_image(image: &HtmlImageElement) -> Result<RgbaPixels, DecodeError> {
    let width = image.natural_width();
    let height = image.natural_height();

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| DecodeError::Decode("no document".into()))?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| DecodeError::Decode(describe(&e)))?
        .dyn_into()
        .map_err(|_| DecodeError::Decode("canvas element cast failed".into()))?;
    canvas.set_width(width);
    canvas.set_height(height);

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(|e| DecodeError::Decode(describe(&e)))?
        .ok_or_else(|| DecodeError::Decode("no 2d context".into()))?
        .dyn_into()
        .map_err(|_| DecodeError::Decode("2d context cast failed".into()))?;
    ctx.draw_image_with_html_image_element(image, 0.0, 0.0)
        .map_err(|e| DecodeError::Decode(describe(&e)))?;

    // Readback throws on a tainted canvas (cross-origin without CORS).
    let image_data = ctx
        .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
        .map_err(|e| DecodeError::PixelAccess(describe(&e)))?;

    Ok(RgbaPixels {
        data: image_data.data().0,
        width: width as usize,
        height: height as usize,
    })
}

/// Best-effort human-readable rendering of a thrown JS value.
fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
