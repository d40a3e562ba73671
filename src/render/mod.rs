//! # Card Rendering
//!
//! Turns layout commands into pixels on the card image.
//!
//! ## Architecture
//!
//! ```text
//! Command stream → LineRenderer → card (RgbaImage)
//!                      ↓
//!                For each command:
//!                - Track cursor/scale state (CursorState)
//!                - Ask the GlyphRasterizer for a cell at base size
//!                - Scale the cell, blit it at the cursor
//!                - Advance by the scaled advance
//! ```
//!
//! Glyph cells are RGBA with a transparent background, so the card
//! background shows through around the ink.

pub mod bitmap;
pub mod layout;
pub mod ttf;

pub use bitmap::BitmapRasterizer;
pub use layout::{CursorState, GlyphSource, LineRenderer, Placement, RenderReport};
pub use ttf::TtfRasterizer;

use image::{Rgba, RgbaImage, imageops};
use std::path::Path;

use crate::error::{CardPrintError, Result};
use crate::protocol::glyph::{GLYPH_SIZE, GlyphMask};

/// A rasterized glyph cell.
#[derive(Debug, Clone)]
pub struct RasterGlyph {
    /// Cell image, ink on transparent
    pub image: RgbaImage,
    /// Horizontal advance at 1x scale, in pixels
    pub advance: i32,
}

/// Rasterization backend: code point + size in, glyph cell out.
pub trait GlyphRasterizer {
    /// Rasterize `ch` at `size` points in `ink`.
    ///
    /// Fails with `RasterizationError` when the backend has no glyph.
    fn rasterize(&self, ch: char, size: f32, ink: Rgba<u8>) -> Result<RasterGlyph>;

    /// Baseline-to-baseline distance at `size` points.
    fn line_skip(&self, size: f32) -> i32;
}

/// Scale a glyph cell by integer factors with nearest-neighbour sampling.
pub fn scale_glyph(image: &RgbaImage, horizontal: u8, vertical: u8) -> RgbaImage {
    let h = u32::from(horizontal.max(1));
    let v = u32::from(vertical.max(1));
    if h == 1 && v == 1 {
        return image.clone();
    }
    RgbaImage::from_fn(image.width() * h, image.height() * v, |x, y| {
        *image.get_pixel(x / h, y / v)
    })
}

/// Alpha-blend `glyph` onto `card` with its top-left corner at `(x, y)`.
/// Parts falling outside the card are clipped.
pub fn composite(card: &mut RgbaImage, glyph: &RgbaImage, x: i32, y: i32) {
    imageops::overlay(card, glyph, i64::from(x), i64::from(y));
}

/// Plain white card stock.
pub fn blank_card(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([0xFF, 0xFF, 0xFF, 0xFF]))
}

/// Load a card background image.
pub fn load_card_image(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).map_err(|e| CardPrintError::ResourceLoadError {
        what: "card image",
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(image.to_rgba8())
}

/// Render a custom glyph mask: ink for set bits, transparent elsewhere.
pub fn mask_to_image(mask: &GlyphMask, ink: Rgba<u8>) -> RgbaImage {
    let size = GLYPH_SIZE as u32;
    RgbaImage::from_fn(size, size, |x, y| {
        if mask.get(x as usize, y as usize) {
            ink
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}
