//! Built-in bitmap glyph backend.
//!
//! Uses the Spleen 12×24 bitmap font, scaled with nearest neighbour to the
//! requested point size (24pt is the native size). Good enough to preview
//! Latin text without shipping a TrueType font; kanji are not covered and
//! come back as rasterization errors.

use image::{Rgba, RgbaImage};
use spleen_font::{FONT_12X24, PSF2Font};

use super::{GlyphRasterizer, RasterGlyph};
use crate::error::{CardPrintError, Result};

const CELL_WIDTH: usize = 12;
const CELL_HEIGHT: usize = 24;

/// Glyph backend backed by the Spleen 12×24 font.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapRasterizer;

impl BitmapRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Cell size in pixels at `size` points.
    fn cell_size(size: f32) -> (usize, usize) {
        let factor = size / CELL_HEIGHT as f32;
        let width = ((CELL_WIDTH as f32 * factor).round() as usize).max(1);
        let height = ((CELL_HEIGHT as f32 * factor).round() as usize).max(1);
        (width, height)
    }

    /// Native 12×24 bitmap for `ch`, or `None` if Spleen has no glyph.
    fn native_bitmap(ch: char) -> Option<Vec<bool>> {
        let mut spleen = PSF2Font::new(FONT_12X24).ok()?;
        let utf8 = ch.to_string();
        let glyph = spleen.glyph_for_utf8(utf8.as_bytes())?;

        let mut bitmap = vec![false; CELL_WIDTH * CELL_HEIGHT];
        for (row_y, row) in glyph.enumerate() {
            for (col_x, on) in row.enumerate() {
                if row_y < CELL_HEIGHT && col_x < CELL_WIDTH {
                    bitmap[row_y * CELL_WIDTH + col_x] = on;
                }
            }
        }
        Some(bitmap)
    }
}

impl GlyphRasterizer for BitmapRasterizer {
    fn rasterize(&self, ch: char, size: f32, ink: Rgba<u8>) -> Result<RasterGlyph> {
        let bitmap = match Self::native_bitmap(ch) {
            Some(bitmap) => bitmap,
            None if ch.is_whitespace() => vec![false; CELL_WIDTH * CELL_HEIGHT],
            None => return Err(CardPrintError::RasterizationError { ch }),
        };

        let (width, height) = Self::cell_size(size);
        let image = RgbaImage::from_fn(width as u32, height as u32, |dx, dy| {
            let sx = dx as usize * CELL_WIDTH / width;
            let sy = dy as usize * CELL_HEIGHT / height;
            if bitmap[sy * CELL_WIDTH + sx] {
                ink
            } else {
                Rgba([0, 0, 0, 0])
            }
        });

        Ok(RasterGlyph {
            image,
            advance: width as i32,
        })
    }

    fn line_skip(&self, size: f32) -> i32 {
        Self::cell_size(size).1 as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba<u8> = Rgba([0x64, 0x64, 0x96, 0xFF]);

    #[test]
    fn test_native_size() {
        let glyph = BitmapRasterizer.rasterize('A', 24.0, INK).unwrap();
        assert_eq!(glyph.image.dimensions(), (12, 24));
        assert_eq!(glyph.advance, 12);
        assert!(glyph.image.pixels().any(|p| *p == INK));
    }

    #[test]
    fn test_scaled_to_point_size() {
        let glyph = BitmapRasterizer.rasterize('A', 36.0, INK).unwrap();
        assert_eq!(glyph.image.dimensions(), (18, 36));
        assert_eq!(glyph.advance, 18);
        assert_eq!(BitmapRasterizer.line_skip(36.0), 36);
        assert_eq!(BitmapRasterizer.line_skip(72.0), 72);
    }

    #[test]
    fn test_space_is_blank() {
        let glyph = BitmapRasterizer.rasterize(' ', 24.0, INK).unwrap();
        assert!(glyph.image.pixels().all(|p| p[3] == 0));
        assert_eq!(glyph.advance, 12);
    }

    #[test]
    fn test_uncovered_code_point() {
        let err = BitmapRasterizer.rasterize('漢', 24.0, INK).unwrap_err();
        assert!(matches!(err, CardPrintError::RasterizationError { ch: '漢' }));
    }
}
