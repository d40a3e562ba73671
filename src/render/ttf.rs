//! TrueType glyph rendering.
//!
//! Rasterizes one code point at a time with ab_glyph. Each cell is as tall
//! as the font's ascent-to-descent height with the glyph sitting on the
//! baseline, so glyphs drawn at the same y line up regardless of shape.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use image::{Rgba, RgbaImage};
use std::path::Path;

use super::{GlyphRasterizer, RasterGlyph};
use crate::error::{CardPrintError, Result};

static BUILTIN_FONT: &[u8] = include_bytes!("fonts/DejaVuSansMono.ttf");

/// Glyph backend for a TrueType/OpenType font file.
#[derive(Clone)]
pub struct TtfRasterizer {
    font: FontArc,
}

impl std::fmt::Debug for TtfRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtfRasterizer").finish_non_exhaustive()
    }
}

impl TtfRasterizer {
    /// Load a font file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let load_error = |reason: String| CardPrintError::ResourceLoadError {
            what: "font",
            path: path.to_path_buf(),
            reason,
        };
        let bytes = std::fs::read(path).map_err(|e| load_error(e.to_string()))?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| load_error(e.to_string()))?;
        Ok(Self { font })
    }

    /// DejaVu Sans Mono, bundled with the crate. Latin, Greek and Cyrillic
    /// only; kana and kanji need a CJK font loaded with [`Self::from_file`].
    pub fn builtin() -> Result<Self> {
        let font = FontArc::try_from_slice(BUILTIN_FONT).map_err(|e| {
            CardPrintError::ResourceLoadError {
                what: "font",
                path: "fonts/DejaVuSansMono.ttf".into(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { font })
    }

    /// Wrap an already-loaded font.
    pub fn from_font(font: FontArc) -> Self {
        Self { font }
    }

    /// Pixel scale for a point size, at 72 dpi (1pt = 1px per em).
    fn px_scale(&self, size: f32) -> PxScale {
        match self.font.units_per_em() {
            Some(upem) if upem > 0.0 => PxScale::from(size * self.font.height_unscaled() / upem),
            _ => PxScale::from(size),
        }
    }
}

impl GlyphRasterizer for TtfRasterizer {
    fn rasterize(&self, ch: char, size: f32, ink: Rgba<u8>) -> Result<RasterGlyph> {
        let glyph_id = self.font.glyph_id(ch);
        // Id 0 is .notdef: the font has no glyph for this code point
        if glyph_id.0 == 0 && !ch.is_whitespace() {
            return Err(CardPrintError::RasterizationError { ch });
        }

        let scale = self.px_scale(size);
        let scaled = self.font.as_scaled(scale);
        let ascent = scaled.ascent();
        let advance = scaled.h_advance(glyph_id);
        let height = scaled.height().ceil().max(1.0) as u32;

        let glyph = glyph_id.with_scale_and_position(scale, point(0.0, ascent));
        let outlined = self.font.outline_glyph(glyph);

        let mut width = advance.ceil().max(1.0) as u32;
        if let Some(outlined) = &outlined {
            width = width.max(outlined.px_bounds().max.x.ceil().max(0.0) as u32);
        }

        let mut image = RgbaImage::new(width, height);
        if let Some(outlined) = outlined {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;
                if x >= 0 && (x as u32) < width && y >= 0 && (y as u32) < height {
                    let alpha = (coverage.min(1.0) * f32::from(ink[3])).round() as u8;
                    let pixel = image.get_pixel_mut(x as u32, y as u32);
                    // Overlapping contours accumulate; keep the strongest coverage
                    if alpha > pixel[3] {
                        *pixel = Rgba([ink[0], ink[1], ink[2], alpha]);
                    }
                }
            });
        }

        Ok(RasterGlyph {
            image,
            advance: advance.round() as i32,
        })
    }

    fn line_skip(&self, size: f32) -> i32 {
        let scaled = self.font.as_scaled(self.px_scale(size));
        (scaled.height() + scaled.line_gap()).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba<u8> = Rgba([0x64, 0x64, 0x96, 0xFF]);

    fn font() -> TtfRasterizer {
        TtfRasterizer::builtin().unwrap()
    }

    /// Lowest row holding any ink.
    fn bottom_ink_row(image: &RgbaImage) -> Option<u32> {
        image
            .enumerate_pixels()
            .filter(|(_, _, p)| p[3] != 0)
            .map(|(_, y, _)| y)
            .max()
    }

    #[test]
    fn test_missing_font_file() {
        let err = TtfRasterizer::from_file(Path::new("/nonexistent/kochi-gothic.ttf")).unwrap_err();
        match err {
            CardPrintError::ResourceLoadError { what, .. } => assert_eq!(what, "font"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_font_bytes() {
        assert!(FontArc::try_from_vec(b"not a font".to_vec()).is_err());
    }

    #[test]
    fn test_rasterize_glyph_in_ink() {
        let glyph = font().rasterize('A', 36.0, INK).unwrap();
        // 1233 of 2048 units at 36pt
        assert_eq!(glyph.advance, 22);

        let inked: Vec<_> = glyph.image.pixels().filter(|p| p[3] != 0).collect();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|p| p.0[..3] == INK.0[..3]));
        assert!(inked.iter().any(|p| p[3] == 0xFF));
    }

    #[test]
    fn test_monospace_advance() {
        let ttf = font();
        let narrow = ttf.rasterize('i', 36.0, INK).unwrap();
        let wide = ttf.rasterize('M', 36.0, INK).unwrap();
        assert_eq!(narrow.advance, wide.advance);
    }

    #[test]
    fn test_cell_height_matches_line_skip() {
        let ttf = font();
        let glyph = ttf.rasterize('A', 36.0, INK).unwrap();
        let skip = ttf.line_skip(36.0);
        assert!((glyph.image.height() as i32 - skip).abs() <= 1);

        let double = ttf.line_skip(72.0);
        assert!((double - 2 * skip).abs() <= 1);
    }

    #[test]
    fn test_glyphs_share_baseline() {
        let ttf = font();
        let upper = ttf.rasterize('A', 36.0, INK).unwrap();
        let lower = ttf.rasterize('x', 36.0, INK).unwrap();
        assert_eq!(upper.image.height(), lower.image.height());
        let (a, x) = (
            bottom_ink_row(&upper.image).unwrap(),
            bottom_ink_row(&lower.image).unwrap(),
        );
        assert!(a.abs_diff(x) <= 1);
    }

    #[test]
    fn test_whitespace_is_blank_cell() {
        let glyph = font().rasterize(' ', 36.0, INK).unwrap();
        assert_eq!(glyph.advance, 22);
        assert!(bottom_ink_row(&glyph.image).is_none());
    }

    #[test]
    fn test_missing_glyph_is_rasterization_error() {
        let err = font().rasterize('日', 36.0, INK).unwrap_err();
        assert!(matches!(err, CardPrintError::RasterizationError { ch: '日' }));
    }
}
