//! Per-line layout: cursor tracking, scaling and glyph placement.
//!
//! Each print line is laid out with its own [`CursorState`]. Lines stack
//! down the card: the caller carries `y` from one line into the next.
//!
//! ## Scale compensation
//!
//! Glyphs drawn at 2x height are taller than one line skip. When the scale
//! is reset mid-line, the next line feed only knows about 1x metrics, so the
//! difference (`max_height - line_skip`, floored at zero) is added to `y`
//! before the next glyph is drawn, or before the next line feed if no glyph
//! comes first.

use image::{Rgba, RgbaImage};
use log::{debug, warn};

use super::{GlyphRasterizer, composite, scale_glyph};
use crate::device::config::DeviceConfig;
use crate::device::registry::GlyphRegistry;
use crate::error::CardPrintError;
use crate::protocol::escape::{Command, CommandParser, Ignored};
use crate::protocol::glyph::GLYPH_SIZE;

/// Layout state for one print line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    pub x: i32,
    pub y: i32,
    pub h_scale: u8,
    pub v_scale: u8,
    /// Deferred y correction armed by a mid-line scale reset
    pub compensate: bool,
    /// Tallest scaled glyph drawn on the current row
    pub max_height: i32,
}

impl CursorState {
    /// Start of a line at `(x, y)`, 1x/1x scale.
    pub fn line_start(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            h_scale: 1,
            v_scale: 1,
            compensate: false,
            max_height: 0,
        }
    }
}

/// Where a cell came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphSource {
    Font(char),
    Custom(u32),
}

/// One composited cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub source: GlyphSource,
    pub x: i32,
    pub y: i32,
    /// Scaled cell size
    pub width: u32,
    pub height: u32,
    pub h_scale: u8,
    pub v_scale: u8,
}

/// What a render pass did.
#[derive(Debug, Default)]
pub struct RenderReport {
    /// Print lines rendered
    pub lines: usize,
    /// Every composited cell, in drawing order
    pub placements: Vec<Placement>,
    /// Per-glyph failures that were skipped
    pub faults: Vec<CardPrintError>,
    /// Control sequences the parser dropped
    pub ignored: Vec<Ignored>,
    /// Vertical cursor after the pass
    pub cursor_y: i32,
}

impl RenderReport {
    /// Number of glyphs drawn.
    pub fn glyphs_drawn(&self) -> usize {
        self.placements.len()
    }
}

/// Lays out one print line at a time onto a card.
pub struct LineRenderer<'a> {
    config: &'a DeviceConfig,
    rasterizer: &'a dyn GlyphRasterizer,
    registry: &'a GlyphRegistry,
    ink: Rgba<u8>,
}

impl<'a> LineRenderer<'a> {
    pub fn new(
        config: &'a DeviceConfig,
        rasterizer: &'a dyn GlyphRasterizer,
        registry: &'a GlyphRegistry,
    ) -> Self {
        Self {
            config,
            rasterizer,
            registry,
            ink: Rgba(config.ink),
        }
    }

    /// Lay out `text` (already decoded) starting from `cursor`.
    ///
    /// Per-glyph failures are logged, recorded in `report` and skipped.
    pub fn render_line(
        &self,
        text: &str,
        cursor: &mut CursorState,
        card: &mut RgbaImage,
        report: &mut RenderReport,
    ) {
        let (commands, ignored) = CommandParser::new().feed_all(text.chars());
        for why in &ignored {
            debug!("ignored control sequence: {:?}", why);
        }
        report.ignored.extend(ignored);

        for command in commands {
            self.apply(command, cursor, card, report);
        }
    }

    /// Apply one command to the cursor (and the card, for glyphs).
    pub fn apply(
        &self,
        command: Command,
        cursor: &mut CursorState,
        card: &mut RgbaImage,
        report: &mut RenderReport,
    ) {
        match command {
            Command::LineFeed => self.line_feed(cursor),
            Command::DoubleHeight => cursor.v_scale = 2,
            Command::ResetScale => {
                if cursor.v_scale != 1 {
                    cursor.compensate = true;
                }
                cursor.v_scale = 1;
                cursor.h_scale = 1;
            }
            Command::SetScale {
                vertical,
                horizontal,
            } => {
                cursor.v_scale = vertical;
                cursor.h_scale = horizontal;
            }
            Command::Glyph(ch) => {
                match self
                    .rasterizer
                    .rasterize(ch, self.config.font_size, self.ink)
                {
                    Ok(glyph) => self.draw(
                        GlyphSource::Font(ch),
                        &glyph.image,
                        glyph.advance,
                        cursor,
                        card,
                        report,
                    ),
                    Err(err) => {
                        warn!("skipping glyph: {}", err);
                        report.faults.push(err);
                    }
                }
            }
            Command::CustomGlyph(slot) => match self.registry.lookup(slot) {
                Ok(image) => self.draw(
                    GlyphSource::Custom(slot),
                    image,
                    GLYPH_SIZE as i32,
                    cursor,
                    card,
                    report,
                ),
                Err(err) => {
                    warn!("skipping cell: {}", err);
                    report.faults.push(err);
                }
            },
        }
    }

    fn base_line_skip(&self) -> i32 {
        self.rasterizer.line_skip(self.config.font_size)
    }

    /// Never moves the cursor up: a reset before any tall glyph was drawn
    /// has nothing to clear.
    fn apply_compensation(&self, cursor: &mut CursorState) {
        if cursor.compensate {
            cursor.y += (cursor.max_height - self.base_line_skip()).max(0);
            cursor.compensate = false;
        }
    }

    fn line_feed(&self, cursor: &mut CursorState) {
        self.apply_compensation(cursor);
        let skip = if cursor.v_scale != 1 {
            self.rasterizer
                .line_skip(self.config.font_size * f32::from(cursor.v_scale))
        } else {
            self.base_line_skip()
        };
        cursor.y += skip + self.config.line_gap;
        cursor.x = self.config.left_margin;
        cursor.h_scale = 1;
        cursor.v_scale = 1;
        cursor.compensate = false;
        cursor.max_height = 0;
    }

    fn draw(
        &self,
        source: GlyphSource,
        cell: &RgbaImage,
        advance: i32,
        cursor: &mut CursorState,
        card: &mut RgbaImage,
        report: &mut RenderReport,
    ) {
        self.apply_compensation(cursor);

        let scaled = scale_glyph(cell, cursor.h_scale, cursor.v_scale);
        composite(card, &scaled, cursor.x, cursor.y);
        report.placements.push(Placement {
            source,
            x: cursor.x,
            y: cursor.y,
            width: scaled.width(),
            height: scaled.height(),
            h_scale: cursor.h_scale,
            v_scale: cursor.v_scale,
        });

        cursor.max_height = cursor.max_height.max(scaled.height() as i32);
        cursor.x += advance * i32::from(cursor.h_scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::config::INK;
    use crate::error::Result;
    use crate::protocol::glyph::{GlyphMask, register_font};
    use crate::render::{RasterGlyph, blank_card};
    use pretty_assertions::assert_eq;

    /// Every glyph is a solid 10×20 cell with advance 12 at 36pt;
    /// line skip is the size rounded. '?' has no glyph.
    struct FixedRasterizer;

    impl GlyphRasterizer for FixedRasterizer {
        fn rasterize(&self, ch: char, size: f32, ink: Rgba<u8>) -> Result<RasterGlyph> {
            if ch == '?' {
                return Err(CardPrintError::RasterizationError { ch });
            }
            let factor = size / 36.0;
            Ok(RasterGlyph {
                image: RgbaImage::from_pixel(
                    (10.0 * factor) as u32,
                    (20.0 * factor) as u32,
                    ink,
                ),
                advance: (12.0 * factor) as i32,
            })
        }

        fn line_skip(&self, size: f32) -> i32 {
            size.round() as i32
        }
    }

    struct Fixture {
        config: DeviceConfig,
        registry: GlyphRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            let config = DeviceConfig::default();
            let registry = GlyphRegistry::new(config.glyph_slots, config.ink);
            Self { config, registry }
        }

        fn run(&self, text: &str) -> (CursorState, RenderReport) {
            let renderer = LineRenderer::new(&self.config, &FixedRasterizer, &self.registry);
            let mut card = blank_card(640, 1012);
            let mut cursor = CursorState::line_start(95, 120);
            let mut report = RenderReport::default();
            renderer.render_line(text, &mut cursor, &mut card, &mut report);
            (cursor, report)
        }
    }

    #[test]
    fn test_two_glyphs_then_line_feed() {
        let (cursor, report) = Fixture::new().run("AB\r");
        assert_eq!(report.glyphs_drawn(), 2);
        assert_eq!(
            report.placements.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>(),
            vec![(95, 120), (107, 120)]
        );
        assert_eq!(cursor, CursorState::line_start(95, 120 + 36 + 4));
    }

    #[test]
    fn test_line_feed_only() {
        let (cursor, report) = Fixture::new().run("\r");
        assert_eq!(report.glyphs_drawn(), 0);
        assert_eq!(cursor.y, 120 + 36 + 4);
        assert_eq!(cursor.x, 95);
    }

    #[test]
    fn test_set_scale_two_by_one() {
        let (_, report) = Fixture::new().run("\u{1b}s21AB");
        let a = report.placements[0];
        assert_eq!((a.v_scale, a.h_scale), (2, 1));
        assert_eq!((a.width, a.height), (10, 40));
        // Unscaled advance at 1x horizontal
        assert_eq!(report.placements[1].x, a.x + 12);
    }

    #[test]
    fn test_horizontal_scale_multiplies_advance() {
        let (cursor, report) = Fixture::new().run("\u{1b}s13AB");
        assert_eq!(report.placements[0].width, 30);
        assert_eq!(report.placements[1].x, 95 + 36);
        assert_eq!(cursor.x, 95 + 72);
    }

    #[test]
    fn test_double_height_line_feed_uses_scaled_skip() {
        let (cursor, _) = Fixture::new().run("\u{11}A\r");
        assert_eq!(cursor.y, 120 + 72 + 4);
        assert_eq!(cursor.v_scale, 1);
        assert_eq!(cursor.max_height, 0);
    }

    #[test]
    fn test_double_height_keeps_horizontal_scale() {
        let (_, report) = Fixture::new().run("\u{1b}s13\u{11}A");
        assert_eq!(
            (report.placements[0].v_scale, report.placements[0].h_scale),
            (2, 3)
        );
    }

    #[test]
    fn test_reset_scale_compensates_before_next_glyph() {
        // Double-height A is 40 tall; base line skip is 36
        let (cursor, report) = Fixture::new().run("\u{11}A\u{14}B\r");
        assert_eq!(report.placements[0].y, 120);
        assert_eq!(report.placements[1].y, 120 + 4);
        assert_eq!(report.placements[1].v_scale, 1);
        assert_eq!(cursor.y, 124 + 36 + 4);
    }

    #[test]
    fn test_reset_scale_compensates_at_line_feed() {
        let (cursor, _) = Fixture::new().run("\u{11}A\u{14}\r");
        assert_eq!(cursor.y, 120 + (40 - 36) + 36 + 4);
        assert!(!cursor.compensate);
    }

    #[test]
    fn test_compensation_applied_once() {
        let (_, report) = Fixture::new().run("\u{11}A\u{14}BC");
        assert_eq!(report.placements[1].y, 124);
        assert_eq!(report.placements[2].y, 124);
    }

    #[test]
    fn test_reset_before_tall_glyph_stays_on_row() {
        let (cursor, report) = Fixture::new().run("\u{11}\u{14}A\r");
        assert_eq!(report.placements[0].y, 120);
        assert_eq!(cursor.y, 120 + 36 + 4);
    }

    #[test]
    fn test_reset_at_1x_does_not_arm() {
        let (cursor, report) = Fixture::new().run("A\u{14}B");
        assert!(!cursor.compensate);
        assert_eq!(report.placements[1].y, 120);
    }

    #[test]
    fn test_rasterization_failure_is_isolated() {
        let (cursor, report) = Fixture::new().run("A?B");
        assert_eq!(report.glyphs_drawn(), 2);
        assert_eq!(report.faults.len(), 1);
        assert!(matches!(
            report.faults[0],
            CardPrintError::RasterizationError { ch: '?' }
        ));
        // Failed glyph takes no space
        assert_eq!(report.placements[1].x, 95 + 12);
        assert_eq!(cursor.x, 95 + 24);
    }

    #[test]
    fn test_custom_glyph_cell() {
        let mut fixture = Fixture::new();
        let mut mask = GlyphMask::default();
        mask.set(0, 0, true);
        fixture
            .registry
            .register_font(&register_font(3, &mask))
            .unwrap();

        let (cursor, report) = fixture.run("g\u{3}A");
        assert_eq!(report.placements[0].source, GlyphSource::Custom(3));
        assert_eq!(
            (report.placements[0].width, report.placements[0].height),
            (24, 24)
        );
        assert_eq!(report.placements[1].x, 95 + 24);
        assert_eq!(cursor.x, 95 + 24 + 12);
    }

    #[test]
    fn test_custom_glyph_scales_like_font_glyphs() {
        let mut fixture = Fixture::new();
        fixture
            .registry
            .register_font(&register_font(1, &GlyphMask::default()))
            .unwrap();
        let (cursor, report) = fixture.run("\u{1b}s22g\u{1}");
        assert_eq!(
            (report.placements[0].width, report.placements[0].height),
            (48, 48)
        );
        assert_eq!(cursor.x, 95 + 48);
        assert_eq!(cursor.max_height, 48);
    }

    #[test]
    fn test_missing_custom_glyph_skips_cell() {
        let (cursor, report) = Fixture::new().run("g\u{5}A");
        assert_eq!(report.glyphs_drawn(), 1);
        assert_eq!(report.placements[0].x, 95);
        assert!(matches!(
            report.faults[0],
            CardPrintError::MissingCustomGlyph { slot: 5 }
        ));
        assert_eq!(cursor.x, 95 + 12);
    }

    #[test]
    fn test_ink_lands_on_card() {
        let fixture = Fixture::new();
        let renderer = LineRenderer::new(&fixture.config, &FixedRasterizer, &fixture.registry);
        let mut card = blank_card(640, 1012);
        let mut cursor = CursorState::line_start(95, 120);
        let mut report = RenderReport::default();
        renderer.render_line("A", &mut cursor, &mut card, &mut report);

        assert_eq!(*card.get_pixel(95, 120), Rgba(INK));
        assert_eq!(*card.get_pixel(104, 139), Rgba(INK));
        assert_eq!(*card.get_pixel(105, 120), Rgba([0xFF, 0xFF, 0xFF, 0xFF]));
    }

    #[test]
    fn test_unfinished_escape_is_reported() {
        let (_, report) = Fixture::new().run("A\u{1b}s");
        assert_eq!(report.glyphs_drawn(), 1);
        assert_eq!(report.ignored.len(), 1);
    }
}
