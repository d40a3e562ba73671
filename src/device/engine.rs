//! # Print Engine
//!
//! Owns the pending-line queue, the glyph registry and the card being
//! printed, and runs render passes over the queue.
//!
//! ## Flow
//!
//! ```text
//! register_font(payload) ──▶ GlyphRegistry
//!
//! queue_print_line(payload)
//!   ├─ parse header, clear queue if asked, append line
//!   └─ render_pass()
//!        ├─ load card stock if no card is in the printer
//!        └─ for each queued line (FIFO):
//!             decode Shift-JIS → parse commands → LineRenderer
//! ```
//!
//! The engine is single-threaded and run-to-completion. Callers that share
//! it across threads must serialize access themselves.

use image::RgbaImage;
use log::{debug, error, warn};
use rand::seq::IndexedRandom;
use std::collections::VecDeque;

use super::config::DeviceConfig;
use super::registry::GlyphRegistry;
use crate::encoding::{ShiftJis, TextDecoder};
use crate::error::{CardPrintError, Result};
use crate::protocol::commands::{BufferControl, HEADER_LEN, PrintLineHeader, PrintMode};
use crate::render::layout::{CursorState, LineRenderer, RenderReport};
use crate::render::{GlyphRasterizer, blank_card, load_card_image};

/// One queued line of print data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLine {
    /// Timing requested by the host
    pub mode: PrintMode,
    /// Native-encoded text with inline controls
    pub bytes: Vec<u8>,
}

/// The card printer's print engine.
pub struct PrintEngine {
    config: DeviceConfig,
    registry: GlyphRegistry,
    queue: VecDeque<PendingLine>,
    rasterizer: Box<dyn GlyphRasterizer>,
    decoder: Box<dyn TextDecoder>,
    card: Option<RgbaImage>,
    cursor_y: i32,
}

impl PrintEngine {
    /// A fresh engine with an empty registry, no queued lines and no card.
    pub fn new(config: DeviceConfig, rasterizer: Box<dyn GlyphRasterizer>) -> Self {
        let registry = GlyphRegistry::new(config.glyph_slots, config.ink);
        let cursor_y = config.top_margin;
        Self {
            config,
            registry,
            queue: VecDeque::new(),
            rasterizer,
            decoder: Box::new(ShiftJis),
            card: None,
            cursor_y,
        }
    }

    /// Replace the native text decoder.
    pub fn with_decoder(mut self, decoder: Box<dyn TextDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn registry(&self) -> &GlyphRegistry {
        &self.registry
    }

    /// Store a custom glyph (RegisterFont). Returns the slot written.
    pub fn register_font(&mut self, payload: &[u8]) -> Result<u8> {
        self.registry.register_font(payload)
    }

    /// Queue a print line and render everything queued (QueuePrintLine).
    ///
    /// Per-glyph failures do not fail the call; they are listed in the
    /// returned report.
    pub fn queue_print_line(&mut self, payload: &[u8]) -> Result<RenderReport> {
        self.enqueue(payload)?;
        self.render_pass()
    }

    /// Parse a print-line payload and append it to the queue without
    /// rendering. A `'0'` buffer-control byte empties the queue first.
    pub fn enqueue(&mut self, payload: &[u8]) -> Result<()> {
        let header = PrintLineHeader::parse(payload).ok_or(CardPrintError::EmptyPayload {
            len: payload.len(),
        })?;
        for (offset, byte) in PrintLineHeader::unknown_bytes(payload) {
            warn!(
                "unknown print-line header byte {:#04x} at offset {}",
                byte, offset
            );
        }

        if header.control == BufferControl::Clear {
            self.queue.clear();
        }
        self.queue.push_back(PendingLine {
            mode: header.mode,
            bytes: header.text.to_vec(),
        });
        debug!(
            "queued {} byte line ({:?}, {:?})",
            payload.len() - HEADER_LEN,
            header.mode,
            header.control
        );
        Ok(())
    }

    /// Lines waiting to be rendered, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &PendingLine> {
        self.queue.iter()
    }

    /// Drain the queue onto the card.
    ///
    /// Fails with `ResourceLoadError` if card stock cannot be loaded
    /// (nothing drawn, queue untouched), or with `EncodingError` if a line
    /// cannot be decoded (that line and everything after it stay queued).
    pub fn render_pass(&mut self) -> Result<RenderReport> {
        let mut report = RenderReport {
            cursor_y: self.cursor_y,
            ..Default::default()
        };
        if self.queue.is_empty() {
            return Ok(report);
        }

        let card = match self.card.take() {
            Some(card) => card,
            None => self.load_stock()?,
        };
        let card = self.card.insert(card);
        let renderer = LineRenderer::new(&self.config, self.rasterizer.as_ref(), &self.registry);

        while let Some(line) = self.queue.front() {
            let text = self.decoder.decode(&line.bytes).inspect_err(|e| {
                error!("render pass aborted: {}", e);
            })?;
            if line.mode == PrintMode::Wait {
                debug!("deferred print mode is not modelled; printing now");
            }

            let mut cursor = CursorState::line_start(self.config.left_margin, self.cursor_y);
            renderer.render_line(&text, &mut cursor, card, &mut report);
            self.cursor_y = cursor.y;
            report.cursor_y = cursor.y;
            report.lines += 1;
            self.queue.pop_front();
        }

        Ok(report)
    }

    /// Fresh card stock: a random background from the pool, or blank.
    fn load_stock(&self) -> Result<RgbaImage> {
        match self.config.card_images.choose(&mut rand::rng()) {
            Some(path) => {
                debug!("loading card stock {}", path.display());
                load_card_image(path)
            }
            None => Ok(blank_card(self.config.card_width, self.config.card_height)),
        }
    }

    /// The card currently in the printer, if any.
    pub fn card(&self) -> Option<&RgbaImage> {
        self.card.as_ref()
    }

    /// Vertical position the next line will start at.
    pub fn cursor_y(&self) -> i32 {
        self.cursor_y
    }

    /// Take the printed card out. The next render pass starts a new card
    /// at the top margin.
    pub fn eject_card(&mut self) -> Option<RgbaImage> {
        self.cursor_y = self.config.top_margin;
        self.card.take()
    }

    /// Power-cycle: forget glyphs, queued lines and the current card.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.queue.clear();
        self.eject_card();
    }
}

impl std::fmt::Debug for PrintEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintEngine")
            .field("config", &self.config)
            .field("queued", &self.queue.len())
            .field("glyphs", &self.registry.len())
            .field("has_card", &self.card.is_some())
            .field("cursor_y", &self.cursor_y)
            .finish()
    }
}
