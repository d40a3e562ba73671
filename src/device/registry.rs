//! # Custom Glyph Registry
//!
//! Device memory for host-uploaded 24×24 glyphs. Slots are overwritten by
//! new uploads and cleared only by a device reset.

use image::{Rgba, RgbaImage};

use crate::error::{CardPrintError, Result};
use crate::protocol::glyph::{self, GlyphMask, MAX_SLOTS, REGISTER_FONT_LEN};
use crate::render::mask_to_image;

/// A registered glyph: the uploaded mask and its renderable bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomGlyph {
    pub mask: GlyphMask,
    pub image: RgbaImage,
}

/// Fixed-size table of custom glyph slots.
#[derive(Debug, Clone)]
pub struct GlyphRegistry {
    slots: Vec<Option<CustomGlyph>>,
    ink: Rgba<u8>,
}

impl GlyphRegistry {
    /// An empty registry with `slots` slots, rendering set bits in `ink`.
    /// Capped at the 256 slots a one-byte index can name.
    pub fn new(slots: usize, ink: [u8; 4]) -> Self {
        Self {
            slots: vec![None; slots.min(MAX_SLOTS)],
            ink: Rgba(ink),
        }
    }

    /// Handle a RegisterFont payload. Returns the slot written.
    ///
    /// Nothing is modified unless the payload is exactly 0x49 bytes and
    /// names a slot inside the device's range.
    pub fn register_font(&mut self, payload: &[u8]) -> Result<u8> {
        let upload =
            glyph::parse_register_font(payload).ok_or(CardPrintError::MalformedPayload {
                expected: REGISTER_FONT_LEN,
                actual: payload.len(),
            })?;

        let index = usize::from(upload.slot);
        if index >= self.slots.len() {
            return Err(CardPrintError::InvalidSlot {
                slot: u32::from(upload.slot),
                slots: self.slots.len(),
            });
        }

        let image = mask_to_image(&upload.mask, self.ink);
        self.slots[index] = Some(CustomGlyph {
            mask: upload.mask,
            image,
        });
        log::debug!("registered custom glyph in slot {}", upload.slot);
        Ok(upload.slot)
    }

    fn entry(&self, slot: u32) -> Option<&CustomGlyph> {
        let index = usize::try_from(slot).ok()?;
        self.slots.get(index)?.as_ref()
    }

    /// Renderable bitmap for `slot`, or `MissingCustomGlyph`.
    pub fn lookup(&self, slot: u32) -> Result<&RgbaImage> {
        self.glyph(slot)
            .ok_or(CardPrintError::MissingCustomGlyph { slot })
    }

    /// Renderable bitmap for `slot`, if registered.
    pub fn glyph(&self, slot: u32) -> Option<&RgbaImage> {
        self.entry(slot).map(|g| &g.image)
    }

    /// Uploaded mask for `slot`, if registered.
    pub fn mask(&self, slot: u32) -> Option<&GlyphMask> {
        self.entry(slot).map(|g| &g.mask)
    }

    /// Number of slots the device has.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of registered slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every glyph (device reset).
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}
