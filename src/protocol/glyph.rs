//! # Custom Glyph Upload
//!
//! The host loads bitmap characters into device memory with a RegisterFont
//! payload:
//!
//! ```text
//! ┌──────┬──────────────────────────────────────────┐
//! │ slot │ 0x48 bytes: 24×24 mask, row-major, MSB first │
//! └──────┴──────────────────────────────────────────┘
//!   1 byte                 72 bytes = 576 bits
//! ```
//!
//! Each row of the mask is exactly 3 bytes wide, so bit `i` of the packed
//! data is pixel `(i % 24, i / 24)`.

/// Width and height of a custom glyph in pixels
pub const GLYPH_SIZE: usize = 24;

/// Number of pixels in a custom glyph mask
pub const MASK_BITS: usize = GLYPH_SIZE * GLYPH_SIZE;

/// Packed mask length in bytes (0x48)
pub const MASK_BYTES: usize = MASK_BITS / 8;

/// Full RegisterFont payload length: slot byte + packed mask (0x49)
pub const REGISTER_FONT_LEN: usize = 1 + MASK_BYTES;

/// Slots addressable by the one-byte slot index
pub const MAX_SLOTS: usize = 256;

/// A 24×24 monochrome glyph mask, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphMask {
    bits: Vec<bool>,
}

impl Default for GlyphMask {
    fn default() -> Self {
        Self {
            bits: vec![false; MASK_BITS],
        }
    }
}

impl GlyphMask {
    /// Unpack 72 bytes MSB-first into a mask.
    ///
    /// Returns `None` unless `packed` is exactly [`MASK_BYTES`] long.
    pub fn unpack(packed: &[u8]) -> Option<Self> {
        if packed.len() != MASK_BYTES {
            return None;
        }
        let bits = packed
            .iter()
            .flat_map(|&byte| (0..8).rev().map(move |bit| (byte >> bit) & 1 == 1))
            .collect();
        Some(Self { bits })
    }

    /// Pack the mask back into 72 bytes, MSB first.
    pub fn pack(&self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .fold(0u8, |acc, &on| (acc << 1) | u8::from(on))
            })
            .collect()
    }

    /// Pixel at `(x, y)`. Out-of-range coordinates read as off.
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= GLYPH_SIZE || y >= GLYPH_SIZE {
            return false;
        }
        self.bits[y * GLYPH_SIZE + x]
    }

    /// Set pixel `(x, y)`. Out-of-range coordinates are ignored.
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if x < GLYPH_SIZE && y < GLYPH_SIZE {
            self.bits[y * GLYPH_SIZE + x] = on;
        }
    }

    /// All 576 bits, row-major.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of pixels that are on.
    pub fn count_on(&self) -> usize {
        self.bits.iter().filter(|&&on| on).count()
    }

    /// Parse a text pattern: 24 lines of 24 cells, `#` (or `X`, `1`) for
    /// ink, anything else for blank. Short lines are padded with blank.
    ///
    /// Returns `None` if there are more than 24 lines or any line is wider
    /// than 24 cells.
    pub fn from_pattern(pattern: &str) -> Option<Self> {
        let mut mask = Self::default();
        let lines: Vec<&str> = pattern.lines().collect();
        if lines.len() > GLYPH_SIZE {
            return None;
        }
        for (y, line) in lines.iter().enumerate() {
            let cells: Vec<char> = line.chars().collect();
            if cells.len() > GLYPH_SIZE {
                return None;
            }
            for (x, c) in cells.into_iter().enumerate() {
                mask.set(x, y, matches!(c, '#' | 'X' | '1'));
            }
        }
        Some(mask)
    }
}

/// A parsed RegisterFont payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphUpload {
    /// Raw slot byte, not yet range-checked against the device
    pub slot: u8,
    pub mask: GlyphMask,
}

/// Parse a RegisterFont payload.
///
/// Returns `None` unless the payload is exactly [`REGISTER_FONT_LEN`] bytes.
pub fn parse_register_font(payload: &[u8]) -> Option<GlyphUpload> {
    if payload.len() != REGISTER_FONT_LEN {
        return None;
    }
    let mask = GlyphMask::unpack(&payload[1..])?;
    Some(GlyphUpload {
        slot: payload[0],
        mask,
    })
}

/// # Register Font
///
/// Builds a RegisterFont payload for `slot`.
///
/// ## Example
///
/// ```
/// use cardprint::protocol::glyph::{self, GlyphMask};
///
/// let payload = glyph::register_font(3, &GlyphMask::default());
/// assert_eq!(payload.len(), 0x49);
/// assert_eq!(payload[0], 3);
/// ```
pub fn register_font(slot: u8, mask: &GlyphMask) -> Vec<u8> {
    let mut out = Vec::with_capacity(REGISTER_FONT_LEN);
    out.push(slot);
    out.extend(mask.pack());
    out
}
