//! # Print-Line Protocol Commands
//!
//! This module implements the print-line half of the card printer's
//! command protocol: the 3-byte print-line header and the inline control
//! bytes embedded in the line text.
//!
//! ## Print-Line Payload
//!
//! ```text
//! ┌──────┬─────────┬──────────┬──────────────────────────────┐
//! │ mode │ control │ reserved │ native text + inline controls │
//! └──────┴─────────┴──────────┴──────────────────────────────┘
//!   '0'=wait  '0'=clear            Shift-JIS
//!   '1'=now   '1'=append
//! ```
//!
//! ## Inline Controls
//!
//! | Byte | Name | Effect |
//! |------|------|--------|
//! | `0x00` | NUL | End of line text |
//! | `0x0D` | CR | Line feed within the current print line |
//! | `0x11` | DC1 | Double height |
//! | `0x14` | DC4 | Reset scale to 1x/1x |
//! | `0x1B` | ESC | Extended sequence (`ESC s v h` sets scale) |
//! | `0x67` | `g` | Next byte selects a custom glyph slot |
//!
//! Builders in this module produce exactly the bytes the interpreter
//! consumes, so tests and tools never hand-assemble payloads.

// ============================================================================
// CONTROL BYTE CONSTANTS
// ============================================================================

/// NUL - Line terminator
///
/// Print-line text ends at the first NUL outside an escape sequence.
pub const NUL: u8 = 0x00;

/// CR (Carriage Return) - Line feed inside a print line
///
/// Advances the cursor to the start of the next text row on the card.
pub const CR: u8 = 0x0D;

/// DC1 - Double height
///
/// Sets the vertical scale to 2x. Horizontal scale is unaffected.
pub const DOUBLE_HEIGHT: u8 = 0x11;

/// DC4 - Reset scale
///
/// Returns both scale factors to 1x. If the vertical scale was enlarged,
/// the taller glyphs already on the line are compensated for before the
/// next glyph or line feed.
pub const RESET_SCALE: u8 = 0x14;

/// ESC (Escape) - Extended sequence prefix
pub const ESC: u8 = 0x1B;

/// `s` - Set scale, valid only after ESC
///
/// `ESC s v h` where `v` and `h` are ASCII digits `'1'..='9'`.
pub const SET_SCALE: u8 = b's';

/// `g` - Use custom glyph
///
/// The following byte is a glyph slot index. The cell is drawn from the
/// glyph registry instead of the font.
pub const USE_CUSTOM_GLYPH: u8 = 0x67;

/// Length of the print-line header (mode, buffer control, reserved)
pub const HEADER_LEN: usize = 3;

// ============================================================================
// HEADER
// ============================================================================

/// Print timing requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintMode {
    /// `'0'`: hold until the host asks for the physical print.
    ///
    /// Parsed and recorded; rendering currently treats it like `Now`.
    Wait,
    /// `'1'`: print immediately
    #[default]
    Now,
}

impl PrintMode {
    /// Wire byte for this mode
    pub fn as_byte(self) -> u8 {
        match self {
            PrintMode::Wait => b'0',
            PrintMode::Now => b'1',
        }
    }

    /// Parse a wire byte. Unknown values yield `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'0' => Some(PrintMode::Wait),
            b'1' => Some(PrintMode::Now),
            _ => None,
        }
    }
}

/// What to do with previously queued lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferControl {
    /// `'0'`: empty the queue before appending
    Clear,
    /// `'1'`: keep queued lines
    #[default]
    Append,
}

impl BufferControl {
    /// Wire byte for this control
    pub fn as_byte(self) -> u8 {
        match self {
            BufferControl::Clear => b'0',
            BufferControl::Append => b'1',
        }
    }

    /// Parse a wire byte. Unknown values yield `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'0' => Some(BufferControl::Clear),
            b'1' => Some(BufferControl::Append),
            _ => None,
        }
    }
}

/// Decoded print-line header plus a borrowed view of the line text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintLineHeader<'a> {
    pub mode: PrintMode,
    pub control: BufferControl,
    /// Native-encoded line text (everything after the header)
    pub text: &'a [u8],
}

impl<'a> PrintLineHeader<'a> {
    /// Split a print-line payload into header fields and line text.
    ///
    /// Returns `None` if the payload is shorter than [`HEADER_LEN`].
    /// Unrecognized mode bytes fall back to `Now`, and anything other than
    /// `'0'` in the control byte appends; the caller decides whether to
    /// complain about them (see [`PrintLineHeader::unknown_bytes`]).
    pub fn parse(payload: &'a [u8]) -> Option<Self> {
        if payload.len() < HEADER_LEN {
            return None;
        }
        Some(Self {
            mode: PrintMode::from_byte(payload[0]).unwrap_or_default(),
            control: BufferControl::from_byte(payload[1]).unwrap_or_default(),
            text: &payload[HEADER_LEN..],
        })
    }

    /// Header bytes that were not recognized, as `(offset, byte)` pairs.
    pub fn unknown_bytes(payload: &[u8]) -> Vec<(usize, u8)> {
        let mut unknown = Vec::new();
        if let Some(&b) = payload.first() {
            if PrintMode::from_byte(b).is_none() {
                unknown.push((0, b));
            }
        }
        if let Some(&b) = payload.get(1) {
            if BufferControl::from_byte(b).is_none() {
                unknown.push((1, b));
            }
        }
        unknown
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

/// # Print Line
///
/// Builds a complete print-line payload: header followed by `text`.
///
/// The reserved byte is sent as `'0'`.
///
/// ## Example
///
/// ```
/// use cardprint::protocol::commands::{self, BufferControl, PrintMode};
///
/// let payload = commands::print_line(PrintMode::Now, BufferControl::Append, b"AB\r");
/// assert_eq!(payload, b"110AB\r");
/// ```
pub fn print_line(mode: PrintMode, control: BufferControl, text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + text.len());
    out.push(mode.as_byte());
    out.push(control.as_byte());
    out.push(b'0');
    out.extend_from_slice(text);
    out
}

/// # Line Feed (CR)
#[inline]
pub fn line_feed() -> Vec<u8> {
    vec![CR]
}

/// # Double Height (DC1)
#[inline]
pub fn double_height() -> Vec<u8> {
    vec![DOUBLE_HEIGHT]
}

/// # Reset Scale (DC4)
#[inline]
pub fn reset_scale() -> Vec<u8> {
    vec![RESET_SCALE]
}

/// # Set Scale (ESC s v h)
///
/// Sets vertical and horizontal scale. Multipliers are sent as single
/// ASCII digits and clamped to `1..=9`.
///
/// ## Protocol Details
///
/// | Format | Bytes |
/// |--------|-------|
/// | ASCII  | ESC s v h |
/// | Hex    | 1B 73 3v 3h |
///
/// ## Example
///
/// ```
/// use cardprint::protocol::commands;
///
/// assert_eq!(commands::set_scale(2, 1), vec![0x1B, b's', b'2', b'1']);
/// ```
pub fn set_scale(vertical: u8, horizontal: u8) -> Vec<u8> {
    let digit = |n: u8| b'0' + n.clamp(1, 9);
    vec![ESC, SET_SCALE, digit(vertical), digit(horizontal)]
}

/// # Use Custom Glyph (g n)
///
/// Draws the glyph registered in `slot` as the next cell.
///
/// Slots at or above 0x80 collide with Shift-JIS lead bytes and will not
/// survive text decoding; keep slot indices in the ASCII range.
#[inline]
pub fn custom_glyph(slot: u8) -> Vec<u8> {
    vec![USE_CUSTOM_GLYPH, slot]
}

// ============================================================================
// TESTS
// ============================================================================
