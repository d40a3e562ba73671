//! # Native Text Decoding
//!
//! The device speaks Shift-JIS. Line text is decoded to code points before
//! the command parser sees it; single-byte controls (CR, DC1, DC4, ESC) and
//! ASCII pass through unchanged.

use crate::error::{CardPrintError, Result};

/// Converts device-native bytes into Unicode text.
pub trait TextDecoder {
    /// Decode `bytes`, failing on malformed input.
    fn decode(&self, bytes: &[u8]) -> Result<String>;
}

/// Shift-JIS decoder backed by `encoding_rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftJis;

impl TextDecoder for ShiftJis {
    fn decode(&self, bytes: &[u8]) -> Result<String> {
        encoding_rs::SHIFT_JIS
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
            .ok_or_else(|| {
                CardPrintError::EncodingError(format!(
                    "malformed Shift-JIS in {} byte line",
                    bytes.len()
                ))
            })
    }
}
