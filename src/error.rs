//! # Error Types
//!
//! This module defines error types used throughout the cardprint library.
//!
//! Structural errors (`MalformedPayload`, `InvalidSlot`, `EmptyPayload`)
//! abort the offending command with no mutation. `EncodingError` and
//! `ResourceLoadError` abort a render pass. `RasterizationError` and
//! `MissingCustomGlyph` are per-glyph faults: the render pass logs them,
//! records them in its report and keeps going.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cardprint operations
#[derive(Debug, Error)]
pub enum CardPrintError {
    /// Upload payload has the wrong size
    #[error("Malformed payload: expected {expected} bytes, got {actual}")]
    MalformedPayload { expected: usize, actual: usize },

    /// Glyph slot index outside the device's slot range
    #[error("Invalid glyph slot {slot} (device has {slots} slots)")]
    InvalidSlot { slot: u32, slots: usize },

    /// Print-line payload shorter than its header
    #[error("Empty payload: print line needs a 3-byte header, got {len} bytes")]
    EmptyPayload { len: usize },

    /// Native text could not be converted to code points
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// The rasterization backend produced no glyph for a code point
    #[error("Rasterization error: no glyph for {ch:?}")]
    RasterizationError { ch: char },

    /// A custom glyph slot was referenced before being registered
    #[error("Missing custom glyph in slot {slot}")]
    MissingCustomGlyph { slot: u32 },

    /// A font or card image asset could not be loaded
    #[error("Failed to load {what} from {path:?}: {reason}")]
    ResourceLoadError {
        what: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// Invalid device configuration
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, CardPrintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CardPrintError::MalformedPayload {
            expected: 73,
            actual: 10,
        };
        assert_eq!(
            err.to_string(),
            "Malformed payload: expected 73 bytes, got 10"
        );

        let err = CardPrintError::RasterizationError { ch: 'A' };
        assert_eq!(err.to_string(), "Rasterization error: no glyph for 'A'");

        let err = CardPrintError::ResourceLoadError {
            what: "font",
            path: PathBuf::from("kochi.ttf"),
            reason: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to load font from \"kochi.ttf\": not found");
    }
}
