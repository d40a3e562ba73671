//! # Device Configuration
//!
//! Layout constants and card stock for the print engine.
//!
//! ## Card Orientations
//!
//! | Preset | Top margin | Line gap | Blank stock |
//! |--------|------------|----------|-------------|
//! | vertical (default) | 120 | 4 | 640×1012 |
//! | horizontal | 85 | 0 | 1012×640 |
//!
//! Both presets print with a 95-pixel left margin at a 36-point base font
//! size, in the device's blue-grey ink.
//!
//! ## Usage
//!
//! ```
//! use cardprint::device::DeviceConfig;
//!
//! let config = DeviceConfig::default();
//! assert_eq!(config.left_margin, 95);
//! assert_eq!(config.top_margin, 120);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CardPrintError, Result};
use crate::protocol::glyph::MAX_SLOTS;

/// Ink color shared by font glyphs and custom glyphs (RGBA)
pub const INK: [u8; 4] = [0x64, 0x64, 0x96, 0xFF];

/// Print engine configuration.
///
/// Deserializing fills omitted fields from the vertical preset, so a
/// config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// X position every text row starts at
    pub left_margin: i32,
    /// Y position of the first text row on a fresh card
    pub top_margin: i32,
    /// Base font size in points (1x scale)
    pub font_size: f32,
    /// Extra pixels added below every line feed
    pub line_gap: i32,
    /// Ink color (RGBA)
    pub ink: [u8; 4],
    /// Number of custom glyph slots (valid indices are `0..glyph_slots`)
    pub glyph_slots: usize,
    /// Blank card width, used when no background image is configured
    pub card_width: u32,
    /// Blank card height, used when no background image is configured
    pub card_height: u32,
    /// Background images; one is picked at random for each new card
    pub card_images: Vec<PathBuf>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::vertical()
    }
}

impl DeviceConfig {
    /// Portrait card: text starts lower and lines are spaced 4 pixels apart.
    pub fn vertical() -> Self {
        Self {
            left_margin: 95,
            top_margin: 120,
            font_size: 36.0,
            line_gap: 4,
            ink: INK,
            glyph_slots: 64,
            card_width: 640,
            card_height: 1012,
            card_images: Vec::new(),
        }
    }

    /// Landscape card: text starts higher and lines are packed.
    pub fn horizontal() -> Self {
        Self {
            top_margin: 85,
            line_gap: 0,
            card_width: 1012,
            card_height: 640,
            ..Self::vertical()
        }
    }

    /// Load a JSON config file. Omitted fields take their vertical defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a JSON config. Omitted fields take their vertical defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| CardPrintError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the layout engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(CardPrintError::Config(format!(
                "font_size must be positive, got {}",
                self.font_size
            )));
        }
        if self.glyph_slots > MAX_SLOTS {
            return Err(CardPrintError::Config(format!(
                "glyph_slots must be at most {}, got {}",
                MAX_SLOTS, self.glyph_slots
            )));
        }
        if self.card_width == 0 || self.card_height == 0 {
            return Err(CardPrintError::Config(format!(
                "card stock must be non-empty, got {}x{}",
                self.card_width, self.card_height
            )));
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
