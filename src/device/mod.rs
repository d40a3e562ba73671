//! # Emulated Device
//!
//! The stateful side of the printer: configuration, custom glyph memory
//! and the print engine that drains queued lines onto a card.
//!
//! - [`config`]: layout constants and card stock
//! - [`registry`]: custom glyph slots (RegisterFont)
//! - [`engine`]: pending-line queue and render passes (QueuePrintLine)

pub mod config;
pub mod engine;
pub mod registry;

pub use config::DeviceConfig;
pub use engine::{PendingLine, PrintEngine};
pub use registry::{CustomGlyph, GlyphRegistry};
