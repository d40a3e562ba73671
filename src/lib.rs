//! # Cardprint - Card Printer Emulation
//!
//! Cardprint emulates the print engine of a card-personalization device.
//! It accepts print jobs in the device's byte protocol and renders the
//! resulting text and graphics onto a card image. It provides:
//!
//! - **Protocol implementation**: print-line header, inline scale and glyph
//!   controls, custom glyph uploads, and builders for all of them
//! - **Glyph registry**: 24×24 host-uploaded glyphs kept in device memory
//! - **Layout**: cursor, scale and line-height tracking across a card
//! - **Rendering backends**: TrueType fonts (ab_glyph) or the built-in
//!   Spleen bitmap font
//!
//! ## Quick Start
//!
//! ```
//! use cardprint::{
//!     device::{DeviceConfig, PrintEngine},
//!     protocol::commands::{self, BufferControl, PrintMode},
//!     protocol::glyph::{self, GlyphMask},
//!     render::BitmapRasterizer,
//! };
//!
//! let mut engine = PrintEngine::new(DeviceConfig::default(), Box::new(BitmapRasterizer));
//!
//! // Upload a custom glyph into slot 3
//! let mut mask = GlyphMask::default();
//! mask.set(0, 0, true);
//! engine.register_font(&glyph::register_font(3, &mask))?;
//!
//! // Print "AB", the custom glyph, then a line feed
//! let mut text = b"AB".to_vec();
//! text.extend(commands::custom_glyph(3));
//! text.extend(commands::line_feed());
//! let report = engine.queue_print_line(&commands::print_line(
//!     PrintMode::Now,
//!     BufferControl::Clear,
//!     &text,
//! ))?;
//! assert_eq!(report.glyphs_drawn(), 3);
//!
//! let card = engine.eject_card().expect("card was printed");
//! assert_eq!(card.dimensions(), (640, 1012));
//! # Ok::<(), cardprint::error::CardPrintError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | Wire formats and command builders |
//! | [`device`] | Print engine, glyph registry, configuration |
//! | [`render`] | Glyph backends, scaling, compositing, layout |
//! | [`encoding`] | Shift-JIS text decoding |
//! | [`error`] | Error types |

pub mod device;
pub mod encoding;
pub mod error;
pub mod protocol;
pub mod render;

// Re-exports for convenience
pub use device::{DeviceConfig, GlyphRegistry, PrintEngine};
pub use error::CardPrintError;
pub use render::{BitmapRasterizer, GlyphRasterizer, RenderReport, TtfRasterizer};
