//! # Card Printer Protocol
//!
//! Wire formats accepted by the print engine.
//!
//! ## Module Structure
//!
//! - [`commands`]: print-line header, inline control bytes and builders
//! - [`glyph`]: RegisterFont payloads and the 24×24 custom glyph mask
//! - [`escape`]: code-point-at-a-time parser for inline commands
//!
//! ## Usage Example
//!
//! ```
//! use cardprint::protocol::commands::{self, BufferControl, PrintMode};
//!
//! // "NAME" at double height, then a line feed, then "ID 42"
//! let mut text = Vec::new();
//! text.extend(commands::double_height());
//! text.extend(b"NAME");
//! text.extend(commands::line_feed());
//! text.extend(b"ID 42");
//!
//! let payload = commands::print_line(PrintMode::Now, BufferControl::Clear, &text);
//! assert_eq!(&payload[..3], b"100");
//! ```

pub mod commands;
pub mod escape;
pub mod glyph;
