//! # Cardprint CLI
//!
//! Command-line harness for the card print engine.
//!
//! ## Usage
//!
//! ```bash
//! # Print two lines onto a blank card with the built-in bitmap font
//! cardprint print '110HELLO\r' '110\x11BIG\x14 small\r'
//!
//! # Use a TrueType font and a background image, save to card.png
//! cardprint print --font kochi-gothic-subst.ttf --card 1.png --out card.png '110NAME\r'
//!
//! # Upload a custom glyph, then use it (slot 3)
//! cardprint glyph --slot 3 --out heart.bin heart.txt
//! cardprint print --glyph heart.bin '110g\x03\r'
//! ```
//!
//! Line arguments are raw print-line payloads (header included) with
//! `\xNN`, `\r`, `\n`, `\t` and `\\` escapes.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use cardprint::{
    BitmapRasterizer, CardPrintError, DeviceConfig, GlyphRasterizer, PrintEngine, TtfRasterizer,
    protocol::glyph::{self, GlyphMask},
};

/// Cardprint - Card printer emulator
#[derive(Parser, Debug)]
#[command(name = "cardprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render print-line payloads onto a card image
    Print {
        /// Print-line payloads, header included (escapes: \xNN \r \n \t \\)
        #[arg(required = true)]
        lines: Vec<String>,

        /// TrueType font (defaults to the built-in bitmap font)
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,

        /// Card background image; repeat to pick one at random
        #[arg(long = "card", value_name = "FILE")]
        cards: Vec<PathBuf>,

        /// JSON device config overriding the defaults
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Use the landscape card preset (a config file sets orientation itself)
        #[arg(long, conflicts_with = "config")]
        horizontal: bool,

        /// Raw 73-byte RegisterFont payload to upload first; repeatable
        #[arg(long = "glyph", value_name = "FILE")]
        glyphs: Vec<PathBuf>,

        /// Output PNG (defaults to a timestamped name)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Build a RegisterFont payload from a 24×24 text pattern ('#' = ink)
    Glyph {
        /// Pattern file: up to 24 lines of up to 24 cells
        pattern: PathBuf,

        /// Target slot
        #[arg(long)]
        slot: u8,

        /// Output payload file
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CardPrintError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Print {
            lines,
            font,
            cards,
            config,
            horizontal,
            glyphs,
            out,
        } => {
            let mut device = match &config {
                Some(path) => DeviceConfig::from_json_file(path)?,
                None if horizontal => DeviceConfig::horizontal(),
                None => DeviceConfig::vertical(),
            };
            if !cards.is_empty() {
                device.card_images = cards;
            }

            let rasterizer: Box<dyn GlyphRasterizer> = match &font {
                Some(path) => Box::new(TtfRasterizer::from_file(path)?),
                None => Box::new(BitmapRasterizer),
            };
            let mut engine = PrintEngine::new(device, rasterizer);

            for path in &glyphs {
                let payload = std::fs::read(path)?;
                let slot = engine.register_font(&payload)?;
                println!("Registered glyph slot {} from {}", slot, path.display());
            }

            for line in &lines {
                let payload = unescape(line)?;
                let report = engine.queue_print_line(&payload)?;
                for fault in &report.faults {
                    eprintln!("warning: {}", fault);
                }
            }

            let card = engine
                .eject_card()
                .ok_or_else(|| CardPrintError::Config("nothing was printed".to_string()))?;
            let out = out.unwrap_or_else(default_output);
            save_png(&out, &card)?;
            println!("Saved to {}", out.display());
        }

        Commands::Glyph { pattern, slot, out } => {
            let text = std::fs::read_to_string(&pattern)?;
            let mask = GlyphMask::from_pattern(&text).ok_or_else(|| {
                CardPrintError::Config(format!(
                    "{} is not a 24x24 glyph pattern",
                    pattern.display()
                ))
            })?;
            std::fs::write(&out, glyph::register_font(slot, &mask))?;
            println!(
                "Wrote slot {} glyph ({} pixels on) to {}",
                slot,
                mask.count_on(),
                out.display()
            );
        }
    }

    Ok(())
}

/// Timestamped default output file name
fn default_output() -> PathBuf {
    PathBuf::from(format!(
        "card-{}.png",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ))
}

/// Save the card as PNG
fn save_png(path: &Path, card: &image::RgbaImage) -> Result<(), CardPrintError> {
    card.save(path).map_err(|e| match e {
        image::ImageError::IoError(io) => CardPrintError::Io(io),
        other => CardPrintError::Config(format!("Failed to save PNG: {}", other)),
    })
}

/// Expand `\xNN`, `\r`, `\n`, `\t`, `\0` and `\\` escapes into raw bytes.
/// Literal text is encoded as Shift-JIS.
fn unescape(arg: &str) -> Result<Vec<u8>, CardPrintError> {
    let bad = |what: &str| CardPrintError::Config(format!("bad escape in {:?}: {}", arg, what));
    let mut out = Vec::with_capacity(arg.len());
    let mut chars = arg.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            let (bytes, _, unmappable) = encoding_rs::SHIFT_JIS.encode(c.encode_utf8(&mut buf));
            if unmappable {
                return Err(bad(&format!("{:?} has no Shift-JIS encoding", c)));
            }
            out.extend_from_slice(&bytes);
            continue;
        }
        match chars.next() {
            Some('r') => out.push(b'\r'),
            Some('n') => out.push(b'\n'),
            Some('t') => out.push(b'\t'),
            Some('0') => out.push(0),
            Some('\\') => out.push(b'\\'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                let byte = u8::from_str_radix(&hex, 16).map_err(|_| bad(&format!("\\x{}", hex)))?;
                out.push(byte);
            }
            Some(other) => return Err(bad(&format!("\\{}", other))),
            None => return Err(bad("trailing backslash")),
        }
    }
    Ok(out)
}
