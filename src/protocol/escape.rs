//! # Inline Command Parser
//!
//! Classifies decoded code points into layout [`Command`]s, one code point
//! at a time. Multi-code-point sequences (`ESC s v h`, `g n`) are tracked as
//! an explicit [`ParseState`], so an unfinished sequence at end-of-line is
//! an observable state rather than a dangling index.
//!
//! ```text
//!            ESC            's'              v               h
//!   Idle ──────────▶ AwaitingCommand ──▶ AwaitingVScale ──▶ AwaitingHScale ──▶ Idle (SetScale)
//!     │                    │ other
//!     │                    └──────▶ Idle (ignored)
//!     │   'g'              n
//!     └──────▶ AwaitingSlot ──▶ Idle (CustomGlyph)
//! ```
//!
//! Line buffers are NUL-terminated: a NUL seen in `Idle` ends the line. A
//! NUL right after `g` is a slot index like any other, so slot 0 is
//! reachable inline.

use super::commands::{CR, DOUBLE_HEIGHT, ESC, NUL, RESET_SCALE, SET_SCALE, USE_CUSTOM_GLYPH};

/// A layout command produced by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Move to the next text row
    LineFeed,
    /// Vertical scale to 2x
    DoubleHeight,
    /// Both scales back to 1x
    ResetScale,
    /// Explicit scale from `ESC s v h`
    SetScale { vertical: u8, horizontal: u8 },
    /// Draw the registered glyph in this slot
    CustomGlyph(u32),
    /// Draw a font glyph
    Glyph(char),
}

/// Escape/slot sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    #[default]
    Idle,
    /// Saw ESC, waiting for the command code point
    AwaitingCommand,
    /// Saw `ESC s`, waiting for the vertical digit
    AwaitingVScale,
    /// Saw `ESC s v`, waiting for the horizontal digit
    AwaitingHScale { vertical: char },
    /// Saw `g`, waiting for the slot index
    AwaitingSlot,
}

/// Something the parser swallowed instead of turning into a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// `ESC` followed by something other than `s`
    UnknownEscape(char),
    /// `ESC s` digit outside `'1'..='9'`
    BadScaleDigit(char),
    /// Sequence cut short before it completed
    Abandoned(ParseState),
}

/// Outcome of feeding one code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A complete command
    Command(Command),
    /// Consumed as part of an unfinished sequence
    Pending,
    /// Consumed and dropped
    Ignored(Ignored),
    /// Line terminator; nothing after it belongs to the line
    EndOfLine,
}

/// Code-point-at-a-time parser for the inline command set.
#[derive(Debug, Clone, Default)]
pub struct CommandParser {
    state: ParseState,
}

fn scale_digit(ch: char) -> Option<u8> {
    match ch {
        '1'..='9' => Some(ch as u8 - b'0'),
        _ => None,
    }
}

impl CommandParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current sub-state.
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Feed one code point.
    ///
    /// A line feed or NUL inside an escape sequence abandons the sequence;
    /// the caller sees the abandonment first and must feed the code point
    /// again to act on it (see [`CommandParser::feed_all`]). Slot indices
    /// are arbitrary values, so `g` followed by CR selects slot 13 and `g`
    /// followed by NUL selects slot 0.
    pub fn feed(&mut self, ch: char) -> Step {
        let code = ch as u32;
        match self.state {
            ParseState::Idle => match code {
                c if c == NUL as u32 => Step::EndOfLine,
                c if c == CR as u32 => Step::Command(Command::LineFeed),
                c if c == DOUBLE_HEIGHT as u32 => Step::Command(Command::DoubleHeight),
                c if c == RESET_SCALE as u32 => Step::Command(Command::ResetScale),
                c if c == ESC as u32 => {
                    self.state = ParseState::AwaitingCommand;
                    Step::Pending
                }
                c if c == USE_CUSTOM_GLYPH as u32 => {
                    self.state = ParseState::AwaitingSlot;
                    Step::Pending
                }
                _ => Step::Command(Command::Glyph(ch)),
            },
            ParseState::AwaitingSlot => {
                self.state = ParseState::Idle;
                Step::Command(Command::CustomGlyph(code))
            }
            state if code == CR as u32 || code == NUL as u32 => {
                self.state = ParseState::Idle;
                Step::Ignored(Ignored::Abandoned(state))
            }
            ParseState::AwaitingCommand => {
                if code == SET_SCALE as u32 {
                    self.state = ParseState::AwaitingVScale;
                    Step::Pending
                } else {
                    self.state = ParseState::Idle;
                    Step::Ignored(Ignored::UnknownEscape(ch))
                }
            }
            ParseState::AwaitingVScale => {
                self.state = ParseState::AwaitingHScale { vertical: ch };
                Step::Pending
            }
            ParseState::AwaitingHScale { vertical } => {
                self.state = ParseState::Idle;
                match (scale_digit(vertical), scale_digit(ch)) {
                    (Some(vertical), Some(horizontal)) => Step::Command(Command::SetScale {
                        vertical,
                        horizontal,
                    }),
                    (None, _) => Step::Ignored(Ignored::BadScaleDigit(vertical)),
                    (Some(_), None) => Step::Ignored(Ignored::BadScaleDigit(ch)),
                }
            }
        }
    }

    /// Close out the line. Returns the abandoned state if a sequence was
    /// left unfinished, and resets to `Idle`.
    pub fn finish(&mut self) -> Option<ParseState> {
        let state = std::mem::take(&mut self.state);
        (state != ParseState::Idle).then_some(state)
    }

    /// Parse a whole line, re-feeding code points that abandoned a
    /// sequence. Stops at the first NUL outside a sequence.
    ///
    /// Returns the commands and everything that was dropped along the way.
    pub fn feed_all(&mut self, text: impl IntoIterator<Item = char>) -> (Vec<Command>, Vec<Ignored>) {
        let mut commands = Vec::new();
        let mut ignored = Vec::new();
        for ch in text {
            match self.feed(ch) {
                Step::Command(cmd) => commands.push(cmd),
                Step::Pending => {}
                Step::Ignored(why @ Ignored::Abandoned(_)) => {
                    ignored.push(why);
                    match self.feed(ch) {
                        Step::Command(cmd) => commands.push(cmd),
                        Step::EndOfLine => break,
                        _ => {}
                    }
                }
                Step::Ignored(why) => ignored.push(why),
                Step::EndOfLine => break,
            }
        }
        if let Some(state) = self.finish() {
            ignored.push(Ignored::Abandoned(state));
        }
        (commands, ignored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> (Vec<Command>, Vec<Ignored>) {
        CommandParser::new().feed_all(text.chars())
    }

    #[test]
    fn test_plain_text() {
        let (cmds, ignored) = parse("AB");
        assert_eq!(cmds, vec![Command::Glyph('A'), Command::Glyph('B')]);
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_single_byte_controls() {
        let (cmds, _) = parse("\u{11}A\u{14}\r");
        assert_eq!(
            cmds,
            vec![
                Command::DoubleHeight,
                Command::Glyph('A'),
                Command::ResetScale,
                Command::LineFeed,
            ]
        );
    }

    #[test]
    fn test_set_scale_sequence() {
        let (cmds, ignored) = parse("\u{1b}s21X");
        assert_eq!(
            cmds,
            vec![
                Command::SetScale {
                    vertical: 2,
                    horizontal: 1
                },
                Command::Glyph('X'),
            ]
        );
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_state_walks_through_sequence() {
        let mut parser = CommandParser::new();
        assert_eq!(parser.feed('\u{1b}'), Step::Pending);
        assert_eq!(parser.state(), ParseState::AwaitingCommand);
        assert_eq!(parser.feed('s'), Step::Pending);
        assert_eq!(parser.state(), ParseState::AwaitingVScale);
        assert_eq!(parser.feed('3'), Step::Pending);
        assert_eq!(parser.state(), ParseState::AwaitingHScale { vertical: '3' });
        assert_eq!(
            parser.feed('2'),
            Step::Command(Command::SetScale {
                vertical: 3,
                horizontal: 2
            })
        );
        assert_eq!(parser.state(), ParseState::Idle);
    }

    #[test]
    fn test_unknown_escape_swallows_one() {
        let (cmds, ignored) = parse("\u{1b}QA");
        assert_eq!(cmds, vec![Command::Glyph('A')]);
        assert_eq!(ignored, vec![Ignored::UnknownEscape('Q')]);
    }

    #[test]
    fn test_bad_scale_digit() {
        let (cmds, ignored) = parse("\u{1b}s2xA");
        assert_eq!(cmds, vec![Command::Glyph('A')]);
        assert_eq!(ignored, vec![Ignored::BadScaleDigit('x')]);

        let (cmds, ignored) = parse("\u{1b}s01");
        assert!(cmds.is_empty());
        assert_eq!(ignored, vec![Ignored::BadScaleDigit('0')]);
    }

    #[test]
    fn test_unterminated_escape_at_end_of_line() {
        let (cmds, ignored) = parse("A\u{1b}s2");
        assert_eq!(cmds, vec![Command::Glyph('A')]);
        assert_eq!(
            ignored,
            vec![Ignored::Abandoned(ParseState::AwaitingHScale {
                vertical: '2'
            })]
        );
    }

    #[test]
    fn test_escape_cannot_span_line_feed() {
        let (cmds, ignored) = parse("\u{1b}s\rA");
        assert_eq!(cmds, vec![Command::LineFeed, Command::Glyph('A')]);
        assert_eq!(ignored, vec![Ignored::Abandoned(ParseState::AwaitingVScale)]);
    }

    #[test]
    fn test_custom_glyph_slot() {
        let (cmds, _) = parse("g\u{3}A");
        assert_eq!(cmds, vec![Command::CustomGlyph(3), Command::Glyph('A')]);

        // Slot byte is taken literally, even if it looks like a control
        let (cmds, _) = parse("g\r");
        assert_eq!(cmds, vec![Command::CustomGlyph(13)]);
    }

    #[test]
    fn test_nul_ends_line() {
        let (cmds, ignored) = parse("AB\0CD");
        assert_eq!(cmds, vec![Command::Glyph('A'), Command::Glyph('B')]);
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_nul_after_g_is_slot_zero() {
        let (cmds, ignored) = parse("g\0A\0B");
        assert_eq!(cmds, vec![Command::CustomGlyph(0), Command::Glyph('A')]);
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_nul_inside_escape_ends_line() {
        let (cmds, ignored) = parse("A\u{1b}s\0B");
        assert_eq!(cmds, vec![Command::Glyph('A')]);
        assert_eq!(ignored, vec![Ignored::Abandoned(ParseState::AwaitingVScale)]);
    }

    #[test]
    fn test_finish_resets() {
        let mut parser = CommandParser::new();
        parser.feed('g');
        assert_eq!(parser.finish(), Some(ParseState::AwaitingSlot));
        assert_eq!(parser.finish(), None);
    }
}
