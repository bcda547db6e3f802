//! SGR and erase-in-line interpreter used when text is written to a view.
//!
//! The interpreter is fed one rune at a time. [`EscapeInterpreter::parse_one`]
//! returns `Ok(true)` when the rune belonged to an escape sequence and must
//! not be printed, and `Ok(false)` for ordinary text. When a sequence turns
//! out to be malformed, the error is returned and [`EscapeInterpreter::runes`]
//! gives back everything consumed for it (failing rune included) so the caller
//! can print it literally.
//!
//! Running colors live here and persist across writes until SGR 0 or
//! [`reset`](EscapeInterpreter::reset).

use thiserror::Error;

use crate::attribute::Attribute;

const MAX_TOKEN_DIGITS: usize = 255;
const MAX_TOKENS: usize = 20;

/// Non-color effects of a completed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Instruction {
    #[default]
    None,
    /// `CSI n K`: 0 clears to end of line, 1 to its start, 2 the whole line.
    EraseInLine(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscapeError {
    #[error("not a CSI sequence")]
    NotCsi,
    #[error("expected number or ;")]
    ExpectedParam,
    #[error("escape sequence too long")]
    TooLong,
    #[error("unsupported terminator {0:?}")]
    UnsupportedTerminator(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    None,
    Escape,
    Csi,
    Params,
}

#[derive(Debug, Clone)]
pub struct EscapeInterpreter {
    state: State,
    tokens: Vec<String>,
    consumed: String,
    fg: Attribute,
    bg: Attribute,
    instruction: Instruction,
}

impl Default for EscapeInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl EscapeInterpreter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: State::None,
            tokens: Vec::new(),
            consumed: String::new(),
            fg: Attribute::DEFAULT,
            bg: Attribute::DEFAULT,
            instruction: Instruction::None,
        }
    }

    /// Current foreground: color plus style flags.
    #[must_use]
    pub const fn fg(&self) -> Attribute {
        self.fg
    }

    #[must_use]
    pub const fn bg(&self) -> Attribute {
        self.bg
    }

    /// Whether a sequence is in progress.
    #[must_use]
    pub fn in_sequence(&self) -> bool {
        self.state != State::None
    }

    /// Drop any partial sequence and return to default colors.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The runes consumed by the current (or just failed) sequence.
    #[must_use]
    pub fn runes(&self) -> Vec<char> {
        self.consumed.chars().collect()
    }

    /// Take the instruction produced by the last completed sequence.
    pub fn take_instruction(&mut self) -> Instruction {
        std::mem::take(&mut self.instruction)
    }

    /// Feed one rune.
    ///
    /// # Errors
    ///
    /// Returns an [`EscapeError`] when `ch` cannot continue the sequence in
    /// progress. The parse state is back to `None` afterwards; colors are kept.
    pub fn parse_one(&mut self, ch: char) -> Result<bool, EscapeError> {
        match self.state {
            State::None => {
                if ch != '\x1b' {
                    return Ok(false);
                }
                self.consumed.clear();
                self.consumed.push(ch);
                self.state = State::Escape;
                Ok(true)
            }
            State::Escape => {
                self.consumed.push(ch);
                if ch == '[' {
                    self.state = State::Csi;
                    Ok(true)
                } else {
                    self.fail(EscapeError::NotCsi)
                }
            }
            State::Csi => {
                self.consumed.push(ch);
                match ch {
                    '0'..='9' => {
                        self.tokens = vec![ch.to_string()];
                        self.state = State::Params;
                        Ok(true)
                    }
                    ';' => {
                        self.tokens = vec![String::new(), String::new()];
                        self.state = State::Params;
                        Ok(true)
                    }
                    'm' | 'K' => self.finish(ch),
                    _ => self.fail(EscapeError::ExpectedParam),
                }
            }
            State::Params => {
                self.consumed.push(ch);
                match ch {
                    '0'..='9' => {
                        let Some(token) = self.tokens.last_mut() else {
                            return self.fail(EscapeError::ExpectedParam);
                        };
                        if token.len() >= MAX_TOKEN_DIGITS {
                            return self.fail(EscapeError::TooLong);
                        }
                        token.push(ch);
                        Ok(true)
                    }
                    ';' => {
                        if self.tokens.len() >= MAX_TOKENS {
                            return self.fail(EscapeError::TooLong);
                        }
                        self.tokens.push(String::new());
                        Ok(true)
                    }
                    'm' | 'K' => self.finish(ch),
                    _ => self.fail(EscapeError::UnsupportedTerminator(ch)),
                }
            }
        }
    }

    fn fail(&mut self, err: EscapeError) -> Result<bool, EscapeError> {
        tracing::trace!(%err, sequence = ?self.consumed, "escape sequence rejected");
        self.state = State::None;
        self.tokens.clear();
        Err(err)
    }

    fn finish(&mut self, terminator: char) -> Result<bool, EscapeError> {
        let codes: Vec<Option<u32>> = self
            .tokens
            .iter()
            .map(|t| if t.is_empty() { Some(0) } else { t.parse().ok() })
            .collect();

        if terminator == 'K' {
            let n = codes.first().copied().flatten().unwrap_or(0);
            self.instruction = Instruction::EraseInLine(u16::try_from(n).unwrap_or(u16::MAX));
        } else if codes.is_empty() {
            self.fg = Attribute::DEFAULT;
            self.bg = Attribute::DEFAULT;
        } else {
            self.apply_sgr(&codes);
        }

        self.state = State::None;
        self.tokens.clear();
        self.consumed.clear();
        Ok(true)
    }

    // -- SGR ----------------------------------------------------------------

    fn apply_sgr(&mut self, codes: &[Option<u32>]) {
        let mut i = 0;
        while i < codes.len() {
            let Some(code) = codes[i] else {
                i += 1;
                continue;
            };
            i += 1;
            match code {
                0 => {
                    self.fg = Attribute::DEFAULT;
                    self.bg = Attribute::DEFAULT;
                }
                1 => self.fg |= Attribute::BOLD,
                2 => self.fg |= Attribute::DIM,
                3 => self.fg |= Attribute::ITALIC,
                4 => self.fg |= Attribute::UNDERLINE,
                5 => self.fg |= Attribute::BLINK,
                7 => self.fg |= Attribute::REVERSE,
                9 => self.fg |= Attribute::STRIKETHROUGH,
                22 => self.fg = self.fg.without(Attribute::BOLD | Attribute::DIM),
                23 => self.fg = self.fg.without(Attribute::ITALIC),
                24 => self.fg = self.fg.without(Attribute::UNDERLINE),
                25 => self.fg = self.fg.without(Attribute::BLINK),
                27 => self.fg = self.fg.without(Attribute::REVERSE),
                29 => self.fg = self.fg.without(Attribute::STRIKETHROUGH),
                30..=37 => self.fg = self.fg.with_color(basic(code - 30)),
                90..=97 => self.fg = self.fg.with_color(basic(code - 90 + 8)),
                40..=47 => self.bg = self.bg.with_color(basic(code - 40)),
                100..=107 => self.bg = self.bg.with_color(basic(code - 100 + 8)),
                39 => self.fg = self.fg.with_color(Attribute::DEFAULT),
                49 => self.bg = self.bg.with_color(Attribute::DEFAULT),
                38 | 48 => {
                    let (color, used) = extended_color(&codes[i..]);
                    i += used;
                    if let Some(color) = color {
                        if code == 38 {
                            self.fg = self.fg.with_color(color);
                        } else {
                            self.bg = self.bg.with_color(color);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)] // callers pass 0..16
const fn basic(index: u32) -> Attribute {
    Attribute::indexed(index as u8)
}

/// Parse the arguments after 38/48: `5;n` or `2;r;g;b`. Returns the color and
/// how many codes it used.
fn extended_color(rest: &[Option<u32>]) -> (Option<Attribute>, usize) {
    let byte = |i: usize| rest.get(i).copied().flatten().and_then(|v| u8::try_from(v).ok());
    match rest.first().copied().flatten() {
        Some(5) => (byte(1).map(Attribute::indexed), rest.len().min(2)),
        Some(2) => {
            let color = match (byte(1), byte(2), byte(3)) {
                (Some(r), Some(g), Some(b)) => Some(Attribute::rgb(r, g, b)),
                _ => None,
            };
            (color, rest.len().min(4))
        }
        _ => (None, 0),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
