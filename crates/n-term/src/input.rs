// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key, mouse and paste events. It understands what
// `terminal.rs` enables:
//
// - Legacy CSI keys (arrows, editing keys, F1–F12) with xterm modifiers
// - SS3 keys (arrows and F1–F4 in application mode)
// - SGR mouse reports (press, release, drag, wheel)
// - Bracketed paste
// - Alt+key (ESC prefix) and control bytes
// - UTF-8 multi-byte characters
//
// Escape sequences can be split across reads, so the parser keeps the
// unconsumed tail and resumes on the next `advance`. A lone ESC stays pending
// until the caller decides no more bytes are coming and calls `flush`.

use bitflags::bitflags;

use crate::terminal::Size;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Text delivered between bracketed-paste delimiters.
    Paste(String),
    /// The terminal was resized. Produced by the event source, never by the
    /// byte parser.
    Resize(Size),
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

/// Which key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character. Control bytes arrive as the letter plus `CTRL`.
    Char(char),
    Enter,
    Tab,
    /// Shift+Tab (`CSI Z`).
    BackTab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F12.
    F(u8),
}

bitflags! {
    /// Modifier keys, in xterm's encoding (`param = 1 + bits`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b001;
        const ALT   = 0b010;
        const CTRL  = 0b100;
    }
}

/// A mouse report. Coordinates are 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Press(MouseButton),
    /// SGR reports which button went up, but terminals disagree on it.
    Release,
    /// Motion with a button held.
    Drag(MouseButton),
    /// Motion with no button held.
    Move,
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

// ─── Parser ─────────────────────────────────────────────────────────────────

const PASTE_START: &[u8] = b"\x1b[200~";
const PASTE_END: &[u8] = b"\x1b[201~";

/// Incremental byte-to-event parser.
pub struct Parser {
    buf: Vec<u8>,
    in_paste: bool,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
            in_paste: false,
        }
    }

    /// Feed bytes and return every complete event. Incomplete sequences are
    /// kept for the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            let rest = &self.buf[pos..];

            if self.in_paste {
                let Some(end) = find_subsequence(rest, PASTE_END) else {
                    break;
                };
                events.push(Event::Paste(String::from_utf8_lossy(&rest[..end]).into_owned()));
                pos += end + PASTE_END.len();
                self.in_paste = false;
                continue;
            }

            if rest.starts_with(PASTE_START) {
                self.in_paste = true;
                pos += PASTE_START.len();
                continue;
            }

            match parse_event(rest) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Skip(consumed) => pos += consumed,
                Parsed::Incomplete => break,
            }
        }

        self.buf.drain(..pos);
        events
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty() && !self.in_paste
    }

    /// Give up on waiting: a pending ESC becomes the Escape key and any other
    /// printable leftovers become characters.
    pub fn flush(&mut self) -> Vec<Event> {
        if self.in_paste {
            return Vec::new();
        }
        let events = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(press(KeyCode::Escape)),
                0x20..=0x7E => Some(press(KeyCode::Char(char::from(byte)))),
                _ => None,
            })
            .collect();
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Sequence Parsing ───────────────────────────────────────────────────────
//
// Pure functions over `&[u8]`: each reports what it found and how many bytes
// it used.

enum Parsed {
    Event(Event, usize),
    Incomplete,
    Skip(usize),
}

fn parse_event(buf: &[u8]) -> Parsed {
    match buf[0] {
        0x1B => parse_escape(buf),
        0x0D | 0x0A => Parsed::Event(press(KeyCode::Enter), 1),
        0x09 => Parsed::Event(press(KeyCode::Tab), 1),
        0x08 | 0x7F => Parsed::Event(press(KeyCode::Backspace), 1),
        0x00 => Parsed::Event(key_with(KeyCode::Char(' '), Modifiers::CTRL), 1),
        b @ 0x01..=0x1A => Parsed::Event(key_with(ctrl_letter(b), Modifiers::CTRL), 1),
        b @ 0x1C..=0x1F => Parsed::Event(
            key_with(KeyCode::Char(char::from(b + 0x40)), Modifiers::CTRL),
            1,
        ),
        b @ 0x20..=0x7E => Parsed::Event(press(KeyCode::Char(char::from(b))), 1),
        _ => parse_utf8(buf),
    }
}

// ── ESC prefix ──────────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&next) = buf.get(1) else {
        return Parsed::Incomplete;
    };
    match next {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Event(key_with(KeyCode::Escape, Modifiers::ALT), 2),
        0x7F => Parsed::Event(key_with(KeyCode::Backspace, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Parsed::Event(
            key_with(KeyCode::Char(char::from(b)), Modifiers::ALT),
            2,
        ),
        b @ 0x01..=0x1A => Parsed::Event(
            key_with(ctrl_letter(b), Modifiers::ALT | Modifiers::CTRL),
            2,
        ),
        _ => Parsed::Event(press(KeyCode::Escape), 1),
    }
}

// ── CSI ─────────────────────────────────────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    if buf.len() < 3 {
        return Parsed::Incomplete;
    }
    if buf[2] == b'<' {
        return parse_sgr_mouse(buf);
    }

    // Parameter bytes 0x30–0x3F, intermediates 0x20–0x2F, final 0x40–0x7E.
    let Some(offset) = buf[2..].iter().position(|b| (0x40..=0x7E).contains(b)) else {
        return if buf[2..].iter().all(|b| (0x20..=0x3F).contains(b)) {
            Parsed::Incomplete
        } else {
            Parsed::Skip(buf.len())
        };
    };
    let end = 2 + offset;
    let params = parse_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = match buf[end] {
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            n @ 11..=15 => function_key(n - 10),
            n @ 17..=21 => function_key(n - 11),
            n @ 23..=24 => function_key(n - 12),
            _ => return Parsed::Skip(consumed),
        },
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'Z' => KeyCode::BackTab,
        // Focus reports and anything else we never asked for.
        _ => return Parsed::Skip(consumed),
    };
    Parsed::Event(key_with(code, modifiers), consumed)
}

// ── SS3 ─────────────────────────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&final_byte) = buf.get(2) else {
        return Parsed::Incomplete;
    };
    let code = match final_byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };
    Parsed::Event(press(code), 3)
}

// ── SGR mouse: ESC [ < Cb ; Cx ; Cy (M | m) ─────────────────────────────────

fn parse_sgr_mouse(buf: &[u8]) -> Parsed {
    let body = &buf[3..];
    let Some(end) = body.iter().position(|&b| b == b'M' || b == b'm') else {
        return if body.iter().all(|b| b.is_ascii_digit() || *b == b';') {
            Parsed::Incomplete
        } else {
            Parsed::Skip(buf.len())
        };
    };
    let consumed = 3 + end + 1;
    let params = &body[..end];
    if !params.iter().all(|b| b.is_ascii_digit() || *b == b';') {
        return Parsed::Skip(consumed);
    }
    let values = parse_params(params);
    let [cb, cx, cy] = [0, 1, 2].map(|i| values.get(i).copied().unwrap_or(0));

    let mut modifiers = Modifiers::empty();
    if cb & 4 != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if cb & 8 != 0 {
        modifiers |= Modifiers::ALT;
    }
    if cb & 16 != 0 {
        modifiers |= Modifiers::CTRL;
    }

    let button = match cb & 3 {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Middle),
        2 => Some(MouseButton::Right),
        _ => None,
    };
    let kind = if cb & 64 != 0 {
        if cb & 1 == 0 {
            MouseEventKind::ScrollUp
        } else {
            MouseEventKind::ScrollDown
        }
    } else if body[end] == b'm' {
        MouseEventKind::Release
    } else if cb & 32 != 0 {
        button.map_or(MouseEventKind::Move, MouseEventKind::Drag)
    } else {
        match button {
            Some(b) => MouseEventKind::Press(b),
            None => MouseEventKind::Release,
        }
    };

    Parsed::Event(
        Event::Mouse(MouseEvent {
            kind,
            x: cx.saturating_sub(1),
            y: cy.saturating_sub(1),
            modifiers,
        }),
        consumed,
    )
}

// ── UTF-8 ───────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };
    if buf.len() < len {
        return Parsed::Incomplete;
    }
    std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| Parsed::Event(press(KeyCode::Char(ch)), len))
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn press(code: KeyCode) -> Event {
    key_with(code, Modifiers::empty())
}

const fn key_with(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent { code, modifiers })
}

/// 0x01..=0x1A → 'a'..='z'.
const fn ctrl_letter(byte: u8) -> KeyCode {
    KeyCode::Char((byte - 1 + b'a') as char)
}

#[allow(clippy::cast_possible_truncation)] // callers pass 1..=12
const fn function_key(n: u16) -> KeyCode {
    KeyCode::F(n as u8)
}

/// Semicolon-separated decimal parameters; empty fields read as 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &d| {
                    acc.saturating_mul(10).saturating_add(u16::from(d - b'0'))
                })
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)] // only the low three bits matter
const fn decode_modifiers(param: u16) -> Modifiers {
    Modifiers::from_bits_truncate(param.saturating_sub(1) as u8)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
