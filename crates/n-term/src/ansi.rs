// SPDX-License-Identifier: MIT
//
// ANSI escape sequence encoding.
//
// Stateless writers for every control sequence the backend emits. They write
// into any `impl Write` (in practice the frame's `OutputBuffer`) and never
// decide *when* something should be sent; the `CellWriter` tracks terminal
// state for that.
//
// Coordinates are 0-indexed here and converted to the terminal's 1-indexed
// convention on the way out.
use std::io::{self, Write};

use crate::cell::Attr;
use crate::color::CellColor;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// CUP: move the cursor to column `x`, row `y`.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// DECTCEM reset.
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// DECTCEM set.
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// ED 2: erase the whole screen.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// SGR 0. Callers tracking colors must forget them afterwards.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// Select the foreground color.
///
/// Palette entries below 16 use the short 30–37 / 90–97 forms, which every
/// terminal understands.
pub fn fg(w: &mut impl Write, color: CellColor) -> io::Result<()> {
    sgr_color(w, color, 30, 90, 38)
}

/// Select the background color.
pub fn bg(w: &mut impl Write, color: CellColor) -> io::Result<()> {
    sgr_color(w, color, 40, 100, 48)
}

fn sgr_color(
    w: &mut impl Write,
    color: CellColor,
    base: u16,
    bright_base: u16,
    extended: u16,
) -> io::Result<()> {
    match color {
        CellColor::Default => write!(w, "\x1b[{}m", base + 9),
        CellColor::Ansi256(idx @ 0..=7) => write!(w, "\x1b[{}m", base + u16::from(idx)),
        CellColor::Ansi256(idx @ 8..=15) => {
            write!(w, "\x1b[{}m", bright_base + u16::from(idx - 8))
        }
        CellColor::Ansi256(idx) => write!(w, "\x1b[{extended};5;{idx}m"),
        CellColor::Rgb(r, g, b) => write!(w, "\x1b[{extended};2;{r};{g};{b}m"),
    }
}

// ─── Attributes ──────────────────────────────────────────────────────────────

/// SGR codes for each attribute flag, in emission order.
const ATTR_CODES: [(Attr, &str); 7] = [
    (Attr::BOLD, "1"),
    (Attr::DIM, "2"),
    (Attr::ITALIC, "3"),
    (Attr::UNDERLINE, "4"),
    (Attr::BLINK, "5"),
    (Attr::REVERSE, "7"),
    (Attr::STRIKETHROUGH, "9"),
];

/// Emit all set attributes in a single SGR sequence. Writes nothing for an
/// empty set.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }
    let codes: Vec<&str> = ATTR_CODES
        .iter()
        .filter(|(flag, _)| attr.contains(*flag))
        .map(|(_, code)| *code)
        .collect();
    write!(w, "\x1b[{}m", codes.join(";"))
}

// ─── Modes ───────────────────────────────────────────────────────────────────

/// DEC 2026: hold output until [`end_sync`] so frames appear atomically.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

/// DEC 1049: switch to the alternate screen, preserving the shell's.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

/// DEC 2004: pasted text arrives between `ESC[200~` and `ESC[201~`.
#[inline]
pub fn enable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004h")
}

#[inline]
pub fn disable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004l")
}

/// Enable SGR mouse reporting (DEC 1006) for clicks, wheel and drags
/// (DEC 1000 + 1002).
pub fn enable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1000h\x1b[?1002h\x1b[?1006h")
}

/// Disable every mouse tracking mode.
pub fn disable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1006l\x1b[?1003l\x1b[?1002l\x1b[?1000l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn emit<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    #[test]
    fn cursor_to_is_one_based() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(emit(|w| cursor_to(w, 10, 20)), "\x1b[21;11H");
    }

    #[test]
    fn cursor_to_does_not_overflow() {
        assert_eq!(emit(|w| cursor_to(w, u16::MAX, 0)), "\x1b[1;65536H");
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(emit(|w| cursor_hide(w)), "\x1b[?25l");
        assert_eq!(emit(|w| cursor_show(w)), "\x1b[?25h");
    }

    // ── Colors ──────────────────────────────────────────────────────────

    #[test]
    fn default_colors() {
        assert_eq!(emit(|w| fg(w, CellColor::Default)), "\x1b[39m");
        assert_eq!(emit(|w| bg(w, CellColor::Default)), "\x1b[49m");
    }

    #[test]
    fn base_palette_uses_short_forms() {
        assert_eq!(emit(|w| fg(w, CellColor::Ansi256(1))), "\x1b[31m");
        assert_eq!(emit(|w| fg(w, CellColor::Ansi256(9))), "\x1b[91m");
        assert_eq!(emit(|w| bg(w, CellColor::Ansi256(4))), "\x1b[44m");
        assert_eq!(emit(|w| bg(w, CellColor::Ansi256(15))), "\x1b[107m");
    }

    #[test]
    fn extended_palette_and_rgb() {
        assert_eq!(emit(|w| fg(w, CellColor::Ansi256(208))), "\x1b[38;5;208m");
        assert_eq!(emit(|w| bg(w, CellColor::Ansi256(16))), "\x1b[48;5;16m");
        assert_eq!(emit(|w| fg(w, CellColor::Rgb(1, 2, 3))), "\x1b[38;2;1;2;3m");
        assert_eq!(emit(|w| bg(w, CellColor::Rgb(255, 0, 0))), "\x1b[48;2;255;0;0m");
    }

    // ── Attributes ──────────────────────────────────────────────────────

    #[test]
    fn empty_attrs_write_nothing() {
        assert_eq!(emit(|w| attrs(w, Attr::empty())), "");
    }

    #[test]
    fn attrs_are_joined_in_one_sequence() {
        assert_eq!(emit(|w| attrs(w, Attr::BOLD)), "\x1b[1m");
        assert_eq!(
            emit(|w| attrs(w, Attr::UNDERLINE | Attr::BOLD | Attr::REVERSE)),
            "\x1b[1;4;7m"
        );
    }

    // ── Modes ───────────────────────────────────────────────────────────

    #[test]
    fn mode_switches() {
        assert_eq!(emit(|w| begin_sync(w)), "\x1b[?2026h");
        assert_eq!(emit(|w| end_sync(w)), "\x1b[?2026l");
        assert_eq!(emit(|w| enter_alt_screen(w)), "\x1b[?1049h");
        assert_eq!(emit(|w| exit_alt_screen(w)), "\x1b[?1049l");
        assert_eq!(emit(|w| enable_bracketed_paste(w)), "\x1b[?2004h");
        assert_eq!(emit(|w| disable_bracketed_paste(w)), "\x1b[?2004l");
    }

    #[test]
    fn mouse_modes() {
        assert_eq!(emit(|w| enable_mouse(w)), "\x1b[?1000h\x1b[?1002h\x1b[?1006h");
        assert!(emit(|w| disable_mouse(w)).contains("\x1b[?1000l"));
    }
}
