// SPDX-License-Identifier: MIT
//
// Output buffering and stateful cell rendering.
//
//   OutputBuffer — collects a whole frame's bytes so it reaches the terminal
//   in one write() call.
//
//   CellWriter — remembers where the terminal cursor is and which colors and
//   attributes are active, and emits only the escapes needed to move from
//   that state to the next cell's.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Attr, Cell, Style};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// In-memory byte sink for one frame of ANSI output.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a codepoint as UTF-8; invalid codepoints become `?`.
    pub fn write_codepoint(&mut self, cp: u32) {
        match char::from_u32(cp).filter(|&ch| ch != '\0') {
            Some(ch) => {
                let mut enc = [0u8; 4];
                self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
            }
            None => self.buf.push(b'?'),
        }
    }

    /// Drop the contents, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write everything to stdout and empty the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.flush_to(&mut lock)
    }

    /// Write everything to `w` and empty the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        w.write_all(&self.buf)?;
        w.flush()?;
        self.buf.clear();
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Emits cells with the fewest escapes the tracked terminal state allows.
///
/// - The cursor move is skipped when the cell directly follows the last one.
/// - An attribute change resets SGR (only when attributes were active) and
///   forgets the tracked colors, so they are re-sent.
/// - A continuation cell right after its wide glyph produces no output.
pub struct CellWriter {
    cursor: Option<(u16, u16)>,
    style: Option<Style>,
}

impl CellWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cursor: None,
            style: None,
        }
    }

    /// Forget all tracked state (after a reset or clear).
    pub const fn reset_state(&mut self) {
        self.cursor = None;
        self.style = None;
    }

    /// Render one cell at `(x, y)`.
    pub fn render_cell(&mut self, out: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        let follows = self
            .cursor
            .is_some_and(|(cx, cy)| cy == y && x > 0 && cx == x - 1);

        if cell.is_continuation() && follows {
            self.cursor = Some((x, y));
            return;
        }

        if !follows {
            ansi::cursor_to(out, x, y).ok();
        }
        self.apply_style(out, cell.style());

        if cell.is_continuation() {
            out.buf.push(b' ');
        } else {
            out.write_codepoint(cell.ch);
        }
        self.cursor = Some((x, y));
    }

    fn apply_style(&mut self, out: &mut OutputBuffer, next: Style) {
        let mut current = self.style.unwrap_or(Style {
            attrs: Attr::empty(),
            ..next
        });
        let mut fresh = self.style.is_none();

        if current.attrs != next.attrs {
            if !current.attrs.is_empty() {
                ansi::reset(out).ok();
                fresh = true;
            }
            ansi::attrs(out, next.attrs).ok();
            current.attrs = next.attrs;
        }
        if fresh || current.fg != next.fg {
            ansi::fg(out, next.fg).ok();
        }
        if fresh || current.bg != next.bg {
            ansi::bg(out, next.bg).ok();
        }
        self.style = Some(next);
    }
}

impl Default for CellWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
