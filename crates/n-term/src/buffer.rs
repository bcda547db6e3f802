// SPDX-License-Identifier: MIT
//
// FrameBuffer — the 2D cell grid a frame is composited into.
//
// n-gui paints frames, titles and view content into one of these; the diff
// renderer compares it with the previous frame and emits only the changes.
//
//   - Flat `Vec<Cell>`, row-major, so a row is one contiguous slice and the
//     renderer's left-to-right scan is linear.
//
//   - `put_char` is the one paint primitive. It owns wide-character
//     bookkeeping: a two-column glyph writes a continuation cell at x + 1,
//     and overwriting either half of an existing wide glyph blanks the other
//     half so no orphaned continuation survives.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, Style};
use crate::color::CellColor;

// ─── FrameBuffer ────────────────────────────────────────────────────────────────

/// A grid of terminal cells.
///
/// ```
/// use n_term::buffer::FrameBuffer;
/// use n_term::cell::Style;
///
/// let mut buf = FrameBuffer::new(10, 2);
/// buf.put_char(0, 0, '中', Style::DEFAULT);
/// assert_eq!(buf.row_text(0), "中        ");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// The raw cells, row-major.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One row as a slice, or `None` past the last row.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// The characters of row `y` as a string. Continuation cells are
    /// skipped, so a wide glyph contributes one `char`.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|row| row.iter().filter_map(|c| c.character()).collect())
            .unwrap_or_default()
    }

    // ─── Clear & Resize ──────────────────────────────────────────────────

    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Fill every cell with a space on `bg`.
    pub fn clear_with_bg(&mut self, bg: CellColor) {
        self.cells.fill(Cell::EMPTY.with_bg(bg));
    }

    /// Change dimensions. All content is discarded.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Copy all cells from a buffer of identical dimensions, reusing this
    /// buffer's allocation. Mismatched sizes fall back to a full clone.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
        } else {
            self.clone_from(other);
        }
    }

    // ─── Painting ────────────────────────────────────────────────────────

    /// Write a cell verbatim. Returns `false` when out of bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Paint `ch` at `(x, y)` and return the number of columns consumed.
    ///
    /// Zero-width characters consume nothing. A wide character that would
    /// straddle the right edge is replaced by a space.
    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: Style) -> u16 {
        if !self.in_bounds(x, y) {
            return 0;
        }
        let width = char_width(ch);
        if width == 0 {
            return 0;
        }

        self.break_wide_char_at(x, y);

        if width == 2 {
            if x + 1 >= self.width {
                let idx = self.index(x, y);
                self.cells[idx] = Cell::styled(' ', style);
                return 1;
            }
            self.break_wide_char_at(x + 1, y);
            let idx = self.index(x, y);
            self.cells[idx] = Cell::styled(ch, style);
            self.cells[idx + 1] = Cell::continuation(style);
            return 2;
        }

        let idx = self.index(x, y);
        self.cells[idx] = Cell::styled(ch, style);
        1
    }

    /// Blank the other half of any wide character touching `(x, y)`.
    fn break_wide_char_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);
        if self.cells[idx].is_continuation() && x > 0 {
            self.cells[idx - 1].ch = u32::from(b' ');
        }
        if x + 1 < self.width && self.cells[idx + 1].is_continuation() {
            self.cells[idx + 1].ch = u32::from(b' ');
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Text Width ─────────────────────────────────────────────────────────────────

/// Display width of a character in columns: 0 for control and combining
/// characters, 2 for wide characters, 1 otherwise.
///
/// ```
/// use n_term::buffer::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('中'), 2);
/// assert_eq!(char_width('\x1b'), 0);
/// ```
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Display width of a string in columns.
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

// ─── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Attr;
    use pretty_assertions::assert_eq;

    fn red() -> Style {
        Style::new(CellColor::Ansi256(1), CellColor::Default, Attr::empty())
    }

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn new_buffer_is_blank() {
        let buf = FrameBuffer::new(4, 2);
        assert_eq!(buf.cells().len(), 8);
        assert!(buf.cells().iter().all(|c| *c == Cell::EMPTY));
    }

    #[test]
    fn out_of_bounds_access_is_none() {
        let mut buf = FrameBuffer::new(4, 2);
        assert!(buf.get(4, 0).is_none());
        assert!(buf.get_mut(0, 2).is_none());
        assert!(buf.row(2).is_none());
        assert!(!buf.set(9, 9, Cell::new('x')));
    }

    // ── Painting ────────────────────────────────────────────────────────

    #[test]
    fn put_char_writes_styled_cell() {
        let mut buf = FrameBuffer::new(4, 1);
        assert_eq!(buf.put_char(1, 0, 'x', red()), 1);
        assert_eq!(buf.get(1, 0).unwrap().fg, CellColor::Ansi256(1));
        assert_eq!(buf.row_text(0), " x  ");
    }

    #[test]
    fn wide_char_writes_continuation() {
        let mut buf = FrameBuffer::new(4, 1);
        assert_eq!(buf.put_char(0, 0, '日', red()), 2);
        assert!(buf.get(1, 0).unwrap().is_continuation());
        assert_eq!(buf.get(1, 0).unwrap().fg, CellColor::Ansi256(1));
    }

    #[test]
    fn wide_char_at_right_edge_becomes_space() {
        let mut buf = FrameBuffer::new(3, 1);
        assert_eq!(buf.put_char(2, 0, '日', red()), 1);
        assert_eq!(buf.row_text(0), "   ");
    }

    #[test]
    fn overwriting_half_of_wide_char_blanks_the_other_half() {
        let mut buf = FrameBuffer::new(4, 1);
        buf.put_char(0, 0, '日', Style::DEFAULT);
        buf.put_char(1, 0, 'x', Style::DEFAULT);
        assert_eq!(buf.row_text(0), " x  ");

        buf.put_char(2, 0, '日', Style::DEFAULT);
        buf.put_char(2, 0, 'y', Style::DEFAULT);
        assert_eq!(buf.row_text(0), " xy ");
    }

    #[test]
    fn zero_width_consumes_nothing() {
        let mut buf = FrameBuffer::new(2, 1);
        assert_eq!(buf.put_char(0, 0, '\u{301}', Style::DEFAULT), 0);
        assert_eq!(buf.row_text(0), "  ");
    }

    // ── Clear / Resize / Copy ───────────────────────────────────────────

    #[test]
    fn clear_with_bg_fills_background() {
        let mut buf = FrameBuffer::new(2, 2);
        buf.put_char(0, 0, 'x', red());
        buf.clear_with_bg(CellColor::Ansi256(4));
        assert!(buf.cells().iter().all(|c| c.ch == u32::from(b' ')));
        assert!(buf.cells().iter().all(|c| c.bg == CellColor::Ansi256(4)));
    }

    #[test]
    fn resize_discards_content() {
        let mut buf = FrameBuffer::new(2, 2);
        buf.put_char(0, 0, 'x', Style::DEFAULT);
        buf.resize(3, 1);
        assert_eq!((buf.width(), buf.height()), (3, 1));
        assert_eq!(buf.row_text(0), "   ");
    }

    #[test]
    fn copy_from_matches_source() {
        let mut src = FrameBuffer::new(3, 1);
        src.put_char(0, 0, 'a', Style::DEFAULT);
        let mut dst = FrameBuffer::new(3, 1);
        dst.copy_from(&src);
        assert_eq!(dst, src);

        let mut other = FrameBuffer::new(1, 1);
        other.copy_from(&src);
        assert_eq!(other, src);
    }

    // ── Width ───────────────────────────────────────────────────────────

    #[test]
    fn string_width_counts_columns() {
        assert_eq!(string_width("hello"), 5);
        assert_eq!(string_width("a中b"), 4);
    }
}
