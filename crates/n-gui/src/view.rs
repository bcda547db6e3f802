//! Views — independently positioned, styled and editable text panes.
//!
//! A [`View`] owns a buffer of [`Line`]s plus three positions:
//!
//! - the **write position**, where [`write_str`](View::write_str) and the
//!   [`std::io::Write`] impl put the next rune
//! - the **cursor**, in document coordinates (column = cell index, row = line
//!   index), moved by the edit engine in [`crate::edit`]
//! - the **origin**, in display coordinates (after wrapping), which selects
//!   the visible part of the content
//!
//! Wrapping is a rendering concern: the buffer is never reflowed. Display
//! lines are recomputed from the buffer whenever they are needed.

use std::fmt;
use std::io;
use std::rc::Rc;

use bitflags::bitflags;
use n_term::buffer::FrameBuffer;

use crate::attribute::{to_style, Attribute, OutputMode};
use crate::cell::{line_to_string, rune_width, Cell, Line};
use crate::editor::{DefaultEditor, Editor};
use crate::escape::{EscapeInterpreter, Instruction};
use crate::geometry::{Geometry, Rect};
use crate::wrap::wrap_ranges;

const TAB_STOP: usize = 4;

// ---------------------------------------------------------------------------
// Frame runes and overlap edges
// ---------------------------------------------------------------------------

/// Glyphs used to draw a view's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRunes {
    pub horizontal: char,
    pub vertical: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
}

impl FrameRunes {
    pub const SINGLE: Self = Self::new('─', '│', '┌', '┐', '└', '┘');
    pub const ROUNDED: Self = Self::new('─', '│', '╭', '╮', '╰', '╯');
    pub const DOUBLE: Self = Self::new('═', '║', '╔', '╗', '╚', '╝');
    pub const ASCII: Self = Self::new('-', '|', '+', '+', '+', '+');

    #[must_use]
    pub const fn new(
        horizontal: char,
        vertical: char,
        top_left: char,
        top_right: char,
        bottom_left: char,
        bottom_right: char,
    ) -> Self {
        Self {
            horizontal,
            vertical,
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }
}

impl Default for FrameRunes {
    fn default() -> Self {
        Self::SINGLE
    }
}

bitflags! {
    /// Frame edges shared with a neighbour. In overlap mode the view does
    /// not draw them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Overlap: u8 {
        const TOP    = 1;
        const BOTTOM = 2;
        const LEFT   = 4;
        const RIGHT  = 8;
    }
}

// ---------------------------------------------------------------------------
// Display lines
// ---------------------------------------------------------------------------

/// One rendered row: the cells `start..end` of buffer line `row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DisplayLine {
    pub row: usize,
    pub start: usize,
    pub end: usize,
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

pub struct View {
    name: String,
    pub(crate) geometry: Geometry,
    pub(crate) rect: Rect,

    pub(crate) lines: Vec<Line>,
    pub(crate) cx: usize,
    pub(crate) cy: usize,
    pub(crate) ox: usize,
    pub(crate) oy: usize,
    wx: usize,
    wy: usize,
    ei: EscapeInterpreter,
    utf8_tail: Vec<u8>,
    pub(crate) clipboard: Option<String>,
    pub(crate) editor: Rc<dyn Editor>,

    pub(crate) visible: bool,
    pub(crate) frame: bool,
    pub(crate) wrap: bool,
    pub(crate) autoscroll: bool,
    pub(crate) editable: bool,
    pub(crate) overwrite: bool,
    pub(crate) highlight: bool,
    pub(crate) scrollbar: bool,
    pub(crate) mask: Option<char>,

    pub(crate) fg: Attribute,
    pub(crate) bg: Attribute,
    pub(crate) sel_fg: Attribute,
    pub(crate) sel_bg: Attribute,
    pub(crate) frame_color: Attribute,
    pub(crate) title_color: Attribute,
    pub(crate) frame_runes: FrameRunes,
    pub(crate) title: String,
    pub(crate) subtitle: String,
    pub(crate) overlap: Overlap,
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("name", &self.name)
            .field("rect", &self.rect)
            .field("lines", &self.lines.len())
            .field("cursor", &(self.cx, self.cy))
            .field("origin", &(self.ox, self.oy))
            .finish_non_exhaustive()
    }
}

impl View {
    /// A visible, framed view with default colors and the default editor.
    #[must_use]
    pub fn new(name: impl Into<String>, geometry: Geometry, rect: Rect) -> Self {
        Self {
            name: name.into(),
            geometry,
            rect,
            lines: Vec::new(),
            cx: 0,
            cy: 0,
            ox: 0,
            oy: 0,
            wx: 0,
            wy: 0,
            ei: EscapeInterpreter::new(),
            utf8_tail: Vec::new(),
            clipboard: None,
            editor: Rc::new(DefaultEditor),
            visible: true,
            frame: true,
            wrap: false,
            autoscroll: false,
            editable: false,
            overwrite: false,
            highlight: false,
            scrollbar: false,
            mask: None,
            fg: Attribute::DEFAULT,
            bg: Attribute::DEFAULT,
            sel_fg: Attribute::DEFAULT,
            sel_bg: Attribute::DEFAULT,
            frame_color: Attribute::DEFAULT,
            title_color: Attribute::DEFAULT,
            frame_runes: FrameRunes::SINGLE,
            title: String::new(),
            subtitle: String::new(),
            overlap: Overlap::empty(),
        }
    }

    // -- Identity and placement ---------------------------------------------

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rectangle from the last layout pass, frame included.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    #[must_use]
    pub const fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Columns and rows available to content.
    #[must_use]
    pub fn inner_size(&self) -> (usize, usize) {
        self.rect.inner_size()
    }

    // -- Flags --------------------------------------------------------------

    pub fn set_visible(&mut self, on: bool) {
        self.visible = on;
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_frame(&mut self, on: bool) {
        self.frame = on;
    }

    #[must_use]
    pub const fn has_frame(&self) -> bool {
        self.frame
    }

    pub fn set_wrap(&mut self, on: bool) {
        self.wrap = on;
        if on {
            self.ox = 0;
        }
    }

    #[must_use]
    pub const fn wraps(&self) -> bool {
        self.wrap
    }

    /// Keep the last line visible when drawing.
    pub fn set_autoscroll(&mut self, on: bool) {
        self.autoscroll = on;
    }

    #[must_use]
    pub const fn autoscrolls(&self) -> bool {
        self.autoscroll
    }

    /// Route unbound keys to this view's editor while it is focused.
    pub fn set_editable(&mut self, on: bool) {
        self.editable = on;
    }

    #[must_use]
    pub const fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn set_overwrite(&mut self, on: bool) {
        self.overwrite = on;
    }

    #[must_use]
    pub const fn overwrites(&self) -> bool {
        self.overwrite
    }

    /// Paint the cursor row with the selection colors.
    pub fn set_highlight(&mut self, on: bool) {
        self.highlight = on;
    }

    #[must_use]
    pub const fn highlights(&self) -> bool {
        self.highlight
    }

    pub fn set_scrollbar(&mut self, on: bool) {
        self.scrollbar = on;
    }

    #[must_use]
    pub const fn has_scrollbar(&self) -> bool {
        self.scrollbar
    }

    /// Draw every rune as `mask` (password fields).
    pub fn set_mask(&mut self, mask: Option<char>) {
        self.mask = mask;
    }

    #[must_use]
    pub const fn mask(&self) -> Option<char> {
        self.mask
    }

    // -- Colors and decoration ----------------------------------------------

    pub fn set_fg_color(&mut self, fg: Attribute) {
        self.fg = fg;
    }

    pub fn set_bg_color(&mut self, bg: Attribute) {
        self.bg = bg;
    }

    pub fn set_sel_fg_color(&mut self, fg: Attribute) {
        self.sel_fg = fg;
    }

    pub fn set_sel_bg_color(&mut self, bg: Attribute) {
        self.sel_bg = bg;
    }

    pub fn set_frame_color(&mut self, color: Attribute) {
        self.frame_color = color;
    }

    pub fn set_title_color(&mut self, color: Attribute) {
        self.title_color = color;
    }

    pub fn set_frame_runes(&mut self, runes: FrameRunes) {
        self.frame_runes = runes;
    }

    #[must_use]
    pub const fn frame_runes(&self) -> FrameRunes {
        self.frame_runes
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_subtitle(&mut self, subtitle: impl Into<String>) {
        self.subtitle = subtitle.into();
    }

    #[must_use]
    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    pub fn set_overlap(&mut self, edges: Overlap) {
        self.overlap = edges;
    }

    #[must_use]
    pub const fn overlap(&self) -> Overlap {
        self.overlap
    }

    /// Replace the editor that receives keys while the view is editable.
    pub fn set_editor(&mut self, editor: impl Editor + 'static) {
        self.editor = Rc::new(editor);
    }

    // -- Cursor and origin --------------------------------------------------

    /// Cursor in document coordinates.
    #[must_use]
    pub const fn cursor(&self) -> (usize, usize) {
        (self.cx, self.cy)
    }

    /// Move the cursor, clamping to the buffer, and scroll it into view.
    pub fn set_cursor(&mut self, x: usize, y: usize) {
        self.cx = x;
        self.cy = y;
        self.clamp_cursor();
        self.adjust_origin();
    }

    /// Scroll offset in display coordinates.
    #[must_use]
    pub const fn origin(&self) -> (usize, usize) {
        (self.ox, self.oy)
    }

    pub fn set_origin(&mut self, x: usize, y: usize) {
        self.ox = if self.wrap { 0 } else { x };
        self.oy = y;
    }

    /// The clipboard filled by word and kill edits.
    #[must_use]
    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    // -- Writing ------------------------------------------------------------

    /// Write text at the write position, interpreting escape sequences.
    pub fn write_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.write_rune(ch);
        }
    }

    /// Empty the buffer and reset the write position, cursor and colors.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.wx = 0;
        self.wy = 0;
        self.cx = 0;
        self.cy = 0;
        self.ei.reset();
        self.utf8_tail.clear();
    }

    /// Replace the whole content.
    pub fn set_content(&mut self, s: &str) {
        self.clear();
        self.write_str(s);
    }

    fn write_rune(&mut self, ch: char) {
        match self.ei.parse_one(ch) {
            Ok(true) => {
                if let Instruction::EraseInLine(mode) = self.ei.take_instruction() {
                    self.erase_in_line(mode);
                }
            }
            Ok(false) => self.put_rune(ch),
            Err(_) => {
                for r in self.ei.runes() {
                    self.put_rune(r);
                }
            }
        }
    }

    fn put_rune(&mut self, ch: char) {
        match ch {
            '\n' => {
                self.ensure_line(self.wy);
                self.wy += 1;
                self.wx = 0;
                self.ensure_line(self.wy);
            }
            '\r' => self.wx = 0,
            '\t' => {
                let stop = (self.wx / TAB_STOP + 1) * TAB_STOP;
                while self.wx < stop {
                    self.put_cell(' ');
                }
            }
            _ => self.put_cell(ch),
        }
    }

    fn put_cell(&mut self, ch: char) {
        let cell = Cell::new(ch, self.ei.fg(), self.ei.bg());
        self.ensure_line(self.wy);
        let line = &mut self.lines[self.wy];
        if self.wx < line.len() {
            line[self.wx] = cell;
        } else {
            line.resize(self.wx, Cell::plain(' '));
            line.push(cell);
        }
        self.wx += 1;
    }

    /// Erase part of the write line: mode 0 from the write position to the
    /// end, 1 from the start through the write position, 2 the whole line.
    /// Cleared cells take the current background and the line is padded to
    /// the inner width. Other modes are ignored.
    fn erase_in_line(&mut self, mode: u16) {
        self.ensure_line(self.wy);
        let width = self.inner_size().0;
        let blank = Cell::new(' ', Attribute::DEFAULT, self.ei.bg());
        let line = &mut self.lines[self.wy];
        match mode {
            0 => {
                line.truncate(self.wx);
                line.resize(self.wx, Cell::plain(' '));
            }
            1 => {
                let end = self.wx + 1;
                if line.len() < end {
                    line.resize(end, Cell::plain(' '));
                }
                line[..end].fill(blank);
            }
            2 => line.clear(),
            _ => return,
        }
        if line.len() < width {
            line.resize(width, blank);
        }
        self.clamp_cursor();
    }

    fn ensure_line(&mut self, y: usize) {
        if self.lines.len() <= y {
            self.lines.resize_with(y + 1, Vec::new);
        }
    }

    // -- Reading ------------------------------------------------------------

    /// The whole content, lines joined by `\n`, padding stripped.
    #[must_use]
    pub fn buffer(&self) -> String {
        self.buffer_lines().join("\n")
    }

    #[must_use]
    pub fn buffer_lines(&self) -> Vec<String> {
        self.lines.iter().map(|l| line_to_string(l)).collect()
    }

    #[must_use]
    pub fn line(&self, y: usize) -> Option<String> {
        self.lines.get(y).map(|l| line_to_string(l))
    }

    /// The visible part of the content, as wrapped and scrolled.
    #[must_use]
    pub fn view_buffer(&self) -> String {
        let (_, height) = self.inner_size();
        self.display_lines()
            .iter()
            .skip(self.oy)
            .take(height)
            .map(|dl| line_to_string(&self.lines[dl.row][dl.start..dl.end]))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of buffer lines.
    #[must_use]
    pub fn lines_height(&self) -> usize {
        self.lines.len()
    }

    /// Number of display lines after wrapping.
    #[must_use]
    pub fn view_lines_height(&self) -> usize {
        self.display_lines().len()
    }

    pub(crate) fn line_len(&self, y: usize) -> usize {
        self.lines.get(y).map_or(0, Vec::len)
    }

    /// Pull the edit cursor back onto the buffer.
    pub(crate) fn clamp_cursor(&mut self) {
        self.cy = self.cy.min(self.lines.len().saturating_sub(1));
        self.cx = self.cx.min(self.line_len(self.cy));
    }

    // -- Display mapping ----------------------------------------------------

    pub(crate) fn display_lines(&self) -> Vec<DisplayLine> {
        let columns = if self.wrap { self.inner_size().0 } else { 0 };
        self.lines
            .iter()
            .enumerate()
            .flat_map(|(row, line)| {
                wrap_ranges(line, columns)
                    .into_iter()
                    .map(move |r| DisplayLine {
                        row,
                        start: r.start,
                        end: r.end,
                    })
            })
            .collect()
    }

    /// Display coordinates (columns, display row) of document position
    /// `(x, y)`, before scrolling.
    pub(crate) fn display_position(&self, x: usize, y: usize) -> (usize, usize) {
        let lines = self.display_lines();
        let Some(idx) = lines
            .iter()
            .rposition(|dl| dl.row == y && dl.start <= x)
            .or_else(|| lines.iter().position(|dl| dl.row == y))
        else {
            return (x, y);
        };
        let dl = lines[idx];
        let row = &self.lines[dl.row];
        let end = x.min(row.len()).max(dl.start);
        let col: usize = row[dl.start..end].iter().map(|c| c.width()).sum();

        let width = self.inner_size().0;
        if self.wrap && width > 0 && col >= width {
            (0, idx + 1)
        } else {
            (col, idx)
        }
    }

    /// Document position under visible cell `(x, y)` of the content area.
    pub(crate) fn document_position(&self, x: usize, y: usize) -> (usize, usize) {
        let lines = self.display_lines();
        let Some(dl) = lines.get(self.oy + y).or_else(|| lines.last()).copied() else {
            return (0, 0);
        };
        let target = self.ox + x;
        let row = &self.lines[dl.row];
        let mut col = 0;
        let mut cx = dl.start;
        while cx < dl.end {
            let w = row[cx].width();
            if col + w > target {
                break;
            }
            col += w;
            cx += 1;
        }
        (cx, dl.row)
    }

    /// Where the hardware cursor goes, relative to the content area.
    pub(crate) fn visible_cursor(&self) -> Option<(usize, usize)> {
        let (dx, dy) = self.display_position(self.cx, self.cy);
        let (w, h) = self.inner_size();
        let x = dx.checked_sub(self.ox)?;
        let y = dy.checked_sub(self.oy)?;
        (x < w && y < h).then_some((x, y))
    }

    // -- Drawing ------------------------------------------------------------

    /// Paint the content area. Cells without a color take the view's.
    pub(crate) fn draw_content(&mut self, canvas: &mut FrameBuffer, mode: OutputMode) {
        let (width, height) = self.inner_size();
        let lines = self.display_lines();
        if self.autoscroll {
            self.oy = lines.len().saturating_sub(height);
        }

        let x0 = self.rect.x0 + 1;
        let y0 = self.rect.y0 + 1;
        let base = to_style(self.fg, self.bg, mode);
        let sel_fg = self.fg | self.sel_fg;
        let sel_bg = self.bg | self.sel_bg;

        for (j, y) in (y0..).take(height).enumerate() {
            let dl = lines.get(self.oy + j);
            let selected = self.highlight && dl.is_some_and(|dl| dl.row == self.cy);
            let row_style = if selected {
                to_style(sel_fg, sel_bg, mode)
            } else {
                base
            };
            for x in (x0..).take(width) {
                put(canvas, x, y, ' ', row_style);
            }

            let Some(dl) = dl else { continue };
            let (fg, bg) = if selected { (sel_fg, sel_bg) } else { (self.fg, self.bg) };
            let mut col = 0;
            for cell in &self.lines[dl.row][dl.start..dl.end] {
                if cell.is_padding() {
                    continue;
                }
                let ch = self.mask.unwrap_or(cell.ch);
                let w = rune_width(ch);
                if col >= self.ox && col - self.ox + w <= width {
                    let style = to_style(fg | cell.fg, bg | cell.bg, mode);
                    let x = x0 + i32::try_from(col - self.ox).unwrap_or(i32::MAX);
                    put(canvas, x, y, ch, style);
                }
                col += w;
                if col >= self.ox + width {
                    break;
                }
            }
        }
    }
}

/// Paint one rune at signed screen coordinates, ignoring anything off screen.
pub(crate) fn put(canvas: &mut FrameBuffer, x: i32, y: i32, ch: char, style: n_term::cell::Style) {
    if let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) {
        canvas.put_char(x, y, ch, style);
    }
}

impl io::Write for View {
    /// Decode UTF-8 and write it. A sequence split across calls is held until
    /// the rest arrives; invalid bytes become U+FFFD.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = std::mem::take(&mut self.utf8_tail);
        bytes.extend_from_slice(buf);

        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(s) => {
                    self.write_str(s);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    self.write_str(std::str::from_utf8(valid).unwrap_or_default());
                    if let Some(len) = e.error_len() {
                        self.write_rune(char::REPLACEMENT_CHARACTER);
                        rest = &after[len..];
                    } else {
                        self.utf8_tail = after.to_vec();
                        break;
                    }
                }
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn view(w: i32, h: i32) -> View {
        View::new("v", Geometry::absolute(0, 0, w + 1, h + 1), Rect::new(0, 0, w + 1, h + 1))
    }

    // -- Writing ------------------------------------------------------------

    #[test]
    fn write_and_read_back() {
        let mut v = view(20, 5);
        v.write_str("hello\nworld");
        assert_eq!(v.buffer(), "hello\nworld");
        assert_eq!(v.buffer_lines(), vec!["hello", "world"]);
        assert_eq!(v.line(1).as_deref(), Some("world"));
        assert_eq!(v.line(2), None);
        assert_eq!(v.lines_height(), 2);
    }

    #[test]
    fn trailing_newline_opens_a_line() {
        let mut v = view(20, 5);
        v.write_str("a\n");
        assert_eq!(v.lines_height(), 2);
        assert_eq!(v.buffer(), "a\n");
    }

    #[test]
    fn carriage_return_overwrites() {
        let mut v = view(20, 5);
        v.write_str("hello\rJ");
        assert_eq!(v.buffer(), "Jello");
    }

    #[test]
    fn tabs_fill_to_next_stop() {
        let mut v = view(20, 5);
        v.write_str("ab\tc");
        assert_eq!(v.buffer(), "ab  c");
        v.set_content("abcd\te");
        assert_eq!(v.buffer(), "abcd    e");
    }

    #[test]
    fn escape_colors_reach_cells() {
        let mut v = view(20, 5);
        v.write_str("\x1b[31mR\x1b[0mN");
        assert_eq!(v.buffer(), "RN");
        assert_eq!(v.lines[0][0].fg, Attribute::RED);
        assert_eq!(v.lines[0][1].fg, Attribute::DEFAULT);
    }

    #[test]
    fn colors_persist_across_writes() {
        let mut v = view(20, 5);
        v.write_str("\x1b[32m");
        v.write_str("g");
        assert_eq!(v.lines[0][0].fg, Attribute::GREEN);
    }

    #[test]
    fn malformed_escape_is_written_literally() {
        let mut v = view(20, 5);
        v.write_str("a\x1b[2Jb");
        assert_eq!(v.buffer(), "a\x1b[2Jb");
    }

    #[test]
    fn erase_in_line_fills_with_background() {
        let mut v = view(6, 3);
        v.write_str("abcdef\r\x1b[44mxy\x1b[K");
        assert_eq!(v.buffer(), "xy    ");
        assert_eq!(v.lines[0][5].bg, Attribute::BLUE);
    }

    #[test]
    fn erase_to_line_start_and_whole_line() {
        let mut v = view(6, 3);
        v.write_str("abcdef\rxy\x1b[1K");
        assert_eq!(v.buffer(), "   def");

        v.write_str("\x1b[2K");
        assert_eq!(v.buffer(), "      ");

        v.write_str("\x1b[7Kz");
        assert_eq!(v.buffer(), "  z   ");
    }

    #[test]
    fn io_write_handles_split_utf8() {
        let mut v = view(20, 5);
        let bytes = "é中".as_bytes();
        v.write_all(&bytes[..1]).unwrap();
        v.write_all(&bytes[1..3]).unwrap();
        v.write_all(&bytes[3..]).unwrap();
        assert_eq!(v.buffer(), "é中");
    }

    #[test]
    fn io_write_replaces_invalid_bytes() {
        let mut v = view(20, 5);
        v.write_all(b"a\xffb").unwrap();
        assert_eq!(v.buffer(), "a\u{fffd}b");
    }

    #[test]
    fn clear_resets_everything() {
        let mut v = view(20, 5);
        v.write_str("\x1b[31mabc\ndef");
        v.clear();
        assert_eq!(v.buffer(), "");
        assert_eq!(v.cursor(), (0, 0));
        v.write_str("x");
        assert_eq!(v.lines[0][0].fg, Attribute::DEFAULT);
    }

    // -- Cursor -------------------------------------------------------------

    #[test]
    fn set_cursor_clamps() {
        let mut v = view(20, 5);
        v.set_content("abc\nde");
        v.set_cursor(10, 10);
        assert_eq!(v.cursor(), (2, 1));
        v.clear();
        v.set_cursor(3, 3);
        assert_eq!(v.cursor(), (0, 0));
    }

    // -- Wrapping and display -----------------------------------------------

    #[test]
    fn wrapped_view_buffer() {
        let mut v = view(5, 5);
        v.set_wrap(true);
        v.set_content("Hello World\nok");
        assert_eq!(v.view_lines_height(), 3);
        assert_eq!(v.view_buffer(), "Hello\nWorld\nok");
        assert_eq!(v.buffer(), "Hello World\nok");
    }

    #[test]
    fn view_buffer_respects_origin_and_height() {
        let mut v = view(10, 2);
        v.set_content("a\nb\nc\nd");
        v.set_origin(0, 1);
        assert_eq!(v.view_buffer(), "b\nc");
    }

    #[test]
    fn display_position_follows_wrap() {
        let mut v = view(5, 5);
        v.set_wrap(true);
        v.set_content("Hello World");
        assert_eq!(v.display_position(7, 0), (1, 1));
        assert_eq!(v.display_position(2, 0), (2, 0));
    }

    #[test]
    fn document_position_maps_clicks() {
        let mut v = view(10, 5);
        v.set_content("a中b\nxyz");
        assert_eq!(v.document_position(3, 0), (2, 0));
        assert_eq!(v.document_position(9, 1), (3, 1));
        assert_eq!(v.document_position(0, 4), (0, 1));
    }

    // -- Drawing ------------------------------------------------------------

    #[test]
    fn draws_inside_the_frame() {
        let mut v = view(4, 2);
        v.set_content("hi\nthere");
        let mut canvas = FrameBuffer::new(8, 5);
        v.draw_content(&mut canvas, OutputMode::Normal);
        assert_eq!(canvas.row_text(1), " hi     ");
        assert_eq!(canvas.row_text(2), " ther   ");
    }

    #[test]
    fn autoscroll_pins_to_bottom() {
        let mut v = view(4, 2);
        v.set_autoscroll(true);
        v.set_content("1\n2\n3\n4");
        let mut canvas = FrameBuffer::new(8, 5);
        v.draw_content(&mut canvas, OutputMode::Normal);
        assert_eq!(v.origin(), (0, 2));
        assert_eq!(canvas.row_text(1).trim(), "3");
    }

    #[test]
    fn mask_hides_runes() {
        let mut v = view(6, 1);
        v.set_mask(Some('*'));
        v.set_content("secret");
        let mut canvas = FrameBuffer::new(8, 3);
        v.draw_content(&mut canvas, OutputMode::Normal);
        assert_eq!(canvas.row_text(1), " ****** ");
    }
}
