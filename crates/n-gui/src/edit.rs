//! The cursor and edit engine.
//!
//! Every operation works in document coordinates and leaves the cursor on a
//! valid position: row < line count (0 for an empty buffer) and column ≤ the
//! row's length. Boundary cases are no-ops. After each operation the origin
//! is adjusted so the cursor stays visible.
//!
//! Word operations treat a run of spaces, or a run of anything else, as one
//! word. Deleting-word and kill operations replace the view's clipboard;
//! [`View::yank`] re-inserts it.

use crate::cell::{line_to_string, Cell};
use crate::view::View;

/// Scroll one axis so `cursor` (an absolute position) stays within
/// `origin..=origin + size`. Returns the cursor relative to the new origin,
/// and the new origin.
///
/// ```
/// use n_gui::edit::updated_cursor_and_origin;
///
/// assert_eq!(updated_cursor_and_origin(20, 10, 19), (0, 19));
/// assert_eq!(updated_cursor_and_origin(0, 10, 15), (10, 5));
/// assert_eq!(updated_cursor_and_origin(3, 10, 7), (4, 3));
/// ```
#[must_use]
pub const fn updated_cursor_and_origin(prev_origin: usize, size: usize, cursor: usize) -> (usize, usize) {
    if cursor > prev_origin + size {
        (size, cursor - size)
    } else if cursor < prev_origin {
        (0, cursor)
    } else {
        (cursor - prev_origin, prev_origin)
    }
}

fn is_space(cell: &Cell) -> bool {
    cell.ch == ' '
}

impl View {
    // -- Insert and delete --------------------------------------------------

    /// Type `ch` at the cursor. In overwrite mode the rune under the cursor is
    /// replaced instead, unless the cursor is at the end of the line.
    pub fn edit_write(&mut self, ch: char) {
        self.ensure_cursor_line();
        let cell = Cell::plain(ch);
        let line = &mut self.lines[self.cy];
        if self.overwrite && self.cx < line.len() {
            line[self.cx] = cell;
        } else {
            line.insert(self.cx, cell);
        }
        self.cx += 1;
        self.adjust_origin();
    }

    /// Delete the rune before the cursor. At column 0 the line is merged into
    /// the previous one.
    pub fn edit_delete_backward(&mut self) {
        self.clamp_cursor();
        if self.cx > 0 {
            self.lines[self.cy].remove(self.cx - 1);
            self.cx -= 1;
        } else if self.cy > 0 {
            let line = self.lines.remove(self.cy);
            self.cy -= 1;
            self.cx = self.lines[self.cy].len();
            self.lines[self.cy].extend(line);
        } else {
            return;
        }
        self.adjust_origin();
    }

    /// Delete the rune under the cursor. At the end of a line the next line
    /// is merged in.
    pub fn edit_delete_forward(&mut self) {
        self.clamp_cursor();
        let len = self.line_len(self.cy);
        if self.cx < len {
            self.lines[self.cy].remove(self.cx);
        } else if self.cy + 1 < self.lines.len() {
            let next = self.lines.remove(self.cy + 1);
            self.lines[self.cy].extend(next);
        } else {
            return;
        }
        self.adjust_origin();
    }

    /// Split the line at the cursor; the cursor moves to the start of the
    /// new line.
    pub fn edit_break_line(&mut self) {
        self.ensure_cursor_line();
        let tail = self.lines[self.cy].split_off(self.cx);
        self.lines.insert(self.cy + 1, tail);
        self.cy += 1;
        self.cx = 0;
        self.adjust_origin();
    }

    // -- Movement -----------------------------------------------------------

    /// Move by `dx` columns and `dy` rows.
    ///
    /// Rows clamp to the buffer. Moving purely right past the end of a line
    /// wraps to the start of the next one; moving left past column 0 wraps to
    /// the end of the previous one. Otherwise the column clamps.
    pub fn move_cursor(&mut self, dx: isize, dy: isize) {
        if self.lines.is_empty() {
            self.cx = 0;
            self.cy = 0;
            return;
        }
        let last = self.lines.len() - 1;
        let mut y = self.cy.saturating_add_signed(dy).min(last);
        let len = self.line_len(y);
        let target = self.cx.checked_add_signed(dx);

        let x = match target {
            Some(x) if x <= len => x,
            Some(_) if dy == 0 && y < last => {
                y += 1;
                0
            }
            Some(_) => len,
            None if y > 0 => {
                y -= 1;
                self.line_len(y)
            }
            None => 0,
        };

        self.cx = x;
        self.cy = y;
        self.adjust_origin();
    }

    /// Start of the current run of spaces or non-spaces to the left.
    pub fn move_word_left(&mut self) {
        if self.cx == 0 {
            if self.cy > 0 {
                self.cy -= 1;
                self.cx = self.line_len(self.cy);
                self.adjust_origin();
            }
            return;
        }
        self.cx = self.word_start(self.cx);
        self.adjust_origin();
    }

    /// End of the current run of spaces or non-spaces to the right.
    pub fn move_word_right(&mut self) {
        if self.cx >= self.line_len(self.cy) {
            if self.cy + 1 < self.lines.len() {
                self.cy += 1;
                self.cx = 0;
                self.adjust_origin();
            }
            return;
        }
        self.cx = self.word_end(self.cx);
        self.adjust_origin();
    }

    /// Column 0 of the current line.
    pub fn move_to_line_start(&mut self) {
        self.cx = 0;
        self.adjust_origin();
    }

    pub fn move_to_line_end(&mut self) {
        self.cx = self.line_len(self.cy);
        self.adjust_origin();
    }

    // -- Word and kill edits ------------------------------------------------

    /// Delete the word before the cursor into the clipboard. At column 0 this
    /// merges lines like [`edit_delete_backward`](Self::edit_delete_backward).
    pub fn backspace_word(&mut self) {
        self.clamp_cursor();
        if self.cx == 0 {
            self.edit_delete_backward();
            return;
        }
        let start = self.word_start(self.cx);
        self.kill(start, self.cx);
        self.cx = start;
        self.adjust_origin();
    }

    /// Delete the word after the cursor into the clipboard. At the end of a
    /// line this merges the next line in.
    pub fn delete_word_forward(&mut self) {
        self.clamp_cursor();
        if self.cx >= self.line_len(self.cy) {
            self.edit_delete_forward();
            return;
        }
        let end = self.word_end(self.cx);
        self.kill(self.cx, end);
        self.adjust_origin();
    }

    /// Delete from column 0 to the cursor into the clipboard.
    pub fn delete_to_line_start(&mut self) {
        self.clamp_cursor();
        if self.cx == 0 {
            return;
        }
        self.kill(0, self.cx);
        self.cx = 0;
        self.adjust_origin();
    }

    /// Delete from the cursor to the end of the line into the clipboard.
    pub fn delete_to_line_end(&mut self) {
        self.clamp_cursor();
        let len = self.line_len(self.cy);
        if self.cx >= len {
            return;
        }
        self.kill(self.cx, len);
        self.adjust_origin();
    }

    /// Insert the clipboard at the cursor. Newlines in it break the line.
    pub fn yank(&mut self) {
        let Some(text) = self.clipboard.clone() else {
            return;
        };
        let overwrite = std::mem::replace(&mut self.overwrite, false);
        for ch in text.chars() {
            if ch == '\n' {
                self.edit_break_line();
            } else {
                self.edit_write(ch);
            }
        }
        self.overwrite = overwrite;
    }

    // -- Helpers ------------------------------------------------------------

    fn ensure_cursor_line(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(Vec::new());
        }
        self.clamp_cursor();
    }

    /// Remove `start..end` of the cursor line into the clipboard.
    fn kill(&mut self, start: usize, end: usize) {
        let removed: Vec<Cell> = self.lines[self.cy].drain(start..end).collect();
        self.clipboard = Some(line_to_string(&removed));
    }

    fn word_start(&self, from: usize) -> usize {
        let line = &self.lines[self.cy];
        let class = is_space(&line[from - 1]);
        let mut start = from - 1;
        while start > 0 && is_space(&line[start - 1]) == class {
            start -= 1;
        }
        start
    }

    fn word_end(&self, from: usize) -> usize {
        let line = &self.lines[self.cy];
        let class = is_space(&line[from]);
        let mut end = from + 1;
        while end < line.len() && is_space(&line[end]) == class {
            end += 1;
        }
        end
    }

    /// Scroll so the cursor is visible: vertically always, horizontally only
    /// when wrapping is off.
    pub(crate) fn adjust_origin(&mut self) {
        let (width, height) = self.inner_size();
        let (dx, dy) = self.display_position(self.cx, self.cy);
        self.oy = updated_cursor_and_origin(self.oy, height.saturating_sub(1), dy).1;
        self.ox = if self.wrap {
            0
        } else {
            updated_cursor_and_origin(self.ox, width.saturating_sub(1), dx).1
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Rect};
    use pretty_assertions::assert_eq;

    fn view_with(content: &str) -> View {
        let mut v = View::new("e", Geometry::absolute(0, 0, 21, 11), Rect::new(0, 0, 21, 11));
        v.set_content(content);
        v
    }

    // -- updated_cursor_and_origin ------------------------------------------

    #[test]
    fn origin_scenario() {
        assert_eq!(updated_cursor_and_origin(20, 10, 19), (0, 19));
    }

    #[test]
    fn origin_unchanged_when_visible() {
        assert_eq!(updated_cursor_and_origin(5, 10, 5), (0, 5));
        assert_eq!(updated_cursor_and_origin(5, 10, 15), (10, 5));
    }

    // -- Insert -------------------------------------------------------------

    #[test]
    fn write_into_empty_buffer() {
        let mut v = view_with("");
        v.edit_write('a');
        v.edit_write('b');
        assert_eq!(v.buffer(), "ab");
        assert_eq!(v.cursor(), (2, 0));
    }

    #[test]
    fn write_inserts_mid_line() {
        let mut v = view_with("ac");
        v.set_cursor(1, 0);
        v.edit_write('b');
        assert_eq!(v.buffer(), "abc");
        assert_eq!(v.cursor(), (2, 0));
    }

    #[test]
    fn overwrite_replaces_until_end() {
        let mut v = view_with("abc");
        v.set_overwrite(true);
        v.set_cursor(1, 0);
        v.edit_write('X');
        v.edit_write('Y');
        v.edit_write('Z');
        assert_eq!(v.buffer(), "aXYZ");
    }

    // -- Delete -------------------------------------------------------------

    #[test]
    fn backspace_merges_lines() {
        let mut v = view_with("ab\ncd");
        v.set_cursor(0, 1);
        v.edit_delete_backward();
        assert_eq!(v.buffer(), "abcd");
        assert_eq!(v.cursor(), (2, 0));
    }

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut v = view_with("ab");
        v.edit_delete_backward();
        assert_eq!(v.buffer(), "ab");
        assert_eq!(v.cursor(), (0, 0));
    }

    #[test]
    fn delete_forward_merges_next_line() {
        let mut v = view_with("ab\ncd");
        v.set_cursor(2, 0);
        v.edit_delete_forward();
        assert_eq!(v.buffer(), "abcd");
        assert_eq!(v.cursor(), (2, 0));
    }

    #[test]
    fn delete_forward_at_end_is_noop() {
        let mut v = view_with("ab");
        v.set_cursor(2, 0);
        v.edit_delete_forward();
        assert_eq!(v.buffer(), "ab");
    }

    #[test]
    fn break_line_splits() {
        let mut v = view_with("abcd");
        v.set_cursor(2, 0);
        v.edit_break_line();
        assert_eq!(v.buffer(), "ab\ncd");
        assert_eq!(v.cursor(), (0, 1));
    }

    // -- Movement -----------------------------------------------------------

    #[test]
    fn right_past_end_wraps_to_next_line() {
        let mut v = view_with("ab\ncd");
        v.set_cursor(2, 0);
        v.move_cursor(1, 0);
        assert_eq!(v.cursor(), (0, 1));
    }

    #[test]
    fn right_past_end_of_last_line_clamps() {
        let mut v = view_with("ab");
        v.set_cursor(2, 0);
        v.move_cursor(1, 0);
        assert_eq!(v.cursor(), (2, 0));
    }

    #[test]
    fn left_past_start_wraps_to_previous_end() {
        let mut v = view_with("abc\nd");
        v.set_cursor(0, 1);
        v.move_cursor(-1, 0);
        assert_eq!(v.cursor(), (3, 0));
        v.set_cursor(0, 0);
        v.move_cursor(-1, 0);
        assert_eq!(v.cursor(), (0, 0));
    }

    #[test]
    fn vertical_moves_clamp() {
        let mut v = view_with("abcdef\nab\nabcd");
        v.set_cursor(5, 0);
        v.move_cursor(0, 1);
        assert_eq!(v.cursor(), (2, 1));
        v.move_cursor(0, 10);
        assert_eq!(v.cursor(), (2, 2));
        v.move_cursor(0, -10);
        assert_eq!(v.cursor(), (2, 0));
    }

    #[test]
    fn moving_scrolls_origin() {
        let content: Vec<String> = (0..30).map(|i| i.to_string()).collect();
        let mut v = view_with(&content.join("\n"));
        v.set_cursor(0, 0);
        v.move_cursor(0, 15);
        assert_eq!(v.origin(), (0, 6));
        v.move_cursor(0, -14);
        assert_eq!(v.origin(), (0, 1));
    }

    #[test]
    fn long_lines_scroll_horizontally_without_wrap() {
        let mut v = view_with(&"x".repeat(40));
        v.set_cursor(30, 0);
        assert_eq!(v.origin(), (11, 0));
        v.set_wrap(true);
        v.set_cursor(30, 0);
        assert_eq!(v.origin().0, 0);
    }

    #[test]
    fn word_motion() {
        let mut v = view_with("foo  bar");
        v.set_cursor(8, 0);
        v.move_word_left();
        assert_eq!(v.cursor(), (5, 0));
        v.move_word_left();
        assert_eq!(v.cursor(), (3, 0));
        v.move_word_left();
        assert_eq!(v.cursor(), (0, 0));
        v.move_word_right();
        assert_eq!(v.cursor(), (3, 0));
        v.move_word_right();
        assert_eq!(v.cursor(), (5, 0));
    }

    // -- Word and kill edits ------------------------------------------------

    #[test]
    fn backspace_word_fills_clipboard() {
        let mut v = view_with("hello world");
        v.set_cursor(11, 0);
        v.backspace_word();
        assert_eq!(v.buffer(), "hello ");
        assert_eq!(v.clipboard(), Some("world"));
        v.backspace_word();
        assert_eq!(v.buffer(), "hello");
        assert_eq!(v.clipboard(), Some(" "));
    }

    #[test]
    fn delete_word_forward_then_yank() {
        let mut v = view_with("one two");
        v.delete_word_forward();
        assert_eq!(v.buffer(), " two");
        v.set_cursor(4, 0);
        v.yank();
        assert_eq!(v.buffer(), " twoone");
        assert_eq!(v.cursor(), (7, 0));
    }

    #[test]
    fn kill_to_line_start_and_end() {
        let mut v = view_with("abcdef");
        v.set_cursor(2, 0);
        v.delete_to_line_end();
        assert_eq!(v.buffer(), "ab");
        assert_eq!(v.clipboard(), Some("cdef"));
        v.delete_to_line_start();
        assert_eq!(v.buffer(), "");
        assert_eq!(v.clipboard(), Some("ab"));
        assert_eq!(v.cursor(), (0, 0));
    }

    #[test]
    fn kill_at_boundary_keeps_clipboard() {
        let mut v = view_with("ab");
        v.set_cursor(2, 0);
        v.delete_to_line_end();
        v.set_cursor(0, 0);
        v.delete_to_line_start();
        assert_eq!(v.clipboard(), None);
    }

    // -- Writes under the cursor -------------------------------------------

    #[test]
    fn erase_under_the_cursor_pulls_it_back() {
        // 4 columns of content.
        let mut v = View::new("e", Geometry::absolute(0, 0, 5, 3), Rect::new(0, 0, 5, 3));
        v.set_content("abcdef");
        v.set_cursor(6, 0);
        v.write_str("\r\x1b[K");
        assert_eq!(v.cursor(), (4, 0));

        v.edit_write('x');
        assert_eq!(v.buffer(), "    x");
        assert_eq!(v.cursor(), (5, 0));
    }

    #[test]
    fn stale_cursor_is_clamped_before_deleting() {
        let mut v = view_with("ab cd");
        v.cx = 40;
        v.backspace_word();
        assert_eq!(v.buffer(), "ab ");
        assert_eq!(v.clipboard(), Some("cd"));
        assert_eq!(v.cursor(), (3, 0));

        v.cy = 7;
        v.edit_delete_backward();
        assert_eq!(v.buffer(), "ab");
        assert_eq!(v.cursor(), (2, 0));
    }

    #[test]
    fn yank_with_newline_breaks_line() {
        let mut v = view_with("");
        v.clipboard = Some("a\nb".into());
        v.yank();
        assert_eq!(v.buffer(), "a\nb");
        assert_eq!(v.cursor(), (1, 1));
    }
}
