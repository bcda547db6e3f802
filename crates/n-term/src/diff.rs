// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Each `show()` hands the composited canvas to `render()`, which compares it
// with the frame it saw last time and feeds only the differing cells to the
// `CellWriter`. Rows that are byte-for-byte identical are skipped with one
// slice comparison. The first frame, and any frame after a size change or
// `force_redraw()`, clears the screen and paints everything.
//
// The whole frame is wrapped in synchronized output (DEC 2026) and ends with
// an SGR reset so no styling leaks past the frame.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// What a render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub cells_rendered: usize,
    pub cells_skipped: usize,
    pub bytes_written: usize,
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Frame differ that owns the previous frame and the pending output.
///
/// ```no_run
/// use n_term::buffer::FrameBuffer;
/// use n_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new();
/// let frame = FrameBuffer::new(80, 24);
/// renderer.render(&frame);
/// renderer.flush()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct DiffRenderer {
    output: OutputBuffer,
    writer: CellWriter,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            previous: None,
        }
    }

    /// Diff `current` against the previous frame and queue the ANSI output.
    pub fn render(&mut self, current: &FrameBuffer) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let mut stats = RenderStats::default();
        let (width, height) = (current.width(), current.height());
        if width == 0 || height == 0 {
            self.store_frame(current);
            return stats;
        }

        ansi::begin_sync(&mut self.output).ok();

        let previous = self
            .previous
            .as_ref()
            .filter(|prev| prev.width() == width && prev.height() == height);
        if previous.is_none() {
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..height {
            let row = current.row(y).unwrap_or_default();
            let prev_row = previous.and_then(|prev| prev.row(y));
            if prev_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }
            for (x, cell) in (0..width).zip(row) {
                if prev_row.is_some_and(|prev| prev[usize::from(x)] == *cell) {
                    stats.cells_skipped += 1;
                    continue;
                }
                self.writer.render_cell(&mut self.output, x, y, cell);
                stats.cells_rendered += 1;
            }
        }

        ansi::reset(&mut self.output).ok();
        ansi::end_sync(&mut self.output).ok();
        stats.bytes_written = self.output.len();

        self.store_frame(current);
        stats
    }

    /// Queued bytes of the last render.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Append raw bytes after the frame (cursor placement, mode switches).
    ///
    /// # Errors
    ///
    /// Never fails in practice; the buffer is in memory.
    pub fn queue(&mut self, f: impl FnOnce(&mut OutputBuffer) -> io::Result<()>) -> io::Result<()> {
        f(&mut self.output)
    }

    /// Write the queued output to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush_stdout()
    }

    /// Write the queued output to `w`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Forget the previous frame; the next render repaints everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    fn store_frame(&mut self, current: &FrameBuffer) {
        match &mut self.previous {
            Some(prev) => prev.copy_from(current),
            None => self.previous = Some(current.clone()),
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, Style};

    fn render(renderer: &mut DiffRenderer, frame: &FrameBuffer) -> (RenderStats, String) {
        let stats = renderer.render(frame);
        let out = String::from_utf8_lossy(renderer.output_bytes()).into_owned();
        (stats, out)
    }

    // ── First frame ─────────────────────────────────────────────────────

    #[test]
    fn first_frame_clears_and_paints_everything() {
        let mut renderer = DiffRenderer::new();
        let (stats, out) = render(&mut renderer, &FrameBuffer::new(4, 2));
        assert_eq!(stats.cells_rendered, 8);
        assert!(out.starts_with("\x1b[?2026h\x1b[2J"));
        assert!(out.ends_with("\x1b[0m\x1b[?2026l"));
    }

    // ── Steady state ────────────────────────────────────────────────────

    #[test]
    fn identical_frame_renders_nothing() {
        let mut renderer = DiffRenderer::new();
        let frame = FrameBuffer::new(4, 2);
        render(&mut renderer, &frame);
        let (stats, out) = render(&mut renderer, &frame);
        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 8);
        assert!(!out.contains("\x1b[2J"));
    }

    #[test]
    fn single_change_renders_one_cell() {
        let mut renderer = DiffRenderer::new();
        let mut frame = FrameBuffer::new(4, 2);
        render(&mut renderer, &frame);

        frame.set(2, 1, Cell::new('x'));
        let (stats, out) = render(&mut renderer, &frame);
        assert_eq!(stats.cells_rendered, 1);
        assert!(out.contains("\x1b[2;3H"));
        assert!(out.contains('x'));
    }

    #[test]
    fn resize_forces_full_redraw() {
        let mut renderer = DiffRenderer::new();
        render(&mut renderer, &FrameBuffer::new(4, 2));
        let (stats, out) = render(&mut renderer, &FrameBuffer::new(5, 2));
        assert_eq!(stats.cells_rendered, 10);
        assert!(out.contains("\x1b[2J"));
    }

    #[test]
    fn force_redraw_repaints() {
        let mut renderer = DiffRenderer::new();
        let frame = FrameBuffer::new(2, 1);
        render(&mut renderer, &frame);
        renderer.force_redraw();
        let (stats, _) = render(&mut renderer, &frame);
        assert_eq!(stats.cells_rendered, 2);
    }

    #[test]
    fn zero_size_frame_writes_nothing() {
        let mut renderer = DiffRenderer::new();
        let (stats, out) = render(&mut renderer, &FrameBuffer::new(0, 0));
        assert_eq!(stats, RenderStats::default());
        assert!(out.is_empty());
    }

    #[test]
    fn queued_bytes_follow_the_frame() {
        let mut renderer = DiffRenderer::new();
        let mut frame = FrameBuffer::new(2, 1);
        frame.put_char(0, 0, 'a', Style::DEFAULT);
        renderer.render(&frame);
        renderer.queue(|out| ansi::cursor_show(out)).unwrap();
        let mut sink = Vec::new();
        renderer.flush_to(&mut sink).unwrap();
        assert!(sink.ends_with(b"\x1b[?25h"));
    }
}
