//! Frame drawing and junction resolution.
//!
//! Each visible framed view gets its edges, corners, title, subtitle and
//! scrollbar thumb painted around its content area. Once every view is down,
//! the cells where frames meet are rewritten to the box-drawing glyph that
//! joins the lines actually reaching them, so neighbouring panes share tidy
//! `├ ┬ ┼` borders instead of overlapping corners.

use std::collections::BTreeSet;

use n_term::buffer::{char_width, string_width, FrameBuffer};
use n_term::cell::Style;

use crate::attribute::to_style;
use crate::config::GuiConfig;
use crate::geometry::Rect;
use crate::scrollbar::scrollbar;
use crate::view::{put, FrameRunes, Overlap, View};

const THUMB: char = '▐';

const LINE_GLYPHS: &str = "─│┌┐└┘├┤┬┴┼";

const REACHES_DOWN: &str = "│┼├┤┌┐┬";
const REACHES_UP: &str = "│┼├┤└┘┴";
const REACHES_RIGHT: &str = "─┼├┌└┬┴";
const REACHES_LEFT: &str = "─┼┤┐┘┬┴";

const TOP: u8 = 1;
const BOTTOM: u8 = 2;
const LEFT: u8 = 4;
const RIGHT: u8 = 8;

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// Paint `view`'s frame. `focused` selects the highlight color when
/// `cfg.highlight` is on.
pub(crate) fn draw_frame(canvas: &mut FrameBuffer, view: &View, cfg: &GuiConfig, focused: bool) {
    let Rect { x0, y0, x1, y1 } = view.rect;
    let runes = if cfg.ascii { FrameRunes::ASCII } else { view.frame_runes };
    let skip = if cfg.support_overlaps { view.overlap } else { Overlap::empty() };
    let fg = if focused && cfg.highlight { cfg.sel_frame_color } else { view.frame_color };
    let style = to_style(fg, view.bg, cfg.output_mode);

    for x in x0 + 1..x1 {
        if !skip.contains(Overlap::TOP) {
            put(canvas, x, y0, runes.horizontal, style);
        }
        if !skip.contains(Overlap::BOTTOM) {
            put(canvas, x, y1, runes.horizontal, style);
        }
    }
    for y in y0 + 1..y1 {
        if !skip.contains(Overlap::LEFT) {
            put(canvas, x0, y, runes.vertical, style);
        }
        if !skip.contains(Overlap::RIGHT) {
            put(canvas, x1, y, runes.vertical, style);
        }
    }

    let corners = [
        (x0, y0, runes.top_left, Overlap::TOP | Overlap::LEFT),
        (x1, y0, runes.top_right, Overlap::TOP | Overlap::RIGHT),
        (x0, y1, runes.bottom_left, Overlap::BOTTOM | Overlap::LEFT),
        (x1, y1, runes.bottom_right, Overlap::BOTTOM | Overlap::RIGHT),
    ];
    for (x, y, ch, edges) in corners {
        if !skip.intersects(edges) {
            put(canvas, x, y, ch, style);
        }
    }

    if !skip.contains(Overlap::TOP) {
        let title_fg = if view.title_color.is_default() { fg } else { view.title_color };
        let title_style = to_style(title_fg, view.bg, cfg.output_mode);
        let title_end = draw_label(canvas, &view.title, x0 + 2, x1 - 1, y0, title_style);

        let start = x1 - 1 - columns(string_width(&view.subtitle));
        let min_start = if view.title.is_empty() { x0 + 2 } else { title_end + 1 };
        if !view.subtitle.is_empty() && start >= min_start {
            draw_label(canvas, &view.subtitle, start, x1 - 1, y0, style);
        }
    }

    if view.scrollbar && !skip.contains(Overlap::RIGHT) {
        let (_, page) = view.inner_size();
        let list = view.view_lines_height();
        if page > 0 && list > page {
            let (start, height) = scrollbar(list, page, view.oy, page);
            for y in (y0 + 1 + columns(start)..).take(height) {
                put(canvas, x1, y, THUMB, style);
            }
        }
    }
}

/// Paint `text` from `x` while it fits before `limit`. Returns the column
/// after the last painted rune.
fn draw_label(canvas: &mut FrameBuffer, text: &str, mut x: i32, limit: i32, y: i32, style: Style) -> i32 {
    for ch in text.chars() {
        let w = columns(char_width(ch));
        if w == 0 {
            continue;
        }
        if x + w > limit {
            break;
        }
        put(canvas, x, y, ch, style);
        x += w;
    }
    x
}

fn columns(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Junctions
// ---------------------------------------------------------------------------

/// The glyph joining the lines in `mask` (`1` up, `2` down, `4` left,
/// `8` right), if it is a junction.
///
/// ```
/// use n_gui::compositor::junction;
///
/// assert_eq!(junction(2 | 4 | 8), Some('┬'));
/// assert_eq!(junction(1 | 2), None);
/// ```
#[must_use]
pub const fn junction(mask: u8) -> Option<char> {
    match mask {
        10 => Some('┌'),
        6 => Some('┐'),
        9 => Some('└'),
        5 => Some('┘'),
        11 => Some('├'),
        7 => Some('┤'),
        14 => Some('┬'),
        13 => Some('┴'),
        15 => Some('┼'),
        _ => None,
    }
}

/// Rewrite frame corners and edge crossings of `frames` to the glyph that
/// joins their neighbours. Masks are computed from the canvas as drawn, then
/// applied together.
pub(crate) fn resolve_junctions(canvas: &mut FrameBuffer, frames: &[Rect]) {
    let mut points = BTreeSet::new();
    for a in frames {
        for b in frames {
            for x in [a.x0, a.x1] {
                for y in [b.y0, b.y1] {
                    if (b.x0..=b.x1).contains(&x) && (a.y0..=a.y1).contains(&y) {
                        points.insert((x, y));
                    }
                }
            }
        }
    }

    let fixes: Vec<_> = points
        .into_iter()
        .filter(|&(x, y)| glyph_at(canvas, x, y).is_some_and(|ch| LINE_GLYPHS.contains(ch)))
        .filter_map(|(x, y)| junction(neighbour_mask(canvas, x, y)).map(|ch| (x, y, ch)))
        .collect();

    for (x, y, ch) in fixes {
        let style = cell_style(canvas, x, y);
        if glyph_at(canvas, x, y) != Some(ch) {
            tracing::trace!(x, y, %ch, "junction");
        }
        put(canvas, x, y, ch, style);
    }
}

fn neighbour_mask(canvas: &FrameBuffer, x: i32, y: i32) -> u8 {
    let reaches = |dx: i32, dy: i32, set: &str| glyph_at(canvas, x + dx, y + dy).is_some_and(|ch| set.contains(ch));
    let mut mask = 0;
    if reaches(0, -1, REACHES_DOWN) {
        mask |= TOP;
    }
    if reaches(0, 1, REACHES_UP) {
        mask |= BOTTOM;
    }
    if reaches(-1, 0, REACHES_RIGHT) {
        mask |= LEFT;
    }
    if reaches(1, 0, REACHES_LEFT) {
        mask |= RIGHT;
    }
    mask
}

fn glyph_at(canvas: &FrameBuffer, x: i32, y: i32) -> Option<char> {
    let (x, y) = (u16::try_from(x).ok()?, u16::try_from(y).ok()?);
    canvas.get(x, y)?.character()
}

fn cell_style(canvas: &FrameBuffer, x: i32, y: i32) -> Style {
    u16::try_from(x)
        .ok()
        .zip(u16::try_from(y).ok())
        .and_then(|(x, y)| canvas.get(x, y))
        .map_or(Style::DEFAULT, |c| c.style())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
