//! Width-aware greedy line wrapping.
//!
//! Pieces accumulate display width until the next rune would overflow the
//! column budget. The piece then ends at the best break point seen so far:
//!
//! - a space: the space is dropped
//! - right after a hyphen: the hyphen stays on the ending piece
//! - neither: a hard split before the overflowing rune
//!
//! A space that is itself the overflowing rune is dropped. Wrapping never
//! changes the underlying text; callers get index ranges back.

use std::ops::Range;

use crate::cell::{rune_width, Cell};

/// Split `line` into piece ranges no wider than `columns`. `columns == 0`
/// returns the whole line as one piece.
///
/// A single rune wider than `columns` still gets a piece of its own.
#[must_use]
pub fn wrap_ranges(line: &[Cell], columns: usize) -> Vec<Range<usize>> {
    wrap_by(line, columns, |c| c.ch)
}

/// Wrap a line of cells, returning owned pieces.
#[must_use]
pub fn wrap_line(line: &[Cell], columns: usize) -> Vec<Vec<Cell>> {
    wrap_ranges(line, columns)
        .into_iter()
        .map(|r| line[r].to_vec())
        .collect()
}

/// Wrap plain text. Newlines are treated as hard line ends.
#[must_use]
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    text.split('\n')
        .flat_map(|line| {
            let chars: Vec<char> = line.chars().collect();
            wrap_by(&chars, columns, |c| *c)
                .into_iter()
                .map(|r| chars[r].iter().collect::<String>())
                .collect::<Vec<_>>()
        })
        .collect()
}

#[derive(Clone, Copy)]
enum Break {
    Space(usize),
    Hyphen(usize),
}

fn wrap_by<T>(items: &[T], columns: usize, rune: impl Fn(&T) -> char) -> Vec<Range<usize>> {
    if columns == 0 {
        return vec![0..items.len()];
    }

    let widths: Vec<usize> = items.iter().map(|it| rune_width(rune(it))).collect();
    let mut pieces = Vec::new();
    let mut offset = 0;
    let mut width = 0;
    let mut last_break: Option<Break> = None;

    for (i, item) in items.iter().enumerate() {
        let ch = rune(item);
        width += widths[i];

        if width > columns {
            if ch == ' ' {
                push_piece(&mut pieces, offset..i);
                offset = i + 1;
                width = 0;
            } else {
                match last_break {
                    Some(Break::Space(b)) => {
                        push_piece(&mut pieces, offset..b);
                        offset = b + 1;
                    }
                    Some(Break::Hyphen(b)) => {
                        push_piece(&mut pieces, offset..b + 1);
                        offset = b + 1;
                    }
                    None => {
                        push_piece(&mut pieces, offset..i);
                        offset = i;
                    }
                }
                width = widths[offset..=i].iter().sum();
                // A wide rune can still overflow what was carried over.
                if width > columns && offset < i {
                    push_piece(&mut pieces, offset..i);
                    offset = i;
                    width = widths[i];
                }
            }
            last_break = None;
        }

        if i >= offset {
            match ch {
                ' ' => last_break = Some(Break::Space(i)),
                '-' => last_break = Some(Break::Hyphen(i)),
                _ => {}
            }
        }
    }

    pieces.push(offset..items.len());
    pieces
}

fn push_piece(pieces: &mut Vec<Range<usize>>, range: Range<usize>) {
    if !range.is_empty() {
        pieces.push(range);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wrap(s: &str, columns: usize) -> Vec<String> {
        wrap_text(s, columns)
    }

    #[test]
    fn breaks_at_space() {
        assert_eq!(wrap("Hello World", 5), vec!["Hello", "World"]);
    }

    #[test]
    fn breaks_after_hyphen() {
        assert_eq!(wrap("Hello-World", 6), vec!["Hello-", "World"]);
    }

    #[test]
    fn hard_split_without_break_point() {
        assert_eq!(wrap("ThisWordIsWayTooLong", 10), vec!["ThisWordIs", "WayTooLong"]);
    }

    #[test]
    fn zero_columns_disables_wrapping() {
        assert_eq!(wrap("a b c d e f", 0), vec!["a b c d e f"]);
    }

    #[test]
    fn earlier_space_is_used() {
        assert_eq!(wrap("one two three", 9), vec!["one two", "three"]);
    }

    #[test]
    fn fits_exactly() {
        assert_eq!(wrap("abcde", 5), vec!["abcde"]);
        assert_eq!(wrap("", 5), vec![""]);
    }

    #[test]
    fn wide_runes_count_double() {
        assert_eq!(wrap("中文字符", 4), vec!["中文", "字符"]);
        assert_eq!(wrap("a中b", 2), vec!["a", "中", "b"]);
    }

    #[test]
    fn newlines_split_first() {
        assert_eq!(wrap("ab\ncd ef", 3), vec!["ab", "cd", "ef"]);
    }

    #[test]
    fn ranges_index_the_line() {
        let line = crate::cell::line_from_str(
            "Hello World",
            crate::Attribute::DEFAULT,
            crate::Attribute::DEFAULT,
        );
        assert_eq!(wrap_ranges(&line, 5), vec![0..5, 6..11]);
        assert_eq!(wrap_line(&line, 5)[1].len(), 5);
    }

    #[test]
    fn pieces_rewrap_to_themselves() {
        for piece in wrap("lorem ipsum-dolor sit amet", 7) {
            assert_eq!(wrap(&piece, 7), vec![piece.clone()]);
        }
    }
}
