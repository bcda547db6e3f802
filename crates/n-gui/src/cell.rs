//! The unit of a view's buffer: one rune with its colors.

use crate::attribute::Attribute;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub fg: Attribute,
    pub bg: Attribute,
}

/// One line of a view's buffer.
pub type Line = Vec<Cell>;

impl Cell {
    /// Filler rune. Cells holding it are stripped when text is read back.
    pub const PADDING: char = '\0';

    #[must_use]
    pub const fn new(ch: char, fg: Attribute, bg: Attribute) -> Self {
        Self { ch, fg, bg }
    }

    /// A cell with default colors.
    #[must_use]
    pub const fn plain(ch: char) -> Self {
        Self::new(ch, Attribute::DEFAULT, Attribute::DEFAULT)
    }

    #[must_use]
    pub const fn is_padding(self) -> bool {
        self.ch == Self::PADDING
    }

    /// Display columns (wide runes take 2, control runes 0).
    #[must_use]
    pub fn width(self) -> usize {
        rune_width(self.ch)
    }
}

/// Display columns of a rune. Control runes count as 0.
#[must_use]
pub fn rune_width(ch: char) -> usize {
    n_term::buffer::char_width(ch)
}

/// Build a line from text, every cell with the same colors.
#[must_use]
pub fn line_from_str(s: &str, fg: Attribute, bg: Attribute) -> Line {
    s.chars().map(|ch| Cell::new(ch, fg, bg)).collect()
}

/// The runes of a line, padding stripped.
#[must_use]
pub fn line_to_string(line: &[Cell]) -> String {
    line.iter().filter(|c| !c.is_padding()).map(|c| c.ch).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cells_compare_structurally() {
        assert_eq!(Cell::plain('a'), Cell::new('a', Attribute::DEFAULT, Attribute::DEFAULT));
        assert_ne!(Cell::plain('a'), Cell::new('a', Attribute::RED, Attribute::DEFAULT));
    }

    #[test]
    fn padding_is_stripped() {
        let mut line = line_from_str("中", Attribute::DEFAULT, Attribute::DEFAULT);
        line.push(Cell::plain(Cell::PADDING));
        line.push(Cell::plain('x'));
        assert_eq!(line_to_string(&line), "中x");
    }

    #[test]
    fn widths() {
        assert_eq!(Cell::plain('a').width(), 1);
        assert_eq!(Cell::plain('中').width(), 2);
        assert_eq!(Cell::plain(Cell::PADDING).width(), 0);
    }
}
