// SPDX-License-Identifier: MIT
//
// Cell — one character position on the physical screen.
//
// The canvas n-gui composites into and the frame the diff renderer compares
// are both grids of these. A cell holds a codepoint, resolved foreground and
// background colors, and SGR attribute flags. Colors are already in the
// terminal's vocabulary (`CellColor`); palette downsampling happens before a
// cell is written, never during output.
//
// Wide characters (CJK, some emoji) take two columns. The first cell holds
// the codepoint and the second is a continuation cell (ch = 0) that only
// carries colors so the background fills correctly.

use crate::color::CellColor;

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// SGR attribute flags.
    ///
    /// ```
    /// use n_term::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::UNDERLINE;
    /// assert!(style.contains(Attr::UNDERLINE));
    /// assert!(!style.contains(Attr::REVERSE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1.
        const BOLD          = 1 << 0;
        /// SGR 2.
        const DIM           = 1 << 1;
        /// SGR 3.
        const ITALIC        = 1 << 2;
        /// SGR 4.
        const UNDERLINE     = 1 << 3;
        /// SGR 5.
        const BLINK         = 1 << 4;
        /// SGR 7 — swap foreground and background.
        const REVERSE       = 1 << 5;
        /// SGR 9.
        const STRIKETHROUGH = 1 << 6;
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Backend-native style: resolved colors plus attribute flags.
///
/// This is what a `set_cell` call carries. n-gui converts its packed
/// attribute values into one of these for the active output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

impl Style {
    /// Default colors, no attributes.
    pub const DEFAULT: Self = Self {
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    #[inline]
    #[must_use]
    pub const fn new(fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self { fg, bg, attrs }
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single screen cell.
///
/// `ch` is `0` for the continuation half of a wide character and a space for
/// an empty cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: u32,
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

const CONTINUATION: u32 = 0;
const SPACE: u32 = b' ' as u32;

impl Cell {
    /// Space, default colors, no attributes.
    pub const EMPTY: Self = Self {
        ch: SPACE,
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch: ch as u32,
            fg: CellColor::Default,
            bg: CellColor::Default,
            attrs: Attr::empty(),
        }
    }

    /// A cell painted with `style`.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, style: Style) -> Self {
        Self {
            ch: ch as u32,
            fg: style.fg,
            bg: style.bg,
            attrs: style.attrs,
        }
    }

    /// The second column of a wide character. The renderer skips its
    /// character output but still applies its colors.
    #[inline]
    #[must_use]
    pub const fn continuation(style: Style) -> Self {
        Self {
            ch: CONTINUATION,
            fg: style.fg,
            bg: style.bg,
            attrs: style.attrs,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// The codepoint as a `char`; `None` for continuation cells.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.ch == CONTINUATION {
            return None;
        }
        char::from_u32(self.ch)
    }

    /// The colors and attributes of this cell.
    #[inline]
    #[must_use]
    pub const fn style(self) -> Style {
        Style {
            fg: self.fg,
            bg: self.bg,
            attrs: self.attrs,
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_style(self, style: Style) -> Self {
        Self {
            fg: style.fg,
            bg: style.bg,
            attrs: style.attrs,
            ..self
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: CellColor) -> Self {
        Self { bg, ..self }
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_continuation() {
            return write!(f, "Cell(continuation)");
        }
        let ch = char::from_u32(self.ch).unwrap_or('?');
        write!(f, "Cell({ch:?}")?;
        if !self.fg.is_default() {
            write!(f, ", fg={:?}", self.fg)?;
        }
        if !self.bg.is_default() {
            write!(f, ", bg={:?}", self.bg)?;
        }
        if !self.attrs.is_empty() {
            write!(f, ", {:?}", self.attrs)?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    // ── Layout ───────────────────────────────────────────────────────────

    #[test]
    fn cell_stays_small() {
        assert!(mem::size_of::<Cell>() <= 16);
        assert_eq!(mem::size_of::<Attr>(), 1);
    }

    // ── Construction ─────────────────────────────────────────────────────

    #[test]
    fn default_cell_is_a_plain_space() {
        let cell = Cell::default();
        assert_eq!(cell, Cell::EMPTY);
        assert_eq!(cell.character(), Some(' '));
        assert_eq!(cell.style(), Style::DEFAULT);
    }

    #[test]
    fn styled_cell_carries_the_style() {
        let style = Style::new(CellColor::Ansi256(1), CellColor::Rgb(0, 0, 80), Attr::BOLD);
        let cell = Cell::styled('x', style);
        assert_eq!(cell.character(), Some('x'));
        assert_eq!(cell.style(), style);
    }

    #[test]
    fn continuation_has_no_character() {
        let cell = Cell::continuation(Style::DEFAULT);
        assert!(cell.is_continuation());
        assert_eq!(cell.character(), None);
    }

    #[test]
    fn with_style_keeps_the_character() {
        let style = Style::new(CellColor::Ansi256(2), CellColor::Default, Attr::REVERSE);
        let cell = Cell::new('日').with_style(style);
        assert_eq!(cell.character(), Some('日'));
        assert_eq!(cell.attrs, Attr::REVERSE);
    }

    // ── Debug ────────────────────────────────────────────────────────────

    #[test]
    fn debug_lists_only_non_default_fields() {
        let cell = Cell::new('A').with_bg(CellColor::Ansi256(4));
        let dbg = format!("{cell:?}");
        assert!(dbg.contains("'A'"));
        assert!(dbg.contains("bg="));
        assert!(!dbg.contains("fg="));
        assert_eq!(format!("{:?}", Cell::continuation(Style::DEFAULT)), "Cell(continuation)");
    }
}
