//! Packed color + text-style values.
//!
//! An [`Attribute`] is one `u64`:
//!
//! | Bits   | Meaning                                         |
//! |--------|-------------------------------------------------|
//! | 0–23   | palette index, or 24-bit RGB when bit 33 is set |
//! | 32     | a color is present                              |
//! | 33     | the color is RGB                                |
//! | 40–46  | bold, blink, reverse, underline, dim, italic, strike-through |
//!
//! The color and flag fields never overlap, so `Attribute::RED |
//! Attribute::BOLD` carries both. [`Attribute::DEFAULT`] (all zero) means
//! "unset" and is distinct from palette index 0.
//!
//! Colors are stored as given and only reduced to the terminal's
//! [`OutputMode`] when a frame is drawn.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use n_term::cell::{Attr, Style};
use n_term::color::{palette, CellColor};

// ---------------------------------------------------------------------------
// Attribute
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attribute(u64);

const VALUE_MASK: u64 = 0x00FF_FFFF;
const VALID: u64 = 1 << 32;
const RGB: u64 = 1 << 33;
const COLOR_MASK: u64 = VALUE_MASK | VALID | RGB;
const STYLE_MASK: u64 = 0x7F << 40;

impl Attribute {
    pub const DEFAULT: Self = Self(0);

    pub const BLACK: Self = Self::indexed(0);
    pub const RED: Self = Self::indexed(1);
    pub const GREEN: Self = Self::indexed(2);
    pub const YELLOW: Self = Self::indexed(3);
    pub const BLUE: Self = Self::indexed(4);
    pub const MAGENTA: Self = Self::indexed(5);
    pub const CYAN: Self = Self::indexed(6);
    pub const WHITE: Self = Self::indexed(7);

    pub const BOLD: Self = Self(1 << 40);
    pub const BLINK: Self = Self(1 << 41);
    pub const REVERSE: Self = Self(1 << 42);
    pub const UNDERLINE: Self = Self(1 << 43);
    pub const DIM: Self = Self(1 << 44);
    pub const ITALIC: Self = Self(1 << 45);
    pub const STRIKETHROUGH: Self = Self(1 << 46);

    // -- Construction -------------------------------------------------------

    /// A 256-color palette entry.
    #[must_use]
    pub const fn indexed(index: u8) -> Self {
        Self(VALID | index as u64)
    }

    /// A 24-bit color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(VALID | RGB | (r as u64) << 16 | (g as u64) << 8 | b as u64)
    }

    /// A 24-bit color from `0xRRGGBB`. Bits above 24 are ignored.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self(VALID | RGB | (hex as u64 & VALUE_MASK))
    }

    /// Raw packed value.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    // -- Queries ------------------------------------------------------------

    #[must_use]
    pub const fn is_default(self) -> bool {
        self.0 & VALID == 0
    }

    #[must_use]
    pub const fn is_rgb(self) -> bool {
        self.0 & (VALID | RGB) == VALID | RGB
    }

    /// The palette index, if this is a palette color.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // masked to 8 bits
    pub const fn index(self) -> Option<u8> {
        if self.0 & (VALID | RGB) == VALID {
            Some((self.0 & 0xFF) as u8)
        } else {
            None
        }
    }

    /// Reference RGB of the color; `None` when unset.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // each channel is masked to 8 bits
    pub const fn to_rgb(self) -> Option<(u8, u8, u8)> {
        if self.is_rgb() {
            let v = self.0 & VALUE_MASK;
            Some(((v >> 16) as u8, (v >> 8 & 0xFF) as u8, (v & 0xFF) as u8))
        } else if let Some(index) = self.index() {
            Some(palette::ansi256_to_rgb(index))
        } else {
            None
        }
    }

    /// `0xRRGGBB` of the color; `None` when unset.
    #[must_use]
    pub fn hex(self) -> Option<u32> {
        self.to_rgb()
            .map(|(r, g, b)| u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b))
    }

    /// Only the color part.
    #[must_use]
    pub const fn color(self) -> Self {
        Self(self.0 & COLOR_MASK)
    }

    /// Only the style flags.
    #[must_use]
    pub const fn style(self) -> Self {
        Self(self.0 & STYLE_MASK)
    }

    /// Whether every style flag in `flags` is set.
    #[must_use]
    pub const fn contains(self, flags: Self) -> bool {
        let wanted = flags.0 & STYLE_MASK;
        self.0 & wanted == wanted
    }

    /// This value with the style flags in `flags` cleared.
    #[must_use]
    pub const fn without(self, flags: Self) -> Self {
        Self(self.0 & !(flags.0 & STYLE_MASK))
    }

    /// This value's flags with `color`'s color part.
    #[must_use]
    pub const fn with_color(self, color: Self) -> Self {
        Self((self.0 & !COLOR_MASK) | (color.0 & COLOR_MASK))
    }

    // -- Output -------------------------------------------------------------

    /// Reduce the color to what `mode` can display.
    #[must_use]
    pub fn to_cell_color(self, mode: OutputMode) -> CellColor {
        if let Some(index) = self.index() {
            return match mode {
                OutputMode::Normal if index < 16 => CellColor::Ansi256(index),
                OutputMode::Normal => {
                    CellColor::Ansi256(palette::nearest_ansi16(palette::ansi256_to_rgb(index)))
                }
                OutputMode::Colors256 | OutputMode::TrueColor => CellColor::Ansi256(index),
                OutputMode::Colors216 if index < 216 => {
                    CellColor::Ansi256(palette::CUBE_BASE + index)
                }
                OutputMode::Grayscale if index < 24 => {
                    CellColor::Ansi256(palette::GRAY_BASE + index)
                }
                OutputMode::Colors216 | OutputMode::Grayscale => CellColor::Default,
            };
        }
        let Some(rgb) = self.to_rgb() else {
            return CellColor::Default;
        };
        match mode {
            OutputMode::Normal => CellColor::Ansi256(palette::nearest_ansi16(rgb)),
            OutputMode::Colors256 => CellColor::Ansi256(palette::nearest_ansi256(rgb)),
            OutputMode::Colors216 => CellColor::Ansi256(palette::CUBE_BASE + palette::nearest_cube(rgb)),
            OutputMode::Grayscale => CellColor::Ansi256(palette::GRAY_BASE + palette::nearest_gray(rgb)),
            OutputMode::TrueColor => CellColor::Rgb(rgb.0, rgb.1, rgb.2),
        }
    }

    fn attrs(self) -> Attr {
        const TABLE: [(Attribute, Attr); 7] = [
            (Attribute::BOLD, Attr::BOLD),
            (Attribute::BLINK, Attr::BLINK),
            (Attribute::REVERSE, Attr::REVERSE),
            (Attribute::UNDERLINE, Attr::UNDERLINE),
            (Attribute::DIM, Attr::DIM),
            (Attribute::ITALIC, Attr::ITALIC),
            (Attribute::STRIKETHROUGH, Attr::STRIKETHROUGH),
        ];
        TABLE
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .fold(Attr::empty(), |acc, (_, attr)| acc | *attr)
    }
}

impl BitOr for Attribute {
    type Output = Self;

    /// Merges style flags. When both sides carry a color, the right one wins.
    fn bitor(self, rhs: Self) -> Self {
        let color = if rhs.is_default() { self.color() } else { rhs.color() };
        Self((self.0 | rhs.0) & STYLE_MASK | color.0)
    }
}

impl BitOrAssign for Attribute {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(index) = self.index() {
            parts.push(format!("ansi({index})"));
        } else if let Some(hex) = self.hex() {
            parts.push(format!("#{hex:06x}"));
        } else {
            parts.push("default".to_string());
        }
        for (flag, name) in [
            (Self::BOLD, "bold"),
            (Self::BLINK, "blink"),
            (Self::REVERSE, "reverse"),
            (Self::UNDERLINE, "underline"),
            (Self::DIM, "dim"),
            (Self::ITALIC, "italic"),
            (Self::STRIKETHROUGH, "strike"),
        ] {
            if self.contains(flag) {
                parts.push(name.to_string());
            }
        }
        write!(f, "Attribute({})", parts.join("|"))
    }
}

// ---------------------------------------------------------------------------
// Output mode
// ---------------------------------------------------------------------------

/// How many colors the terminal is assumed to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputMode {
    /// The 16 base colors.
    #[default]
    Normal,
    Colors256,
    /// The 6×6×6 cube only; palette indices address cube entries.
    Colors216,
    /// The 24-step gray ramp only; palette indices address ramp steps.
    Grayscale,
    TrueColor,
}

/// Build the backend style for one cell. Style flags from `fg` and `bg` are
/// merged.
#[must_use]
pub fn to_style(fg: Attribute, bg: Attribute, mode: OutputMode) -> Style {
    Style::new(
        fg.to_cell_color(mode),
        bg.to_cell_color(mode),
        (fg.style() | bg.style()).attrs(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
