// SPDX-License-Identifier: MIT
//
// Terminal colors and palette math.
//
// `CellColor` is the compact color a cell stores: the terminal default, a
// 256-color palette index, or 24-bit RGB. The `palette` module holds the
// xterm reference palette and the nearest-match searches used to downsample
// RGB (or high palette indices) for terminals that can only show 16, 216 or
// 24 gray colors.
//
// Matching uses a weighted ("redmean") RGB distance. It is cheap, integer
// only, and fully deterministic, which keeps downsampling a pure function of
// its input.

use std::fmt;

// ─── CellColor ───────────────────────────────────────────────────────────────

/// A resolved terminal color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// 24-bit color.
    Rgb(u8, u8, u8),
    /// 256-color palette index.
    Ansi256(u8),
    /// Whatever the terminal's theme uses.
    #[default]
    Default,
}

impl CellColor {
    /// The reference RGB value; `None` for the terminal default.
    #[must_use]
    pub fn to_rgb(self) -> Option<(u8, u8, u8)> {
        match self {
            Self::Rgb(r, g, b) => Some((r, g, b)),
            Self::Ansi256(idx) => Some(palette::ansi256_to_rgb(idx)),
            Self::Default => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Debug for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Ansi256(idx) => write!(f, "ansi({idx})"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ─── Palette ─────────────────────────────────────────────────────────────────

pub mod palette {
    //! The xterm 256-color palette and nearest-match searches.
    //!
    //! - 0–7: standard colors, 8–15: bright variants
    //! - 16–231: 6×6×6 color cube
    //! - 232–255: 24-step gray ramp

    /// xterm defaults for the first 16 entries.
    pub const ANSI16_RGB: [(u8, u8, u8); 16] = [
        (0, 0, 0),
        (205, 0, 0),
        (0, 205, 0),
        (205, 205, 0),
        (0, 0, 238),
        (205, 0, 205),
        (0, 205, 205),
        (229, 229, 229),
        (127, 127, 127),
        (255, 0, 0),
        (0, 255, 0),
        (255, 255, 0),
        (92, 92, 255),
        (255, 0, 255),
        (0, 255, 255),
        (255, 255, 255),
    ];

    /// Channel levels of the color cube.
    pub const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    /// Index of the first gray ramp entry.
    pub const GRAY_BASE: u8 = 232;

    /// Index of the first color cube entry.
    pub const CUBE_BASE: u8 = 16;

    /// Reference RGB for a palette index.
    #[must_use]
    pub const fn ansi256_to_rgb(idx: u8) -> (u8, u8, u8) {
        match idx {
            0..=15 => ANSI16_RGB[idx as usize],
            16..=231 => {
                let i = idx - CUBE_BASE;
                (
                    CUBE_LEVELS[(i / 36) as usize],
                    CUBE_LEVELS[((i % 36) / 6) as usize],
                    CUBE_LEVELS[(i % 6) as usize],
                )
            }
            232..=255 => {
                let v = gray_level(idx - GRAY_BASE);
                (v, v, v)
            }
        }
    }

    /// Channel value of gray ramp step `step` (0..24).
    #[inline]
    #[must_use]
    pub const fn gray_level(step: u8) -> u8 {
        8 + 10 * step
    }

    /// Weighted squared distance between two colors.
    #[must_use]
    pub fn distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> u32 {
        let rmean = (u32::from(a.0) + u32::from(b.0)) / 2;
        let dr = u32::from(a.0.abs_diff(b.0));
        let dg = u32::from(a.1.abs_diff(b.1));
        let db = u32::from(a.2.abs_diff(b.2));
        (((512 + rmean) * dr * dr) >> 8) + 4 * dg * dg + (((767 - rmean) * db * db) >> 8)
    }

    /// Nearest of the 16 base colors.
    #[must_use]
    pub fn nearest_ansi16(rgb: (u8, u8, u8)) -> u8 {
        let mut best = 0u8;
        let mut best_dist = u32::MAX;
        for (idx, &candidate) in (0u8..).zip(ANSI16_RGB.iter()) {
            let d = distance(rgb, candidate);
            if d < best_dist {
                best_dist = d;
                best = idx;
            }
        }
        best
    }

    /// Offset (0..216) of the nearest color cube entry.
    #[must_use]
    pub fn nearest_cube(rgb: (u8, u8, u8)) -> u8 {
        let r = nearest_level(rgb.0);
        let g = nearest_level(rgb.1);
        let b = nearest_level(rgb.2);
        36 * r + 6 * g + b
    }

    /// Step (0..24) of the nearest gray ramp entry for an RGB color,
    /// looked up by luminance.
    #[must_use]
    pub fn nearest_gray(rgb: (u8, u8, u8)) -> u8 {
        let luma = (299 * u32::from(rgb.0) + 587 * u32::from(rgb.1) + 114 * u32::from(rgb.2))
            / 1000;
        // Ramp values are 8, 18, ..., 238; round to the closest step.
        let step = (luma.saturating_sub(3) / 10).min(23);
        u8::try_from(step).unwrap_or(23)
    }

    /// Nearest entry of the full 256-color palette, searching the cube and
    /// the gray ramp (the 16 base colors vary between terminals and are
    /// skipped).
    #[must_use]
    pub fn nearest_ansi256(rgb: (u8, u8, u8)) -> u8 {
        let cube = CUBE_BASE + nearest_cube(rgb);
        let gray = GRAY_BASE + nearest_gray(rgb);
        if distance(rgb, ansi256_to_rgb(gray)) < distance(rgb, ansi256_to_rgb(cube)) {
            gray
        } else {
            cube
        }
    }

    /// Index of the cube level closest to channel value `v`.
    const fn nearest_level(v: u8) -> u8 {
        match v {
            0..=47 => 0,
            48..=114 => 1,
            _ => (v - 35) / 40,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::palette::*;
    use super::*;

    // ── CellColor ────────────────────────────────────────────────────────

    #[test]
    fn default_has_no_rgb() {
        assert_eq!(CellColor::Default.to_rgb(), None);
        assert!(CellColor::default().is_default());
    }

    #[test]
    fn palette_color_resolves_to_reference_rgb() {
        assert_eq!(CellColor::Ansi256(196).to_rgb(), Some((255, 0, 0)));
        assert_eq!(CellColor::Rgb(1, 2, 3).to_rgb(), Some((1, 2, 3)));
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", CellColor::Rgb(255, 0, 16)), "#ff0010");
        assert_eq!(format!("{}", CellColor::Ansi256(42)), "ansi(42)");
        assert_eq!(format!("{:?}", CellColor::Default), "default");
    }

    // ── Palette layout ───────────────────────────────────────────────────

    #[test]
    fn cube_corners() {
        assert_eq!(ansi256_to_rgb(16), (0, 0, 0));
        assert_eq!(ansi256_to_rgb(21), (0, 0, 255));
        assert_eq!(ansi256_to_rgb(231), (255, 255, 255));
    }

    #[test]
    fn gray_ramp_ends() {
        assert_eq!(ansi256_to_rgb(232), (8, 8, 8));
        assert_eq!(ansi256_to_rgb(255), (238, 238, 238));
    }

    // ── Nearest match ────────────────────────────────────────────────────

    #[test]
    fn exact_base_colors_match_themselves() {
        for idx in 0..16u8 {
            assert_eq!(nearest_ansi16(ANSI16_RGB[idx as usize]), idx);
        }
    }

    #[test]
    fn cube_entries_match_themselves() {
        for idx in 16..=231u8 {
            assert_eq!(CUBE_BASE + nearest_cube(ansi256_to_rgb(idx)), idx);
        }
    }

    #[test]
    fn pure_red_maps_into_the_cube() {
        assert_eq!(nearest_ansi256((255, 0, 0)), 196);
    }

    #[test]
    fn mid_gray_prefers_the_ramp() {
        assert_eq!(nearest_ansi256((128, 128, 128)), GRAY_BASE + 12);
    }

    #[test]
    fn gray_lookup_is_clamped() {
        assert_eq!(nearest_gray((0, 0, 0)), 0);
        assert_eq!(nearest_gray((255, 255, 255)), 23);
    }

    #[test]
    fn distance_is_zero_for_equal_colors() {
        assert_eq!(distance((10, 20, 30), (10, 20, 30)), 0);
        assert!(distance((0, 0, 0), (255, 255, 255)) > distance((0, 0, 0), (10, 10, 10)));
    }
}
