//! View placement: absolute cells or fractions of the terminal.

/// Where a view goes. Corners are inclusive and include the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Absolute { x0: i32, y0: i32, x1: i32, y1: i32 },
    /// Fractions of the terminal size, resolved on every layout pass.
    Fractional { x0: f32, y0: f32, x1: f32, y1: f32 },
}

impl Geometry {
    #[must_use]
    pub const fn absolute(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::Absolute { x0, y0, x1, y1 }
    }

    #[must_use]
    pub const fn fractional(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::Fractional { x0, y0, x1, y1 }
    }

    /// Resolve against a `width` × `height` terminal. A fraction `f` maps to
    /// `round(f * (dim - 1))`.
    #[must_use]
    pub fn resolve(&self, width: i32, height: i32) -> Rect {
        match *self {
            Self::Absolute { x0, y0, x1, y1 } => Rect { x0, y0, x1, y1 },
            Self::Fractional { x0, y0, x1, y1 } => Rect {
                x0: scale(x0, width),
                y0: scale(y0, height),
                x1: scale(x1, width),
                y1: scale(y1, height),
            },
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)] // terminal sizes are small
fn scale(fraction: f32, dim: i32) -> i32 {
    (fraction * (dim - 1).max(0) as f32).round() as i32
}

/// A resolved view rectangle, frame included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// No room between the corners.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Whether `(x, y)` lies on or inside the rectangle.
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Columns and rows strictly between the corners.
    #[must_use]
    pub fn inner_size(&self) -> (usize, usize) {
        let w = usize::try_from(self.x1 - self.x0 - 1).unwrap_or(0);
        let h = usize::try_from(self.y1 - self.y0 - 1).unwrap_or(0);
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn absolute_resolves_unchanged() {
        let g = Geometry::absolute(1, 2, 30, 10);
        assert_eq!(g.resolve(80, 24), Rect::new(1, 2, 30, 10));
    }

    #[test]
    fn fractional_scales_to_last_cell() {
        let g = Geometry::fractional(0.0, 0.0, 0.5, 1.0);
        assert_eq!(g.resolve(81, 25), Rect::new(0, 0, 40, 24));
    }

    #[test]
    fn fractional_follows_resize() {
        let g = Geometry::fractional(0.5, 0.0, 1.0, 1.0);
        assert_eq!(g.resolve(21, 11), Rect::new(10, 0, 20, 10));
        assert_eq!(g.resolve(41, 11), Rect::new(20, 0, 40, 10));
    }

    #[test]
    fn degenerate() {
        assert!(Rect::new(5, 0, 5, 3).is_degenerate());
        assert!(Rect::new(0, 3, 5, 2).is_degenerate());
        assert!(!Rect::new(0, 0, 1, 1).is_degenerate());
    }

    #[test]
    fn inner_size() {
        assert_eq!(Rect::new(0, 0, 11, 6).inner_size(), (10, 5));
        assert_eq!(Rect::new(0, 0, 1, 1).inner_size(), (0, 0));
    }

    #[test]
    fn contains_is_inclusive() {
        let r = Rect::new(2, 2, 5, 5);
        assert!(r.contains(2, 2));
        assert!(r.contains(5, 5));
        assert!(!r.contains(6, 5));
        assert!(!r.contains(1, 3));
    }
}
