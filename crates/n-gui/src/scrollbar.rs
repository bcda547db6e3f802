//! Scrollbar thumb geometry.

/// Thumb `(start, height)` along a track of `track` cells, for a list of
/// `list` rows showing `page` rows from `position`.
///
/// The thumb never leaves the track, and sits flush with its end when the
/// list is scrolled to the bottom.
///
/// ```
/// use n_gui::scrollbar::scrollbar;
///
/// assert_eq!(scrollbar(15, 5, 5, 21), (7, 7));
/// assert_eq!(scrollbar(3, 10, 0, 8), (0, 8));
/// ```
#[must_use]
pub fn scrollbar(list: usize, page: usize, position: usize, track: usize) -> (usize, usize) {
    if page >= list || track == 0 {
        return (0, track);
    }
    let height = div_round(track * page, list).clamp(1, track);
    let max_position = list - page;
    let position = position.min(max_position);

    let start = if position == max_position {
        track.saturating_sub(height)
    } else {
        div_round(track * position, list).min(track.saturating_sub(height))
    };
    (start, height)
}

const fn div_round(n: usize, d: usize) -> usize {
    (n + d / 2) / d
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scenario() {
        assert_eq!(scrollbar(15, 5, 5, 21), (7, 7));
    }

    #[test]
    fn whole_list_fits() {
        assert_eq!(scrollbar(5, 5, 0, 10), (0, 10));
        assert_eq!(scrollbar(0, 3, 0, 4), (0, 4));
    }

    #[test]
    fn empty_track_has_no_thumb() {
        assert_eq!(scrollbar(100, 10, 50, 0), (0, 0));
    }

    #[test]
    fn top_and_bottom() {
        assert_eq!(scrollbar(100, 10, 0, 10), (0, 1));
        assert_eq!(scrollbar(100, 10, 90, 10), (9, 1));
        assert_eq!(scrollbar(100, 10, 500, 10), (9, 1));
    }

    #[test]
    fn thumb_stays_on_track() {
        for position in 0..=40 {
            let (start, height) = scrollbar(50, 10, position, 7);
            assert!(height >= 1);
            assert!(start + height <= 7, "position {position}");
        }
    }
}
