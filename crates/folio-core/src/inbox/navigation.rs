//! Sequential traversal of the filtered list.

/// Traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards older messages (arrow down).
    Next,
    /// Towards newer messages (arrow up).
    Previous,
}

/// Index to move to from `current` in a list of `len` items.
///
/// With nothing selected, `Next` starts at the first item and `Previous` at
/// the last. Movement is clamped to the list; there is no wraparound.
/// Returns `None` for an empty list.
#[must_use]
pub fn next_index(len: usize, current: Option<usize>, direction: Direction) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let last = len - 1;
    Some(match (current, direction) {
        (None, Direction::Next) => 0,
        (None, Direction::Previous) => last,
        (Some(i), Direction::Next) => (i + 1).min(last),
        (Some(i), Direction::Previous) => i.saturating_sub(1).min(last),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list() {
        assert_eq!(next_index(0, None, Direction::Next), None);
        assert_eq!(next_index(0, Some(3), Direction::Previous), None);
    }

    #[test]
    fn test_start_positions() {
        assert_eq!(next_index(5, None, Direction::Next), Some(0));
        assert_eq!(next_index(5, None, Direction::Previous), Some(4));
    }

    #[test]
    fn test_clamped_at_edges() {
        assert_eq!(next_index(3, Some(2), Direction::Next), Some(2));
        assert_eq!(next_index(3, Some(0), Direction::Previous), Some(0));
        assert_eq!(next_index(3, Some(1), Direction::Next), Some(2));
        assert_eq!(next_index(3, Some(1), Direction::Previous), Some(0));
    }

    #[test]
    fn test_out_of_range_current_is_clamped() {
        assert_eq!(next_index(3, Some(10), Direction::Previous), Some(2));
    }
}
