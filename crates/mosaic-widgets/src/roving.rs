#![forbid(unsafe_code)]

//! Roving focus: one tab stop per group, arrow keys move the active index.
//!
//! Menus and listboxes keep focus on a single element and track an active
//! index among their items. Traversal wraps at both ends and skips items the
//! caller reports as unavailable (disabled entries, separators).
//!
//! # Invariants
//!
//! - [`step`] never lands on an unavailable index.
//! - Stepping `n` times from an available index, where `n` is the number of
//!   available items, returns to the start.
//! - When nothing qualifies the starting index is returned unchanged.

/// Traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Down / right / next.
    Forward,
    /// Up / left / previous.
    Backward,
}

/// Next available index after `from`, wrapping around `len` items.
///
/// With no starting index the search begins just outside the list, so
/// `Forward` yields the first available item and `Backward` the last.
#[must_use]
pub fn step(
    len: usize,
    from: Option<usize>,
    direction: Direction,
    available: impl Fn(usize) -> bool,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let mut index = match (from, direction) {
        (Some(i), _) => i.min(len - 1),
        (None, Direction::Forward) => len - 1,
        (None, Direction::Backward) => 0,
    };
    for _ in 0..len {
        index = match direction {
            Direction::Forward => (index + 1) % len,
            Direction::Backward => (index + len - 1) % len,
        };
        if available(index) {
            return Some(index);
        }
    }
    from
}

/// First available index.
#[must_use]
pub fn first(len: usize, available: impl Fn(usize) -> bool) -> Option<usize> {
    (0..len).find(|&i| available(i))
}

/// Last available index.
#[must_use]
pub fn last(len: usize, available: impl Fn(usize) -> bool) -> Option<usize> {
    (0..len).rev().find(|&i| available(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    // index 1 and 3 unavailable
    fn avail(i: usize) -> bool {
        i != 1 && i != 3
    }

    #[test]
    fn forward_skips_and_wraps() {
        assert_eq!(step(5, Some(0), Direction::Forward, avail), Some(2));
        assert_eq!(step(5, Some(2), Direction::Forward, avail), Some(4));
        assert_eq!(step(5, Some(4), Direction::Forward, avail), Some(0));
    }

    #[test]
    fn backward_skips_and_wraps() {
        assert_eq!(step(5, Some(0), Direction::Backward, avail), Some(4));
        assert_eq!(step(5, Some(4), Direction::Backward, avail), Some(2));
        assert_eq!(step(5, Some(2), Direction::Backward, avail), Some(0));
    }

    #[test]
    fn no_start_picks_the_ends() {
        assert_eq!(step(5, None, Direction::Forward, avail), Some(0));
        assert_eq!(step(5, None, Direction::Backward, |i| i < 3), Some(2));
    }

    #[test]
    fn nothing_available_keeps_start() {
        assert_eq!(step(3, Some(1), Direction::Forward, |_| false), Some(1));
        assert_eq!(step(3, None, Direction::Forward, |_| false), None);
        assert_eq!(step(0, Some(0), Direction::Forward, |_| true), None);
    }

    #[test]
    fn single_available_item_returns_to_itself() {
        assert_eq!(step(4, Some(2), Direction::Forward, |i| i == 2), Some(2));
    }

    #[test]
    fn first_and_last() {
        assert_eq!(first(5, |i| i > 1), Some(2));
        assert_eq!(last(5, |i| i < 3), Some(2));
        assert_eq!(first(5, |_| false), None);
        assert_eq!(last(0, |_| true), None);
    }
}
