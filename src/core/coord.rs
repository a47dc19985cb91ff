//! Board coordinates.
//!
//! A `Coord` names a cell by `(row, col)`. Row 0 is the top of the board,
//! so gravity pulls tiles toward higher row numbers.

use serde::{Deserialize, Serialize};

/// Position of a cell on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Apply a signed offset, returning `None` if the result would be negative.
    ///
    /// Upper bounds are not checked here; the grid decides what is in range.
    #[must_use]
    pub fn offset(self, d_row: i32, d_col: i32) -> Option<Self> {
        let row = self.row as i64 + i64::from(d_row);
        let col = self.col as i64 + i64::from(d_col);
        if row < 0 || col < 0 {
            return None;
        }
        Some(Self::new(row as usize, col as usize))
    }

    /// Check 8-directional adjacency.
    ///
    /// Two cells are adjacent when both deltas are at most 1.
    /// A cell is not adjacent to itself.
    ///
    /// ```
    /// use tile_match::core::Coord;
    ///
    /// let c = Coord::new(3, 3);
    /// assert!(c.is_adjacent(Coord::new(2, 4)));
    /// assert!(!c.is_adjacent(Coord::new(3, 5)));
    /// assert!(!c.is_adjacent(c));
    /// ```
    #[must_use]
    pub fn is_adjacent(self, other: Self) -> bool {
        self != other && self.row.abs_diff(other.row) <= 1 && self.col.abs_diff(other.col) <= 1
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
