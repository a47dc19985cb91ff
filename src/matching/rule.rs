//! Declarative combination shapes.
//!
//! A rule is a list of offsets relative to an anchor cell. It matches at an
//! anchor when every offset lands on the board on a tile of the anchor's
//! color. The classic game uses two rules: three in a row and three in a
//! column.
//!
//! ```
//! use tile_match::matching::{CombinationRule, Offset};
//!
//! let row = CombinationRule::horizontal(3);
//! assert_eq!(row.offsets(), &[Offset::new(0, 1), Offset::new(0, 2)]);
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Coord;

/// Relative position from a rule's anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    pub row: i32,
    pub col: i32,
}

impl Offset {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// True for `(0, 0)`, the anchor itself.
    #[must_use]
    pub const fn is_anchor(self) -> bool {
        self.row == 0 && self.col == 0
    }

    /// Apply to an anchor coordinate. `None` if it falls off the top or left.
    #[must_use]
    pub fn apply(self, anchor: Coord) -> Option<Coord> {
        anchor.offset(self.row, self.col)
    }
}

impl From<(i32, i32)> for Offset {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

/// A combination shape anchored at one tile.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombinationRule {
    offsets: SmallVec<[Offset; 4]>,
}

impl CombinationRule {
    /// Create a rule from offsets (the anchor is implied).
    pub fn new(offsets: impl IntoIterator<Item = Offset>) -> Self {
        Self {
            offsets: offsets.into_iter().collect(),
        }
    }

    /// `len` tiles in a row, anchored at the leftmost.
    ///
    /// Panics if `len < 2`.
    #[must_use]
    pub fn horizontal(len: usize) -> Self {
        assert!(len >= 2, "A line needs at least two tiles");
        Self::new((1..len as i32).map(|c| Offset::new(0, c)))
    }

    /// `len` tiles in a column, anchored at the topmost.
    ///
    /// Panics if `len < 2`.
    #[must_use]
    pub fn vertical(len: usize) -> Self {
        assert!(len >= 2, "A line needs at least two tiles");
        Self::new((1..len as i32).map(|r| Offset::new(r, 0)))
    }

    /// Offsets, excluding the anchor.
    #[must_use]
    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    /// Number of tiles a match of this rule covers, anchor included.
    #[must_use]
    pub fn size(&self) -> usize {
        self.offsets.len() + 1
    }
}

impl FromIterator<(i32, i32)> for CombinationRule {
    fn from_iter<I: IntoIterator<Item = (i32, i32)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Offset::from))
    }
}
