//! Combination rules and match detection.
//!
//! Rules are read-only configuration; the detector scans the grid against
//! them and returns merged, disjoint groups of tiles.

mod detector;
mod rule;

pub use detector::{matched_tile_count, CombinationDetector, MatchGroup};
pub use rule::{CombinationRule, Offset};
