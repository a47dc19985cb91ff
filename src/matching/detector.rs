//! Combination detection.
//!
//! ## Algorithm
//!
//! Every occupied cell is tried as an anchor (row-major) against every rule
//! (in configuration order). A rule matches when all of its offset cells are
//! on the board and hold the anchor's color; the anchor and those cells form
//! a candidate.
//!
//! Candidates that share a cell are merged, so an L, T or cross made of a
//! row match and a column match becomes one group and no tile is scored or
//! removed twice in a pass.
//!
//! ## Determinism
//!
//! Groups come out in the order their first candidate was found. A merged
//! group keeps the position of its earliest member. Cells inside a group are
//! in discovery order.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

use super::CombinationRule;
use crate::core::{Color, Coord, Grid, TileId};

/// A set of same-colored tiles removed together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchGroup {
    color: Color,
    cells: SmallVec<[Coord; 8]>,
    tiles: SmallVec<[TileId; 8]>,
}

impl MatchGroup {
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Cells covered by the group, in discovery order.
    #[must_use]
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Tiles in the group, parallel to `cells()`.
    #[must_use]
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }
}

/// Total number of tiles across groups.
#[must_use]
pub fn matched_tile_count(groups: &[MatchGroup]) -> usize {
    groups.iter().map(MatchGroup::len).sum()
}

/// Finds rule-satisfying groups on a grid.
#[derive(Clone, Debug)]
pub struct CombinationDetector {
    rules: Vec<CombinationRule>,
}

impl CombinationDetector {
    /// Create a detector for a fixed rule list.
    #[must_use]
    pub fn new(rules: Vec<CombinationRule>) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &[CombinationRule] {
        &self.rules
    }

    /// Cells covered by `rule` anchored at `anchor`, if it matches.
    fn rule_cells<F>(
        rule: &CombinationRule,
        anchor: Coord,
        color: Color,
        rows: usize,
        cols: usize,
        color_at: &F,
    ) -> Option<SmallVec<[Coord; 8]>>
    where
        F: Fn(Coord) -> Option<Color>,
    {
        let mut cells = SmallVec::new();
        cells.push(anchor);

        for offset in rule.offsets() {
            let c = offset.apply(anchor)?;
            if c.row >= rows || c.col >= cols || color_at(c) != Some(color) {
                return None;
            }
            cells.push(c);
        }

        Some(cells)
    }

    /// Visit every candidate match in scan order. Stops when `visit` returns false.
    fn scan<F, V>(&self, rows: usize, cols: usize, color_at: F, mut visit: V)
    where
        F: Fn(Coord) -> Option<Color>,
        V: FnMut(Color, SmallVec<[Coord; 8]>) -> bool,
    {
        for row in 0..rows {
            for col in 0..cols {
                let anchor = Coord::new(row, col);
                let Some(color) = color_at(anchor) else {
                    continue;
                };

                for rule in &self.rules {
                    if let Some(cells) = Self::rule_cells(rule, anchor, color, rows, cols, &color_at) {
                        if !visit(color, cells) {
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Find all disjoint match groups on the grid.
    ///
    /// Returns an empty vector when the board has no match.
    #[must_use]
    pub fn find_matches(&self, grid: &Grid) -> Vec<MatchGroup> {
        let mut groups: Vec<Option<(Color, SmallVec<[Coord; 8]>)>> = Vec::new();
        let mut owner: FxHashMap<Coord, usize> = FxHashMap::default();

        self.scan(grid.rows(), grid.cols(), |c| grid.color_at(c), |color, cells| {
            trace!(anchor = %cells[0], size = cells.len(), "candidate match");

            let mut hits: SmallVec<[usize; 4]> =
                cells.iter().filter_map(|c| owner.get(c).copied()).collect();
            hits.sort_unstable();
            hits.dedup();

            let target = if let Some(&first) = hits.first() {
                first
            } else {
                groups.push(Some((color, SmallVec::new())));
                groups.len() - 1
            };

            for &other in hits.iter().skip(1) {
                if let Some((_, moved)) = groups[other].take() {
                    for c in &moved {
                        owner.insert(*c, target);
                    }
                    if let Some((_, into)) = groups[target].as_mut() {
                        into.extend(moved);
                    }
                }
            }

            for c in cells {
                if let std::collections::hash_map::Entry::Vacant(slot) = owner.entry(c) {
                    slot.insert(target);
                    if let Some((_, into)) = groups[target].as_mut() {
                        into.push(c);
                    }
                }
            }

            true
        });

        groups
            .into_iter()
            .flatten()
            .map(|(color, cells)| {
                let tiles = cells
                    .iter()
                    .filter_map(|&c| grid.tile_id_at(c))
                    .collect();
                MatchGroup { color, cells, tiles }
            })
            .collect()
    }

    /// Check whether the grid has at least one match.
    #[must_use]
    pub fn has_match(&self, grid: &Grid) -> bool {
        self.any_match(grid.rows(), grid.cols(), |c| grid.color_at(c))
    }

    fn any_match<F>(&self, rows: usize, cols: usize, color_at: F) -> bool
    where
        F: Fn(Coord) -> Option<Color>,
    {
        let mut found = false;
        self.scan(rows, cols, color_at, |_, _| {
            found = true;
            false
        });
        found
    }

    /// Find the first adjacent swap that would produce a match.
    ///
    /// Pairs are tried row-major by first cell, then by neighbour order.
    /// The grid is not modified; the swap is evaluated on a virtual view.
    /// Returns `None` when the board is deadlocked.
    #[must_use]
    pub fn find_possible_swap(&self, grid: &Grid) -> Option<(Coord, Coord)> {
        for a in grid.coords() {
            for b in grid.neighbors(a).filter(|&b| b > a) {
                let (ca, cb) = (grid.color_at(a), grid.color_at(b));
                if ca == cb {
                    continue;
                }

                let swapped = |c: Coord| {
                    if c == a {
                        cb
                    } else if c == b {
                        ca
                    } else {
                        grid.color_at(c)
                    }
                };

                if self.any_match(grid.rows(), grid.cols(), swapped) {
                    return Some((a, b));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a grid from rows of color digits; '.' leaves a cell empty.
    fn grid_from(rows: &[&str]) -> Grid {
        let mut grid = Grid::new(rows.len(), rows[0].len());
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                if let Some(d) = ch.to_digit(10) {
                    grid.spawn(Coord::new(r, c), Color(d as u8));
                }
            }
        }
        grid
    }

    fn triples() -> CombinationDetector {
        CombinationDetector::new(vec![CombinationRule::horizontal(3), CombinationRule::vertical(3)])
    }

    #[test]
    fn test_no_matches() {
        let grid = grid_from(&["012", "120", "201"]);
        assert!(triples().find_matches(&grid).is_empty());
        assert!(!triples().has_match(&grid));
    }

    #[test]
    fn test_single_row_match() {
        let grid = grid_from(&["1112", "0230", "3023"]);
        let groups = triples().find_matches(&grid);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].color(), Color(1));
        assert_eq!(groups[0].cells(), &[Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)]);
    }

    #[test]
    fn test_four_in_a_row_is_one_group() {
        let grid = grid_from(&["2222", "0101"]);
        let groups = triples().find_matches(&grid);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 4);
    }

    #[test]
    fn test_l_shape_merges() {
        let grid = grid_from(&["300", "312", "311", "000"]);
        // Column of 3s at col 0 plus the bottom row of 0s are separate.
        let groups = triples().find_matches(&grid);

        let threes = groups.iter().find(|g| g.color() == Color(3)).unwrap();
        assert_eq!(threes.len(), 3);

        let grid = grid_from(&["5..", "5..", "555"]);
        let groups = triples().find_matches(&grid);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 5);
    }

    #[test]
    fn test_cross_merges_into_one_group() {
        let grid = grid_from(&[".4.", "444", ".4."]);
        let groups = triples().find_matches(&grid);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 5);
        assert!(groups[0].contains(Coord::new(1, 1)));
    }

    #[test]
    fn test_late_candidate_bridges_two_groups() {
        // Two vertical triples found from row 0, then a horizontal triple
        // anchored on row 2 touches both.
        let detector = triples();
        let grid = grid_from(&["1.1", "1.1", "111"]);
        let groups = detector.find_matches(&grid);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 7);
    }

    #[test]
    fn test_disjoint_groups_stay_separate_and_ordered() {
        let grid = grid_from(&["000", "121", "333"]);
        let groups = triples().find_matches(&grid);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].color(), Color(0));
        assert_eq!(groups[1].color(), Color(3));
        assert_eq!(matched_tile_count(&groups), 6);
    }

    #[test]
    fn test_empty_cells_never_match() {
        let grid = grid_from(&["...", "...", "..."]);
        assert!(triples().find_matches(&grid).is_empty());
    }

    #[test]
    fn test_rule_off_board_edge() {
        let grid = grid_from(&["011", "200"]);
        assert!(triples().find_matches(&grid).is_empty());
    }

    #[test]
    fn test_tiles_parallel_cells() {
        let grid = grid_from(&["777"]);
        let groups = triples().find_matches(&grid);
        for (cell, tile) in groups[0].cells().iter().zip(groups[0].tiles()) {
            assert_eq!(grid.tile_id_at(*cell), Some(*tile));
        }
    }

    #[test]
    fn test_custom_diagonal_rule() {
        let detector = CombinationDetector::new(vec![[(1, 1), (2, 2)].into_iter().collect()]);
        let grid = grid_from(&["100", "210", "021"]);
        let groups = detector.find_matches(&grid);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].cells(), &[Coord::new(0, 0), Coord::new(1, 1), Coord::new(2, 2)]);
    }

    #[test]
    fn test_find_possible_swap() {
        let grid = grid_from(&["110", "002", "343"]);
        let detector = triples();
        assert!(!detector.has_match(&grid));

        let (a, b) = detector.find_possible_swap(&grid).unwrap();
        let mut swapped = grid.clone();
        swapped.swap(a, b);
        assert!(detector.has_match(&swapped));
        // The grid itself is untouched.
        assert!(!detector.has_match(&grid));
    }

    #[test]
    fn test_deadlocked_board() {
        let grid = grid_from(&["01", "23"]);
        assert_eq!(triples().find_possible_swap(&grid), None);
    }
}
