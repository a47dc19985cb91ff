//! The board: a fixed-size grid of cells owning tiles.
//!
//! ## Ownership
//!
//! Cells and tiles refer to each other, so both sides live in the grid:
//! - `cells`: one `Cell` per coordinate, row-major, holding `Option<TileId>`
//! - `tiles`: an arena of `Tile`s keyed by `TileId`, each holding the
//!   coordinate of its owning cell
//!
//! Every mutation (spawn, swap, move, remove) updates both sides of the link
//! in one place, so a tile is owned by exactly one cell at a time and a
//! removed tile has no cell.
//!
//! ## Usage
//!
//! ```
//! use tile_match::core::{Color, Coord, Grid};
//!
//! let mut grid = Grid::new(3, 3);
//! let a = grid.spawn(Coord::new(0, 0), Color::new(1));
//! let b = grid.spawn(Coord::new(1, 1), Color::new(2));
//!
//! grid.swap(Coord::new(0, 0), Coord::new(1, 1));
//! assert_eq!(grid.tile_id_at(Coord::new(0, 0)), Some(b));
//! assert_eq!(grid.tile(a).unwrap().cell(), Some(Coord::new(1, 1)));
//! ```

use std::ops::Index;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Color, Coord, Tile, TileId};
use crate::visual::VisualHandle;

/// Errors from checked grid access.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("coordinate {coord} is outside the {rows}x{cols} board")]
    OutOfBounds { coord: Coord, rows: usize, cols: usize },
}

/// A single board position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    coord: Coord,
    tile: Option<TileId>,
}

impl Cell {
    #[must_use]
    pub fn coord(&self) -> Coord {
        self.coord
    }

    #[must_use]
    pub fn row(&self) -> usize {
        self.coord.row
    }

    #[must_use]
    pub fn col(&self) -> usize {
        self.coord.col
    }

    /// The tile owned by this cell, if any.
    #[must_use]
    pub fn tile(&self) -> Option<TileId> {
        self.tile
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tile.is_none()
    }
}

/// One tile transfer produced by gravity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fall {
    pub tile: TileId,
    pub from: Coord,
    pub to: Coord,
}

/// Color layout of the board, row-major. Used for comparisons and debugging.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub colors: Vec<Option<Color>>,
}

impl BoardSnapshot {
    /// Color at a coordinate, `None` if empty, missing or outside the board.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<Color> {
        if coord.row >= self.rows || coord.col >= self.cols {
            return None;
        }
        self.colors.get(coord.row * self.cols + coord.col).copied().flatten()
    }

    /// Check that there is exactly one entry per cell.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.colors.len() == self.rows * self.cols
    }

    /// Build a fully occupied layout from rows of palette indices.
    ///
    /// # Panics
    ///
    /// Panics if `rows` is empty or ragged.
    #[must_use]
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        assert!(cols > 0, "Board layout must not be empty");
        assert!(
            rows.iter().all(|r| r.as_ref().len() == cols),
            "Board layout rows must have equal length"
        );

        Self {
            rows: rows.len(),
            cols,
            colors: rows
                .iter()
                .flat_map(|r| r.as_ref().iter().map(|&c| Some(Color(c))))
                .collect(),
        }
    }

    /// Number of empty entries.
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.colors.iter().filter(|c| c.is_none()).count()
    }
}

/// Fixed-size board of cells and the arena of tiles they own.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    tiles: FxHashMap<TileId, Tile>,
    next_tile: u32,
}

impl Grid {
    /// Create an empty grid.
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "Grid must have at least one cell");

        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Cell { coord: Coord::new(row, col), tile: None }))
            .collect();

        Self {
            rows,
            cols,
            cells,
            tiles: FxHashMap::default(),
            next_tile: 0,
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Check if a coordinate lies on the board.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    fn checked_slot(&self, coord: Coord) -> Result<usize, GridError> {
        if self.contains(coord) {
            Ok(coord.row * self.cols + coord.col)
        } else {
            Err(GridError::OutOfBounds {
                coord,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    fn slot(&self, coord: Coord) -> usize {
        match self.checked_slot(coord) {
            Ok(i) => i,
            Err(e) => panic!("{e}"),
        }
    }

    /// Assert that `coord` lies on the board.
    ///
    /// # Panics
    ///
    /// Panics with the `GridError::OutOfBounds` message otherwise.
    pub fn assert_on_board(&self, coord: Coord) {
        if let Err(e) = self.checked_slot(coord) {
            panic!("{e}");
        }
    }

    /// Get a cell, reporting out-of-range coordinates as an error.
    pub fn try_cell(&self, coord: Coord) -> Result<&Cell, GridError> {
        self.checked_slot(coord).map(|i| &self.cells[i])
    }

    /// Get a cell.
    ///
    /// # Panics
    ///
    /// Panics if `coord` is outside the board.
    #[must_use]
    pub fn cell(&self, coord: Coord) -> &Cell {
        &self.cells[self.slot(coord)]
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().map(|c| c.coord)
    }

    // === Tiles ===

    /// Look up a tile in the arena.
    #[must_use]
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    /// The tile id owned by the cell at `coord`.
    #[must_use]
    pub fn tile_id_at(&self, coord: Coord) -> Option<TileId> {
        self.cell(coord).tile
    }

    /// The tile owned by the cell at `coord`.
    #[must_use]
    pub fn tile_at(&self, coord: Coord) -> Option<&Tile> {
        self.tile_id_at(coord).and_then(|id| self.tiles.get(&id))
    }

    /// The color at `coord`, or `None` if the cell is empty or off the board.
    #[must_use]
    pub fn color_at(&self, coord: Coord) -> Option<Color> {
        if !self.contains(coord) {
            return None;
        }
        self.tile_at(coord).map(Tile::color)
    }

    /// Number of tiles currently on the board.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Iterate over all placed tiles in row-major cell order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells
            .iter()
            .filter_map(|c| c.tile.and_then(|id| self.tiles.get(&id)))
    }

    /// Create a new tile in an empty cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is off the board or already occupied.
    pub fn spawn(&mut self, coord: Coord, color: Color) -> TileId {
        let idx = self.slot(coord);
        assert!(
            self.cells[idx].tile.is_none(),
            "Cannot spawn into occupied cell {coord}"
        );

        let id = TileId(self.next_tile);
        self.next_tile += 1;

        self.cells[idx].tile = Some(id);
        self.tiles.insert(id, Tile::new(id, color, coord));
        id
    }

    /// Remove a tile from the board, clearing both sides of the link.
    ///
    /// Returns the removed tile, or `None` if it was not on the board.
    pub fn remove(&mut self, id: TileId) -> Option<Tile> {
        let mut tile = self.tiles.remove(&id)?;
        if let Some(coord) = tile.cell.take() {
            let idx = self.slot(coord);
            self.cells[idx].tile = None;
        }
        Some(tile)
    }

    /// Remove whatever tile occupies `coord`.
    pub fn remove_at(&mut self, coord: Coord) -> Option<Tile> {
        let id = self.tile_id_at(coord)?;
        self.remove(id)
    }

    /// Exchange the tiles owned by two cells.
    ///
    /// No legality check: either cell may be empty and they need not be
    /// adjacent. Back-references are updated for whatever tiles move.
    pub fn swap(&mut self, a: Coord, b: Coord) {
        let ia = self.slot(a);
        let ib = self.slot(b);
        if ia == ib {
            return;
        }

        let ta = self.cells[ia].tile.take();
        let tb = self.cells[ib].tile.take();
        self.cells[ia].tile = tb;
        self.cells[ib].tile = ta;

        if let Some(id) = ta {
            self.relink(id, b);
        }
        if let Some(id) = tb {
            self.relink(id, a);
        }
    }

    /// Transfer the tile at `from` into the empty cell `to`.
    ///
    /// Returns the moved tile, or `None` if `from` was empty.
    ///
    /// # Panics
    ///
    /// Panics if `to` is occupied.
    pub fn move_tile(&mut self, from: Coord, to: Coord) -> Option<TileId> {
        let ifrom = self.slot(from);
        let ito = self.slot(to);
        assert!(
            self.cells[ito].tile.is_none(),
            "Cannot move tile into occupied cell {to}"
        );

        let id = self.cells[ifrom].tile.take()?;
        self.cells[ito].tile = Some(id);
        self.relink(id, to);
        Some(id)
    }

    fn relink(&mut self, id: TileId, coord: Coord) {
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.cell = Some(coord);
        }
    }

    pub(crate) fn attach_visual(&mut self, id: TileId, handle: VisualHandle) {
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.visual = Some(handle);
        }
    }

    // === Queries ===

    /// Empty cells in row-major order. Recomputed on every call.
    pub fn empty_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().filter(|c| c.tile.is_none()).map(|c| c.coord)
    }

    /// Empty cells from the bottom-right corner upward (reverse row-major).
    pub fn empty_cells_bottom_up(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells
            .iter()
            .rev()
            .filter(|c| c.tile.is_none())
            .map(|c| c.coord)
    }

    /// Check if every cell holds a tile.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.tiles.len() == self.cells.len()
    }

    /// On-board neighbours of a cell (up to 8), in row-major order.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        self.assert_on_board(coord);
        (-1..=1)
            .flat_map(|dr| (-1..=1).map(move |dc| (dr, dc)))
            .filter(|&(dr, dc)| (dr, dc) != (0, 0))
            .filter_map(move |(dr, dc)| coord.offset(dr, dc))
            .filter(move |&c| self.contains(c))
    }

    /// Check adjacency of two on-board cells.
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is outside the board.
    #[must_use]
    pub fn are_adjacent(&self, a: Coord, b: Coord) -> bool {
        self.assert_on_board(a);
        self.assert_on_board(b);
        a.is_adjacent(b)
    }

    // === Gravity ===

    /// Compact every column toward the bottom.
    ///
    /// For each empty cell, scanning bottom to top, the nearest occupied cell
    /// above it in the same column hands its tile down. Returns the transfers
    /// in the order they were made.
    pub fn collapse(&mut self) -> Vec<Fall> {
        let mut falls = Vec::new();

        for row in (0..self.rows).rev() {
            for col in (0..self.cols).rev() {
                let to = Coord::new(row, col);
                if self.tile_id_at(to).is_some() {
                    continue;
                }

                let source = (0..row)
                    .rev()
                    .map(|r| Coord::new(r, col))
                    .find(|&c| self.tile_id_at(c).is_some());

                if let Some(from) = source {
                    if let Some(tile) = self.move_tile(from, to) {
                        falls.push(Fall { tile, from, to });
                    }
                }
            }
        }

        falls
    }

    /// Check that no column has an empty cell beneath an occupied one.
    #[must_use]
    pub fn is_compacted(&self) -> bool {
        (0..self.cols).all(|col| {
            let mut seen_tile = false;
            (0..self.rows).all(|row| {
                let occupied = self.tile_id_at(Coord::new(row, col)).is_some();
                if occupied {
                    seen_tile = true;
                    true
                } else {
                    !seen_tile
                }
            })
        })
    }

    // === Lifecycle ===

    /// Clear every cell. Returns the released tiles.
    pub fn reset(&mut self) -> Vec<Tile> {
        for cell in &mut self.cells {
            cell.tile = None;
        }
        let mut released: Vec<Tile> = self
            .tiles
            .drain()
            .map(|(_, mut tile)| {
                tile.cell = None;
                tile
            })
            .collect();
        released.sort_by_key(Tile::id);
        released
    }

    /// Replace the contents with the layout of `board`. Returns the
    /// released tiles.
    ///
    /// # Panics
    ///
    /// Panics if `board` has a different size or is not one entry per cell.
    pub fn load(&mut self, board: &BoardSnapshot) -> Vec<Tile> {
        assert!(
            (board.rows, board.cols) == (self.rows, self.cols),
            "Cannot load a {}x{} layout into a {}x{} grid",
            board.rows,
            board.cols,
            self.rows,
            self.cols
        );
        assert!(
            board.is_well_formed(),
            "Layout has {} entries for {} cells",
            board.colors.len(),
            self.cells.len()
        );

        let released = self.reset();
        for (coord, color) in self.coords().collect::<Vec<_>>().into_iter().zip(&board.colors) {
            if let Some(color) = *color {
                self.spawn(coord, color);
            }
        }
        released
    }

    /// Capture the color layout.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            rows: self.rows,
            cols: self.cols,
            colors: self.coords().map(|c| self.color_at(c)).collect(),
        }
    }

    /// Tile identities per cell, row-major.
    #[must_use]
    pub fn layout(&self) -> Vec<Option<TileId>> {
        self.cells.iter().map(|c| c.tile).collect()
    }
}

impl Index<Coord> for Grid {
    type Output = Cell;

    fn index(&self, coord: Coord) -> &Cell {
        self.cell(coord)
    }
}
