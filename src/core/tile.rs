//! Tiles and their colors.
//!
//! ## Color
//!
//! An opaque index into the configured palette. The engine only compares
//! colors for equality; the renderer maps them to sprites by palette name.
//!
//! ## Tile
//!
//! A tile is identity-bearing: two tiles of the same color are still
//! different tiles, so animations can follow one specific tile across
//! swaps and falls. Tiles live in the grid's arena and are addressed by
//! `TileId`.

use serde::{Deserialize, Serialize};

use super::Coord;
use crate::visual::VisualHandle;

/// Palette index of a tile color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Color(pub u8);

impl Color {
    /// Create a new color from a palette index.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Get the palette index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Color({})", self.0)
    }
}

/// Unique identifier for a tile.
///
/// Allocated by the grid, never reused within a grid's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl TileId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tile({})", self.0)
    }
}

/// A colored unit occupying one cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    id: TileId,
    color: Color,
    /// Back-reference to the owning cell. `None` once removed.
    pub(crate) cell: Option<Coord>,
    /// Visual representation, attached by the engine.
    pub(crate) visual: Option<VisualHandle>,
}

impl Tile {
    pub(crate) fn new(id: TileId, color: Color, cell: Coord) -> Self {
        Self {
            id,
            color,
            cell: Some(cell),
            visual: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> TileId {
        self.id
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// The cell currently owning this tile.
    #[must_use]
    pub fn cell(&self) -> Option<Coord> {
        self.cell
    }

    /// The visual representation, if one has been created.
    #[must_use]
    pub fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }

    /// Check adjacency with another placed tile.
    ///
    /// Returns false if either tile has been removed from the board.
    #[must_use]
    pub fn is_neighbour(&self, other: &Tile) -> bool {
        match (self.cell, other.cell) {
            (Some(a), Some(b)) => a.is_adjacent(b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_index() {
        let c = Color::new(5);
        assert_eq!(c.index(), 5);
        assert_eq!(format!("{}", c), "Color(5)");
    }

    #[test]
    fn test_neighbour_requires_placement() {
        let a = Tile::new(TileId(0), Color(0), Coord::new(0, 0));
        let mut b = Tile::new(TileId(1), Color(1), Coord::new(1, 1));
        assert!(a.is_neighbour(&b));

        b.cell = None;
        assert!(!a.is_neighbour(&b));
    }

    #[test]
    fn test_tile_id_serde() {
        let id = TileId(17);
        let json = serde_json::to_string(&id).unwrap();
        let back: TileId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
