//! Core board types: coordinates, tiles, the grid, RNG, configuration.
//!
//! These are the leaves of the engine. Nothing here knows about sessions,
//! animations or input; the engine composes them.

pub mod coord;
pub mod tile;
pub mod grid;
pub mod rng;
pub mod config;

pub use coord::Coord;
pub use tile::{Color, Tile, TileId};
pub use grid::{BoardSnapshot, Cell, Fall, Grid, GridError};
pub use rng::{GameRng, GameRngState};
pub use config::{ConfigError, GameConfig, MAX_TIMING_SECS, MIN_PALETTE};
