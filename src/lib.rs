//! # tile-match
//!
//! A deterministic rule engine for grid-based tile-matching puzzles.
//!
//! ## Design Principles
//!
//! 1. **Rendering-Agnostic**: The engine never draws. Every visual effect
//!    goes through the `VisualPort` trait, and every animation it starts is
//!    reported back by id before the board moves on.
//!
//! 2. **Data-Driven Rules**: What counts as a match is a list of offset
//!    patterns in `GameConfig`, not code.
//!
//! 3. **Reproducible**: All randomness comes from a seeded ChaCha8 stream,
//!    so a seed and a sequence of touches replay exactly.
//!
//! ## Architecture
//!
//! - **Arena Board**: The grid owns the tiles; cells and tiles refer to
//!   each other by `Coord` and `TileId`, never by pointer.
//!
//! - **Batch Barriers**: Each animated step (swap, fall, refill) is one
//!   `AnimationBatch`. The next step starts only when all of it settled.
//!
//! - **Host-Driven Clock**: The session timer ticks when the host says so.
//!
//! ## Modules
//!
//! - `core`: Coordinates, tiles, the grid, RNG, configuration
//! - `matching`: Combination rules and match detection
//! - `session`: Score, countdown and session observers
//! - `visual`: The rendering port, animation barriers, a headless port
//! - `engine`: The turn state machine
//!
//! ## Example
//!
//! ```
//! use tile_match::{Coord, GameConfig, GameEngine, HeadlessPort, TouchOutcome};
//!
//! let mut engine = GameEngine::new(GameConfig::default(), HeadlessPort::new()).unwrap();
//! engine.start();
//!
//! assert_eq!(engine.touch(Coord::new(0, 0)), TouchOutcome::Selected);
//! assert_eq!(engine.touch(Coord::new(0, 1)), TouchOutcome::SwapStarted);
//!
//! // The headless port finishes every animation when drained.
//! engine.pump();
//! assert!(engine.is_idle());
//! ```

pub mod core;
pub mod engine;
pub mod matching;
pub mod session;
pub mod visual;

// Re-export commonly used types
pub use crate::core::{
    BoardSnapshot, Cell, Color, ConfigError, Coord, Fall, GameConfig, GameRng, GameRngState, Grid,
    GridError, Tile, TileId,
};

pub use crate::matching::{matched_tile_count, CombinationDetector, CombinationRule, MatchGroup, Offset};

pub use crate::session::{
    Session, SessionController, SessionEvent, SessionLog, SessionObserver, SessionStatus,
};

pub use crate::visual::{
    AnimationBatch, AnimationId, Easing, HeadlessPort, MoveRequest, MoveSpec, Placement,
    VisualHandle, VisualPort,
};

pub use crate::engine::{EngineState, EngineStats, GameEngine, SessionOutcome, TouchOutcome};
