//! Turn state machine and session lifecycle.
//!
//! `GameEngine` wires the grid, detector, session controller and visual port
//! together. It is generic over the port so tests run it headless.

mod game;
mod state;

pub use game::GameEngine;
pub use state::{EngineState, EngineStats, SessionOutcome, TouchOutcome};
