//! Engine-level state and result types.

use serde::{Deserialize, Serialize};

/// Turn state of the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineState {
    /// Accepting input.
    #[default]
    Idle,
    /// A swap (or its reversal) is in flight. Input is ignored.
    Animating,
    /// The cascade loop is removing, dropping and refilling. Input is ignored.
    Resolving,
    /// The session ended and the board is frozen until restarted.
    SessionOver,
}

impl EngineState {
    /// True when input is accepted.
    #[must_use]
    pub fn is_idle(self) -> bool {
        self == EngineState::Idle
    }
}

/// What a touch did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchOutcome {
    /// The engine was busy or the session is over; nothing changed.
    Ignored,
    /// The touched tile is now selected.
    Selected,
    /// The selected tile was touched again; nothing changed.
    Unchanged,
    /// A non-adjacent tile was touched and replaced the selection.
    Reselected,
    /// A swap request between non-adjacent cells was refused.
    Rejected,
    /// An adjacent tile was touched and the swap animation started.
    SwapStarted,
}

/// How the most recent session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub won: bool,
    pub score: u32,
}

/// Running counters, for debugging and tuning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Swaps started by the player.
    pub swaps: u32,
    /// Swaps that produced no match and were reversed.
    pub rejected_swaps: u32,
    /// Cascade passes resolved, across all swaps.
    pub cascade_passes: u32,
    /// Longest chain of passes triggered by one swap.
    pub longest_cascade: u32,
    /// Tiles removed by matches.
    pub tiles_cleared: u32,
    /// Boards regenerated because no move was possible.
    pub reshuffles: u32,
    /// Sessions that reached an ending.
    pub sessions_finished: u32,
}
