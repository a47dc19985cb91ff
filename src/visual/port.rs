//! The capability the engine needs from a rendering layer.
//!
//! The engine never reasons about pixels. It names destinations by board
//! cell and asks the port to create, move, highlight and destroy visual
//! representations. Positions, sprites and tweening are the port's business.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{Color, Coord};

/// Opaque reference to a visual representation owned by the port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u32);

/// Identifies one requested animation. Allocated by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimationId(pub u64);

impl std::fmt::Display for AnimationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Anim({})", self.0)
    }
}

/// Where a new visual first appears.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Directly on a cell (board setup).
    Cell(Coord),
    /// Above the top edge of the board, in a column (refills falling in).
    AboveBoard { col: usize },
}

/// Interpolation curve hint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    /// Settling bounce used for falling tiles.
    BounceOut,
}

/// Timing of one move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSpec {
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
}

impl MoveSpec {
    /// A move with no delay and linear easing.
    #[must_use]
    pub fn linear(secs: f32) -> Self {
        Self {
            duration: Duration::from_secs_f32(secs),
            delay: Duration::ZERO,
            easing: Easing::Linear,
        }
    }

    /// A falling move with a bounce at the end.
    #[must_use]
    pub fn fall(secs: f32, delay_secs: f32) -> Self {
        Self {
            duration: Duration::from_secs_f32(secs),
            delay: Duration::from_secs_f32(delay_secs),
            easing: Easing::BounceOut,
        }
    }
}

/// A request to animate a visual toward a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Completion of this animation must be reported with this id.
    pub id: AnimationId,
    pub handle: VisualHandle,
    pub target: Coord,
    pub spec: MoveSpec,
}

/// Rendering-side collaborator of the engine.
///
/// ## Contract
///
/// Every `move_to` request must be reported finished exactly once, either by
/// the host calling `GameEngine::animation_finished` or by returning its id
/// from `drain_finished` when the engine pumps. The engine waits for every
/// animation of a batch before it mutates the board again; a lost
/// completion stalls the engine in its busy state.
pub trait VisualPort {
    /// Allocate a visual for a tile of `color`.
    fn create(&mut self, color: Color, placement: Placement) -> VisualHandle;

    /// Start animating a visual toward a cell.
    fn move_to(&mut self, request: MoveRequest);

    /// Release a visual. Must tolerate handles that were already released.
    fn destroy(&mut self, handle: VisualHandle);

    /// Show or hide the selection highlight of a cell.
    fn highlight(&mut self, _cell: Coord, _on: bool) {}

    /// Animations that finished since the last call.
    ///
    /// Frame-driven renderers can report completions here instead of
    /// calling back into the engine.
    fn drain_finished(&mut self) -> Vec<AnimationId> {
        Vec::new()
    }
}

impl<P: VisualPort + ?Sized> VisualPort for Box<P> {
    fn create(&mut self, color: Color, placement: Placement) -> VisualHandle {
        (**self).create(color, placement)
    }

    fn move_to(&mut self, request: MoveRequest) {
        (**self).move_to(request);
    }

    fn destroy(&mut self, handle: VisualHandle) {
        (**self).destroy(handle);
    }

    fn highlight(&mut self, cell: Coord, on: bool) {
        (**self).highlight(cell, on);
    }

    fn drain_finished(&mut self) -> Vec<AnimationId> {
        (**self).drain_finished()
    }
}
