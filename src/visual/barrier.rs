//! Join point for concurrently started animations.
//!
//! A batch counts how many animations were started and how many finished.
//! The engine only moves on when the batch is settled, never on the first
//! completion.

use rustc_hash::FxHashSet;

use super::AnimationId;

/// Barrier over one batch of animations.
#[derive(Clone, Debug, Default)]
pub struct AnimationBatch {
    in_flight: FxHashSet<AnimationId>,
    started: usize,
    completed: usize,
}

impl AnimationBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a started animation.
    pub fn start(&mut self, id: AnimationId) {
        let fresh = self.in_flight.insert(id);
        assert!(fresh, "Animation {id} started twice");
        self.started += 1;
    }

    /// Record a completion. Returns true once every started animation has
    /// finished.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not in flight in this batch (a completion reported
    /// twice, or for an animation the engine never started).
    pub fn complete(&mut self, id: AnimationId) -> bool {
        assert!(self.in_flight.remove(&id), "Animation {id} is not in flight");
        self.completed += 1;
        self.is_settled()
    }

    /// True when nothing is in flight. An empty batch is settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.completed == self.started
    }

    #[must_use]
    pub fn started(&self) -> usize {
        self.started
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed
    }

    #[must_use]
    pub fn contains(&self, id: AnimationId) -> bool {
        self.in_flight.contains(&id)
    }
}
