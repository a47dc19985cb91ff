//! A `VisualPort` with no renderer behind it.
//!
//! Records every request and reports animations finished on demand. With
//! auto-completion on (the default) each `drain_finished` call completes
//! everything in flight, so `GameEngine::pump` runs a whole move to rest.
//! With it off, tests hand completions to the engine one at a time.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use super::{AnimationId, MoveRequest, Placement, VisualHandle, VisualPort};
use crate::core::{Color, Coord};

/// One live visual.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadlessVisual {
    pub color: Color,
    pub placement: Placement,
}

/// Recording port for tests, benchmarks and headless simulation.
#[derive(Clone, Debug)]
pub struct HeadlessPort {
    auto_complete: bool,
    next_handle: u32,
    live: FxHashMap<VisualHandle, HeadlessVisual>,
    destroyed: usize,
    highlighted: FxHashSet<Coord>,
    moves: Vec<MoveRequest>,
    in_flight: VecDeque<AnimationId>,
}

impl Default for HeadlessPort {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPort {
    /// A port that completes every animation when drained.
    #[must_use]
    pub fn new() -> Self {
        Self {
            auto_complete: true,
            next_handle: 0,
            live: FxHashMap::default(),
            destroyed: 0,
            highlighted: FxHashSet::default(),
            moves: Vec::new(),
            in_flight: VecDeque::new(),
        }
    }

    /// A port that never completes on its own.
    #[must_use]
    pub fn manual() -> Self {
        Self {
            auto_complete: false,
            ..Self::new()
        }
    }

    pub fn set_auto_complete(&mut self, enabled: bool) {
        self.auto_complete = enabled;
    }

    /// Animations started but not yet reported.
    #[must_use]
    pub fn in_flight(&self) -> Vec<AnimationId> {
        self.in_flight.iter().copied().collect()
    }

    /// Remove and return the oldest in-flight animation.
    pub fn pop_in_flight(&mut self) -> Option<AnimationId> {
        self.in_flight.pop_front()
    }

    /// Remove and return everything in flight.
    pub fn take_in_flight(&mut self) -> Vec<AnimationId> {
        self.in_flight.drain(..).collect()
    }

    /// Every move request seen so far.
    #[must_use]
    pub fn moves(&self) -> &[MoveRequest] {
        &self.moves
    }

    pub fn clear_moves(&mut self) {
        self.moves.clear();
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }

    #[must_use]
    pub fn visual(&self, handle: VisualHandle) -> Option<&HeadlessVisual> {
        self.live.get(&handle)
    }

    #[must_use]
    pub fn is_highlighted(&self, cell: Coord) -> bool {
        self.highlighted.contains(&cell)
    }

    #[must_use]
    pub fn highlight_count(&self) -> usize {
        self.highlighted.len()
    }
}

impl VisualPort for HeadlessPort {
    fn create(&mut self, color: Color, placement: Placement) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(handle, HeadlessVisual { color, placement });
        handle
    }

    fn move_to(&mut self, request: MoveRequest) {
        if let Some(visual) = self.live.get_mut(&request.handle) {
            visual.placement = Placement::Cell(request.target);
        }
        self.moves.push(request);
        self.in_flight.push_back(request.id);
    }

    fn destroy(&mut self, handle: VisualHandle) {
        if self.live.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }

    fn highlight(&mut self, cell: Coord, on: bool) {
        if on {
            self.highlighted.insert(cell);
        } else {
            self.highlighted.remove(&cell);
        }
    }

    fn drain_finished(&mut self) -> Vec<AnimationId> {
        if self.auto_complete {
            self.take_in_flight()
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::MoveSpec;

    fn request(id: u64, handle: VisualHandle) -> MoveRequest {
        MoveRequest {
            id: AnimationId(id),
            handle,
            target: Coord::new(2, 2),
            spec: MoveSpec::linear(0.2),
        }
    }

    #[test]
    fn test_create_and_destroy_is_idempotent() {
        let mut port = HeadlessPort::new();
        let h = port.create(Color(1), Placement::Cell(Coord::new(0, 0)));
        assert_eq!(port.live_count(), 1);

        port.destroy(h);
        port.destroy(h);
        assert_eq!(port.live_count(), 0);
        assert_eq!(port.destroyed_count(), 1);
    }

    #[test]
    fn test_auto_complete_drains_everything() {
        let mut port = HeadlessPort::new();
        let h = port.create(Color(0), Placement::AboveBoard { col: 2 });
        port.move_to(request(1, h));
        port.move_to(request(2, h));

        assert_eq!(port.drain_finished(), vec![AnimationId(1), AnimationId(2)]);
        assert!(port.drain_finished().is_empty());
        assert_eq!(port.visual(h).unwrap().placement, Placement::Cell(Coord::new(2, 2)));
    }

    #[test]
    fn test_manual_port_holds_completions() {
        let mut port = HeadlessPort::manual();
        let h = port.create(Color(0), Placement::Cell(Coord::new(0, 0)));
        port.move_to(request(5, h));

        assert!(port.drain_finished().is_empty());
        assert_eq!(port.pop_in_flight(), Some(AnimationId(5)));
        assert!(port.in_flight().is_empty());
    }

    #[test]
    fn test_highlight_tracking() {
        let mut port = HeadlessPort::new();
        port.highlight(Coord::new(1, 1), true);
        assert!(port.is_highlighted(Coord::new(1, 1)));
        port.highlight(Coord::new(1, 1), false);
        assert_eq!(port.highlight_count(), 0);
    }
}
