//! The turn state machine.
//!
//! ## Flow
//!
//! ```text
//! Idle --touch, touch(adjacent)--> Animating (swap)
//!   swap settled, no match  --> Animating (swap back) --settled--> Idle
//!   swap settled, matches   --> Resolving
//! Resolving: score, remove, gravity --settled--> refill --settled--> re-check
//!   matches   --> next pass
//!   no match  --> Idle
//!   session ended at any point --> SessionOver (at the end of the step)
//! SessionOver --auto restart / start()--> Idle
//! ```
//!
//! Every animated step is a batch of `move_to` requests joined by an
//! `AnimationBatch`. The board is only mutated when a batch settles, so at
//! most one completion chain is ever interpreted at a time.
//!
//! ## Driving the engine
//!
//! The host forwards three things:
//! - input: `touch(coord)`
//! - animation completions: `animation_finished(id)` or `pump()`
//! - time: `tick()` once a second, or `advance(elapsed)`

use std::time::Duration;

use tracing::{debug, info, warn};

use super::{EngineState, EngineStats, SessionOutcome, TouchOutcome};
use crate::core::{
    BoardSnapshot, Color, ConfigError, Coord, GameConfig, GameRng, GameRngState, Grid, Tile, TileId,
};
use crate::matching::{matched_tile_count, CombinationDetector, MatchGroup};
use crate::session::{SessionController, SessionObserver, SessionStatus};
use crate::visual::{AnimationBatch, AnimationId, MoveRequest, MoveSpec, Placement, VisualPort};

/// Fixed part of a refill delay, divided by `row + 1` so lower rows land first.
const REFILL_ROW_STAGGER_SECS: f32 = 0.3;

/// Board generations tried before accepting a deadlocked start.
const MAX_BOARD_ATTEMPTS: u32 = 64;

/// The animated step waiting on the current batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Swap { a: Coord, b: Coord },
    SwapBack { a: Coord, b: Coord },
    Fall,
    Refill,
}

#[derive(Debug)]
struct Pending {
    step: Step,
    batch: AnimationBatch,
}

/// Game engine: owns the board, the detector, the session and the port.
#[derive(Debug)]
pub struct GameEngine<P: VisualPort> {
    config: GameConfig,
    grid: Grid,
    detector: CombinationDetector,
    session: SessionController,
    port: P,
    rng: GameRng,
    state: EngineState,
    selected: Option<Coord>,
    pending: Option<Pending>,
    next_animation: u64,
    cascade_depth: u32,
    stats: EngineStats,
    last_outcome: Option<SessionOutcome>,
}

impl<P: VisualPort> GameEngine<P> {
    /// Build an engine and all of its components from a configuration.
    ///
    /// The board stays empty until `start()`.
    pub fn new(config: GameConfig, port: P) -> Result<Self, ConfigError> {
        let grid = Grid::new(config.rows.max(1), config.cols.max(1));
        let detector = CombinationDetector::new(config.rules.clone());
        let session = SessionController::new(config.initial_time, config.target_score);
        Self::from_parts(config, grid, detector, session, port)
    }

    /// Assemble an engine from explicitly constructed components.
    ///
    /// The grid must match the configured board size. Its contents are
    /// discarded at `start()`.
    pub fn from_parts(
        config: GameConfig,
        grid: Grid,
        detector: CombinationDetector,
        session: SessionController,
        port: P,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if (grid.rows(), grid.cols()) != (config.rows, config.cols) {
            return Err(ConfigError::GridMismatch {
                rows: config.rows,
                cols: config.cols,
                got_rows: grid.rows(),
                got_cols: grid.cols(),
            });
        }

        let rng = GameRng::new(config.seed);
        Ok(Self {
            config,
            grid,
            detector,
            session,
            port,
            rng,
            state: EngineState::Idle,
            selected: None,
            pending: None,
            next_animation: 0,
            cascade_depth: 0,
            stats: EngineStats::default(),
            last_outcome: None,
        })
    }

    /// Register a session observer (HUD, result screen).
    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.session.subscribe(observer);
    }

    // === Lifecycle ===

    /// Generate a fresh board and start a new session.
    ///
    /// Also restarts a session that ended without auto-restart. Returns
    /// false, doing nothing, while animations are in flight.
    pub fn start(&mut self) -> bool {
        if self.pending.is_some() {
            debug!(state = ?self.state, "start ignored: animations in flight");
            return false;
        }
        self.new_session();
        true
    }

    fn new_session(&mut self) {
        self.clear_selection();
        self.rebuild_board();
        self.session.start(self.config.initial_time, self.config.target_score);
        self.set_state(EngineState::Idle);
    }

    /// Start a new session on a given layout instead of a generated one.
    ///
    /// The layout must fill the board with palette colors and contain no
    /// match. It is used as given: a board without moves is not reshuffled.
    /// Returns `Ok(false)` while animations are in flight.
    pub fn start_with_board(&mut self, board: &BoardSnapshot) -> Result<bool, ConfigError> {
        if (board.rows, board.cols) != (self.grid.rows(), self.grid.cols()) {
            return Err(ConfigError::GridMismatch {
                rows: self.grid.rows(),
                cols: self.grid.cols(),
                got_rows: board.rows,
                got_cols: board.cols,
            });
        }
        if !board.is_well_formed() {
            return Err(ConfigError::LayoutLength {
                expected: board.rows * board.cols,
                got: board.colors.len(),
            });
        }
        let empty = board.empty_count();
        if empty > 0 {
            return Err(ConfigError::IncompleteBoard(empty));
        }
        let palette = self.config.palette_len();
        if let Some(&color) = board.colors.iter().flatten().find(|c| c.index() >= palette) {
            return Err(ConfigError::UnknownColor { color, palette });
        }
        let mut staged = Grid::new(board.rows, board.cols);
        staged.load(board);
        if self.detector.has_match(&staged) {
            return Err(ConfigError::StartingMatch);
        }
        if self.pending.is_some() {
            return Ok(false);
        }

        self.clear_selection();
        let released = self.grid.load(board);
        self.destroy_visuals(released);
        self.create_visuals();
        self.session.start(self.config.initial_time, self.config.target_score);
        self.set_state(EngineState::Idle);
        Ok(true)
    }

    /// Replace every tile with a freshly generated, match-free board.
    fn rebuild_board(&mut self) {
        let released = self.grid.reset();
        self.destroy_visuals(released);

        let mut attempts = 0;
        loop {
            attempts += 1;
            self.fill_empty_cells();
            self.remove_start_matches();

            if !self.config.reshuffle_on_deadlock
                || self.detector.find_possible_swap(&self.grid).is_some()
            {
                break;
            }
            if attempts >= MAX_BOARD_ATTEMPTS {
                warn!(attempts, "could not generate a board with a possible move");
                break;
            }
            self.grid.reset();
        }

        self.create_visuals();
        debug!(attempts, tiles = self.grid.tile_count(), "board generated");
    }

    fn destroy_visuals(&mut self, tiles: Vec<Tile>) {
        for handle in tiles.iter().filter_map(Tile::visual) {
            self.port.destroy(handle);
        }
    }

    /// Give every tile on the board a visual sitting in its cell.
    fn create_visuals(&mut self) {
        let placed: Vec<(TileId, Color, Coord)> = self
            .grid
            .tiles()
            .filter_map(|t| t.cell().map(|c| (t.id(), t.color(), c)))
            .collect();
        for (id, color, cell) in placed {
            let handle = self.port.create(color, Placement::Cell(cell));
            self.grid.attach_visual(id, handle);
        }
    }

    fn fill_empty_cells(&mut self) {
        let empties: Vec<Coord> = self.grid.empty_cells().collect();
        for cell in empties {
            let color = self.rng.gen_color(self.config.palette_len());
            self.grid.spawn(cell, color);
        }
    }

    /// Re-roll matched tiles until the board has no match. No score, no visuals.
    fn remove_start_matches(&mut self) {
        let mut pass = 0;
        loop {
            let groups = self.detector.find_matches(&self.grid);
            if groups.is_empty() {
                break;
            }
            pass += 1;
            debug!(pass, groups = groups.len(), "re-rolling starting matches");

            for group in &groups {
                for &id in group.tiles() {
                    self.grid.remove(id);
                }
            }
            self.fill_empty_cells();
        }
    }

    fn end_session(&mut self) {
        let session = self.session.session();
        let outcome = SessionOutcome {
            won: session.status == SessionStatus::Won,
            score: session.score,
        };

        self.session.stop();
        self.clear_selection();
        self.set_state(EngineState::SessionOver);
        self.last_outcome = Some(outcome);
        self.stats.sessions_finished += 1;
        info!(won = outcome.won, score = outcome.score, "session over");

        if self.config.auto_restart {
            self.new_session();
        }
    }

    // === Time ===

    /// One second passed.
    pub fn tick(&mut self) {
        self.session.tick();
        self.end_session_if_idle();
    }

    /// Feed elapsed wall time. Returns the number of one-second ticks fired.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let fired = self.session.advance(elapsed);
        self.end_session_if_idle();
        fired
    }

    /// An ending that happens while the board is busy waits for the next
    /// quiescent point instead.
    fn end_session_if_idle(&mut self) {
        if self.state.is_idle() && self.session.status().is_over() {
            self.end_session();
        }
    }

    // === Input ===

    /// React to a tile being touched.
    ///
    /// # Panics
    ///
    /// Panics if `coord` is outside the board.
    pub fn touch(&mut self, coord: Coord) -> TouchOutcome {
        self.grid.assert_on_board(coord);

        if !self.state.is_idle() {
            if self.state == EngineState::SessionOver {
                warn!(%coord, "touch ignored: session over");
            } else {
                debug!(%coord, state = ?self.state, "touch ignored: engine busy");
            }
            return TouchOutcome::Ignored;
        }
        if self.grid.tile_id_at(coord).is_none() {
            return TouchOutcome::Ignored;
        }

        match self.selected {
            None => {
                self.select(coord);
                TouchOutcome::Selected
            }
            Some(current) if current == coord => TouchOutcome::Unchanged,
            Some(current) if !current.is_adjacent(coord) => {
                self.clear_selection();
                self.select(coord);
                TouchOutcome::Reselected
            }
            Some(current) => {
                self.clear_selection();
                self.begin_swap(current, coord);
                TouchOutcome::SwapStarted
            }
        }
    }

    /// Ask for a swap between two cells directly, bypassing selection.
    ///
    /// Any selection is cleared. Non-adjacent pairs are refused without
    /// touching the board.
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is outside the board.
    pub fn request_swap(&mut self, a: Coord, b: Coord) -> TouchOutcome {
        let adjacent = self.grid.are_adjacent(a, b);

        if !self.state.is_idle() {
            return TouchOutcome::Ignored;
        }
        self.clear_selection();

        if !adjacent || self.grid.tile_id_at(a).is_none() || self.grid.tile_id_at(b).is_none() {
            debug!(%a, %b, "swap refused");
            return TouchOutcome::Rejected;
        }
        self.begin_swap(a, b);
        TouchOutcome::SwapStarted
    }

    fn select(&mut self, coord: Coord) {
        self.selected = Some(coord);
        self.port.highlight(coord, true);
    }

    fn clear_selection(&mut self) {
        if let Some(coord) = self.selected.take() {
            self.port.highlight(coord, false);
        }
    }

    // === Animation plumbing ===

    /// Report a finished animation.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not part of the batch in flight.
    pub fn animation_finished(&mut self, id: AnimationId) {
        let settled = match self.pending.as_mut() {
            Some(pending) => pending.batch.complete(id),
            None => panic!("Animation {id} finished but nothing is in flight"),
        };
        if !settled {
            return;
        }
        if let Some(pending) = self.pending.take() {
            self.finish_step(pending.step);
        }
    }

    /// Deliver every completion the port reports, until it reports none.
    ///
    /// Returns the number of completions delivered. With a port that
    /// completes immediately, this runs the current move to rest.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        loop {
            let finished = self.port.drain_finished();
            if finished.is_empty() {
                break;
            }
            for id in finished {
                self.animation_finished(id);
                delivered += 1;
            }
        }
        delivered
    }

    fn animate(&mut self, batch: &mut AnimationBatch, tile: TileId, target: Coord, spec: MoveSpec) {
        let Some(handle) = self.grid.tile(tile).and_then(Tile::visual) else {
            return;
        };

        let id = AnimationId(self.next_animation);
        self.next_animation += 1;
        batch.start(id);
        self.port.move_to(MoveRequest {
            id,
            handle,
            target,
            spec,
        });
    }

    /// Wait for `batch`, or run the step right away if nothing was started.
    fn await_step(&mut self, step: Step, batch: AnimationBatch) {
        if batch.is_settled() {
            self.finish_step(step);
        } else {
            self.pending = Some(Pending { step, batch });
        }
    }

    fn finish_step(&mut self, step: Step) {
        match step {
            Step::Swap { a, b } => self.on_swapped(a, b),
            Step::SwapBack { a, b } => {
                self.grid.swap(a, b);
                self.settle();
            }
            Step::Fall => self.refill(),
            Step::Refill => self.on_refilled(),
        }
    }

    // === Turn ===

    fn begin_swap(&mut self, a: Coord, b: Coord) {
        debug!(%a, %b, "swap started");
        self.stats.swaps += 1;
        self.set_state(EngineState::Animating);
        let batch = self.swap_batch(a, b);
        self.await_step(Step::Swap { a, b }, batch);
    }

    /// Move the tile at `a` to `b` and the tile at `b` to `a`, concurrently.
    fn swap_batch(&mut self, a: Coord, b: Coord) -> AnimationBatch {
        let spec = MoveSpec::linear(self.config.swap_secs);
        let mut batch = AnimationBatch::new();
        if let Some(tile) = self.grid.tile_id_at(a) {
            self.animate(&mut batch, tile, b, spec);
        }
        if let Some(tile) = self.grid.tile_id_at(b) {
            self.animate(&mut batch, tile, a, spec);
        }
        batch
    }

    fn on_swapped(&mut self, a: Coord, b: Coord) {
        self.grid.swap(a, b);

        let groups = self.detector.find_matches(&self.grid);
        if groups.is_empty() {
            debug!(%a, %b, "no match, swapping back");
            self.stats.rejected_swaps += 1;
            // The reversal restores a match-free board, so it skips detection.
            let batch = self.swap_batch(a, b);
            self.await_step(Step::SwapBack { a, b }, batch);
            return;
        }

        self.cascade_depth = 0;
        self.set_state(EngineState::Resolving);
        self.resolve(&groups);
    }

    /// One cascade pass: score, remove, then let the columns fall.
    fn resolve(&mut self, groups: &[MatchGroup]) {
        self.cascade_depth += 1;
        self.stats.cascade_passes += 1;
        self.stats.longest_cascade = self.stats.longest_cascade.max(self.cascade_depth);

        let tiles = matched_tile_count(groups);
        let points = (tiles as u32).saturating_mul(self.config.points_per_tile);
        debug!(
            pass = self.cascade_depth,
            groups = groups.len(),
            tiles,
            points,
            "resolving matches"
        );
        self.session.add_points(points);
        self.stats.tiles_cleared += tiles as u32;

        for group in groups {
            for &id in group.tiles() {
                if let Some(handle) = self.grid.remove(id).and_then(|t| t.visual()) {
                    self.port.destroy(handle);
                }
            }
        }

        let falls = self.grid.collapse();
        let spec = MoveSpec::fall(self.config.fall_secs, 0.0);
        let mut batch = AnimationBatch::new();
        for fall in &falls {
            self.animate(&mut batch, fall.tile, fall.to, spec);
        }
        self.await_step(Step::Fall, batch);
    }

    /// Fill every empty cell with a new tile dropping in from above.
    fn refill(&mut self) {
        let empties: Vec<Coord> = self.grid.empty_cells().collect();
        let mut batch = AnimationBatch::new();

        for cell in empties {
            let color = self.rng.gen_color(self.config.palette_len());
            let id = self.grid.spawn(cell, color);
            let handle = self.port.create(color, Placement::AboveBoard { col: cell.col });
            self.grid.attach_visual(id, handle);

            let delay = self.rng.gen_unit() * self.config.refill_jitter_secs
                + REFILL_ROW_STAGGER_SECS / (cell.row as f32 + 1.0);
            self.animate(&mut batch, id, cell, MoveSpec::fall(self.config.fall_secs, delay));
        }

        self.await_step(Step::Refill, batch);
    }

    fn on_refilled(&mut self) {
        if self.session.status().is_over() {
            self.end_session();
            return;
        }

        let groups = self.detector.find_matches(&self.grid);
        if groups.is_empty() {
            self.settle();
        } else {
            self.resolve(&groups);
        }
    }

    /// Quiescent point: the board is full and match-free.
    fn settle(&mut self) {
        if self.session.status().is_over() {
            self.end_session();
            return;
        }

        if self.config.reshuffle_on_deadlock && self.detector.find_possible_swap(&self.grid).is_none() {
            info!("no possible move, regenerating board");
            self.stats.reshuffles += 1;
            self.rebuild_board();
        }
        self.set_state(EngineState::Idle);
    }

    fn set_state(&mut self, state: EngineState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "engine state");
            self.state = state;
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn detector(&self) -> &CombinationDetector {
        &self.detector
    }

    #[must_use]
    pub fn session(&self) -> &SessionController {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// The selected cell, if any.
    #[must_use]
    pub fn selected(&self) -> Option<Coord> {
        self.selected
    }

    /// Number of animations the current step is still waiting for.
    #[must_use]
    pub fn animations_in_flight(&self) -> usize {
        self.pending
            .as_ref()
            .map_or(0, |p| p.batch.started() - p.batch.completed())
    }

    /// A swap that would produce a match, if the board has one.
    #[must_use]
    pub fn hint(&self) -> Option<(Coord, Coord)> {
        self.detector.find_possible_swap(&self.grid)
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<SessionOutcome> {
        self.last_outcome
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    #[must_use]
    pub fn rng_state(&self) -> GameRngState {
        self.rng.state()
    }
}
