//! Score and countdown timer.
//!
//! ## Lifecycle
//!
//! - `start()` opens an `Active` session and starts the one-second tick
//! - `tick()` counts down; reaching zero loses the session
//! - `add_points()` counts up; reaching the target wins the session
//! - `stop()` halts the tick without touching the status
//!
//! Once the status leaves `Active` the session is frozen: ticks and points
//! are ignored until the next `start()`. The ending is reported to observers
//! exactly once.
//!
//! ## Driving the clock
//!
//! The controller owns no timer thread. The host either calls `tick()` once
//! a second or feeds frame time to `advance()`, which fires one tick per
//! whole elapsed second.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::SessionObserver;

const TICK: Duration = Duration::from_secs(1);

/// Session outcome state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    Active,
    Won,
    Lost,
}

impl SessionStatus {
    #[must_use]
    pub fn is_over(self) -> bool {
        self != SessionStatus::Active
    }
}

/// Snapshot of session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub score: u32,
    pub time_remaining: u32,
    pub target_score: u32,
    pub status: SessionStatus,
}

/// Owns score, remaining time and the win/lose decision.
pub struct SessionController {
    session: Session,
    ticking: bool,
    elapsed: Duration,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("session", &self.session)
            .field("ticking", &self.ticking)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Create a controller holding an unstarted session.
    ///
    /// The clock does not run until `start()`.
    #[must_use]
    pub fn new(initial_time: u32, target_score: u32) -> Self {
        Self {
            session: Session {
                score: 0,
                time_remaining: initial_time,
                target_score,
                status: SessionStatus::Active,
            },
            ticking: false,
            elapsed: Duration::ZERO,
            observers: Vec::new(),
        }
    }

    /// Register an observer. Observers persist across sessions.
    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Begin a fresh session.
    pub fn start(&mut self, initial_time: u32, target_score: u32) {
        self.session = Session {
            score: 0,
            time_remaining: initial_time,
            target_score,
            status: SessionStatus::Active,
        };
        self.ticking = true;
        self.elapsed = Duration::ZERO;
        info!(initial_time, target_score, "session started");
        self.notify_changed();
    }

    /// One second passed.
    pub fn tick(&mut self) {
        if !self.ticking || self.session.status.is_over() {
            return;
        }

        self.session.time_remaining = self.session.time_remaining.saturating_sub(1);
        if self.session.time_remaining == 0 {
            self.finish(SessionStatus::Lost);
        } else {
            self.notify_changed();
        }
    }

    /// Feed elapsed wall time. Returns the number of ticks fired.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.ticking {
            return 0;
        }

        self.elapsed += elapsed;
        let mut fired = 0;
        while self.ticking && self.elapsed >= TICK {
            self.elapsed -= TICK;
            self.tick();
            fired += 1;
        }
        fired
    }

    /// Add points to the score. Ignored once the session is over.
    pub fn add_points(&mut self, points: u32) {
        if self.session.status.is_over() {
            return;
        }

        self.session.score = self.session.score.saturating_add(points);
        debug!(points, score = self.session.score, "points added");
        self.notify_changed();

        if self.session.score >= self.session.target_score {
            self.finish(SessionStatus::Won);
        }
    }

    /// Halt the clock. The status is unchanged.
    pub fn stop(&mut self) {
        self.ticking = false;
    }

    fn finish(&mut self, status: SessionStatus) {
        self.session.status = status;
        self.stop();

        let won = status == SessionStatus::Won;
        info!(won, score = self.session.score, "session ended");
        for observer in &mut self.observers {
            observer.on_session_ended(won);
        }
    }

    fn notify_changed(&mut self) {
        let Session { score, time_remaining, .. } = self.session;
        for observer in &mut self.observers {
            observer.on_score_or_time_changed(score, time_remaining);
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn session(&self) -> Session {
        self.session
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.session.score
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.session.time_remaining
    }

    #[must_use]
    pub fn target_score(&self) -> u32 {
        self.session.target_score
    }

    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }
}
