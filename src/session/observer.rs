//! Outbound session notifications.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Receives score/time updates and the session outcome.
///
/// Typically implemented by the HUD. Both methods default to no-ops.
pub trait SessionObserver {
    /// Score or remaining time changed.
    fn on_score_or_time_changed(&mut self, _score: u32, _time_remaining: u32) {}

    /// The session ended. Called exactly once per session.
    fn on_session_ended(&mut self, _won: bool) {}
}

/// A notification as recorded by `SessionLog`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    Changed { score: u32, time_remaining: u32 },
    Ended { won: bool },
}

/// Shared, cloneable event recorder.
///
/// Subscribe one clone to a controller and keep another to inspect what was
/// delivered.
#[derive(Clone, Debug, Default)]
pub struct SessionLog {
    events: Rc<RefCell<Vec<SessionEvent>>>,
}

impl SessionLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.borrow().clone()
    }

    /// The most recent score/time pair.
    #[must_use]
    pub fn last_change(&self) -> Option<(u32, u32)> {
        self.events.borrow().iter().rev().find_map(|e| match *e {
            SessionEvent::Changed { score, time_remaining } => Some((score, time_remaining)),
            SessionEvent::Ended { .. } => None,
        })
    }

    /// Outcomes delivered, in order.
    #[must_use]
    pub fn endings(&self) -> Vec<bool> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match *e {
                SessionEvent::Ended { won } => Some(won),
                SessionEvent::Changed { .. } => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl SessionObserver for SessionLog {
    fn on_score_or_time_changed(&mut self, score: u32, time_remaining: u32) {
        self.events
            .borrow_mut()
            .push(SessionEvent::Changed { score, time_remaining });
    }

    fn on_session_ended(&mut self, won: bool) {
        self.events.borrow_mut().push(SessionEvent::Ended { won });
    }
}
