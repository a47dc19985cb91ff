//! Session scoring and timing.
//!
//! The controller decides when a session is won or lost; observers (the
//! HUD, result screens) are told about every change.

mod controller;
mod observer;

pub use controller::{Session, SessionController, SessionStatus};
pub use observer::{SessionEvent, SessionLog, SessionObserver};
