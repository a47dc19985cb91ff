//! Boundary to the rendering layer.
//!
//! - `VisualPort`: what the engine asks of a renderer
//! - `AnimationBatch`: barrier over concurrently started animations
//! - `HeadlessPort`: a recording port with no renderer, for tests

mod barrier;
mod headless;
mod port;

pub use barrier::AnimationBatch;
pub use headless::{HeadlessPort, HeadlessVisual};
pub use port::{AnimationId, Easing, MoveRequest, MoveSpec, Placement, VisualHandle, VisualPort};
