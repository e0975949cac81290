//! Story loop module
//!
//! Drives one request through Drafting -> Judging -> {Accepted, Revising},
//! bounded by the revision budget, then an optional user-feedback pass.
//! Every model call is awaited before the next one starts.

mod config;
mod engine;
mod observer;
mod state;

pub use config::{CallSettings, LoopConfig};
pub use engine::{StoryLoop, StoryOutcome};
pub use observer::{LoopEvent, LoopObserver, NoopObserver};
pub use state::{LoopState, Termination};
