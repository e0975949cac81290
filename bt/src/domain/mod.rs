//! Domain types for bedtime stories
//!
//! The request a run is built around and the drafts it produces. Nothing here
//! outlives a single run.

mod draft;
mod request;

pub use draft::{DraftOrigin, StoryDraft};
pub use request::StoryRequest;
