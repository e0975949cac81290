//! Story pipeline components
//!
//! Classifier, storyteller, judge and reviser. Each component issues at most
//! one gateway call per operation; sequencing lives in the story loop.

pub mod classifier;
pub mod evaluation;
mod generator;
mod judge;
mod reviser;

pub use classifier::{Category, classify, guidance_for};
pub use evaluation::{
    DEFAULT_THRESHOLD, Evaluation, ScoreField, coerce_score, extract_braced, is_acceptable, parse_evaluation,
    parse_strict,
};
pub use generator::StoryGenerator;
pub use judge::Judge;
pub use reviser::Reviser;
