//! Bedtime - a generate, judge, revise loop for children's bedtime stories
//!
//! One request becomes one story. A storyteller model writes a first draft
//! steered by a keyword classifier, a judge model scores it against a strict
//! rubric, and a reviser rewrites it until the overall score reaches the
//! threshold or the revision budget runs out. The user may then ask for one
//! more revision of their own.
//!
//! # Modules
//!
//! - [`llm`] - Model gateway trait with OpenAI and Anthropic implementations
//! - [`story`] - Classifier, generator, judge and reviser
//! - [`r#loop`] - The bounded story loop controller
//! - [`prompts`] - Handlebars prompt templates
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod llm;
pub mod prompts;
pub mod repl;
pub mod story;

// Note: 'loop' is a reserved keyword, so we use r#loop
#[path = "loop/mod.rs"]
pub mod r#loop;

// Re-export commonly used types
pub use config::{Config, LlmConfig, PromptsConfig};
pub use domain::{DraftOrigin, StoryDraft, StoryRequest};
pub use error::{BedtimeError, Step};
pub use llm::{
    AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, complete_text,
    create_client,
};
pub use prompts::PromptLoader;
pub use r#loop::{
    CallSettings, LoopConfig, LoopEvent, LoopObserver, LoopState, NoopObserver, StoryLoop, StoryOutcome, Termination,
};
pub use story::{Category, Evaluation, Judge, Reviser, StoryGenerator, classify, is_acceptable};
