//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for each story step.
//!
//! Template loading chain:
//! 1. `prompts.dir` from config (explicit override)
//! 2. `.bedtime/prompts/{name}.pmt` (project override)
//! 3. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{EvaluateContext, GenerateContext, PromptLoader, ReviseContext};
