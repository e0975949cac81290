//! Story loop configuration types

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::story::DEFAULT_THRESHOLD;

/// Output limit and sampling temperature for one kind of model call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CallSettings {
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    pub temperature: f32,
}

impl CallSettings {
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

/// Configuration for the draft/judge/revise loop (the `story` section in YAML)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Minimum overall score (1-10) that ends the loop early
    #[serde(rename = "acceptance-threshold", default = "default_acceptance_threshold")]
    pub acceptance_threshold: i64,

    /// Automated revisions allowed after the first draft
    #[serde(rename = "max-revisions", default = "default_max_revisions")]
    pub max_revisions: u32,

    #[serde(default = "default_generation")]
    pub generation: CallSettings,

    #[serde(default = "default_judging")]
    pub judging: CallSettings,

    #[serde(default = "default_revision")]
    pub revision: CallSettings,
}

fn default_acceptance_threshold() -> i64 {
    debug!("default_acceptance_threshold: called");
    DEFAULT_THRESHOLD
}

fn default_max_revisions() -> u32 {
    debug!("default_max_revisions: called");
    2
}

fn default_generation() -> CallSettings {
    debug!("default_generation: called");
    CallSettings::new(1200, 0.8)
}

fn default_judging() -> CallSettings {
    debug!("default_judging: called");
    CallSettings::new(800, 0.2)
}

fn default_revision() -> CallSettings {
    debug!("default_revision: called");
    CallSettings::new(1200, 0.7)
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: default_acceptance_threshold(),
            max_revisions: default_max_revisions(),
            generation: default_generation(),
            judging: default_judging(),
            revision: default_revision(),
        }
    }
}

impl LoopConfig {
    /// Check value ranges, returning a description of the first problem found
    pub fn check(&self) -> Result<(), String> {
        debug!(?self, "LoopConfig::check: called");
        if !(1..=10).contains(&self.acceptance_threshold) {
            return Err(format!(
                "acceptance-threshold must be between 1 and 10, got {}",
                self.acceptance_threshold
            ));
        }
        for (name, settings) in [
            ("generation", &self.generation),
            ("judging", &self.judging),
            ("revision", &self.revision),
        ] {
            if !(0.0..=2.0).contains(&settings.temperature) {
                return Err(format!(
                    "{}.temperature must be between 0.0 and 2.0, got {}",
                    name, settings.temperature
                ));
            }
            if settings.max_tokens == 0 {
                return Err(format!("{}.max-tokens must be greater than 0", name));
            }
        }
        Ok(())
    }
}
