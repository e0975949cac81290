//! Crate error type

use std::fmt;

use thiserror::Error;

use crate::llm::LlmError;

/// Which pipeline step issued a gateway call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Generation,
    Judging,
    Revision,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Generation => write!(f, "generation"),
            Step::Judging => write!(f, "judging"),
            Step::Revision => write!(f, "revision"),
        }
    }
}

/// Errors surfaced by the story pipeline
#[derive(Debug, Error)]
pub enum BedtimeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model call failed during {step}: {source}")]
    Backend {
        step: Step,
        #[source]
        source: LlmError,
    },

    #[error("Judge reply is not a JSON object: {reason}")]
    MalformedJudgeOutput { reason: String, raw: String },

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Cannot {action} while {state}")]
    InvalidState { action: &'static str, state: String },
}

impl BedtimeError {
    /// Wrap a gateway failure with the step that issued the call
    pub fn backend(step: Step, source: LlmError) -> Self {
        BedtimeError::Backend { step, source }
    }

    /// The step that failed, for backend errors
    pub fn step(&self) -> Option<Step> {
        match self {
            BedtimeError::Backend { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// A short suggestion for the user, when one applies
    pub fn hint(&self) -> Option<String> {
        match self {
            BedtimeError::Backend { source, .. } if source.is_auth() => {
                Some("The provider rejected the API key; check the configured key".to_string())
            }
            BedtimeError::Backend { source, .. } if source.is_rate_limit() => source
                .retry_after()
                .map(|wait| format!("Rate limited by the provider; try again in {}s", wait.as_secs())),
            BedtimeError::MalformedJudgeOutput { raw, .. } => {
                let preview: String = raw.chars().take(200).collect();
                Some(format!("The judge replied: {}", preview))
            }
            _ => None,
        }
    }
}
