//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Storyteller system prompt
pub const STORYTELLER: &str = include_str!("../../prompts/storyteller.pmt");

/// Judge system prompt with the scoring rubric
pub const JUDGE: &str = include_str!("../../prompts/judge.pmt");

/// Reviser system prompt
pub const REVISER: &str = include_str!("../../prompts/reviser.pmt");

/// User turn for the first draft
pub const GENERATE: &str = include_str!("../../prompts/generate.pmt");

/// User turn for an evaluation
pub const EVALUATE: &str = include_str!("../../prompts/evaluate.pmt");

/// User turn for a revision
pub const REVISE: &str = include_str!("../../prompts/revise.pmt");

/// Names of every embedded template
pub const NAMES: [&str; 6] = ["storyteller", "judge", "reviser", "generate", "evaluate", "revise"];

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "storyteller" => Some(STORYTELLER),
        "judge" => Some(JUDGE),
        "reviser" => Some(REVISER),
        "generate" => Some(GENERATE),
        "evaluate" => Some(EVALUATE),
        "revise" => Some(REVISE),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_names_resolve() {
        for name in NAMES {
            let template = get_embedded(name);
            assert!(template.is_some(), "missing embedded template {}", name);
            assert!(!template.unwrap().trim().is_empty());
        }
    }

    #[test]
    fn test_judge_prompt_carries_rubric() {
        let judge = get_embedded("judge").unwrap();
        for key in [
            "age_appropriateness",
            "clarity_and_coherence",
            "emotional_tone",
            "creativity",
            "language_simplicity",
            "overall_score",
            "improvements",
        ] {
            assert!(judge.contains(key), "judge prompt missing {}", key);
        }
        assert!(judge.contains("MUST be 4 or lower"));
        assert!(judge.contains("language_simplicity should be 6"));
    }

    #[test]
    fn test_storyteller_prompt_targets_age_range() {
        assert!(STORYTELLER.contains("5 to 10"));
        assert!(STORYTELLER.contains("600 to 1000 words"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
