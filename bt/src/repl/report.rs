//! Progress and result rendering

use colored::Colorize;
use serde_json::Value;

use crate::domain::{DraftOrigin, StoryDraft};
use crate::r#loop::{LoopEvent, LoopObserver, Termination};
use crate::story::Evaluation;

/// Prints loop progress to stdout as it happens
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl LoopObserver for ConsoleReporter {
    fn on_event(&mut self, event: &LoopEvent<'_>) {
        match event {
            LoopEvent::DraftReady { draft } => {
                let title = match draft.origin {
                    DraftOrigin::Generated => "INITIAL STORY".to_string(),
                    DraftOrigin::Revised => format!("REVISED STORY (revision {})", draft.version),
                    DraftOrigin::UserRevised => "STORY WITH YOUR CHANGES".to_string(),
                };
                println!("{}", render_story(&title, draft));
                println!("{}", "Evaluating story quality and safety...".dimmed());
            }
            LoopEvent::Evaluated { evaluation, round } => {
                println!("{}", format!("----- JUDGE RESULT (round {}) -----", round).bright_cyan());
                println!("{}", render_summary(evaluation));
            }
            LoopEvent::Revising {
                revision,
                max_revisions,
            } => {
                println!(
                    "{}",
                    format!(
                        "Story not good enough yet (revision {} of {}). Revising based on judge feedback...",
                        revision, max_revisions
                    )
                    .yellow()
                );
                println!();
            }
            LoopEvent::Accepted { termination } => match termination {
                Termination::Passed => println!("{}", "Story accepted by the judge.".green().bold()),
                Termination::Exhausted => println!(
                    "{}",
                    "Revision budget used up; keeping the latest draft.".yellow().bold()
                ),
            },
            LoopEvent::ApplyingFeedback { .. } => {
                println!();
                println!(
                    "{}",
                    "Revising story based on your feedback (and still respecting safety)...".dimmed()
                );
                println!();
            }
            LoopEvent::Finished => {}
        }
    }
}

/// A titled story block
pub fn render_story(title: &str, draft: &StoryDraft) -> String {
    format!(
        "{}\n\n{}\n",
        format!("----- {} -----", title).bright_cyan().bold(),
        draft.text.trim_end()
    )
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Overall score, detailed scores and suggested improvements
pub fn render_summary(evaluation: &Evaluation) -> String {
    let mut out = String::new();

    let overall = evaluation
        .get("overall_score")
        .map(render_value)
        .unwrap_or_else(|| "?".to_string());
    out.push_str(&format!("{} {}/10\n", "Overall score:".bold(), overall));

    out.push_str(&format!("{}\n", "Detailed scores:".bold()));
    for (key, value) in evaluation.detailed_scores() {
        out.push_str(&format!("  {}: {}\n", key, render_value(value)));
    }

    out.push_str(&format!("{}\n", "Suggested improvements:".bold()));
    let improvements = evaluation.improvements();
    if improvements.is_empty() {
        out.push_str("  (none)\n");
    }
    for tip in improvements {
        out.push_str(&format!("  - {}\n", tip));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::parse_strict;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_render_summary() {
        plain();
        let evaluation = Evaluation::from_map(
            parse_strict(
                r#"{"creativity": 7, "overall_score": "8", "improvements": ["Shorter sentences", "Softer ending"]}"#,
            )
            .unwrap(),
        );

        let text = render_summary(&evaluation);
        assert!(text.contains("Overall score: 8/10"));
        assert!(text.contains("  creativity: 7\n"));
        assert!(text.contains("  overall_score: 8\n"));
        assert!(text.contains("  - Shorter sentences\n  - Softer ending\n"));
        assert!(!text.contains("  improvements:"));
    }

    #[test]
    fn test_render_summary_missing_fields() {
        plain();
        let evaluation = Evaluation::from_map(parse_strict("{}").unwrap());
        let text = render_summary(&evaluation);
        assert!(text.contains("Overall score: ?/10"));
        assert!(text.contains("(none)"));
    }

    #[test]
    fn test_render_story() {
        plain();
        let text = render_story("INITIAL STORY", &StoryDraft::generated("Once upon a time.\n\n"));
        assert_eq!(text, "----- INITIAL STORY -----\n\nOnce upon a time.\n");
    }
}
