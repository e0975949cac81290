//! Judge - scores a draft against the bedtime rubric

use std::sync::Arc;

use tracing::{debug, info};

use super::evaluation::{Evaluation, parse_evaluation};
use crate::domain::{StoryDraft, StoryRequest};
use crate::error::{BedtimeError, Step};
use crate::llm::{CompletionRequest, LlmClient, complete_text};
use crate::prompts::{EvaluateContext, PromptLoader};
use crate::r#loop::CallSettings;

/// Asks the model to grade a story and parses its JSON verdict
pub struct Judge {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    settings: CallSettings,
}

impl Judge {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, settings: CallSettings) -> Self {
        debug!(?settings, "Judge::new: called");
        Self { llm, prompts, settings }
    }

    pub async fn evaluate(&self, request: &StoryRequest, draft: &StoryDraft) -> Result<Evaluation, BedtimeError> {
        debug!(version = draft.version, "Judge::evaluate: called");
        let system_prompt = self.prompts.system_prompt("judge")?;
        let user_prompt = self.prompts.render(
            "evaluate",
            &EvaluateContext {
                request: request.as_str(),
                story: &draft.text,
            },
        )?;

        let completion = CompletionRequest::single_turn(system_prompt, user_prompt)
            .with_max_tokens(self.settings.max_tokens)
            .with_temperature(self.settings.temperature);

        let reply = complete_text(self.llm.as_ref(), completion)
            .await
            .map_err(|e| BedtimeError::backend(Step::Judging, e))?;

        let evaluation = parse_evaluation(&reply.text)?;
        info!(
            overall = ?evaluation.overall_score(),
            tokens = reply.usage.total(),
            "Evaluation received"
        );
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;

    fn judge(client: Arc<MockLlmClient>) -> Judge {
        Judge::new(
            client,
            Arc::new(PromptLoader::embedded_only()),
            CallSettings::new(800, 0.2),
        )
    }

    #[tokio::test]
    async fn test_evaluate_strict_json() {
        let client = Arc::new(MockLlmClient::with_texts([
            r#"{"age_appropriateness": 9, "overall_score": 8, "improvements": ["Add a lullaby"]}"#,
        ]));
        let evaluation = judge(client.clone())
            .evaluate(
                &StoryRequest::new("a cat"),
                &StoryDraft::generated("The cat purred."),
            )
            .await
            .unwrap();

        assert_eq!(evaluation.overall_score(), Some(8));
        assert_eq!(evaluation.improvements(), vec!["Add a lullaby"]);

        let sent = &client.requests()[0];
        assert!(sent.system_prompt.contains("STRICT"));
        assert!(sent.messages[0].content.contains("The cat purred."));
        assert!(sent.messages[0].content.contains("a cat"));
        assert_eq!(sent.max_tokens, 800);
        assert!((sent.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_evaluate_recovers_wrapped_json() {
        let client = Arc::new(MockLlmClient::with_texts([
            "Here is my verdict:\n{\"overall_score\": 6, \"improvements\": []}\nThanks!",
        ]));
        let evaluation = judge(client)
            .evaluate(&StoryRequest::new("a cat"), &StoryDraft::generated("x"))
            .await
            .unwrap();
        assert_eq!(evaluation.overall_score(), Some(6));
    }

    #[tokio::test]
    async fn test_evaluate_unrecoverable_reply() {
        let client = Arc::new(MockLlmClient::with_texts(["I give it a nine."]));
        let err = judge(client)
            .evaluate(&StoryRequest::new("a cat"), &StoryDraft::generated("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, BedtimeError::MalformedJudgeOutput { .. }));
    }

    #[tokio::test]
    async fn test_evaluate_blank_reply_is_malformed() {
        let client = Arc::new(MockLlmClient::with_texts(["   \n"]));
        let err = judge(client)
            .evaluate(&StoryRequest::new("a cat"), &StoryDraft::generated("x"))
            .await
            .unwrap_err();
        match err {
            BedtimeError::MalformedJudgeOutput { reason, raw } => {
                assert!(reason.contains("no opening brace"), "reason: {}", reason);
                assert_eq!(raw, "   \n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_evaluate_backend_failure_is_tagged() {
        let client = Arc::new(MockLlmClient::new(vec![]));
        let err = judge(client)
            .evaluate(&StoryRequest::new("a cat"), &StoryDraft::generated("x"))
            .await
            .unwrap_err();
        assert_eq!(err.step(), Some(Step::Judging));
    }
}
