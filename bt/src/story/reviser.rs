//! Reviser - rewrites a draft using judge and user feedback

use std::sync::Arc;

use tracing::{debug, info};

use super::evaluation::Evaluation;
use crate::domain::{DraftOrigin, StoryDraft, StoryRequest};
use crate::error::{BedtimeError, Step};
use crate::llm::{CompletionRequest, LlmClient, complete_text};
use crate::prompts::{PromptLoader, ReviseContext};
use crate::r#loop::CallSettings;

/// Produces a new draft from the previous one plus feedback
pub struct Reviser {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    settings: CallSettings,
}

impl Reviser {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, settings: CallSettings) -> Self {
        debug!(?settings, "Reviser::new: called");
        Self { llm, prompts, settings }
    }

    /// Rewrite `previous` so it addresses the evaluation and, when given, the user's feedback
    pub async fn revise(
        &self,
        request: &StoryRequest,
        previous: &StoryDraft,
        evaluation: &Evaluation,
        user_feedback: Option<&str>,
    ) -> Result<StoryDraft, BedtimeError> {
        debug!(version = previous.version, has_feedback = user_feedback.is_some(), "Reviser::revise: called");
        let evaluation_json = evaluation.to_pretty_json();

        let system_prompt = self.prompts.system_prompt("reviser")?;
        let user_prompt = self.prompts.render(
            "revise",
            &ReviseContext {
                request: request.as_str(),
                story: &previous.text,
                evaluation: &evaluation_json,
                feedback: user_feedback,
            },
        )?;

        let completion = CompletionRequest::single_turn(system_prompt, user_prompt)
            .with_max_tokens(self.settings.max_tokens)
            .with_temperature(self.settings.temperature);

        let reply = complete_text(self.llm.as_ref(), completion)
            .await
            .map_err(|e| BedtimeError::backend(Step::Revision, e))?;

        let origin = if user_feedback.is_some() {
            DraftOrigin::UserRevised
        } else {
            DraftOrigin::Revised
        };
        let draft = previous.succeed(reply.text, origin);
        info!(version = draft.version, %origin, tokens = reply.usage.total(), "Revision received");
        Ok(draft)
    }
}
