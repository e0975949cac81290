//! Story generator - produces the first draft

use std::sync::Arc;

use tracing::{debug, info};

use super::classifier::{classify, guidance_for};
use crate::domain::{StoryDraft, StoryRequest};
use crate::error::{BedtimeError, Step};
use crate::llm::{CompletionRequest, LlmClient, complete_text};
use crate::prompts::{GenerateContext, PromptLoader};
use crate::r#loop::CallSettings;

/// Writes the first draft for a request
pub struct StoryGenerator {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    settings: CallSettings,
}

impl StoryGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, settings: CallSettings) -> Self {
        debug!(?settings, "StoryGenerator::new: called");
        Self { llm, prompts, settings }
    }

    /// Classify the request and ask the storyteller for a complete story
    ///
    /// The reply text becomes the draft unchanged.
    pub async fn generate(&self, request: &StoryRequest) -> Result<StoryDraft, BedtimeError> {
        debug!("StoryGenerator::generate: called");
        let category = classify(request.as_str());
        info!(%category, "Generating first draft");

        let system_prompt = self.prompts.system_prompt("storyteller")?;
        let user_prompt = self.prompts.render(
            "generate",
            &GenerateContext {
                category: category.label(),
                guidance: guidance_for(category.label()),
                request: request.as_str(),
            },
        )?;

        let completion = CompletionRequest::single_turn(system_prompt, user_prompt)
            .with_max_tokens(self.settings.max_tokens)
            .with_temperature(self.settings.temperature);

        let reply = complete_text(self.llm.as_ref(), completion)
            .await
            .map_err(|e| BedtimeError::backend(Step::Generation, e))?;
        info!(tokens = reply.usage.total(), "First draft received");

        Ok(StoryDraft::generated(reply.text))
    }
}
