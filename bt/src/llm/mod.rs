//! Model gateway
//!
//! Provides the stateless completion client used by every story step.

use std::sync::Arc;

use tracing::{debug, warn};

mod anthropic;
pub mod client;
mod error;
mod openai;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, TokenUsage};

use crate::config::LlmConfig;
use crate::error::BedtimeError;

/// Create an LLM client based on the provider specified in config
///
/// Supports "openai" and "anthropic" providers.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, BedtimeError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "openai" => {
            debug!("create_client: creating OpenAI client");
            Ok(Arc::new(OpenAIClient::from_config(config)?))
        }
        "anthropic" => {
            debug!("create_client: creating Anthropic client");
            Ok(Arc::new(AnthropicClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(BedtimeError::Config(format!(
                "Unknown LLM provider: '{}'. Supported: openai, anthropic",
                other
            )))
        }
    }
}

/// A completed call reduced to its text
#[derive(Debug, Clone)]
pub struct TextReply {
    pub text: String,
    pub usage: TokenUsage,
}

/// Send one request and return the reply text
///
/// The text is returned as sent, blank or not; only a reply with no text
/// content at all is an `InvalidResponse` error.
pub async fn complete_text(llm: &dyn LlmClient, request: CompletionRequest) -> Result<TextReply, LlmError> {
    debug!(max_tokens = %request.max_tokens, temperature = %request.temperature, "complete_text: called");
    let response = llm.complete(request).await?;

    if response.stop_reason == StopReason::MaxTokens {
        warn!("complete_text: reply was cut off at the token limit");
    }

    match response.content {
        Some(text) => Ok(TextReply {
            text,
            usage: response.usage,
        }),
        None => {
            debug!(stop_reason = ?response.stop_reason, "complete_text: reply had no text");
            Err(LlmError::InvalidResponse(format!(
                "Model returned no text (stop reason: {:?})",
                response.stop_reason
            )))
        }
    }
}
