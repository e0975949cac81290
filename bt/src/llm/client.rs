//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent (fresh context)
///
/// Every story step (draft, judge, revise) builds its own request from scratch;
/// nothing is carried between calls except what the caller puts in the prompt.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request and wait for the full reply
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
