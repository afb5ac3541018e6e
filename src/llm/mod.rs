//! LLM access: conversation types, the completion-service trait and an
//! OpenAI-compatible HTTP client.

mod openai;
mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use openai::OpenAiClient;
pub use types::*;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response from LLM: {0}")]
    InvalidResponse(String),
}

/// A chat-completion backend.
///
/// Implementations must be cancel-safe: dropping the returned future aborts the
/// request.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete `messages`, optionally offering `tools` to the model.
    ///
    /// When `tools` is `None` the model must not be offered any tool.
    async fn create(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSchema]>,
    ) -> Result<Completion, LlmError>;
}
