//! Financial analyst agent: a single tool-free completion over the given content.

use std::sync::Arc;

use crate::llm::{CompletionContent, LlmClient};

use super::error::AgentError;
use super::prompt::ANALYSIS_SYSTEM_PROMPT;
use super::session::Session;

pub struct AnalystAgent {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl AnalystAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            system_prompt: ANALYSIS_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Analyze `content` and return the model's raw answer.
    pub async fn analyze(&self, content: &str) -> Result<String, AgentError> {
        let session = Session::new(&self.system_prompt, content);

        tracing::debug!("Requesting analysis of {} chars", content.len());
        let completion = self.llm.create(session.messages(), None).await?;

        match completion.content {
            CompletionContent::Text(text) => Ok(text),
            CompletionContent::ToolCalls(calls) => Err(AgentError::UnexpectedToolCalls {
                count: calls.len(),
            }),
        }
    }
}
