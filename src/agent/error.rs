use thiserror::Error;

use crate::llm::LlmError;

/// Errors that end an agent run.
///
/// Tool failures are not represented here: they are captured per call and
/// handed back to the model.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model requested a tool that was never registered.
    #[error("Model requested unknown tool: {name}")]
    UnknownTool { name: String },

    /// The model answered with tool calls where only text is allowed.
    #[error("Expected a text completion, got {count} tool call(s)")]
    UnexpectedToolCalls { count: usize },

    #[error("Model returned an empty tool call list")]
    EmptyToolCalls,

    #[error("Completion request failed: {0}")]
    Completion(#[from] LlmError),

    #[error("Agent run was cancelled")]
    Cancelled,
}

impl AgentError {
    /// Whether this error means the agent and its tools are misconfigured.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool { .. } | Self::UnexpectedToolCalls { .. } | Self::EmptyToolCalls
        )
    }
}
