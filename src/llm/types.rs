//! Conversation and completion types shared by the agents and LLM clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier, unique within one assistant turn
    pub id: String,

    /// Name of the requested tool
    pub name: String,

    /// Raw JSON arguments, exactly as produced by the model
    pub arguments: String,
}

/// The outcome of executing one [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Id of the originating tool call
    pub call_id: String,

    /// Name of the tool that ran
    pub name: String,

    /// Stringified tool output, or the error message when `is_error` is set
    pub content: String,

    pub is_error: bool,
}

impl ToolCallResult {
    pub fn success(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(call: &ToolCall, message: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content: message.into(),
            is_error: true,
        }
    }
}

/// Content of an assistant turn: either prose or a batch of tool calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantContent {
    Text(String),
    ToolCalls(Vec<ToolCall>),
}

/// One entry of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    System(String),
    User(String),
    Assistant(AssistantContent),
    /// Results for every call of the preceding assistant turn.
    ToolResults(Vec<ToolCallResult>),
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    /// Tool calls carried by this message, if it is an assistant tool-call turn.
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        match self {
            Self::Assistant(AssistantContent::ToolCalls(calls)) => Some(calls),
            _ => None,
        }
    }
}

/// Tool declaration sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

/// Token accounting reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// What the model answered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContent {
    Text(String),
    ToolCalls(Vec<ToolCall>),
}

/// A single completion returned by an [`LlmClient`](super::LlmClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: CompletionContent,
    pub usage: Option<Usage>,
}

impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: CompletionContent::Text(content.into()),
            usage: None,
        }
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            content: CompletionContent::ToolCalls(calls),
            usage: None,
        }
    }
}
