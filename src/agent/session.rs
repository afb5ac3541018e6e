//! Per-run conversation history.

use crate::llm::{AssistantContent, Message, ToolCall, ToolCallResult};

/// Ordered, append-only message history for a single agent run.
#[derive(Debug, Clone)]
pub struct Session {
    messages: Vec<Message>,
}

impl Session {
    /// Start a session with a system prompt and the user's request.
    pub fn new(system_prompt: &str, user_text: &str) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::user(user_text)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages; at least two, since `new` seeds the prompt and request.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn push_tool_calls(&mut self, calls: Vec<ToolCall>) {
        self.messages
            .push(Message::Assistant(AssistantContent::ToolCalls(calls)));
    }

    /// Append results for the latest assistant tool-call turn.
    ///
    /// Every result must answer exactly one call of that turn.
    pub fn push_tool_results(&mut self, results: Vec<ToolCallResult>) {
        debug_assert!(
            self.answers_pending_calls(&results),
            "tool results do not match the pending tool calls"
        );
        self.messages.push(Message::ToolResults(results));
    }

    fn answers_pending_calls(&self, results: &[ToolCallResult]) -> bool {
        let Some(calls) = self.messages.last().and_then(Message::tool_calls) else {
            return false;
        };
        let mut pending: Vec<&str> = calls.iter().map(|c| c.id.as_str()).collect();
        for result in results {
            match pending.iter().position(|id| *id == result.call_id) {
                Some(idx) => {
                    pending.swap_remove(idx);
                }
                None => return false,
            }
        }
        pending.is_empty()
    }
}
