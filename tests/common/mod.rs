#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use post_analyst::llm::{Completion, LlmClient, LlmError, Message, ToolCall, ToolSchema};
use post_analyst::tools::Tool;
use serde_json::{json, Value};

/// One recorded `create` call.
#[derive(Debug, Clone)]
pub struct Request {
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolSchema>>,
}

/// LLM fake that replays scripted completions and records every request.
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<Completion, LlmError>>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<Result<Completion, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(completions: Vec<Completion>) -> Arc<Self> {
        Self::new(completions.into_iter().map(Ok).collect())
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn create(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSchema]>,
    ) -> Result<Completion, LlmError> {
        self.requests.lock().unwrap().push(Request {
            messages: messages.to_vec(),
            tools: tools.map(<[ToolSchema]>::to_vec),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::InvalidResponse("script exhausted".to_string())))
    }
}

pub fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}

/// Returns a fixed value and counts invocations.
pub struct FixedTool {
    pub name: &'static str,
    pub output: Value,
    pub calls: AtomicUsize,
}

impl FixedTool {
    pub fn new(name: &'static str, output: Value) -> Arc<Self> {
        Arc::new(Self {
            name,
            output,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for FixedTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Returns a fixed value"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"q": {"type": "string"}}})
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

/// Always fails with the given message.
pub struct FailingTool {
    pub name: &'static str,
    pub message: &'static str,
}

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object"})
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<Value> {
        Err(anyhow::anyhow!(self.message))
    }
}
