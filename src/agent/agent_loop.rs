//! Core agent loop implementation.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::llm::{CompletionContent, LlmClient, ToolCall, ToolCallResult, ToolSchema};
use crate::tools::{Tool, ToolRegistry};

use super::error::AgentError;
use super::prompt::TOOL_USE_SYSTEM_PROMPT;
use super::session::Session;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhase {
    AwaitingInitialCompletion,
    ExecutingTools,
    AwaitingReflection,
    Done,
}

impl fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingInitialCompletion => write!(f, "awaiting_initial_completion"),
            Self::ExecutingTools => write!(f, "executing_tools"),
            Self::AwaitingReflection => write!(f, "awaiting_reflection"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Final answer of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub text: String,

    /// Results of the tool round, in request order. Empty when the model
    /// answered directly.
    pub tool_results: Vec<ToolCallResult>,
}

impl AgentReply {
    pub fn used_tools(&self) -> bool {
        !self.tool_results.is_empty()
    }
}

/// Agent that answers a request with at most one round of tool calls.
///
/// # Algorithm
/// 1. Ask the LLM with the request and the tool declarations
/// 2. If it answers with text, that is the result
/// 3. Otherwise run every requested tool concurrently, capturing failures
/// 4. Append the results and ask the LLM again, without tools, for the answer
pub struct ToolUseAgent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    schemas: Vec<ToolSchema>,
    system_prompt: String,
}

impl ToolUseAgent {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry) -> Self {
        let schemas = tools.get_tool_schemas();
        Self {
            llm,
            tools,
            schemas,
            system_prompt: TOOL_USE_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run a request and return the final text.
    pub async fn run(&self, user_text: &str) -> Result<String, AgentError> {
        Ok(self.run_turn(user_text).await?.text)
    }

    /// Like [`run_turn`](Self::run_turn), but abandons the run as soon as
    /// `cancel` fires. In-flight completion and tool calls are dropped.
    pub async fn run_with_cancel(
        &self,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Result<AgentReply, AgentError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Agent run cancelled");
                Err(AgentError::Cancelled)
            }
            reply = self.run_turn(user_text) => reply,
        }
    }

    /// Run a request and return the final text together with the tool round.
    pub async fn run_turn(&self, user_text: &str) -> Result<AgentReply, AgentError> {
        let mut session = Session::new(&self.system_prompt, user_text);

        log_phase(AgentPhase::AwaitingInitialCompletion);
        let completion = self
            .llm
            .create(session.messages(), Some(&self.schemas))
            .await?;

        let calls = match completion.content {
            CompletionContent::Text(text) => {
                log_phase(AgentPhase::Done);
                return Ok(AgentReply {
                    text,
                    tool_results: Vec::new(),
                });
            }
            CompletionContent::ToolCalls(calls) if calls.is_empty() => {
                return Err(AgentError::EmptyToolCalls);
            }
            CompletionContent::ToolCalls(calls) => calls,
        };

        // Resolve every tool before running any of them.
        let resolved = calls
            .iter()
            .map(|call| {
                self.tools
                    .get(&call.name)
                    .ok_or_else(|| AgentError::UnknownTool {
                        name: call.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        session.push_tool_calls(calls.clone());

        log_phase(AgentPhase::ExecutingTools);
        tracing::info!("Executing {} tool call(s)", calls.len());
        let results = join_all(
            calls
                .iter()
                .zip(resolved)
                .map(|(call, tool)| execute_tool_call(tool, call)),
        )
        .await;

        session.push_tool_results(results.clone());

        log_phase(AgentPhase::AwaitingReflection);
        let reflection = self.llm.create(session.messages(), None).await?;

        match reflection.content {
            CompletionContent::Text(text) => {
                log_phase(AgentPhase::Done);
                Ok(AgentReply {
                    text,
                    tool_results: results,
                })
            }
            CompletionContent::ToolCalls(calls) => Err(AgentError::UnexpectedToolCalls {
                count: calls.len(),
            }),
        }
    }
}

fn log_phase(phase: AgentPhase) {
    tracing::debug!(%phase, "Agent phase");
}

/// Execute a single tool call. Never fails: errors and panics become error results.
async fn execute_tool_call(tool: Arc<dyn Tool>, call: &ToolCall) -> ToolCallResult {
    tracing::info!("Calling tool: {} with args: {}", call.name, call.arguments);

    let outcome = AssertUnwindSafe(invoke(tool.as_ref(), call))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(content)) => {
            tracing::debug!("Tool {} ({}) succeeded", call.name, call.id);
            ToolCallResult::success(call, content)
        }
        Ok(Err(e)) => {
            tracing::warn!("Tool {} ({}) failed: {:#}", call.name, call.id, e);
            ToolCallResult::error(call, format!("{:#}", e))
        }
        Err(panic) => {
            let message = format!("Tool '{}' panicked: {}", call.name, panic_message(&*panic));
            tracing::warn!("{}", message);
            ToolCallResult::error(call, message)
        }
    }
}

async fn invoke(tool: &dyn Tool, call: &ToolCall) -> anyhow::Result<String> {
    let args = parse_arguments(&call.arguments)
        .map_err(|e| anyhow::anyhow!("Invalid arguments for tool '{}': {}", call.name, e))?;
    let result = tool.execute(args).await?;
    Ok(tool.stringify(&result))
}

/// Parse model-provided arguments. Blank input means "no arguments".
fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
