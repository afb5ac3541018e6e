//! Agent module - the tool-use agent and the analyst built on the LLM client.
//!
//! The tool-use agent runs a single "plan, act, reflect" cycle:
//! 1. Build a session with the system prompt and the user request
//! 2. Call the LLM with the available tools
//! 3. If the LLM requests tool calls, run them all concurrently and append the results
//! 4. Call the LLM again without tools to produce the final answer

mod agent_loop;
mod analyst;
mod error;
mod prompt;
mod session;

pub use agent_loop::{AgentPhase, AgentReply, ToolUseAgent};
pub use analyst::AnalystAgent;
pub use error::AgentError;
pub use prompt::{default_request, ANALYSIS_SYSTEM_PROMPT, TOOL_USE_SYSTEM_PROMPT};
pub use session::Session;
