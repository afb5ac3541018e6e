//! # Post Analyst
//!
//! A small agent pipeline that fetches a social-media user's latest posts and
//! asks a language model whether they matter for financial markets.
//!
//! This library provides:
//! - A tool-use agent that runs one round of concurrent tool calls
//! - An analyst agent producing a JSON relevance verdict
//! - An OpenAI-compatible LLM client and a timeline tool
//!
//! ## Architecture
//!
//! The tool-use agent follows a "plan, act, reflect" pattern:
//! 1. Send the request with the tool declarations to the LLM
//! 2. Execute every requested tool call concurrently, capturing failures
//! 3. Feed the results back and ask the LLM for the final answer
//!
//! ## Example
//!
//! ```rust,ignore
//! use post_analyst::{agent::ToolUseAgent, llm::OpenAiClient, tools::ToolRegistry};
//!
//! let agent = ToolUseAgent::new(llm, tools);
//! let answer = agent.run("Latest post of @myfxtrader?").await?;
//! ```

pub mod agent;
pub mod analysis;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod tools;

pub use config::Config;
