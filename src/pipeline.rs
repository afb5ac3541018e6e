//! Post analysis pipeline: fetch posts with tools, analyze them, deliver the result.

use tokio_util::sync::CancellationToken;

use crate::agent::{AgentError, AgentReply, AnalystAgent, ToolUseAgent};
use crate::analysis::Analysis;

/// Receives the final text of each pipeline run.
pub trait Sink: Send + Sync {
    fn deliver(&self, text: &str);
}

/// Prints results to stdout.
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn deliver(&self, text: &str) {
        println!("{}", text);
    }
}

/// Where the tool-use agent's answer was routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The model answered without tools; delivered as-is.
    Direct,
    /// Tools ran; the reflected answer went through the analyst.
    ///
    /// `is_relevant` is `None` when the analyst's output held no readable verdict.
    Analyzed { is_relevant: Option<bool> },
}

pub struct Pipeline<S: Sink> {
    tool_agent: ToolUseAgent,
    analyst: AnalystAgent,
    sink: S,
}

impl<S: Sink> Pipeline<S> {
    pub fn new(tool_agent: ToolUseAgent, analyst: AnalystAgent, sink: S) -> Self {
        Self {
            tool_agent,
            analyst,
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run one request through the pipeline and deliver exactly one text.
    pub async fn run(&self, prompt: &str) -> Result<Route, AgentError> {
        let reply = self.tool_agent.run_turn(prompt).await?;
        self.finish(reply).await
    }

    /// Like [`run`](Self::run), abandoning the run when `cancel` fires.
    /// Nothing is delivered for a cancelled run.
    pub async fn run_with_cancel(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<Route, AgentError> {
        let reply = self.tool_agent.run_with_cancel(prompt, cancel).await?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AgentError::Cancelled),
            route = self.finish(reply) => route,
        }
    }

    async fn finish(&self, reply: AgentReply) -> Result<Route, AgentError> {
        if !reply.used_tools() {
            tracing::info!("Model answered without tools, skipping analysis");
            self.sink.deliver(&reply.text);
            return Ok(Route::Direct);
        }

        let failed = reply.tool_results.iter().filter(|r| r.is_error).count();
        tracing::info!(
            "Tool round finished: {} call(s), {} failed",
            reply.tool_results.len(),
            failed
        );

        let analysis = self.analyst.analyze(&reply.text).await?;
        let is_relevant = match Analysis::parse(&analysis) {
            Ok(verdict) => {
                tracing::info!("Analysis verdict: relevant={}", verdict.is_relevant);
                Some(verdict.is_relevant)
            }
            Err(e) => {
                tracing::warn!("Analyst output has no usable verdict: {}", e);
                None
            }
        };

        // Delivered verbatim either way.
        self.sink.deliver(&analysis);
        Ok(Route::Analyzed { is_relevant })
    }
}
