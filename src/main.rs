//! Post Analyst - command-line entry point
//!
//! Fetches the latest posts of the configured users, analyzes them and prints
//! the result. Any command-line arguments are joined into the request.

use std::sync::Arc;

use post_analyst::agent::{default_request, AnalystAgent, ToolUseAgent};
use post_analyst::llm::{LlmClient, OpenAiClient};
use post_analyst::pipeline::{Pipeline, StdoutSink};
use post_analyst::tools::{ToolRegistry, UserPostsTool};
use post_analyst::Config;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "post_analyst=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration (.env first, then the process environment)
    let config = Config::load()?;
    info!("Loaded configuration: model={}", config.model);

    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(
        &config.base_url,
        config.api_key.clone(),
        config.model.clone(),
        config.http_timeout,
    )?);

    let tools = ToolRegistry::new().with(Arc::new(UserPostsTool::new(
        &config.posts_api_url,
        config.posts_api_token.clone(),
        config.http_timeout,
    )?))?;

    let pipeline = Pipeline::new(
        ToolUseAgent::new(Arc::clone(&llm), tools),
        AnalystAgent::new(llm),
        StdoutSink,
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let request = if args.is_empty() {
        default_request(&config.users)
    } else {
        args.join(" ")
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let route = pipeline.run_with_cancel(&request, &cancel).await?;
    info!("Pipeline finished: {:?}", route);

    Ok(())
}
