//! Configuration management for Post Analyst.
//!
//! Configuration is read from environment variables. `Config::load` first reads
//! a `.env` file from the working directory (or its parents); variables already
//! set in the process environment take precedence over the file.
//!
//! Variables:
//! - `OPENAI_API_KEY` - Required. API key for the OpenAI-compatible endpoint.
//! - `OPENAI_MODEL` - Optional. Model identifier. Defaults to `gpt-4o`.
//! - `OPENAI_BASE_URL` - Optional. Defaults to `https://api.openai.com/v1`.
//! - `POSTS_API_URL` - Optional. Base URL of the timeline API. Defaults to `http://127.0.0.1:8080`.
//! - `POSTS_API_TOKEN` - Optional. Bearer token for the timeline API.
//! - `POST_USERS` - Optional. Comma-separated user ids for the default request.
//! - `HTTP_TIMEOUT_SECS` - Optional. Timeout for outbound HTTP calls. Defaults to `60`.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the completion endpoint
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// Base URL of the timeline API used by the posts tool
    pub posts_api_url: String,

    pub posts_api_token: Option<String>,

    /// Users the default request asks about
    pub users: Vec<String>,

    /// Timeout applied to every outbound HTTP request
    pub http_timeout: Duration,
}

impl Config {
    /// Load `.env` if present, then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_env()
    }

    /// Load the given env file, then read the environment.
    ///
    /// A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if dotenv::from_path(path).is_ok() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_env()
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = get("OPENAI_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let model = get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_string());

        let base_url =
            get("OPENAI_BASE_URL").unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        let posts_api_url =
            get("POSTS_API_URL").unwrap_or_else(|| "http://127.0.0.1:8080".to_string());

        let posts_api_token = get("POSTS_API_TOKEN").filter(|v| !v.trim().is_empty());

        let users = get("POST_USERS")
            .map(|v| parse_list(&v))
            .unwrap_or_else(|| vec!["myfxtrader".to_string(), "HAOHONG_CFA".to_string()]);

        let http_timeout = get("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "60".to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidValue("HTTP_TIMEOUT_SECS".to_string(), format!("{}", e)))?;

        Ok(Self {
            api_key,
            model,
            base_url,
            posts_api_url,
            posts_api_token,
            users,
            http_timeout,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            base_url,
            posts_api_url: "http://127.0.0.1:8080".to_string(),
            posts_api_token: None,
            users: Vec::new(),
            http_timeout: Duration::from_secs(60),
        }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_start_matches('@'))
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
