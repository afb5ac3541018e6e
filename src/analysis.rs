//! Parsing of the analyst's JSON verdict.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No JSON object found in analysis output")]
    NoJson,

    #[error("Malformed analysis payload: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// The analyst's verdict on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Whether the content matters for the tracked markets
    #[serde(deserialize_with = "relevance_flag")]
    pub is_relevant: bool,

    /// Markdown briefing, only present for relevant content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytical_briefing: Option<String>,
}

impl Analysis {
    /// Parse the model's answer, tolerating prose or code fences around the JSON object.
    pub fn parse(text: &str) -> Result<Self, AnalysisError> {
        let start = text.find('{').ok_or(AnalysisError::NoJson)?;
        let end = text.rfind('}').ok_or(AnalysisError::NoJson)?;
        if end < start {
            return Err(AnalysisError::NoJson);
        }

        let mut analysis: Analysis = serde_json::from_str(&text[start..=end])?;
        if analysis
            .analytical_briefing
            .as_deref()
            .is_some_and(|b| b.trim().is_empty())
        {
            analysis.analytical_briefing = None;
        }
        Ok(analysis)
    }
}

/// Accepts `"1"`/`"0"`, `1`/`0` and booleans.
fn relevance_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) if n.as_u64() == Some(1) => Ok(true),
        Value::Number(n) if n.as_u64() == Some(0) => Ok(false),
        Value::String(s) => match s.trim() {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            other => Err(D::Error::custom(format!(
                "expected 0 or 1 for is_relevant, got: {}",
                other
            ))),
        },
        other => Err(D::Error::custom(format!(
            "expected 0 or 1 for is_relevant, got: {}",
            other
        ))),
    }
}
