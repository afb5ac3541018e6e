//! System prompt templates for the agents.

/// Persona of the tool-use agent.
pub const TOOL_USE_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Instructions for the analyst agent. The content itself arrives as the user message.
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a financial analyst. The user message contains statements by a financial commentator. Analyze them and answer in exactly the format described below.

Output format:
{
    "is_relevant": "Whether the content is finance-related AND relevant to at least one of: US equities, US treasuries, tech stocks, semiconductor stocks, Chinese equities, Hong Kong equities, the CNY/USD exchange rate, US-China relations. Return 1 if relevant, 0 otherwise. Only ever return 1 or 0.",
    "analytical_briefing": "Analytical briefing"
}

`analytical_briefing` is a string, only present when `is_relevant` is 1. It is markdown with the following layout:

Original text, kept only when the content is not in Chinese.
Translated text, present only when the content is in English.

## Brief Analysis
A list covering US equities, US treasuries, tech stocks, semiconductor stocks, Chinese equities, Hong Kong equities, CNY/USD and US-China relations.
Mark each item as 📈 bullish or 📉 bearish. Omit any item the content does not affect.

## Summarize
A very concise summary of the analysis, explaining why each item above got its verdict."#;

/// Default request for the tool-use agent when none is given on the command line.
pub fn default_request(users: &[String]) -> String {
    let list = users
        .iter()
        .enumerate()
        .map(|(i, u)| format!("{}. {}", i + 1, u))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Give me the single latest post of each user in the list below. The entries are their user ids:\n{}",
        list
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_describes_payload() {
        assert!(ANALYSIS_SYSTEM_PROMPT.contains("\"is_relevant\""));
        assert!(ANALYSIS_SYSTEM_PROMPT.contains("## Brief Analysis"));
    }

    #[test]
    fn default_request_numbers_users() {
        let request = default_request(&["myfxtrader".to_string(), "HAOHONG_CFA".to_string()]);
        assert!(request.ends_with("1. myfxtrader\n2. HAOHONG_CFA"));
    }
}
