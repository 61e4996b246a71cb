//! Anthropic Messages API adapter.

use std::collections::HashMap;

use ag_domain::error::Result;
use serde_json::Value;

use crate::egress::GuardedHttpClient;
use crate::traits::{LlmProvider, LlmResponse};
use crate::util::expect_json;

const ANTHROPIC_VERSION: &str = "2023-06-01";

const COST_PER_1K: &[(&str, f64)] = &[
    ("claude-sonnet-4-20250514", 0.006),
    ("claude-haiku-4-5-20251001", 0.002),
];
const FALLBACK_COST_PER_1K: f64 = 0.005;

fn price_per_1k(model: &str) -> f64 {
    COST_PER_1K
        .iter()
        .find(|(m, _)| *m == model)
        .map(|(_, p)| *p)
        .unwrap_or(FALLBACK_COST_PER_1K)
}

pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
    http: GuardedHttpClient,
}

impl AnthropicProvider {
    pub fn new(api_key: String, base_url: &str, http: GuardedHttpClient) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_name(&self) -> &'static str {
        "anthropic"
    }

    async fn query(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<LlmResponse> {
        if self.api_key.is_empty() {
            return Ok(LlmResponse::text_only(
                "Error: Anthropic API key is not configured. Set ANTHROPIC_API_KEY in environment.",
                model,
            ));
        }

        let url = format!("{}/messages", self.base_url);
        let body = serde_json::json!({
            "model": model,
            "max_tokens": max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });

        let resp = self
            .http
            .post_json(
                &url,
                &[
                    ("x-api-key", self.api_key.as_str()),
                    ("anthropic-version", ANTHROPIC_VERSION),
                ],
                &body,
            )
            .await?;
        let data = expect_json(resp, "anthropic").await?;
        Ok(parse_messages_response(&data, model))
    }
}

/// Text is the newline-joined concatenation of every `text`-typed content
/// block; a response with no text blocks yields an empty string rather than
/// an error (tool-use-only responses are valid upstream).
fn parse_messages_response(data: &Value, model: &str) -> LlmResponse {
    let blocks = data["content"].as_array().cloned().unwrap_or_default();
    let text = blocks
        .iter()
        .filter(|b| b["type"].as_str() == Some("text"))
        .filter_map(|b| b["text"].as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let usage = &data["usage"];
    let input_tokens = usage["input_tokens"].as_u64().unwrap_or(0);
    let output_tokens = usage["output_tokens"].as_u64().unwrap_or(0);
    let total = input_tokens + output_tokens;
    let cost = (total as f64 / 1000.0) * price_per_1k(model);

    let mut counters = HashMap::new();
    counters.insert("input_tokens".to_string(), input_tokens);
    counters.insert("output_tokens".to_string(), output_tokens);
    counters.insert("total_tokens".to_string(), total);

    LlmResponse {
        text,
        model: model.to_string(),
        usage: counters,
        estimated_cost: cost,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn joins_text_blocks_with_newlines() {
        let data = serde_json::json!({
            "content": [
                {"type": "text", "text": "first"},
                {"type": "tool_use", "name": "x", "input": {}},
                {"type": "text", "text": "second"}
            ],
            "usage": {"input_tokens": 5, "output_tokens": 5}
        });
        let resp = parse_messages_response(&data, "claude-sonnet-4-20250514");
        assert_eq!(resp.text, "first\nsecond");
        assert_eq!(resp.usage["total_tokens"], 10);
    }

    #[test]
    fn cost_uses_input_plus_output() {
        let data = serde_json::json!({
            "content": [{"type": "text", "text": "ok"}],
            "usage": {"input_tokens": 600, "output_tokens": 400}
        });
        let resp = parse_messages_response(&data, "claude-sonnet-4-20250514");
        assert!((resp.estimated_cost - 0.006).abs() < 1e-9);
    }

    #[test]
    fn unknown_model_uses_fallback_price() {
        let data = serde_json::json!({
            "content": [{"type": "text", "text": "ok"}],
            "usage": {"input_tokens": 1000, "output_tokens": 0}
        });
        let resp = parse_messages_response(&data, "claude-next");
        assert!((resp.estimated_cost - 0.005).abs() < 1e-9);
    }

    #[test]
    fn empty_content_yields_empty_text() {
        let data = serde_json::json!({"content": [], "usage": {}});
        let resp = parse_messages_response(&data, "claude-sonnet-4-20250514");
        assert_eq!(resp.text, "");
        assert_eq!(resp.estimated_cost, 0.0);
    }

    #[tokio::test]
    async fn missing_api_key_reports_in_band() {
        let http = GuardedHttpClient::new(
            &["api.anthropic.com".to_string()],
            Duration::from_secs(5),
        )
        .unwrap();
        let provider =
            AnthropicProvider::new(String::new(), "https://api.anthropic.com/v1", http);
        let resp = provider
            .query("claude-sonnet-4-20250514", "hello", 16)
            .await
            .unwrap();
        assert!(resp.text.starts_with("Error:"));
        assert!(resp.text.contains("ANTHROPIC_API_KEY"));
        assert_eq!(resp.estimated_cost, 0.0);
    }
}
