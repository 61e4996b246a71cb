//! OpenAI chat-completions adapter.

use std::collections::HashMap;

use ag_domain::error::{Error, Result};
use serde_json::Value;

use crate::egress::GuardedHttpClient;
use crate::traits::{LlmProvider, LlmResponse};
use crate::util::expect_json;

/// Rough cost per 1K tokens (input + output averaged).
const COST_PER_1K: &[(&str, f64)] = &[("gpt-4o", 0.005), ("gpt-4o-mini", 0.0003)];
const FALLBACK_COST_PER_1K: f64 = 0.01;

fn price_per_1k(model: &str) -> f64 {
    COST_PER_1K
        .iter()
        .find(|(m, _)| *m == model)
        .map(|(_, p)| *p)
        .unwrap_or(FALLBACK_COST_PER_1K)
}

pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    http: GuardedHttpClient,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: &str, http: GuardedHttpClient) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    async fn query(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<LlmResponse> {
        if self.api_key.is_empty() {
            // A missing key is a configuration problem, not an upstream
            // failure: report it in-band so the caller is never charged.
            return Ok(LlmResponse::text_only(
                "Error: OpenAI API key is not configured. Set OPENAI_API_KEY in environment.",
                model,
            ));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": max_tokens,
        });
        let auth = format!("Bearer {}", self.api_key);

        let resp = self
            .http
            .post_json(&url, &[("Authorization", auth.as_str())], &body)
            .await?;
        let data = expect_json(resp, "openai").await?;
        parse_chat_completion(&data, model)
    }
}

fn parse_chat_completion(data: &Value, model: &str) -> Result<LlmResponse> {
    let text = data["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| Error::Provider {
            provider: "openai".into(),
            message: "response missing choices[0].message.content".into(),
        })?
        .to_string();

    let usage = &data["usage"];
    let prompt_tokens = usage["prompt_tokens"].as_u64().unwrap_or(0);
    let completion_tokens = usage["completion_tokens"].as_u64().unwrap_or(0);
    let total_tokens = usage["total_tokens"].as_u64().unwrap_or(0);
    let cost = (total_tokens as f64 / 1000.0) * price_per_1k(model);

    let mut counters = HashMap::new();
    counters.insert("prompt_tokens".to_string(), prompt_tokens);
    counters.insert("completion_tokens".to_string(), completion_tokens);
    counters.insert("total_tokens".to_string(), total_tokens);

    Ok(LlmResponse {
        text,
        model: model.to_string(),
        usage: counters,
        estimated_cost: cost,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parses_completion_and_estimates_cost() {
        let data = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "hi there"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 90, "total_tokens": 100}
        });
        let resp = parse_chat_completion(&data, "gpt-4o").unwrap();
        assert_eq!(resp.text, "hi there");
        assert_eq!(resp.usage["total_tokens"], 100);
        assert!((resp.estimated_cost - 0.0005).abs() < 1e-9);
    }

    #[test]
    fn unknown_model_uses_fallback_price() {
        let data = serde_json::json!({
            "choices": [{"message": {"content": "x"}}],
            "usage": {"total_tokens": 1000}
        });
        let resp = parse_chat_completion(&data, "gpt-5-experimental").unwrap();
        assert!((resp.estimated_cost - 0.01).abs() < 1e-9);
    }

    #[test]
    fn missing_content_is_a_provider_error() {
        let data = serde_json::json!({"choices": []});
        assert!(matches!(
            parse_chat_completion(&data, "gpt-4o").unwrap_err(),
            Error::Provider { .. }
        ));
    }

    #[test]
    fn missing_usage_means_zero_cost() {
        let data = serde_json::json!({
            "choices": [{"message": {"content": "x"}}]
        });
        let resp = parse_chat_completion(&data, "gpt-4o").unwrap();
        assert_eq!(resp.estimated_cost, 0.0);
    }

    #[tokio::test]
    async fn missing_api_key_reports_in_band() {
        let http = GuardedHttpClient::new(
            &["api.openai.com".to_string()],
            Duration::from_secs(5),
        )
        .unwrap();
        let provider = OpenAiProvider::new(String::new(), "https://api.openai.com/v1", http);
        let resp = provider.query("gpt-4o", "hello", 16).await.unwrap();
        assert!(resp.text.starts_with("Error:"));
        assert!(resp.text.contains("OPENAI_API_KEY"));
        assert_eq!(resp.estimated_cost, 0.0);
    }
}
