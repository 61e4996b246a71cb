//! Local (Ollama-shaped) adapter. No API key, no cost.

use std::collections::HashMap;

use ag_domain::error::Result;
use serde_json::Value;

use crate::egress::GuardedHttpClient;
use crate::traits::{LlmProvider, LlmResponse};
use crate::util::expect_json;

pub struct LocalProvider {
    base_url: String,
    http: GuardedHttpClient,
}

impl LocalProvider {
    pub fn new(base_url: &str, http: GuardedHttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for LocalProvider {
    fn provider_name(&self) -> &'static str {
        "local"
    }

    async fn query(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<LlmResponse> {
        let url = format!("{}/api/generate", self.base_url);
        let body = serde_json::json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
            "options": {"num_predict": max_tokens},
        });

        let resp = self.http.post_json(&url, &[], &body).await?;
        let data = expect_json(resp, "local").await?;
        Ok(parse_generate_response(&data, model))
    }
}

fn parse_generate_response(data: &Value, model: &str) -> LlmResponse {
    let text = data["response"].as_str().unwrap_or("").to_string();
    let total =
        data["prompt_eval_count"].as_u64().unwrap_or(0) + data["eval_count"].as_u64().unwrap_or(0);

    let mut counters = HashMap::new();
    counters.insert("total_tokens".to_string(), total);

    LlmResponse {
        text,
        model: model.to_string(),
        usage: counters,
        estimated_cost: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_response_and_counts() {
        let data = serde_json::json!({
            "response": "local answer",
            "prompt_eval_count": 7,
            "eval_count": 13
        });
        let resp = parse_generate_response(&data, "llama3");
        assert_eq!(resp.text, "local answer");
        assert_eq!(resp.usage["total_tokens"], 20);
        assert_eq!(resp.estimated_cost, 0.0);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let data = serde_json::json!({});
        let resp = parse_generate_response(&data, "llama3");
        assert_eq!(resp.text, "");
        assert_eq!(resp.usage["total_tokens"], 0);
    }
}
