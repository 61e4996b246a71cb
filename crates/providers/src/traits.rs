//! Provider abstraction for the LLM router.

use std::collections::HashMap;

use ag_domain::error::Result;
use serde::Serialize;

/// A completed response from an LLM provider.
#[derive(Debug, Clone, Serialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: String,
    /// Provider-specific token counters (`total_tokens`, `input_tokens`, ...).
    pub usage: HashMap<String, u64>,
    /// Estimated cost of this call in USD. Zero means "do not charge".
    pub estimated_cost: f64,
}

impl LlmResponse {
    /// A zero-cost response carrying only text, used for in-band errors
    /// such as a missing API key.
    pub fn text_only(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            usage: HashMap::new(),
            estimated_cost: 0.0,
        }
    }
}

/// Trait every LLM adapter implements.
///
/// Implementations translate between the router's call shape and each
/// provider's wire format, and estimate the call cost from the returned
/// usage counters. Adapters are shared across requests and must be safe for
/// concurrent use.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stable provider name (`openai`, `anthropic`, `local`).
    fn provider_name(&self) -> &'static str;

    /// Send one prompt and wait for the full response.
    async fn query(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<LlmResponse>;
}
