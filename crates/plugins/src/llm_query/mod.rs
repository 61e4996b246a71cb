//! `llm.query`: the LLM router tool.
//!
//! This is the one tool where every enforcement dimension fires at once:
//! egress allowlisting, capability gating (via its manifest), the input
//! guard, token clamping, and budget accounting. Cost is recorded only
//! after a successful provider call, so denied or failed calls never
//! charge the agent.

pub mod input_guard;

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use ag_domain::config::Config;
use ag_domain::error::Result;
use ag_domain::types::{Capability, PluginManifest};
use ag_policy::{ConcurrencyGate, PolicyEngine};
use ag_providers::registry::{ANTHROPIC_HOST, OPENAI_HOST};
use ag_providers::ProviderRegistry;

use crate::{parse_args, ToolContext, ToolPlugin};

use input_guard::check_input;

pub struct LlmQueryPlugin {
    config: Arc<Config>,
    policy: Arc<PolicyEngine>,
    providers: Arc<ProviderRegistry>,
    gate: Arc<ConcurrencyGate>,
}

#[derive(Debug, Deserialize)]
struct LlmQueryInput {
    provider: String,
    model: String,
    prompt: String,
    #[serde(default = "d_max_tokens")]
    max_tokens: u32,
}

fn d_max_tokens() -> u32 {
    1024
}

impl LlmQueryPlugin {
    pub fn new(
        config: Arc<Config>,
        policy: Arc<PolicyEngine>,
        providers: Arc<ProviderRegistry>,
        gate: Arc<ConcurrencyGate>,
    ) -> Self {
        Self {
            config,
            policy,
            providers,
            gate,
        }
    }

    /// Canonical egress host for a provider name. Cloud providers map to
    /// fixed API hosts; `local` uses the host parsed from its configured
    /// base URL (held by the registry entry).
    fn provider_host(&self, provider: &str) -> String {
        if let Some(entry) = self.providers.get(provider) {
            return entry.host().to_string();
        }
        match provider {
            "openai" => OPENAI_HOST.to_string(),
            "anthropic" => ANTHROPIC_HOST.to_string(),
            _ => "unknown".to_string(),
        }
    }
}

fn error_body(message: &str) -> String {
    json!({"error": message}).to_string()
}

#[async_trait::async_trait]
impl ToolPlugin for LlmQueryPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new(
            "llm.query",
            "LLM Query",
            "Route queries to LLM providers (OpenAI, Anthropic, local). \
             Requires network:outbound and llm:query capabilities.",
            [Capability::NetworkOutbound, Capability::LlmQuery],
        )
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "provider": {
                    "type": "string",
                    "description": "LLM provider: 'openai', 'anthropic', or 'local'"
                },
                "model": {
                    "type": "string",
                    "description": "Model name (must be on allowlist)"
                },
                "prompt": {
                    "type": "string",
                    "description": "The prompt to send to the LLM"
                },
                "max_tokens": {
                    "type": "integer",
                    "description": "Maximum tokens in response",
                    "default": 1024
                }
            },
            "required": ["provider", "model", "prompt"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, args: Value) -> Result<String> {
        let input: LlmQueryInput = parse_args(args)?;
        let identity = &ctx.identity;

        let Some(agent_cfg) = self.config.agents.get(&identity.agent_id) else {
            return Ok(error_body(&format!(
                "Unknown agent: {}",
                identity.agent_id
            )));
        };

        // Egress allowlist for the provider's canonical host.
        let host = self.provider_host(&input.provider);
        let egress = self.policy.check_egress(identity, &host);
        if !egress.allowed {
            return Ok(json!({"error": "Egress denied", "reasons": egress.reasons}).to_string());
        }

        let Some(entry) = self.providers.get(&input.provider) else {
            return Ok(error_body(&format!(
                "Unknown provider: {}",
                input.provider
            )));
        };

        if !entry.allows_model(&input.model) {
            return Ok(error_body(&format!(
                "Model '{}' is not on the allowlist for provider '{}'",
                input.model, input.provider
            )));
        }

        let guard_reasons = check_input(&input.prompt);
        if !guard_reasons.is_empty() {
            return Ok(json!({"error": "Input rejected", "reasons": guard_reasons}).to_string());
        }

        let max_tokens = input.max_tokens.min(agent_cfg.max_tokens_per_request);

        // This tool opts into the per-agent concurrency gate: provider
        // calls are the long-lived ones.
        let semaphore = self
            .gate
            .semaphore(&identity.agent_id, agent_cfg.concurrency);
        let _permit = semaphore
            .acquire_owned()
            .await
            .map_err(|_| ag_domain::Error::Other("concurrency gate closed".into()))?;

        let response = match entry
            .provider()
            .query(&input.model, &input.prompt, max_tokens)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    provider = %input.provider,
                    model = %input.model,
                    error = %e,
                    "LLM query failed"
                );
                return Ok(error_body(&format!("LLM query failed: {e}")));
            }
        };

        // Charge only on success.
        if response.estimated_cost > 0.0 {
            self.policy
                .budget()
                .record(&identity.agent_id, response.estimated_cost);
        }

        Ok(json!({
            "text": response.text,
            "model": response.model,
            "usage": response.usage,
            "estimated_cost": response.estimated_cost,
        })
        .to_string())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
