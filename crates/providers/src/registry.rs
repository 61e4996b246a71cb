//! Provider registry.
//!
//! Constructs and holds all configured LLM provider instances. Each provider
//! gets its own [`GuardedHttpClient`] whose allowlist is exactly that
//! provider's canonical host, so even a bad base URL in config cannot make
//! the adapter reach anywhere else. A provider that fails to initialize is
//! logged and skipped rather than aborting startup.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ag_domain::config::{LlmConfig, LlmProviderConfig};
use ag_domain::error::Result;

use crate::anthropic::AnthropicProvider;
use crate::egress::GuardedHttpClient;
use crate::local::LocalProvider;
use crate::openai::OpenAiProvider;
use crate::traits::LlmProvider;

pub const OPENAI_HOST: &str = "api.openai.com";
pub const ANTHROPIC_HOST: &str = "api.anthropic.com";

const OPENAI_DEFAULT_BASE: &str = "https://api.openai.com/v1";
const ANTHROPIC_DEFAULT_BASE: &str = "https://api.anthropic.com/v1";
const LOCAL_DEFAULT_BASE: &str = "http://localhost:11434";

const CLOUD_TIMEOUT: Duration = Duration::from_secs(60);
const LOCAL_TIMEOUT: Duration = Duration::from_secs(120);

/// One registered provider: the adapter, its canonical egress host, and the
/// models agents may request from it.
pub struct ProviderEntry {
    provider: Arc<dyn LlmProvider>,
    host: String,
    allowed_models: Vec<String>,
}

impl ProviderEntry {
    pub fn new(provider: Arc<dyn LlmProvider>, host: String, allowed_models: Vec<String>) -> Self {
        Self {
            provider,
            host,
            allowed_models,
        }
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// The host the egress policy check runs against for this provider.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn allows_model(&self, model: &str) -> bool {
        self.allowed_models.iter().any(|m| m == model)
    }
}

#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, ProviderEntry>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the registry from the application's [`LlmConfig`].
    pub fn from_config(config: &LlmConfig) -> Self {
        let mut registry = Self::empty();
        for (name, pcfg) in &config.providers {
            let built = match name.as_str() {
                "openai" => build_openai(pcfg),
                "anthropic" => build_anthropic(pcfg),
                "local" => build_local(pcfg),
                other => {
                    tracing::warn!(provider = %other, "unknown LLM provider in config, skipping");
                    continue;
                }
            };
            match built {
                Ok(entry) => {
                    tracing::info!(
                        provider = %name,
                        host = %entry.host,
                        models = entry.allowed_models.len(),
                        "registered LLM provider"
                    );
                    registry.providers.insert(name.clone(), entry);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = %name,
                        error = %e,
                        "failed to initialize LLM provider, skipping"
                    );
                }
            }
        }
        registry
    }

    /// Insert an already-built entry. Used for composition and tests.
    pub fn insert(&mut self, name: impl Into<String>, entry: ProviderEntry) {
        self.providers.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&ProviderEntry> {
        self.providers.get(name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// All registered provider names, sorted.
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

fn build_openai(pcfg: &LlmProviderConfig) -> Result<ProviderEntry> {
    let base_url = if pcfg.base_url.is_empty() {
        OPENAI_DEFAULT_BASE
    } else {
        &pcfg.base_url
    };
    let http = GuardedHttpClient::new(&[OPENAI_HOST.to_string()], CLOUD_TIMEOUT)?;
    Ok(ProviderEntry::new(
        Arc::new(OpenAiProvider::new(pcfg.api_key.clone(), base_url, http)),
        OPENAI_HOST.to_string(),
        pcfg.allowed_models.clone(),
    ))
}

fn build_anthropic(pcfg: &LlmProviderConfig) -> Result<ProviderEntry> {
    let base_url = if pcfg.base_url.is_empty() {
        ANTHROPIC_DEFAULT_BASE
    } else {
        &pcfg.base_url
    };
    let http = GuardedHttpClient::new(&[ANTHROPIC_HOST.to_string()], CLOUD_TIMEOUT)?;
    Ok(ProviderEntry::new(
        Arc::new(AnthropicProvider::new(pcfg.api_key.clone(), base_url, http)),
        ANTHROPIC_HOST.to_string(),
        pcfg.allowed_models.clone(),
    ))
}

fn build_local(pcfg: &LlmProviderConfig) -> Result<ProviderEntry> {
    let base_url = if pcfg.base_url.is_empty() {
        LOCAL_DEFAULT_BASE
    } else {
        &pcfg.base_url
    };
    // The local provider's egress host comes from its configured base URL.
    let host = reqwest::Url::parse(base_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| "localhost".to_string());
    let http = GuardedHttpClient::new(&[host.clone()], LOCAL_TIMEOUT)?;
    Ok(ProviderEntry::new(
        Arc::new(LocalProvider::new(base_url, http)),
        host,
        pcfg.allowed_models.clone(),
    ))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn llm_config(entries: &[(&str, &str, &[&str])]) -> LlmConfig {
        let mut providers = HashMap::new();
        for (name, base_url, models) in entries {
            providers.insert(
                name.to_string(),
                LlmProviderConfig {
                    api_key: "test-key".into(),
                    base_url: base_url.to_string(),
                    allowed_models: models.iter().map(|m| m.to_string()).collect(),
                },
            );
        }
        LlmConfig { providers }
    }

    #[test]
    fn cloud_providers_use_canonical_hosts() {
        let config = llm_config(&[
            ("openai", "", &["gpt-4o"]),
            ("anthropic", "", &["claude-sonnet-4-20250514"]),
        ]);
        let registry = ProviderRegistry::from_config(&config);
        assert_eq!(registry.get("openai").unwrap().host(), "api.openai.com");
        assert_eq!(
            registry.get("anthropic").unwrap().host(),
            "api.anthropic.com"
        );
    }

    #[test]
    fn local_host_parsed_from_base_url() {
        let config = llm_config(&[("local", "http://llm-box.internal:11434", &["llama3"])]);
        let registry = ProviderRegistry::from_config(&config);
        assert_eq!(registry.get("local").unwrap().host(), "llm-box.internal");
    }

    #[test]
    fn local_defaults_to_localhost() {
        let config = llm_config(&[("local", "", &[])]);
        let registry = ProviderRegistry::from_config(&config);
        assert_eq!(registry.get("local").unwrap().host(), "localhost");
    }

    #[test]
    fn unknown_provider_name_is_skipped() {
        let config = llm_config(&[("mystery", "", &[])]);
        let registry = ProviderRegistry::from_config(&config);
        assert!(registry.is_empty());
    }

    #[test]
    fn model_allowlist_is_exact() {
        let config = llm_config(&[("openai", "", &["gpt-4o", "gpt-4o-mini"])]);
        let registry = ProviderRegistry::from_config(&config);
        let entry = registry.get("openai").unwrap();
        assert!(entry.allows_model("gpt-4o"));
        assert!(!entry.allows_model("gpt-3.5-turbo"));
    }

    #[test]
    fn provider_names_sorted() {
        let config = llm_config(&[("openai", "", &[]), ("local", "", &[]), ("anthropic", "", &[])]);
        let registry = ProviderRegistry::from_config(&config);
        assert_eq!(
            registry.provider_names(),
            vec!["anthropic", "local", "openai"]
        );
    }
}
