//! Configuration model and YAML loader with `${VAR}` expansion.
//!
//! The configuration is loaded once at startup and is read-only afterwards.
//! A missing file or an empty document yields the defaults; a malformed
//! document is a startup error.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Capability;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Agent definitions (key = agent_id).
    #[serde(default)]
    pub agents: HashMap<String, AgentConfig>,
    #[serde(default = "d_enabled_plugins")]
    pub enabled_plugins: Vec<String>,
    #[serde(default)]
    pub llm: LlmConfig,
    /// Regex patterns applied to every log record before emission.
    #[serde(default = "d_redact_patterns")]
    pub redact_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            agents: HashMap::new(),
            enabled_plugins: d_enabled_plugins(),
            llm: LlmConfig::default(),
            redact_patterns: d_redact_patterns(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default = "d_port")]
    pub port: u16,
    #[serde(default = "d_server_name")]
    pub name: String,
    #[serde(default = "d_server_version")]
    pub version: String,
    #[serde(default = "d_server_description")]
    pub description: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: d_host(),
            port: d_port(),
            name: d_server_name(),
            version: d_server_version(),
            description: d_server_description(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Agents
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-agent quota bundle. Every limit has a conservative default so a
/// minimal config entry (just a token) still yields an enforceable policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Pre-shared bearer token. Must be unique across agents.
    #[serde(default)]
    pub token: String,
    #[serde(default = "d_tenant")]
    pub tenant_id: String,
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    #[serde(default)]
    pub allowed_capabilities: Vec<Capability>,
    /// Hostnames this agent may reach via outbound HTTP (exact,
    /// case-insensitive match).
    #[serde(default)]
    pub egress_allowlist: Vec<String>,
    #[serde(default = "d_mib")]
    pub max_payload_bytes: usize,
    #[serde(default = "d_mib")]
    pub max_response_bytes: usize,
    #[serde(default = "d_30")]
    pub timeout_seconds: u64,
    #[serde(default = "d_5")]
    pub concurrency: usize,
    /// Requests per 60-second sliding window.
    #[serde(default = "d_60")]
    pub rate_limit: usize,
    #[serde(default = "d_4096")]
    pub max_tokens_per_request: u32,
    /// Daily LLM spend cap in USD.
    #[serde(default = "d_cost_cap")]
    pub max_cost_per_day: f64,
    /// Free-form instructions served via `instructions://agent`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            tenant_id: d_tenant(),
            allowed_tools: Vec::new(),
            allowed_capabilities: Vec::new(),
            egress_allowlist: Vec::new(),
            max_payload_bytes: d_mib(),
            max_response_bytes: d_mib(),
            timeout_seconds: d_30(),
            concurrency: d_5(),
            rate_limit: d_60(),
            max_tokens_per_request: d_4096(),
            max_cost_per_day: d_cost_cap(),
            instructions: None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM providers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmConfig {
    /// Keyed by provider name: `openai`, `anthropic`, or `local`.
    #[serde(default)]
    pub providers: HashMap<String, LlmProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub allowed_models: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Serde default helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn d_host() -> String {
    "0.0.0.0".into()
}
fn d_port() -> u16 {
    8000
}
fn d_server_name() -> String {
    "agentgate".into()
}
fn d_server_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}
fn d_server_description() -> String {
    "Remote tool gateway for multi-agent assistants".into()
}
fn d_tenant() -> String {
    "default".into()
}
fn d_mib() -> usize {
    1_048_576
}
fn d_30() -> u64 {
    30
}
fn d_5() -> usize {
    5
}
fn d_60() -> usize {
    60
}
fn d_4096() -> u32 {
    4096
}
fn d_cost_cap() -> f64 {
    10.0
}
fn d_enabled_plugins() -> Vec<String> {
    vec!["core.echo".into(), "core.sum".into()]
}
fn d_redact_patterns() -> Vec<String> {
    vec![
        r"(?i)(sk-[a-zA-Z0-9]{20,})".into(),
        r"(?i)(Bearer\s+[a-zA-Z0-9._\-]+)".into(),
        r"(?i)(api[_-]?key\s*[:=]\s*\S+)".into(),
    ]
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Loader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const ENV_REF: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}";

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// `${VAR}` references inside any string value are expanded from the
    /// process environment; unset variables expand to the empty string. A
    /// missing file or an empty document yields [`Config::default`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the document cannot be parsed or does
    /// not match the schema.
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(path)?;
        if raw.trim().is_empty() {
            return Ok(Config::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(&raw)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;
        let env_re = Regex::new(ENV_REF).expect("static env-ref regex");
        let expanded = expand_env(value, &env_re);
        serde_yaml::from_value(expanded)
            .map_err(|e| Error::Config(format!("invalid config {}: {e}", path.display())))
    }

    /// Startup-time sanity checks in severity order. The caller decides
    /// whether to abort; error-level issues make the config unusable.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // The token -> agent map must be injective.
        let mut seen: HashMap<&str, &str> = HashMap::new();
        let mut agent_ids: Vec<&String> = self.agents.keys().collect();
        agent_ids.sort();
        for agent_id in agent_ids {
            let agent = &self.agents[agent_id];
            if agent.token.is_empty() {
                issues.push(ConfigIssue::warning(format!(
                    "agent '{agent_id}' has an empty token and cannot authenticate"
                )));
                continue;
            }
            if let Some(other) = seen.insert(agent.token.as_str(), agent_id.as_str()) {
                issues.push(ConfigIssue::error(format!(
                    "agents '{other}' and '{agent_id}' share the same token"
                )));
            }
            if agent.rate_limit == 0 {
                issues.push(ConfigIssue::warning(format!(
                    "agent '{agent_id}' has rate_limit 0; every tool call will be denied"
                )));
            }
        }

        for pattern in &self.redact_patterns {
            if let Err(e) = Regex::new(pattern) {
                issues.push(ConfigIssue::error(format!(
                    "invalid redact pattern '{pattern}': {e}"
                )));
            }
        }

        issues
    }
}

/// Recursively expand `${VAR}` references in every string node.
fn expand_env(value: serde_yaml::Value, re: &Regex) -> serde_yaml::Value {
    use serde_yaml::Value;
    match value {
        Value::String(s) => {
            let expanded = re.replace_all(&s, |caps: &regex::Captures<'_>| {
                std::env::var(&caps[1]).unwrap_or_default()
            });
            Value::String(expanded.into_owned())
        }
        Value::Sequence(seq) => {
            Value::Sequence(seq.into_iter().map(|v| expand_env(v, re)).collect())
        }
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (k, expand_env(v, re)))
                .collect(),
        ),
        Value::Tagged(tagged) => {
            let serde_yaml::value::TaggedValue { tag, value } = *tagged;
            Value::Tagged(Box::new(serde_yaml::value::TaggedValue {
                tag,
                value: expand_env(value, re),
            }))
        }
        other => other,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validation issues
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub message: String,
}

impl ConfigIssue {
    fn warning(message: String) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            message,
        }
    }

    fn error(message: String) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            message,
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
