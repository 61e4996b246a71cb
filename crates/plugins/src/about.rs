//! Informational resources: `about://server` and `about://policies`.

use std::sync::Arc;

use serde_json::json;

use ag_domain::config::Config;
use ag_domain::error::Result;
use ag_domain::types::{AgentIdentity, PluginManifest};

use crate::ResourcePlugin;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// about://server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct AboutServerPlugin {
    config: Arc<Config>,
}

impl AboutServerPlugin {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl ResourcePlugin for AboutServerPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new(
            "about.server",
            "About Server",
            "Server name, version, and description.",
            [],
        )
    }

    fn uri(&self) -> &str {
        "about://server"
    }

    async fn read(&self, _identity: Option<&AgentIdentity>) -> Result<String> {
        Ok(serde_json::to_string_pretty(&json!({
            "name": self.config.server.name,
            "version": self.config.server.version,
            "description": self.config.server.description,
        }))?)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// about://policies
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The requesting agent's effective policy bundle, secrets excluded.
pub struct AboutPoliciesPlugin {
    config: Arc<Config>,
}

impl AboutPoliciesPlugin {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl ResourcePlugin for AboutPoliciesPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new(
            "about.policies",
            "About Policies",
            "Effective policy configuration for the requesting agent (secrets redacted).",
            [],
        )
    }

    fn uri(&self) -> &str {
        "about://policies"
    }

    async fn read(&self, identity: Option<&AgentIdentity>) -> Result<String> {
        let Some(identity) = identity else {
            return Ok(json!({"error": "Not authenticated"}).to_string());
        };
        let Some(agent_cfg) = self.config.agents.get(&identity.agent_id) else {
            return Ok(json!({"error": format!("Unknown agent: {}", identity.agent_id)}).to_string());
        };

        let capabilities: Vec<&str> = agent_cfg
            .allowed_capabilities
            .iter()
            .map(|c| c.as_str())
            .collect();

        Ok(serde_json::to_string_pretty(&json!({
            "agent_id": identity.agent_id,
            "tenant_id": identity.tenant_id,
            "allowed_tools": agent_cfg.allowed_tools,
            "allowed_capabilities": capabilities,
            "egress_allowlist": agent_cfg.egress_allowlist,
            "max_payload_bytes": agent_cfg.max_payload_bytes,
            "max_response_bytes": agent_cfg.max_response_bytes,
            "timeout_seconds": agent_cfg.timeout_seconds,
            "concurrency": agent_cfg.concurrency,
            "rate_limit": agent_cfg.rate_limit,
            "max_tokens_per_request": agent_cfg.max_tokens_per_request,
            "max_cost_per_day": agent_cfg.max_cost_per_day,
            "enabled_plugins": self.config.enabled_plugins,
        }))?)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
