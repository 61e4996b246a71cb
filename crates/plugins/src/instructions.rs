//! `instructions://agent`: per-agent instructions loaded at session start.

use std::sync::Arc;

use serde_json::json;

use ag_domain::config::Config;
use ag_domain::error::Result;
use ag_domain::types::{AgentIdentity, PluginManifest};

use crate::ResourcePlugin;

pub struct InstructionsAgentPlugin {
    config: Arc<Config>,
}

impl InstructionsAgentPlugin {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl ResourcePlugin for InstructionsAgentPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new(
            "instructions.agent",
            "Agent Instructions",
            "Per-agent instructions loaded at session start and after context clearing.",
            [],
        )
    }

    fn uri(&self) -> &str {
        "instructions://agent"
    }

    async fn read(&self, identity: Option<&AgentIdentity>) -> Result<String> {
        let Some(identity) = identity else {
            return Ok(json!({"error": "Not authenticated"}).to_string());
        };
        let Some(agent_cfg) = self.config.agents.get(&identity.agent_id) else {
            return Ok(json!({"error": format!("Unknown agent: {}", identity.agent_id)}).to_string());
        };

        match &agent_cfg.instructions {
            Some(instructions) if !instructions.is_empty() => Ok(instructions.clone()),
            _ => Ok(json!({
                "agent_id": identity.agent_id,
                "instructions": "(no per-agent instructions configured)",
            })
            .to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_domain::config::AgentConfig;

    fn config_with_instructions(instructions: Option<&str>) -> Arc<Config> {
        let mut config = Config::default();
        config.agents.insert(
            "agent-alpha".into(),
            AgentConfig {
                token: "t".into(),
                instructions: instructions.map(|s| s.to_string()),
                ..AgentConfig::default()
            },
        );
        Arc::new(config)
    }

    fn alpha() -> AgentIdentity {
        AgentIdentity {
            agent_id: "agent-alpha".into(),
            tenant_id: "default".into(),
        }
    }

    #[tokio::test]
    async fn returns_configured_instructions_verbatim() {
        let plugin =
            InstructionsAgentPlugin::new(config_with_instructions(Some("Always be brief.")));
        let body = plugin.read(Some(&alpha())).await.unwrap();
        assert_eq!(body, "Always be brief.");
    }

    #[tokio::test]
    async fn placeholder_when_unset() {
        let plugin = InstructionsAgentPlugin::new(config_with_instructions(None));
        let body = plugin.read(Some(&alpha())).await.unwrap();
        assert!(body.contains("no per-agent instructions configured"));
    }

    #[tokio::test]
    async fn unauthenticated_read_is_error_body() {
        let plugin = InstructionsAgentPlugin::new(config_with_instructions(None));
        let body = plugin.read(None).await.unwrap();
        assert!(body.contains("Not authenticated"));
    }
}
