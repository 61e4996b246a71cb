//! Plugin loader and registry, driven by `enabled_plugins` in config.
//!
//! The factory table is a compile-time match over the known plugin names.
//! Unknown names are logged and skipped; loading one plugin never prevents
//! the rest from loading.

use std::collections::HashMap;
use std::sync::Arc;

use ag_domain::config::Config;
use ag_policy::{ConcurrencyGate, PolicyEngine};
use ag_providers::ProviderRegistry;

use crate::about::{AboutPoliciesPlugin, AboutServerPlugin};
use crate::echo::EchoPlugin;
use crate::instructions::InstructionsAgentPlugin;
use crate::llm_query::LlmQueryPlugin;
use crate::prompts::{ReviewPrPlugin, ToolUsagePlugin};
use crate::sum::SumPlugin;
use crate::{PromptPlugin, ResourcePlugin, ToolPlugin};

/// Every plugin name the factory table can construct.
pub const KNOWN_PLUGINS: &[&str] = &[
    "core.echo",
    "core.sum",
    "llm.query",
    "about.server",
    "about.policies",
    "instructions.agent",
    "prompt.review_pr",
    "prompt.tool_usage",
];

/// Shared services plugins may need at construction time.
pub struct PluginDeps {
    pub policy: Arc<PolicyEngine>,
    pub providers: Arc<ProviderRegistry>,
    pub gate: Arc<ConcurrencyGate>,
}

enum Loaded {
    Tool(Arc<dyn ToolPlugin>),
    Resource(Arc<dyn ResourcePlugin>),
    Prompt(Arc<dyn PromptPlugin>),
}

/// Holds all enabled plugin instances, indexed by kind.
#[derive(Default)]
pub struct PluginRegistry {
    tools: HashMap<String, Arc<dyn ToolPlugin>>,
    resources: HashMap<String, Arc<dyn ResourcePlugin>>,
    prompts: HashMap<String, Arc<dyn PromptPlugin>>,
}

impl PluginRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Instantiate every enabled plugin from the factory table.
    pub fn load(config: &Arc<Config>, deps: &PluginDeps) -> Self {
        let mut registry = Self::empty();
        for name in &config.enabled_plugins {
            let loaded = match name.as_str() {
                "core.echo" => Loaded::Tool(Arc::new(EchoPlugin)),
                "core.sum" => Loaded::Tool(Arc::new(SumPlugin)),
                "llm.query" => Loaded::Tool(Arc::new(LlmQueryPlugin::new(
                    config.clone(),
                    deps.policy.clone(),
                    deps.providers.clone(),
                    deps.gate.clone(),
                ))),
                "about.server" => Loaded::Resource(Arc::new(AboutServerPlugin::new(config.clone()))),
                "about.policies" => {
                    Loaded::Resource(Arc::new(AboutPoliciesPlugin::new(config.clone())))
                }
                "instructions.agent" => {
                    Loaded::Resource(Arc::new(InstructionsAgentPlugin::new(config.clone())))
                }
                "prompt.review_pr" => Loaded::Prompt(Arc::new(ReviewPrPlugin)),
                "prompt.tool_usage" => Loaded::Prompt(Arc::new(ToolUsagePlugin)),
                other => {
                    tracing::warn!(plugin = %other, "unknown plugin, skipping");
                    continue;
                }
            };
            match loaded {
                Loaded::Tool(tool) => {
                    let tool_name = tool.manifest().name;
                    tracing::info!(plugin = %tool_name, "loaded tool plugin");
                    registry.tools.insert(tool_name, tool);
                }
                Loaded::Resource(resource) => {
                    let uri = resource.uri().to_string();
                    tracing::info!(plugin = %name, uri = %uri, "loaded resource plugin");
                    registry.resources.insert(uri, resource);
                }
                Loaded::Prompt(prompt) => {
                    let prompt_name = prompt.prompt_name().to_string();
                    tracing::info!(plugin = %name, prompt = %prompt_name, "loaded prompt plugin");
                    registry.prompts.insert(prompt_name, prompt);
                }
            }
        }
        registry
    }

    pub fn tool(&self, name: &str) -> Option<&Arc<dyn ToolPlugin>> {
        self.tools.get(name)
    }

    pub fn resource(&self, uri: &str) -> Option<&Arc<dyn ResourcePlugin>> {
        self.resources.get(uri)
    }

    pub fn prompt(&self, name: &str) -> Option<&Arc<dyn PromptPlugin>> {
        self.prompts.get(name)
    }

    pub fn tools(&self) -> impl Iterator<Item = &Arc<dyn ToolPlugin>> {
        self.tools.values()
    }

    pub fn resources(&self) -> impl Iterator<Item = &Arc<dyn ResourcePlugin>> {
        self.resources.values()
    }

    pub fn prompts(&self) -> impl Iterator<Item = &Arc<dyn PromptPlugin>> {
        self.prompts.values()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.len()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(config: &Arc<Config>) -> PluginDeps {
        PluginDeps {
            policy: Arc::new(PolicyEngine::new(config.clone())),
            providers: Arc::new(ProviderRegistry::empty()),
            gate: Arc::new(ConcurrencyGate::new()),
        }
    }

    fn config_with_plugins(plugins: &[&str]) -> Arc<Config> {
        let mut config = Config::default();
        config.enabled_plugins = plugins.iter().map(|p| p.to_string()).collect();
        Arc::new(config)
    }

    #[test]
    fn loads_core_tools() {
        let config = config_with_plugins(&["core.echo", "core.sum"]);
        let registry = PluginRegistry::load(&config, &deps(&config));
        assert!(registry.tool("core.echo").is_some());
        assert!(registry.tool("core.sum").is_some());
        assert_eq!(registry.tool_count(), 2);
    }

    #[test]
    fn discriminates_kinds_at_registration() {
        let config = config_with_plugins(&[
            "core.echo",
            "about.server",
            "prompt.review_pr",
        ]);
        let registry = PluginRegistry::load(&config, &deps(&config));
        assert_eq!(registry.tool_count(), 1);
        assert_eq!(registry.resource_count(), 1);
        assert_eq!(registry.prompt_count(), 1);
        assert!(registry.resource("about://server").is_some());
        assert!(registry.prompt("review_pr").is_some());
    }

    #[test]
    fn unknown_plugin_skipped_without_affecting_others() {
        let config = config_with_plugins(&["nonexistent.plugin", "core.echo"]);
        let registry = PluginRegistry::load(&config, &deps(&config));
        assert!(registry.tool("nonexistent.plugin").is_none());
        assert!(registry.tool("core.echo").is_some());
        assert_eq!(registry.tool_count(), 1);
    }

    #[test]
    fn only_unknown_plugins_means_empty_registry() {
        let config = config_with_plugins(&["nonexistent.plugin"]);
        let registry = PluginRegistry::load(&config, &deps(&config));
        assert_eq!(registry.tool_count(), 0);
        assert_eq!(registry.resource_count(), 0);
        assert_eq!(registry.prompt_count(), 0);
    }

    #[test]
    fn every_loaded_manifest_matches_its_key() {
        let config = config_with_plugins(KNOWN_PLUGINS);
        let registry = PluginRegistry::load(&config, &deps(&config));
        for (name, tool) in &registry.tools {
            let manifest = tool.manifest();
            assert_eq!(&manifest.name, name);
            assert!(!manifest.title.is_empty());
            assert!(!manifest.description.is_empty());
        }
        assert_eq!(
            registry.tool_count() + registry.resource_count() + registry.prompt_count(),
            KNOWN_PLUGINS.len()
        );
    }

    #[test]
    fn tool_schemas_declare_object_type() {
        let config = config_with_plugins(&["core.echo", "core.sum", "llm.query"]);
        let registry = PluginRegistry::load(&config, &deps(&config));
        for tool in registry.tools() {
            assert_eq!(tool.input_schema()["type"], "object");
        }
    }
}
