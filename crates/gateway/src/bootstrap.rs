//! AppState construction and router assembly.
//!
//! Shared by `serve` and the integration tests so both boot the same stack.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use ag_domain::config::{Config, ConfigSeverity};
use ag_plugins::registry::{PluginDeps, PluginRegistry};
use ag_policy::{AuthResolver, ConcurrencyGate, PolicyEngine};
use ag_providers::ProviderRegistry;

use crate::api;
use crate::state::AppState;

/// Validate config, initialize every subsystem, and return a fully-wired
/// [`AppState`].
pub fn build_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Auth resolver ────────────────────────────────────────────────
    let auth = Arc::new(AuthResolver::new(&config));
    tracing::info!(tokens = auth.len(), "auth resolver ready");

    // ── Policy engine ────────────────────────────────────────────────
    let policy = Arc::new(PolicyEngine::new(config.clone()));
    tracing::info!(agents = config.agents.len(), "policy engine ready");

    // ── LLM providers ────────────────────────────────────────────────
    let providers = Arc::new(ProviderRegistry::from_config(&config.llm));
    if providers.is_empty() && config.enabled_plugins.iter().any(|p| p == "llm.query") {
        tracing::warn!(
            "llm.query is enabled but no LLM providers initialized; \
             its calls will fail until llm.providers is configured"
        );
    }

    // ── Plugins ──────────────────────────────────────────────────────
    let deps = PluginDeps {
        policy: policy.clone(),
        providers,
        gate: Arc::new(ConcurrencyGate::new()),
    };
    let plugins = Arc::new(PluginRegistry::load(&config, &deps));
    tracing::info!(
        tools = plugins.tool_count(),
        resources = plugins.resource_count(),
        prompts = plugins.prompt_count(),
        "plugin registry ready"
    );

    Ok(AppState {
        config,
        auth,
        policy,
        plugins,
    })
}

/// Assemble the HTTP stack around the state: API routes, request tracing,
/// and a global concurrency limit for backpressure.
pub fn build_router(state: AppState) -> Router {
    let max_concurrent = std::env::var("AGENTGATE_MAX_CONCURRENT_REQUESTS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(256);

    api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_concurrent))
}
