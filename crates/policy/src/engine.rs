//! Central policy enforcement for tool calls and egress.
//!
//! Every tool invocation passes through [`PolicyEngine::check_tool_call`];
//! there is no bypass path. Checks run in a fixed order and accumulate every
//! failing reason rather than short-circuiting, so a client sees all blocking
//! conditions at once instead of probing for the next one retry by retry.

use std::sync::Arc;

use ag_domain::config::{AgentConfig, Config};
use ag_domain::types::{AgentIdentity, Capability, PluginManifest, PolicyDecision};

use crate::budget::BudgetTracker;
use crate::rate_limit::RateLimiter;

pub struct PolicyEngine {
    config: Arc<Config>,
    budget: BudgetTracker,
    rate_limiter: RateLimiter,
}

impl PolicyEngine {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            budget: BudgetTracker::new(),
            rate_limiter: RateLimiter::new(),
        }
    }

    /// The cost tracker, exposed so LLM-consuming tools can record charges.
    pub fn budget(&self) -> &BudgetTracker {
        &self.budget
    }

    fn agent_config(&self, identity: &AgentIdentity) -> Option<&AgentConfig> {
        self.config.agents.get(&identity.agent_id)
    }

    /// Run all policy checks for a tool call.
    ///
    /// Check order: agent existence (short-circuits; nothing else can be
    /// evaluated without an agent config), tool allowlist, capability
    /// gating, payload size, rate window, and LLM budget (only for tools
    /// requiring `llm:query`). The rate window is only charged when the
    /// whole decision is an allow.
    pub fn check_tool_call(
        &self,
        identity: &AgentIdentity,
        manifest: &PluginManifest,
        payload_size: usize,
    ) -> PolicyDecision {
        let Some(agent_cfg) = self.agent_config(identity) else {
            return PolicyDecision::deny(vec![format!("Unknown agent: {}", identity.agent_id)]);
        };

        let mut reasons: Vec<String> = Vec::new();

        // 1. Tool allowlist
        if !agent_cfg.allowed_tools.iter().any(|t| t == &manifest.name) {
            reasons.push(format!(
                "Tool '{}' is not in allowed_tools for agent '{}'",
                manifest.name, identity.agent_id
            ));
        }

        // 2. Capability gating
        let mut missing: Vec<&str> = manifest
            .capabilities
            .iter()
            .filter(|c| !agent_cfg.allowed_capabilities.contains(*c))
            .map(|c| c.as_str())
            .collect();
        if !missing.is_empty() {
            missing.sort_unstable();
            reasons.push(format!("Missing capabilities: {missing:?}"));
        }

        // 3. Payload size
        if payload_size > agent_cfg.max_payload_bytes {
            reasons.push(format!(
                "Payload size {payload_size} exceeds limit {}",
                agent_cfg.max_payload_bytes
            ));
        }

        // 4. Rate limit
        if !self
            .rate_limiter
            .check(&identity.agent_id, agent_cfg.rate_limit)
        {
            reasons.push(format!(
                "Rate limit exceeded: {} requests/minute",
                agent_cfg.rate_limit
            ));
        }

        // 5. LLM budget (only for tools requiring llm:query)
        if manifest.capabilities.contains(&Capability::LlmQuery)
            && self
                .budget
                .check(&identity.agent_id, agent_cfg.max_cost_per_day)
                <= 0.0
        {
            reasons.push(format!(
                "Daily LLM budget exhausted (limit: ${:.2})",
                agent_cfg.max_cost_per_day
            ));
        }

        if !reasons.is_empty() {
            tracing::warn!(
                agent_id = %identity.agent_id,
                tool = %manifest.name,
                reasons = ?reasons,
                "policy deny"
            );
            return PolicyDecision::deny(reasons);
        }

        self.rate_limiter.record(&identity.agent_id);
        PolicyDecision::allow()
    }

    /// Check whether outbound HTTP to `host` is allowed for this agent:
    /// the agent must exist, hold `network:outbound`, and the host must be
    /// on its egress allowlist (exact, case-insensitive).
    pub fn check_egress(&self, identity: &AgentIdentity, host: &str) -> PolicyDecision {
        let Some(agent_cfg) = self.agent_config(identity) else {
            return PolicyDecision::deny(vec![format!("Unknown agent: {}", identity.agent_id)]);
        };

        if !agent_cfg
            .allowed_capabilities
            .contains(&Capability::NetworkOutbound)
        {
            return PolicyDecision::deny(vec![format!(
                "Agent '{}' lacks capability 'network:outbound'",
                identity.agent_id
            )]);
        }

        if !agent_cfg
            .egress_allowlist
            .iter()
            .any(|h| h.eq_ignore_ascii_case(host))
        {
            return PolicyDecision::deny(vec![format!(
                "Host '{host}' not in egress allowlist for agent '{}'",
                identity.agent_id
            )]);
        }

        PolicyDecision::allow()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
