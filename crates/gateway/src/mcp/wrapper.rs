//! Per-invocation wrapper around tool execution.
//!
//! This is the only code path by which a tool's `execute` is reachable:
//! identity check, payload sizing, policy decision, timeout-bounded
//! execution, and outcome logging all happen here. Every failure becomes a
//! structured error body; the transport stays at HTTP 200 because JSON-RPC
//! carries its own error shape.

use std::time::Duration;

use serde_json::{json, Value};

use ag_domain::types::AgentIdentity;
use ag_plugins::ToolContext;

use crate::state::AppState;

fn error_body(message: &str) -> String {
    json!({"error": message}).to_string()
}

/// Run one tool call through the full policy pipeline and return the
/// response body (a plain string on success, a JSON error body otherwise).
pub async fn run_tool(
    state: &AppState,
    identity: Option<&AgentIdentity>,
    name: &str,
    args: Value,
) -> String {
    let Some(identity) = identity else {
        return error_body("Not authenticated");
    };

    let Some(tool) = state.plugins.tool(name) else {
        tracing::warn!(tool = %name, agent_id = %identity.agent_id, "unknown tool requested");
        return error_body(&format!("Unknown tool: {name}"));
    };

    let manifest = tool.manifest();
    let payload_size = serde_json::to_string(&args).map(|s| s.len()).unwrap_or(0);

    let decision = state.policy.check_tool_call(identity, &manifest, payload_size);
    if !decision.allowed {
        tracing::warn!(
            agent_id = %identity.agent_id,
            tool = %manifest.name,
            reasons = ?decision.reasons,
            "tool call denied"
        );
        return json!({"error": "Policy denied", "reasons": decision.reasons}).to_string();
    }

    let timeout_seconds = state
        .config
        .agents
        .get(&identity.agent_id)
        .map(|a| a.timeout_seconds)
        .unwrap_or(30);

    let ctx = ToolContext {
        identity: identity.clone(),
        raw_arguments: args.clone(),
    };

    match tokio::time::timeout(
        Duration::from_secs(timeout_seconds),
        tool.execute(&ctx, args),
    )
    .await
    {
        Err(_) => {
            tracing::error!(
                agent_id = %identity.agent_id,
                tool = %manifest.name,
                timeout_seconds,
                "tool execution timed out"
            );
            error_body(&format!(
                "Tool '{}' timed out after {timeout_seconds}s",
                manifest.name
            ))
        }
        Ok(Err(e)) => {
            tracing::error!(
                agent_id = %identity.agent_id,
                tool = %manifest.name,
                error = %e,
                "tool execution error"
            );
            error_body(&e.to_string())
        }
        Ok(Ok(result)) => {
            tracing::info!(
                agent_id = %identity.agent_id,
                tool = %manifest.name,
                "tool call succeeded"
            );
            result
        }
    }
}

/// Whether a wrapper outcome is an error body (used for the JSON-RPC
/// `isError` flag).
pub fn is_error_body(outcome: &str) -> bool {
    serde_json::from_str::<Value>(outcome)
        .map(|v| v.get("error").is_some())
        .unwrap_or(false)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
