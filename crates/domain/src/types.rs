//! Core domain values shared across the gateway.
//!
//! Everything here is an immutable value object: agent identity, capability
//! tags, plugin manifests, and the policy decision produced for each action.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Capabilities
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Coarse-grained permission tags gating tool invocation.
///
/// The set is closed: new capabilities require a code change, which keeps the
/// policy surface auditable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Capability {
    #[serde(rename = "network:outbound")]
    NetworkOutbound,
    #[serde(rename = "llm:query")]
    LlmQuery,
    #[serde(rename = "fs:read")]
    FsRead,
    #[serde(rename = "fs:write")]
    FsWrite,
    #[serde(rename = "db:read")]
    DbRead,
    #[serde(rename = "db:write")]
    DbWrite,
}

impl Capability {
    /// The wire/config tag for this capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::NetworkOutbound => "network:outbound",
            Capability::LlmQuery => "llm:query",
            Capability::FsRead => "fs:read",
            Capability::FsWrite => "fs:write",
            Capability::DbRead => "db:read",
            Capability::DbWrite => "db:write",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Identity & manifest
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The resolved principal behind a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub agent_id: String,
    /// Groups agents; informational only.
    pub tenant_id: String,
}

/// Static self-description supplied by every plugin: name, title,
/// description, and the capabilities the plugin *requires*. Policy
/// intersects the required set with the agent's allowed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginManifest {
    /// Unique dotted name, e.g. `core.echo`.
    pub name: String,
    pub title: String,
    pub description: String,
    pub capabilities: BTreeSet<Capability>,
}

impl PluginManifest {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: description.into(),
            capabilities: capabilities.into_iter().collect(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Policy decision
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The outcome of a single policy evaluation.
///
/// Invariant: `allowed` implies `reasons` is empty. Use the constructors
/// rather than building the struct literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub reasons: Vec<String>,
}

impl PolicyDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reasons: Vec::new(),
        }
    }

    pub fn deny(reasons: Vec<String>) -> Self {
        Self {
            allowed: false,
            reasons,
        }
    }

    /// Merge two decisions: denied if either is denied, with both reason
    /// lists concatenated.
    pub fn merge(self, other: PolicyDecision) -> PolicyDecision {
        if self.allowed && other.allowed {
            return PolicyDecision::allow();
        }
        let mut reasons = self.reasons;
        reasons.extend(other.reasons);
        PolicyDecision::deny(reasons)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
