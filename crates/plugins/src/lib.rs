//! Plugin contracts and the built-in plugin set.
//!
//! Three plugin families share a manifest but have distinct contracts; the
//! registry discriminates on kind at registration time. A constructor
//! returns exactly one kind, never several.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use ag_domain::error::{Error, Result};
use ag_domain::types::{AgentIdentity, PluginManifest};

pub mod about;
pub mod echo;
pub mod instructions;
pub mod llm_query;
pub mod prompts;
pub mod registry;
pub mod sum;

pub use registry::{PluginDeps, PluginRegistry};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Contracts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Request-scoped context handed to a tool's `execute`.
///
/// Identity is threaded explicitly rather than held in ambient task-local
/// state, so tools stay trivially testable.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub identity: AgentIdentity,
    pub raw_arguments: Value,
}

/// A callable tool.
#[async_trait::async_trait]
pub trait ToolPlugin: Send + Sync {
    fn manifest(&self) -> PluginManifest;

    /// JSON Schema for the tool's arguments, published via `tools/list`.
    fn input_schema(&self) -> Value;

    /// Execute with already-policy-checked raw arguments and return a plain
    /// string result. Argument mismatches surface as [`Error::Validation`].
    async fn execute(&self, ctx: &ToolContext, args: Value) -> Result<String>;
}

/// A readable resource addressed by URI.
#[async_trait::async_trait]
pub trait ResourcePlugin: Send + Sync {
    fn manifest(&self) -> PluginManifest;

    /// The resource URI, e.g. `about://server`.
    fn uri(&self) -> &str;

    async fn read(&self, identity: Option<&AgentIdentity>) -> Result<String>;
}

/// Descriptor for one prompt-template argument.
#[derive(Debug, Clone)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// A renderable prompt template.
#[async_trait::async_trait]
pub trait PromptPlugin: Send + Sync {
    fn manifest(&self) -> PluginManifest;

    /// The prompt name, e.g. `review_pr`.
    fn prompt_name(&self) -> &str;

    fn arguments(&self) -> Vec<PromptArgument>;

    async fn render(&self, args: &HashMap<String, String>) -> Result<String>;
}

/// Deserialize a tool's typed input from its raw arguments.
///
/// This is the argument-schema check of the request pipeline: the typed
/// struct mirrors the published schema, and serde's error message becomes
/// the user-visible validation detail.
pub fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| Error::Validation(format!("invalid arguments: {e}")))
}
