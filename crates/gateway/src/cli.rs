//! Command-line interface.

use clap::{Parser, Subcommand};

use ag_domain::config::Config;

#[derive(Parser)]
#[command(name = "agentgate", about = "Remote tool gateway for multi-agent assistants")]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, global = true, default_value = "config.yaml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the gateway (default).
    Serve,
    /// Configuration helpers.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print the version.
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Validate the configuration and report issues.
    Validate,
    /// Print the effective configuration with secrets masked.
    Show,
}

/// Render the effective config as YAML with tokens and API keys masked.
pub fn masked_yaml(config: &Config) -> anyhow::Result<String> {
    let mut masked = config.clone();
    for agent in masked.agents.values_mut() {
        if !agent.token.is_empty() {
            agent.token = "***".into();
        }
    }
    for provider in masked.llm.providers.values_mut() {
        if !provider.api_key.is_empty() {
            provider.api_key = "***".into();
        }
    }
    Ok(serde_yaml::to_string(&masked)?)
}
