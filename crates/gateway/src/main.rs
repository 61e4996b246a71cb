use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use ag_domain::config::{Config, ConfigSeverity};
use ag_gateway::cli::{Cli, Command, ConfigCommand};
use ag_gateway::{audit, bootstrap};
use ag_policy::Redactor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            let config =
                Arc::new(Config::load(&cli.config).context("loading configuration")?);
            let redactor = Arc::new(
                Redactor::new(&config.redact_patterns).context("compiling redact_patterns")?,
            );
            audit::init_tracing(redactor);
            run_server(config).await
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let config = Config::load(&cli.config).context("loading configuration")?;
            let issues = config.validate();
            for issue in &issues {
                match issue.severity {
                    ConfigSeverity::Warning => println!("warning: {issue}"),
                    ConfigSeverity::Error => println!("error: {issue}"),
                }
            }
            if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
                std::process::exit(1);
            }
            println!("{} ok", cli.config);
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let config = Config::load(&cli.config).context("loading configuration")?;
            print!("{}", ag_gateway::cli::masked_yaml(&config)?);
            Ok(())
        }
        Some(Command::Version) => {
            println!("agentgate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    tracing::info!(
        name = %config.server.name,
        version = %config.server.version,
        "AgentGate starting"
    );

    let state = bootstrap::build_state(config.clone())?;
    let app = bootstrap::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    tracing::info!(addr = %addr, "AgentGate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("AgentGate stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM so in-flight requests can drain.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
