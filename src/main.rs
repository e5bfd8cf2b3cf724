//! Baton - multi-agent assistant
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;
use std::sync::Arc;

use baton::llm::OllamaBackend;
use baton::{Config, Repl, Team};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Baton - multi-agent assistant
#[derive(Parser, Debug)]
#[command(name = "baton")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// Model for every agent
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Maximum backend rounds per invocation
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Config file (default: ~/.config/baton/config.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::try_load(args.config.as_deref())?;

    // Apply CLI overrides
    if let Some(model) = args.model {
        config.models.default = model;
        config.models.orchestrator = None;
    }

    if let Some(max_rounds) = args.max_rounds {
        config.agent.max_rounds = max_rounds;
    }

    if args.debug {
        config.agent.debug = true;
    }

    // Logs go to stderr so answers on stdout stay clean
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(rust_log.as_deref(), config.agent.debug))
        .init();

    let backend = Arc::new(OllamaBackend::from_config(&config)?);
    tracing::info!(url = %config.backend_url(), "Using Ollama backend");

    let orchestrator = Team::new(config, backend).orchestrator()?;

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        println!("{}", orchestrator.invoke(&prompt).await);
        return Ok(());
    }

    // Interactive REPL mode
    Repl::new(orchestrator).run().await?;

    Ok(())
}

/// `RUST_LOG` when set, otherwise debug or warn depending on the debug flag
fn log_filter(directives: Option<&str>, debug: bool) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(if debug { "debug" } else { "warn" }))
}
