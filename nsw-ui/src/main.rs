//! nsw-ui - Novel Scene Workshop reviewer console
//!
//! Loads the bootstrap configuration, connects the orchestrator to the
//! generation backend and runs the line-oriented review console on stdin.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::Directive;

use nsw_common::config::load_config;
use nsw_common::events::EventBus;
use nsw_ui::console::{self, terminal, ConsoleOptions};
use nsw_ui::orchestrator::ReviewForm;
use nsw_ui::{Gateway, HttpTransport, WorkflowOrchestrator};

/// Command-line arguments for nsw-ui
#[derive(Parser, Debug)]
#[command(name = "nsw-ui")]
#[command(about = "Reviewer console for the Novel Scene Workshop")]
#[command(version)]
struct Args {
    /// Configuration file (overrides NSW_CONFIG and the user config file)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(short, long, env = "NSW_BACKEND_URL")]
    backend: Option<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(url) = args.backend {
        config.backend.base_url = url;
    }

    // Initialize tracing
    let default_directive: Directive = config
        .logging
        .level
        .parse()
        .unwrap_or_else(|_| tracing::Level::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(default_directive))
        .init();

    info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    info!("Configuration source: {:?}", source);
    info!("Backend: {}", config.backend.base_url);

    let transport = HttpTransport::new(&config.backend).context("Failed to build HTTP client")?;
    let gateway = Gateway::new(Arc::new(transport));
    let event_bus = EventBus::new(256);
    let _printer = terminal::spawn_event_printer(&event_bus);

    let orchestrator = WorkflowOrchestrator::new(gateway, event_bus, ReviewForm::from(config.form));
    let options = ConsoleOptions {
        default_export_path: config.export.final_text_path,
    };

    console::run(orchestrator, tokio::io::stdin(), options)
        .await
        .context("Console input failed")?;

    info!("Shutdown complete");
    Ok(())
}
