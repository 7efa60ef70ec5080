//! # Sitewatch Server
//!
//! Long-running service: startup report, daily report, and the on-demand form.
//!
//! ## Usage
//!
//! ```bash
//! # Run with ./config and environment auto-detection
//! sitewatch
//!
//! # Explicit environment and config directory
//! SITEWATCH_ENV=production sitewatch --config-dir /etc/sitewatch
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};

use sitewatch::logging;
use sitewatch::orchestration::{BootstrapConfig, SitewatchBootstrap};

#[derive(Parser)]
#[command(name = "sitewatch")]
#[command(about = "Probe websites, email a PDF status report daily and on demand")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration directory (default: $SITEWATCH_CONFIG_DIR or ./config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Environment override (default: $SITEWATCH_ENV, $APP_ENV, development)
    #[arg(short, long)]
    environment: Option<String>,

    /// Override web.bind_address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_structured_logging();

    info!("🚀 Starting Sitewatch...");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "   Environment: {}",
        cli.environment.as_deref().unwrap_or("auto-detect")
    );

    let mut handle = SitewatchBootstrap::bootstrap(BootstrapConfig {
        config_directory: cli.config_dir,
        environment_override: cli.environment,
        bind_address_override: cli.bind,
    })
    .await
    .context("failed to bootstrap sitewatch")?;

    info!("🎉 Sitewatch started on http://{}", handle.local_addr);
    info!("   Press Ctrl+C to shutdown gracefully");

    shutdown_signal().await;

    info!("🛑 Shutdown signal received, initiating graceful shutdown...");
    if let Err(e) = handle.stop().await {
        error!("Failed to stop cleanly: {}", e);
    }

    info!("👋 Sitewatch shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
