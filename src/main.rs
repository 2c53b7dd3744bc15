//! Main entry point for the pokefetch CLI

use clap::Parser;
use pokefetch::cli::{Cli, Commands};
use pokefetch::shutdown::{self, ShutdownCoordinator};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pokefetch=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr {
        if let Err(e) = pokefetch::metrics::init_metrics(addr) {
            error!(error = %e, "failed to install metrics exporter");
            std::process::exit(1);
        }
    }

    // Install global shutdown coordinator and Ctrl+C handler
    let shutdown = ShutdownCoordinator::shared();
    shutdown::set_global_shutdown(shutdown.clone());
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - finishing current item before stopping");
                shutdown.request();
            }
        }
    });

    let result = match &cli.command {
        Commands::Fetch(args) => args.execute(&cli).await,
        Commands::Search(args) => args.execute(&cli).await,
        Commands::Batch(args) => args.execute(&cli).await,
        Commands::Import(args) => args.execute(&cli, shutdown.clone()).await,
        Commands::Moves(args) => args.execute(&cli).await,
    };

    if let Err(e) = result {
        error!("command failed: {e}");
        if let Some(hint) = e.recovery_suggestion() {
            error!("hint: {hint}");
        }
        std::process::exit(1);
    }
}
