//! Bulk import command with live progress display.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::api::ApiClient;
use crate::cli::{Cli, CliError};
use crate::importer::rate_limit::RateLimiter;
use crate::importer::{BulkImporter, ImportConfig};
use crate::shutdown::SharedShutdown;
use crate::store::{EntityStore, JsonLinesStore};

/// Arguments for the `import` command
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Write imported records to this JSON Lines file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Item cap requested from the listing endpoint
    #[arg(long, default_value_t = 1000)]
    pub limit: u32,
}

impl ImportArgs {
    /// Run the bulk import, rendering progress until it finishes.
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<(), CliError> {
        let limiter = RateLimiter::shared();
        let client = Arc::new(
            ApiClient::new(limiter)?.with_min_interval(Duration::from_millis(cli.interval_ms)),
        );

        let config = ImportConfig {
            list_limit: self.limit,
            ..ImportConfig::default()
        };
        let importer = Arc::new(
            BulkImporter::new(client)
                .with_config(config)
                .with_shutdown(shutdown),
        );

        let bar = ProgressBar::new(100).with_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {percent:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let run = tokio::spawn({
            let importer = Arc::clone(&importer);
            async move { importer.run().await }
        });

        while !run.is_finished() {
            let progress = importer.progress();
            if let Some(fraction) = progress.fraction {
                bar.set_position((fraction * 100.0).round() as u64);
            }
            bar.set_message(progress.message);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let summary = run
            .await
            .map_err(|e| CliError::Runtime(e.to_string()))?;
        bar.finish_with_message(format!(
            "{} records ({} skipped{})",
            summary.imported,
            summary.skipped,
            if summary.fell_back { ", offline fallback" } else { "" }
        ));

        if let Some(path) = &self.output {
            let records = importer.results().await;
            let mut store = JsonLinesStore::create(path)?;
            for pokemon in &records {
                store.persist(pokemon).await?;
            }
            store.flush().await?;
            info!(
                path = %path.display(),
                records = store.records_written(),
                "export written"
            );
            println!("wrote {} records to {}", store.records_written(), path.display());
        }

        Ok(())
    }
}
