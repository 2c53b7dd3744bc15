//! Single-record, search, batch, and learnset commands.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tracing::info;

use crate::api::ApiClient;
use crate::cli::{Cli, CliError};
use crate::importer::rate_limit::RateLimiter;
use crate::importer::BulkImporter;
use crate::repo::Repository;
use crate::Pokemon;

fn build_client(cli: &Cli) -> Result<Arc<ApiClient>, CliError> {
    let limiter = RateLimiter::shared();
    let client = ApiClient::new(limiter)?
        .with_min_interval(Duration::from_millis(cli.interval_ms));
    Ok(Arc::new(client))
}

fn print_record(pokemon: &Pokemon) {
    let types: Vec<&str> = pokemon
        .types
        .iter()
        .map(|t| t.type_ref.name.as_str())
        .collect();
    println!("#{:<4} {:<12} [{}]", pokemon.id, pokemon.name, types.join("/"));
    for stat in &pokemon.stats {
        println!("      {:<16} {}", stat.stat.name, stat.base_stat);
    }
}

/// Arguments for the `fetch` command
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Numeric id or name of the record (case-insensitive)
    pub key: String,
}

impl FetchArgs {
    /// Fetch one record and print it.
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let repo = Repository::new(build_client(cli)?);

        let pokemon = match self.key.parse::<u32>() {
            Ok(id) => repo.fetch_by_id(id).await?,
            Err(_) => repo.fetch_by_name(&self.key).await?,
        };

        print_record(&pokemon);
        Ok(())
    }
}

/// Arguments for the `search` command
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Substring to match against record names
    pub query: String,
}

impl SearchArgs {
    /// Search the listing and print matching references.
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let repo = Repository::new(build_client(cli)?);

        let hits = repo.search(&self.query).await?;
        if hits.is_empty() {
            println!("no matches for {:?}", self.query);
            return Ok(());
        }

        for hit in &hits {
            match hit.id() {
                Some(id) => println!("#{id:<4} {}", hit.name),
                None => println!("      {}", hit.name),
            }
        }
        info!(query = %self.query, hits = hits.len(), "search finished");
        Ok(())
    }
}

/// Arguments for the `batch` command
#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Record ids to fetch
    #[arg(required = true)]
    pub ids: Vec<u32>,

    /// Milliseconds to pause between batch items
    #[arg(long, default_value_t = 50)]
    pub pause_ms: u64,
}

impl BatchArgs {
    /// Fetch a batch of records, skipping failures, and print a summary.
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let repo = Repository::new(build_client(cli)?)
            .with_batch_pause(Duration::from_millis(self.pause_ms));

        let fetched = repo.fetch_batch(&self.ids).await;
        for pokemon in &fetched {
            print_record(pokemon);
        }

        let stats = repo.stats();
        println!(
            "fetched {} of {} requested ({} cached entities, {} bytes of responses)",
            fetched.len(),
            self.ids.len(),
            stats.cached_entities,
            stats.response_cache_bytes
        );
        Ok(())
    }
}

/// Arguments for the `moves` command
#[derive(Debug, Args)]
pub struct MovesArgs {
    /// Id of the record whose learnset to resolve
    pub id: u32,
}

impl MovesArgs {
    /// Resolve and print the learnset for one record.
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let importer = BulkImporter::new(build_client(cli)?);

        let moves = importer.moves_for(self.id).await?;
        if moves.is_empty() {
            println!("no learnable moves recorded for #{}", self.id);
            return Ok(());
        }

        for learned in &moves {
            let level = if learned.level > 0 {
                format!("lv {:>2}", learned.level)
            } else {
                format!("[{}]", learned.learn_method)
            };
            let power = learned
                .power
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{level:<10} {:<16} {:<10} power {power}",
                learned.name, learned.move_type
            );
        }
        Ok(())
    }
}
