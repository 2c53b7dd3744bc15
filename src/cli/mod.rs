//! CLI command implementations

use std::net::SocketAddr;

use clap::{Parser, Subcommand};

pub mod error;
pub mod fetch;
pub mod import;

pub use error::CliError;
pub use fetch::{BatchArgs, FetchArgs, MovesArgs, SearchArgs};
pub use import::ImportArgs;

/// Fetch and cache Pokémon records from PokeAPI
#[derive(Debug, Parser)]
#[command(name = "pokefetch", version, about)]
pub struct Cli {
    /// Prometheus scrape endpoint to install (e.g. 127.0.0.1:9090)
    #[arg(long, global = true, env = "POKEFETCH_METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,

    /// Minimum milliseconds between dispatched requests
    #[arg(long, global = true, default_value_t = 100)]
    pub interval_ms: u64,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch a single record by id or name
    Fetch(FetchArgs),
    /// Search the listing by case-insensitive name substring
    Search(SearchArgs),
    /// Fetch several records by id, skipping failures
    Batch(BatchArgs),
    /// Run the one-shot bulk import
    Import(ImportArgs),
    /// Show the learnset for one Pokémon
    Moves(MovesArgs),
}
