//! # AgriSakha CLI (`agrisakha`)
//!
//! Runs the advisory HTTP server and a few maintenance commands.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `agrisakha serve` | Start the HTTP API |
//! | `agrisakha ask "<query>"` | Answer one query and print the advice |
//! | `agrisakha history` | Print logged queries |
//! | `agrisakha check` | Validate config, rules, and translations |
//!
//! ## Examples
//!
//! ```bash
//! agrisakha serve --config ./config/agrisakha.toml
//! agrisakha ask "गेहूं में बीमारी" --language Hindi
//! agrisakha history --limit 20
//! ```

use agrisakha::config;
use agrisakha::logging::init_logging;
use agrisakha::{ask, check, history, server};
use agrisakha_core::models::AdvisoryRequest;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AgriSakha: keyword-driven crop advice for farmers.
#[derive(Parser)]
#[command(
    name = "agrisakha",
    about = "AgriSakha: crop advisory API for farmers",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults are used if it does not exist.
    #[arg(long, global = true, default_value = "./config/agrisakha.toml")]
    config: PathBuf,

    /// Log debug output from AgriSakha itself.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` (or the `PORT` environment variable) and
    /// serves `/`, `/health`, `/advisory`, `/upload-image`, and `/queries`.
    Serve,

    /// Answer a single query and print the advice.
    Ask {
        /// The farmer's question.
        query: String,

        #[arg(long, default_value = "Delhi")]
        location: String,

        /// Response language. Only `Hindi` triggers translation.
        #[arg(long, default_value = "English")]
        language: String,

        /// Do not append the query to the query log.
        #[arg(long)]
        no_log: bool,
    },

    /// Print logged queries, oldest first.
    History {
        /// Number of entries to skip.
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Maximum number of entries to print.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Validate config and check that every translation key matches an advisory.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Ask {
            query,
            location,
            language,
            no_log,
        } => {
            let request = AdvisoryRequest {
                query,
                location,
                language,
            };
            ask::run_ask(&cfg, request, !no_log).await?;
        }
        Commands::History { offset, limit } => {
            history::run_history(&cfg, offset, limit).await?;
        }
        Commands::Check => {
            check::run_check(&cfg)?;
        }
    }

    Ok(())
}
