//! Lightweight AgriSakha server for CI.
//!
//! Serves the same routes as `agrisakha serve` from the same core library,
//! but with [`LiteAnalyzer`] in place of the image analyzer so pipelines
//! never need anything beyond the classifier.
//!
//! ```bash
//! PORT=8000 agrisakha-ci --config ./config/agrisakha.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use agrisakha::config;
use agrisakha::knowledge::build_service;
use agrisakha::logging::init_logging;
use agrisakha::server::run_server_with_service;
use agrisakha_core::analysis::LiteAnalyzer;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "agrisakha-ci",
    about = "AgriSakha API with the lightweight image analyzer",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults are used if it does not exist.
    #[arg(long, default_value = "./config/agrisakha.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(false);

    let cfg = config::load_config(&cli.config)?;
    let service = build_service(&cfg)?;
    let analyzer = LiteAnalyzer::new(service.classifier().clone());

    run_server_with_service(&cfg, service, Arc::new(analyzer)).await
}
