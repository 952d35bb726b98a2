//! `agrisakha ask`: answer one query from the command line.

use std::sync::Arc;

use agrisakha_core::models::AdvisoryRequest;
use agrisakha_core::query_log::memory::InMemoryQueryLog;
use anyhow::Result;

use crate::config::Config;
use crate::knowledge::{build_service, build_service_with_log};

/// Runs the advisory pipeline once and prints the advice.
///
/// With `record = false` the query goes to a throwaway in-memory log and
/// the configured log file is left untouched.
pub async fn run_ask(config: &Config, request: AdvisoryRequest, record: bool) -> Result<()> {
    let service = if record {
        build_service(config)?
    } else {
        build_service_with_log(config, Arc::new(InMemoryQueryLog::new()))?
    };

    let (response, matched) = service.advise_with_match(&request).await?;

    println!("{}", response.advice);
    println!();
    println!("matched:    {:?}", matched);
    println!("language:   {}", response.language);
    println!("confidence: {:.2}", response.confidence);
    if record {
        println!("logged to:  {}", config.storage.query_log.display());
    }
    Ok(())
}
