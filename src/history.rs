//! `agrisakha history`: print logged queries.

use agrisakha_core::models::QueryLogEntry;
use agrisakha_core::query_log::QueryLog;
use anyhow::Result;

use crate::config::Config;
use crate::file_log::JsonFileQueryLog;

pub async fn run_history(config: &Config, offset: usize, limit: Option<usize>) -> Result<()> {
    let log = JsonFileQueryLog::new(&config.storage.query_log);
    let total = log.read_all().await.len();
    let entries = log.read_range(offset, limit).await;

    if entries.is_empty() {
        println!("No queries logged (total: {}).", total);
        return Ok(());
    }

    for (i, entry) in entries.iter().enumerate() {
        print_entry(offset + i + 1, entry);
    }
    println!(
        "showing {}-{} of {}",
        offset + 1,
        offset + entries.len(),
        total
    );
    Ok(())
}

fn print_entry(n: usize, entry: &QueryLogEntry) {
    println!("#{} {} [{} / {}]", n, entry.timestamp, entry.location, entry.language);
    println!("  Q: {}", entry.query);
    println!("  A: {}", entry.advice);
}
