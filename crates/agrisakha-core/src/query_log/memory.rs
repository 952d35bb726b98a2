//! In-memory [`QueryLog`] for tests and embedding.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::QueryLog;
use crate::models::QueryLogEntry;

#[derive(Debug, Default)]
pub struct InMemoryQueryLog {
    entries: RwLock<Vec<QueryLogEntry>>,
}

impl InMemoryQueryLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueryLog for InMemoryQueryLog {
    async fn append(&self, entry: QueryLogEntry) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow!("query log lock poisoned"))?;
        entries.push(entry);
        Ok(())
    }

    async fn read_all(&self) -> Vec<QueryLogEntry> {
        match self.entries.read() {
            Ok(entries) => entries.clone(),
            Err(_) => Vec::new(),
        }
    }
}
