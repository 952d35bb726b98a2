//! Query log abstraction.
//!
//! The [`QueryLog`] trait is the only thing the advisory pipeline knows
//! about storage. Backends decide where records live (memory, a JSON file,
//! a database) without touching the classifier or translator.
//!
//! # Contract
//!
//! | Method | Behaviour |
//! |--------|-----------|
//! | [`append`](QueryLog::append) | Adds one record at the end. Appends are serialized. |
//! | [`read_all`](QueryLog::read_all) | All records in insertion order. Never fails. |
//! | [`read_range`](QueryLog::read_range) | A window of `read_all`. |
//!
//! Reads are availability-first: a missing or damaged store reads as empty.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::QueryLogEntry;

#[async_trait]
pub trait QueryLog: Send + Sync {
    /// Appends `entry` after every existing record.
    async fn append(&self, entry: QueryLogEntry) -> Result<()>;

    /// Returns every record in insertion order, or an empty list when the
    /// store is absent or unreadable.
    async fn read_all(&self) -> Vec<QueryLogEntry>;

    /// Returns at most `limit` records starting at `offset`.
    async fn read_range(&self, offset: usize, limit: Option<usize>) -> Vec<QueryLogEntry> {
        let all = self.read_all().await;
        let iter = all.into_iter().skip(offset);
        match limit {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        }
    }
}
