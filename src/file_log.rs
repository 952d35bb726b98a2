//! JSON-file [`QueryLog`] backend.
//!
//! The whole log is a single pretty-printed JSON array. Every append reads
//! the array, pushes one record, and rewrites the file through a temporary
//! sibling followed by a rename, so readers never observe a half-written
//! array.
//!
//! Appends are serialized by an async mutex, which removes the lost-update
//! race between concurrent requests inside one process. Separate processes
//! sharing the same file are still last-writer-wins.
//!
//! A file that is not valid UTF-8 JSON reads as empty. On the next append it
//! is renamed to `<path>.corrupt.<YYYYmmddHHMMSS>` (with a `.N` counter if
//! that name is taken) before a fresh array is written, so every damaged
//! copy is kept for inspection.
//!
//! Any other I/O failure (permissions, a directory at the path) also reads
//! as empty, but `append` returns the error and leaves the path alone.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use agrisakha_core::models::QueryLogEntry;
use agrisakha_core::query_log::QueryLog;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::sync::Mutex;

pub struct JsonFileQueryLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

enum Stored {
    Missing,
    Entries(Vec<QueryLogEntry>),
    Damaged(String),
    Unreadable(std::io::Error),
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

impl JsonFileQueryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// First free quarantine name for a log damaged at `now`.
    async fn quarantine_path(&self, now: DateTime<Local>) -> Result<PathBuf> {
        let base = sibling(
            &self.path,
            &format!(".corrupt.{}", now.format("%Y%m%d%H%M%S")),
        );
        let mut candidate = base.clone();
        let mut n = 1;
        while tokio::fs::try_exists(&candidate)
            .await
            .with_context(|| format!("Failed to check {}", candidate.display()))?
        {
            candidate = sibling(&base, &format!(".{}", n));
            n += 1;
        }
        Ok(candidate)
    }

    async fn load(&self) -> Stored {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Stored::Missing,
            Err(e) if e.kind() == ErrorKind::InvalidData => return Stored::Damaged(e.to_string()),
            Err(e) => return Stored::Unreadable(e),
        };
        if content.trim().is_empty() {
            return Stored::Entries(Vec::new());
        }
        match serde_json::from_str::<Vec<QueryLogEntry>>(&content) {
            Ok(entries) => Stored::Entries(entries),
            Err(e) => Stored::Damaged(e.to_string()),
        }
    }

    async fn write_all(&self, entries: &[QueryLogEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = sibling(&self.path, ".tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl QueryLog for JsonFileQueryLog {
    async fn append(&self, entry: QueryLogEntry) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut entries = match self.load().await {
            Stored::Missing => Vec::new(),
            Stored::Entries(entries) => entries,
            Stored::Unreadable(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read query log {}", self.path.display())
                });
            }
            Stored::Damaged(reason) => {
                let quarantine = self.quarantine_path(Local::now()).await?;
                tracing::warn!(
                    path = %self.path.display(),
                    moved_to = %quarantine.display(),
                    %reason,
                    "query log is damaged, starting a new one"
                );
                tokio::fs::rename(&self.path, &quarantine)
                    .await
                    .with_context(|| {
                        format!("Failed to move damaged query log to {}", quarantine.display())
                    })?;
                Vec::new()
            }
        };

        entries.push(entry);
        self.write_all(&entries).await
    }

    async fn read_all(&self) -> Vec<QueryLogEntry> {
        match self.load().await {
            Stored::Missing => Vec::new(),
            Stored::Entries(entries) => entries,
            Stored::Damaged(reason) => {
                tracing::warn!(path = %self.path.display(), %reason, "query log damaged, reporting it as empty");
                Vec::new()
            }
            Stored::Unreadable(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "query log unreadable, reporting it as empty");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Contents of every quarantined copy of `queries.json` under `dir`.
    fn quarantined(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("queries.json.corrupt"))
            })
            .map(|p| String::from_utf8_lossy(&std::fs::read(p).unwrap()).into_owned())
            .collect()
    }

    fn entry(query: &str) -> QueryLogEntry {
        QueryLogEntry {
            timestamp: "2024-11-02T10:15:00.000000Z".to_string(),
            query: query.to_string(),
            location: "Delhi".to_string(),
            language: "Hindi".to_string(),
            advice: "सामान्य सलाह: उचित सिंचाई और मिट्टी परीक्षण बनाए रखें।".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let tmp = TempDir::new().unwrap();
        let log = JsonFileQueryLog::new(tmp.path().join("queries.json"));
        assert!(log.read_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_append_round_trip() {
        let tmp = TempDir::new().unwrap();
        let log = JsonFileQueryLog::new(tmp.path().join("queries.json"));

        log.append(entry("गेहूं कब बोएं")).await.unwrap();
        let before = log.read_all().await;
        log.append(entry("second")).await.unwrap();
        let after = log.read_all().await;

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after[0], entry("गेहूं कब बोएं"));
        assert_eq!(after[1], entry("second"));
        assert_eq!(log.read_all().await, after);
    }

    #[tokio::test]
    async fn test_file_is_pretty_json_array() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("queries.json");
        let log = JsonFileQueryLog::new(&path);
        log.append(entry("rain")).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n  {"));
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["query"], "rain");
        assert!(!sibling(&path, ".tmp").exists());
    }

    #[tokio::test]
    async fn test_reads_existing_log_written_elsewhere() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("queries.json");
        std::fs::write(
            &path,
            r#"[{"timestamp": "2024-01-05T09:30:12.123456", "query": "wheat", "location": "Delhi", "language": "English", "advice": "Best sowing time"}]"#,
        )
        .unwrap();
        let log = JsonFileQueryLog::new(&path);
        let all = log.read_all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].timestamp, "2024-01-05T09:30:12.123456");
    }

    #[tokio::test]
    async fn test_empty_file_reads_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("queries.json");
        std::fs::write(&path, "  \n").unwrap();
        let log = JsonFileQueryLog::new(&path);
        assert!(log.read_all().await.is_empty());
        log.append(entry("x")).await.unwrap();
        assert_eq!(log.read_all().await.len(), 1);
        assert!(quarantined(tmp.path()).is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_empty_and_is_quarantined_on_append() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("queries.json");
        std::fs::write(&path, "[{\"timestamp\": ").unwrap();
        let log = JsonFileQueryLog::new(&path);

        assert!(log.read_all().await.is_empty());

        log.append(entry("after")).await.unwrap();
        let all = log.read_all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].query, "after");
        assert_eq!(quarantined(tmp.path()), vec!["[{\"timestamp\": ".to_string()]);
    }

    #[tokio::test]
    async fn test_repeated_damage_keeps_every_copy() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("queries.json");
        let log = JsonFileQueryLog::new(&path);

        std::fs::write(&path, "first damaged history").unwrap();
        log.append(entry("a")).await.unwrap();
        std::fs::write(&path, "second damage").unwrap();
        log.append(entry("b")).await.unwrap();

        let mut copies = quarantined(tmp.path());
        copies.sort();
        assert_eq!(copies, vec!["first damaged history", "second damage"]);
        assert_eq!(log.read_all().await[0].query, "b");
    }

    #[tokio::test]
    async fn test_quarantine_name_counts_up_on_collision() {
        let tmp = TempDir::new().unwrap();
        let log = JsonFileQueryLog::new(tmp.path().join("queries.json"));
        let now = Local::now();

        let first = log.quarantine_path(now).await.unwrap();
        assert!(first
            .to_string_lossy()
            .ends_with(&format!("queries.json.corrupt.{}", now.format("%Y%m%d%H%M%S"))));
        std::fs::write(&first, "x").unwrap();

        let second = log.quarantine_path(now).await.unwrap();
        assert_eq!(second, sibling(&first, ".1"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_quarantined() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("queries.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let log = JsonFileQueryLog::new(&path);

        assert!(log.read_all().await.is_empty());
        log.append(entry("x")).await.unwrap();
        assert_eq!(log.read_all().await.len(), 1);
        assert_eq!(quarantined(tmp.path()).len(), 1);
    }

    #[tokio::test]
    async fn test_directory_at_path_is_an_error_and_left_in_place() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("queries.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep.txt"), "keep").unwrap();
        let log = JsonFileQueryLog::new(&path);

        assert!(log.read_all().await.is_empty());
        let err = log.append(entry("x")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read query log"));

        assert!(path.is_dir());
        assert_eq!(std::fs::read_to_string(path.join("keep.txt")).unwrap(), "keep");
        assert!(quarantined(tmp.path()).is_empty());
    }

    #[tokio::test]
    async fn test_creates_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let log = JsonFileQueryLog::new(tmp.path().join("data").join("queries.json"));
        log.append(entry("x")).await.unwrap();
        assert_eq!(log.read_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let tmp = TempDir::new().unwrap();
        let log = Arc::new(JsonFileQueryLog::new(tmp.path().join("queries.json")));

        let mut handles = Vec::new();
        for i in 0..25 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                log.append(entry(&format!("q{i}"))).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let all = log.read_all().await;
        assert_eq!(all.len(), 25);
        let mut queries: Vec<String> = all.into_iter().map(|e| e.query).collect();
        queries.sort();
        queries.dedup();
        assert_eq!(queries.len(), 25);
    }

    #[tokio::test]
    async fn test_read_range() {
        let tmp = TempDir::new().unwrap();
        let log = JsonFileQueryLog::new(tmp.path().join("queries.json"));
        for i in 0..4 {
            log.append(entry(&format!("q{i}"))).await.unwrap();
        }
        let page = log.read_range(2, Some(5)).await;
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].query, "q2");
    }
}
