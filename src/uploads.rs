//! Storage for uploaded crop images.
//!
//! Files land in the configured uploads directory as
//! `{YYYYmmdd_HHMMSS}_{original}`. Two uploads of the same name within one
//! second share a stored name and the later one overwrites the earlier.

use std::path::{Path, PathBuf};

use agrisakha_core::analysis::StoredUpload;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};

/// Name used when the client sends no usable filename.
const FALLBACK_NAME: &str = "upload";

pub fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// Reduces a client-supplied filename to its last path component.
pub fn sanitize_filename(name: Option<&str>) -> String {
    name.and_then(|n| {
        // Treat both separators as path separators regardless of platform.
        n.rsplit(['/', '\\'])
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
    })
    .unwrap_or(FALLBACK_NAME)
    .to_string()
}

pub fn stored_name(original: Option<&str>, now: DateTime<Local>) -> String {
    format!(
        "{}_{}",
        now.format("%Y%m%d_%H%M%S"),
        sanitize_filename(original)
    )
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(
        &self,
        original: Option<&str>,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredUpload> {
        self.save_at(original, content_type, bytes, Local::now())
            .await
    }

    pub async fn save_at(
        &self,
        original: Option<&str>,
        content_type: &str,
        bytes: &[u8],
        now: DateTime<Local>,
    ) -> Result<StoredUpload> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let filename = stored_name(original, now);
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!(file = %path.display(), size = bytes.len(), "image stored");

        Ok(StoredUpload {
            filename,
            file_path: path.display().to_string(),
            size: bytes.len(),
            content_type: content_type.to_string(),
        })
    }
}
