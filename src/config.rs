//! TOML configuration for the AgriSakha service.
//!
//! Every section is optional; a missing config file yields
//! [`Config::default`]. The `PORT` environment variable, when set,
//! replaces the port of `[server].bind`.
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8000"
//! allowed_origins = ["*"]
//! max_upload_bytes = 10485760
//!
//! [storage]
//! query_log = "queries.json"
//! uploads_dir = "uploads"
//!
//! [advisory]
//! rules = "config/rules.toml"
//! translations = "config/translations.toml"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub advisory: AdvisoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// CORS origins. `"*"` anywhere in the list allows every origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origins: default_allowed_origins(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_query_log")]
    pub query_log: PathBuf,
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            query_log: default_query_log(),
            uploads_dir: default_uploads_dir(),
        }
    }
}

fn default_query_log() -> PathBuf {
    PathBuf::from("queries.json")
}
fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

/// Optional replacements for the built-in knowledge base.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdvisoryConfig {
    /// TOML file in the shape of [`AdvisoryRules`](agrisakha_core::rules::AdvisoryRules).
    #[serde(default)]
    pub rules: Option<PathBuf>,
    /// TOML table of `"English advice" = { Hindi = "..." }`.
    #[serde(default)]
    pub translations: Option<PathBuf>,
}

impl ServerConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Loads and validates the config at `path`.
///
/// A missing file is not an error: defaults are used so the service can
/// start with no setup at all.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str::<Config>(&content).with_context(|| "Failed to parse config file")?
    } else {
        tracing::info!(path = %path.display(), "config file not found, using defaults");
        Config::default()
    };

    if let Ok(port) = std::env::var("PORT") {
        config.server.bind = override_port(&config.server.bind, &port)?;
    }

    validate(&config)?;
    Ok(config)
}

fn override_port(bind: &str, port: &str) -> Result<String> {
    let port: u16 = port
        .trim()
        .parse()
        .with_context(|| format!("PORT must be a valid port number, got '{}'", port))?;
    let host = match bind.rsplit_once(':') {
        Some((host, _)) if !host.is_empty() => host,
        _ => "0.0.0.0",
    };
    Ok(format!("{}:{}", host, port))
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        bail!("server.bind must not be empty");
    }
    if config.server.allowed_origins.is_empty() {
        bail!("server.allowed_origins must list at least one origin (use \"*\" for any)");
    }
    if config.server.max_upload_bytes == 0 {
        bail!("server.max_upload_bytes must be > 0");
    }
    if config.storage.query_log.as_os_str().is_empty() {
        bail!("storage.query_log must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert!(config.server.allows_any_origin());
        assert_eq!(config.storage.query_log, PathBuf::from("queries.json"));
        assert_eq!(config.storage.uploads_dir, PathBuf::from("uploads"));
        assert!(config.advisory.rules.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
[server]
bind = "127.0.0.1:9000"
allowed_origins = ["http://localhost:3000"]

[storage]
query_log = "/tmp/q.json"
"#,
        )
        .unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert!(!config.server.allows_any_origin());
        assert_eq!(config.server.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.storage.uploads_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_zero_upload_limit_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("agrisakha.toml");
        std::fs::write(&path, "[server]\nmax_upload_bytes = 0\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("max_upload_bytes"));
    }

    #[test]
    fn test_empty_origins_rejected() {
        let config: Config = toml::from_str("[server]\nallowed_origins = []\n").unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("agrisakha.toml");
        std::fs::write(&path, "[server\nbind = ").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_override_port() {
        assert_eq!(override_port("0.0.0.0:8000", "9100").unwrap(), "0.0.0.0:9100");
        assert_eq!(override_port("127.0.0.1:1", " 80 ").unwrap(), "127.0.0.1:80");
        assert_eq!(override_port("8000", "81").unwrap(), "0.0.0.0:81");
        assert!(override_port("0.0.0.0:8000", "http").is_err());
    }
}
