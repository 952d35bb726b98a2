//! Loads advisory rules and translations and assembles the
//! [`AdvisoryService`] used by the server and CLI.
//!
//! Rules and translations are read once, validated, and then shared
//! read-only for the lifetime of the process.

use std::path::Path;
use std::sync::Arc;

use agrisakha_core::advisory::AdvisoryService;
use agrisakha_core::classify::Classifier;
use agrisakha_core::query_log::QueryLog;
use agrisakha_core::rules::AdvisoryRules;
use agrisakha_core::translate::{TranslationTable, Translator};
use anyhow::{Context, Result};

use crate::config::Config;
use crate::file_log::JsonFileQueryLog;

pub fn load_rules(config: &Config) -> Result<AdvisoryRules> {
    let rules = match &config.advisory.rules {
        Some(path) => read_toml::<AdvisoryRules>(path, "advisory rules")?,
        None => AdvisoryRules::builtin(),
    };
    rules.validate()?;
    Ok(rules)
}

pub fn load_translations(config: &Config) -> Result<TranslationTable> {
    match &config.advisory.translations {
        Some(path) => read_toml::<TranslationTable>(path, "translations"),
        None => Ok(TranslationTable::builtin()),
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {}", what, path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse {} file: {}", what, path.display()))
}

/// Builds the service with the given log backend.
pub fn build_service_with_log(config: &Config, log: Arc<dyn QueryLog>) -> Result<AdvisoryService> {
    let rules = load_rules(config)?;
    let table = load_translations(config)?;

    let orphaned = table.orphaned_keys(&rules);
    if !orphaned.is_empty() {
        tracing::warn!(
            count = orphaned.len(),
            "translation keys match no advisory and will never be used; run `agrisakha check`"
        );
    }

    Ok(AdvisoryService::new(
        Classifier::new(rules),
        Translator::new(table),
        log,
    ))
}

/// Builds the service backed by the configured JSON query log.
pub fn build_service(config: &Config) -> Result<AdvisoryService> {
    let log = Arc::new(JsonFileQueryLog::new(&config.storage.query_log));
    build_service_with_log(config, log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_use_builtin_knowledge() {
        let config = Config::default();
        assert_eq!(load_rules(&config).unwrap(), AdvisoryRules::builtin());
        assert_eq!(load_translations(&config).unwrap(), TranslationTable::builtin());
    }

    #[test]
    fn test_rules_and_translations_from_files() {
        let tmp = TempDir::new().unwrap();
        let rules_path = tmp.path().join("rules.toml");
        let tr_path = tmp.path().join("translations.toml");
        std::fs::write(
            &rules_path,
            r#"
default_advice = "Ask us about maize in {location}."

[[topics]]
name = "maize"
keywords = ["maize", "मक्का"]
advice = "Sow maize in June."

[[topics.branches]]
name = "pest"
keywords = ["borer"]
advice = "Use pheromone traps for stem borer."
"#,
        )
        .unwrap();
        std::fs::write(
            &tr_path,
            r#"
"Sow maize in June." = { Hindi = "जून में मक्का बोएं।" }
"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.advisory.rules = Some(rules_path);
        config.advisory.translations = Some(tr_path);

        let rules = load_rules(&config).unwrap();
        assert_eq!(rules.topics.len(), 1);
        assert_eq!(rules.topics[0].branches.len(), 1);

        let table = load_translations(&config).unwrap();
        assert!(table.orphaned_keys(&rules).is_empty());
        assert_eq!(table.untranslated(&rules), vec!["Use pheromone traps for stem borer."]);
    }

    #[test]
    fn test_invalid_rules_file_rejected() {
        let tmp = TempDir::new().unwrap();
        let rules_path = tmp.path().join("rules.toml");
        std::fs::write(
            &rules_path,
            "default_advice = \"x\"\n\n[[topics]]\nname = \"t\"\nkeywords = [\"\"]\nadvice = \"a\"\n",
        )
        .unwrap();
        let mut config = Config::default();
        config.advisory.rules = Some(rules_path);
        assert!(load_rules(&config).is_err());
    }

    #[test]
    fn test_shipped_example_files_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("config");
        let mut config = Config::default();
        config.advisory.rules = Some(dir.join("rules.example.toml"));
        config.advisory.translations = Some(dir.join("translations.example.toml"));

        let rules = load_rules(&config).unwrap();
        let table = load_translations(&config).unwrap();
        assert_eq!(rules.topics[0].name, "wheat");
        assert!(table.orphaned_keys(&rules).is_empty());
    }

    #[test]
    fn test_missing_rules_file_is_error() {
        let mut config = Config::default();
        config.advisory.rules = Some("/nonexistent/rules.toml".into());
        let err = load_rules(&config).unwrap_err();
        assert!(err.to_string().contains("advisory rules"));
    }
}
