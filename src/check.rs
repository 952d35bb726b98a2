//! `agrisakha check`: validate config and knowledge files.
//!
//! Translation keys must equal classifier outputs byte for byte. An edit to
//! one side without the other silently disables that translation, so this
//! command reports both directions of drift and fails on orphaned keys.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::knowledge::{load_rules, load_translations};

#[derive(Debug, Default)]
pub struct CheckReport {
    pub topics: usize,
    pub translations: usize,
    /// Translation keys no rule produces.
    pub orphaned: Vec<String>,
    /// Fixed advice with no Hindi translation.
    pub untranslated: Vec<String>,
}

pub fn check_knowledge(config: &Config) -> Result<CheckReport> {
    let rules = load_rules(config)?;
    let table = load_translations(config)?;

    Ok(CheckReport {
        topics: rules.topics.len(),
        translations: table.len(),
        orphaned: table
            .orphaned_keys(&rules)
            .into_iter()
            .map(str::to_string)
            .collect(),
        untranslated: table
            .untranslated(&rules)
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

pub fn run_check(config: &Config) -> Result<()> {
    let report = check_knowledge(config)?;

    println!("bind:         {}", config.server.bind);
    println!("query log:    {}", config.storage.query_log.display());
    println!("uploads dir:  {}", config.storage.uploads_dir.display());
    println!("topics:       {}", report.topics);
    println!("translations: {}", report.translations);

    for text in &report.untranslated {
        println!("  warning: no Hindi translation for: {}", text);
    }
    for key in &report.orphaned {
        println!("  error: translation key matches no advisory: {}", key);
    }

    if !report.orphaned.is_empty() {
        bail!(
            "{} translation key(s) do not match any advisory",
            report.orphaned.len()
        );
    }
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_knowledge_is_consistent() {
        let report = check_knowledge(&Config::default()).unwrap();
        assert_eq!(report.topics, 10);
        assert!(report.orphaned.is_empty());
        assert!(report.untranslated.is_empty());
    }

    #[test]
    fn test_drifted_translation_fails() {
        let tmp = TempDir::new().unwrap();
        let tr_path = tmp.path().join("translations.toml");
        std::fs::write(
            &tr_path,
            "\"Possible pest detected: Aphids, use neem spray\" = { Hindi = \"x\" }\n",
        )
        .unwrap();
        let mut config = Config::default();
        config.advisory.translations = Some(tr_path);

        let report = check_knowledge(&config).unwrap();
        assert_eq!(report.orphaned.len(), 1);
        assert!(run_check(&config).is_err());
    }
}
