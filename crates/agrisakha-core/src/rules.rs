//! Advisory rule data: topics, keyword sets, and canned advice.
//!
//! Rules are plain data. [`AdvisoryRules::builtin`] returns the stock
//! knowledge base; deployments may replace it with a TOML file of the same
//! shape (see `config/rules.example.toml`). Either way the rules are loaded
//! once at startup and handed to a [`Classifier`](crate::classify::Classifier).
//!
//! # Priority
//!
//! Topic order is significant. The first topic whose keyword set matches
//! wins, and within that topic the first matching branch wins. The built-in
//! order is:
//!
//! ```text
//! wheat → rice → pest → fertilizer → irrigation → weather
//!       → soil → market → seed → crop → default
//! ```

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Placeholder substituted with the caller's location in the default advice.
pub const LOCATION_PLACEHOLDER: &str = "{location}";

/// A complete, ordered rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRules {
    /// Topics in priority order.
    pub topics: Vec<Topic>,
    /// Advice returned when no topic matches. May contain `{location}`.
    pub default_advice: String,
}

/// A top-level subject such as "wheat" or "pest".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub keywords: Vec<String>,
    /// More specific answers, tried in order before `advice`.
    #[serde(default)]
    pub branches: Vec<Branch>,
    /// Fallback advice for the topic.
    pub advice: String,
}

/// A sub-branch of a [`Topic`], e.g. wheat + disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub keywords: Vec<String>,
    pub advice: String,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn topic(name: &str, keywords: &[&str], branches: Vec<Branch>, advice: &str) -> Topic {
    Topic {
        name: name.to_string(),
        keywords: words(keywords),
        branches,
        advice: advice.to_string(),
    }
}

fn branch(name: &str, keywords: &[&str], advice: &str) -> Branch {
    Branch {
        name: name.to_string(),
        keywords: words(keywords),
        advice: advice.to_string(),
    }
}

impl AdvisoryRules {
    /// The stock rule set shipped with AgriSakha.
    pub fn builtin() -> Self {
        let topics = vec![
            topic(
                "wheat",
                &["wheat", "गेहूं", "गेहूँ", "gehu"],
                vec![
                    branch(
                        "disease",
                        &["disease", "बीमारी", "problem"],
                        "Common wheat diseases: Rust, Blight. Use Propiconazole fungicide. Ensure proper crop rotation and avoid waterlogging.",
                    ),
                    branch(
                        "fertilizer",
                        &["fertilizer", "खाद"],
                        "Wheat fertilizer schedule: Basal dose - DAP 100kg/acre, Urea 50kg/acre. Top dressing at 21 days - Urea 50kg/acre.",
                    ),
                ],
                "Wheat cultivation tips: Sow in November, use certified seeds, maintain 20cm row spacing. Expected yield: 20-25 quintals/acre.",
            ),
            topic(
                "rice",
                &["rice", "paddy", "धान", "चावल", "chawal"],
                vec![branch(
                    "disease",
                    &["disease", "blast", "बीमारी", "रोग", "problem"],
                    "Common rice diseases: Blast, Bacterial leaf blight. Use Tricyclazole for blast and avoid excess nitrogen.",
                )],
                "Rice cultivation: Best time June-July, ensure proper water management",
            ),
            topic(
                "pest",
                &["pest", "insect", "bug", "कीट", "कीड़े", "keeda", "keede"],
                vec![],
                "Possible pest detected: Aphids, use Neem spray",
            ),
            topic(
                "fertilizer",
                &["fertilizer", "fertiliser", "urea", "npk", "खाद", "उर्वरक", "khad"],
                vec![],
                "Use NPK 10:26:26 for better yield, apply according to soil test",
            ),
            topic(
                "irrigation",
                &["water", "irrigation", "सिंचाई", "पानी", "pani"],
                vec![],
                "Maintain proper irrigation schedule, avoid overwatering",
            ),
            topic(
                "weather",
                &["weather", "rain", "मौसम", "बारिश", "mausam", "barish"],
                vec![],
                "Check weather forecast regularly, plan activities accordingly",
            ),
            topic(
                "soil",
                &["soil", "मिट्टी", "mitti"],
                vec![],
                "Soil health: Test soil every 2-3 years, add organic compost and keep pH between 6.0 and 7.5.",
            ),
            topic(
                "market",
                &["market", "mandi", "sell", "मंडी", "बाजार", "बाज़ार", "भाव"],
                vec![],
                "Market prices: Check your nearest mandi or the eNAM portal for current rates before selling.",
            ),
            topic(
                "seed",
                &["seed", "बीज", "beej"],
                vec![],
                "Seed selection: Buy certified seeds from authorised dealers and treat them with fungicide before sowing.",
            ),
            topic(
                "crop",
                &["crop", "farm", "harvest", "फसल", "खेती", "fasal", "kheti"],
                vec![],
                "General advice: Maintain proper irrigation and soil testing.",
            ),
        ];

        Self {
            topics,
            default_advice: "Agricultural guidance: Please specify your query about crops, pests, fertilizers, irrigation, or weather. For {location} region, I can provide localized advice.".to_string(),
        }
    }

    /// Checks that the rule set can be matched safely.
    ///
    /// A blank keyword would match every query, so it is rejected, as are
    /// topics or branches without keywords and blank advice.
    pub fn validate(&self) -> Result<()> {
        if self.topics.is_empty() {
            bail!("advisory rules must define at least one topic");
        }
        if self.default_advice.trim().is_empty() {
            bail!("default_advice must not be empty");
        }
        for t in &self.topics {
            check_keywords(&t.name, &t.keywords)?;
            if t.advice.trim().is_empty() {
                bail!("topic '{}' has empty advice", t.name);
            }
            for b in &t.branches {
                let label = format!("{}.{}", t.name, b.name);
                check_keywords(&label, &b.keywords)?;
                if b.advice.trim().is_empty() {
                    bail!("branch '{}' has empty advice", label);
                }
            }
        }
        Ok(())
    }

    /// Every fixed advice string the rules can produce, in priority order.
    ///
    /// The default advice is excluded because it varies with location.
    pub fn fixed_outputs(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for t in &self.topics {
            for b in &t.branches {
                out.push(b.advice.as_str());
            }
            out.push(t.advice.as_str());
        }
        out
    }
}

fn check_keywords(label: &str, keywords: &[String]) -> Result<()> {
    if keywords.is_empty() {
        bail!("'{}' must list at least one keyword", label);
    }
    if keywords.iter().any(|k| k.trim().is_empty()) {
        bail!("'{}' contains a blank keyword", label);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        AdvisoryRules::builtin().validate().unwrap();
    }

    #[test]
    fn test_builtin_topic_order() {
        let rules = AdvisoryRules::builtin();
        let names: Vec<&str> = rules.topics.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "wheat",
                "rice",
                "pest",
                "fertilizer",
                "irrigation",
                "weather",
                "soil",
                "market",
                "seed",
                "crop"
            ]
        );
    }

    #[test]
    fn test_builtin_default_has_placeholder() {
        assert!(AdvisoryRules::builtin()
            .default_advice
            .contains(LOCATION_PLACEHOLDER));
    }

    #[test]
    fn test_blank_keyword_rejected() {
        let mut rules = AdvisoryRules::builtin();
        rules.topics[0].keywords.push("  ".to_string());
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("blank keyword"));
    }

    #[test]
    fn test_branch_without_keywords_rejected() {
        let mut rules = AdvisoryRules::builtin();
        rules.topics[0].branches[0].keywords.clear();
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("wheat.disease"));
    }

    #[test]
    fn test_empty_rules_rejected() {
        let rules = AdvisoryRules {
            topics: vec![],
            default_advice: "x".to_string(),
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_fixed_outputs_branches_before_fallback() {
        let rules = AdvisoryRules::builtin();
        let outputs = rules.fixed_outputs();
        assert!(outputs[0].starts_with("Common wheat diseases"));
        assert!(outputs[1].starts_with("Wheat fertilizer schedule"));
        assert!(outputs[2].starts_with("Wheat cultivation tips"));
        assert!(!outputs.iter().any(|o| o.contains(LOCATION_PLACEHOLDER)));
    }

    #[test]
    fn test_rules_deserialize_from_json_shape() {
        let json = r#"{
            "topics": [
                {"name": "maize", "keywords": ["maize", "makka"], "advice": "Sow maize in June."}
            ],
            "default_advice": "Ask about maize in {location}."
        }"#;
        let rules: AdvisoryRules = serde_json::from_str(json).unwrap();
        assert!(rules.topics[0].branches.is_empty());
        rules.validate().unwrap();
    }
}
