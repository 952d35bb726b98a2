//! Keyword classifier mapping a free-text query to one canned advisory.
//!
//! # Algorithm
//!
//! 1. Fold ASCII letters in the query to lowercase.
//! 2. Walk the topics in declaration order; a topic matches when the query
//!    contains any of its keywords as a substring.
//! 3. For the first matching topic, walk its branches in order and return
//!    the first branch whose keywords match, else the topic's own advice.
//! 4. If nothing matched, return the default advice with `{location}`
//!    replaced by the caller's location.
//!
//! Keywords are folded the same way once at construction. Only ASCII is
//! folded, so Latin keywords match case-insensitively while Devanagari and
//! any other script in an override rules file match as exact substrings.
//!
//! # Example
//!
//! ```rust
//! use agrisakha_core::classify::Classifier;
//! use agrisakha_core::rules::AdvisoryRules;
//!
//! let classifier = Classifier::new(AdvisoryRules::builtin());
//! let advice = classifier.classify("Aphids everywhere, which PEST spray?", "Pune");
//! assert_eq!(advice, "Possible pest detected: Aphids, use Neem spray");
//! ```

use crate::rules::{AdvisoryRules, LOCATION_PLACEHOLDER};

/// Stateless classifier over an immutable [`AdvisoryRules`] set.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: AdvisoryRules,
}

/// Which rule produced an advisory. Useful for logging and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match<'a> {
    Branch { topic: &'a str, branch: &'a str },
    Topic(&'a str),
    Default,
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| haystack.contains(k.as_str()))
}

impl Classifier {
    pub fn new(mut rules: AdvisoryRules) -> Self {
        for t in &mut rules.topics {
            fold_all(&mut t.keywords);
            for b in &mut t.branches {
                fold_all(&mut b.keywords);
            }
        }
        Self { rules }
    }

    pub fn rules(&self) -> &AdvisoryRules {
        &self.rules
    }

    /// Returns the advice for `query`, echoing `location` into the default.
    pub fn classify(&self, query: &str, location: &str) -> String {
        let (advice, _) = self.classify_with_match(query, location);
        advice
    }

    /// Like [`classify`](Self::classify) but also reports which rule fired.
    pub fn classify_with_match(&self, query: &str, location: &str) -> (String, Match<'_>) {
        let query = query.to_ascii_lowercase();

        let Some(topic) = self
            .rules
            .topics
            .iter()
            .find(|t| contains_any(&query, &t.keywords))
        else {
            let advice = self
                .rules
                .default_advice
                .replace(LOCATION_PLACEHOLDER, location);
            return (advice, Match::Default);
        };

        match topic
            .branches
            .iter()
            .find(|b| contains_any(&query, &b.keywords))
        {
            Some(b) => (
                b.advice.clone(),
                Match::Branch {
                    topic: &topic.name,
                    branch: &b.name,
                },
            ),
            None => (topic.advice.clone(), Match::Topic(&topic.name)),
        }
    }
}

fn fold_all(keywords: &mut [String]) {
    for k in keywords.iter_mut() {
        k.make_ascii_lowercase();
    }
}
