//! Response rule types and the rule-table configuration schema.
//!
//! A `RuleTable` is deserialized from TOML and holds an ordered list of
//! `ResponseRule`s plus a fallback template. Rules are evaluated in
//! declaration order and the first match wins. When nothing matches, the
//! fallback is used, so every table answers every message.

use serde::{Deserialize, Serialize};

use welli_contracts::error::{WelliError, WelliResult};

/// The keyword predicate a rule tests against the lowercased message.
///
/// Expressed in TOML as a single-key inline table:
/// ```toml
/// match = { contains = "headaches" }
/// match = { all = ["risk", "cardiovascular"] }
/// match = { any = ["family history", "genetic"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordMatch {
    /// The message contains this substring.
    Contains(String),
    /// The message contains every one of these substrings.
    All(Vec<String>),
    /// The message contains at least one of these substrings.
    Any(Vec<String>),
}

impl KeywordMatch {
    /// Test this predicate against `lowered`, which must already be lowercase.
    pub fn matches(&self, lowered: &str) -> bool {
        match self {
            KeywordMatch::Contains(keyword) => lowered.contains(keyword.as_str()),
            KeywordMatch::All(keywords) => keywords.iter().all(|k| lowered.contains(k.as_str())),
            KeywordMatch::Any(keywords) => keywords.iter().any(|k| lowered.contains(k.as_str())),
        }
    }

    /// Every keyword this predicate mentions, in declaration order.
    pub fn keywords(&self) -> &[String] {
        match self {
            KeywordMatch::Contains(keyword) => std::slice::from_ref(keyword),
            KeywordMatch::All(keywords) | KeywordMatch::Any(keywords) => keywords,
        }
    }

    /// Short human-readable form, e.g. `all("risk", "cardiovascular")`.
    pub fn describe(&self) -> String {
        let quoted = self
            .keywords()
            .iter()
            .map(|k| format!("{:?}", k))
            .collect::<Vec<_>>()
            .join(", ");
        match self {
            KeywordMatch::Contains(_) => format!("contains({})", quoted),
            KeywordMatch::All(_) => format!("all({})", quoted),
            KeywordMatch::Any(_) => format!("any({})", quoted),
        }
    }

    fn lowercase_in_place(&mut self) {
        match self {
            KeywordMatch::Contains(keyword) => *keyword = keyword.to_lowercase(),
            KeywordMatch::All(keywords) | KeywordMatch::Any(keywords) => {
                for keyword in keywords.iter_mut() {
                    *keyword = keyword.to_lowercase();
                }
            }
        }
    }
}

/// A single (predicate, template) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRule {
    /// Stable identifier used in logs and the `explain` output.
    pub id: String,

    /// Human-readable note on what the rule answers.
    #[serde(default)]
    pub description: String,

    /// The predicate that selects this rule.
    #[serde(rename = "match")]
    pub matches: KeywordMatch,

    /// Reply body. `{subject}` is replaced with the context's subject.
    pub template: String,
}

/// The top-level structure deserialized from a rule-table TOML file.
///
/// Example:
/// ```toml
/// name = "patient-assistant"
/// fallback = "Based on {subject}'s medical profile..."
///
/// [[rules]]
/// id = "headaches"
/// match = { contains = "headaches" }
/// template = "Potential causes for {subject}'s headaches..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTable {
    /// Table name, used in logs.
    pub name: String,

    /// Reply used when no rule matches.
    pub fallback: String,

    /// Ordered list of rules. First match wins.
    #[serde(default)]
    pub rules: Vec<ResponseRule>,
}

impl RuleTable {
    /// Normalize keywords to lowercase and reject tables that could produce
    /// an empty reply or a rule that can never be told apart.
    ///
    /// Rejected with `ConfigError`:
    /// - a blank fallback or template
    /// - a blank rule id, or the same id used twice
    /// - a predicate with no keywords, or with a blank keyword
    pub fn validated(mut self) -> WelliResult<Self> {
        if self.fallback.trim().is_empty() {
            return Err(config_error(format!("table '{}' has an empty fallback", self.name)));
        }

        let mut seen = std::collections::HashSet::new();
        for rule in &mut self.rules {
            if rule.id.trim().is_empty() {
                return Err(config_error(format!("table '{}' has a rule with no id", self.name)));
            }
            if !seen.insert(rule.id.clone()) {
                return Err(config_error(format!(
                    "table '{}' declares rule '{}' more than once",
                    self.name, rule.id
                )));
            }
            if rule.template.trim().is_empty() {
                return Err(config_error(format!("rule '{}' has an empty template", rule.id)));
            }
            if rule.matches.keywords().is_empty() {
                return Err(config_error(format!("rule '{}' has no keywords", rule.id)));
            }
            if rule.matches.keywords().iter().any(|k| k.trim().is_empty()) {
                return Err(config_error(format!("rule '{}' has a blank keyword", rule.id)));
            }
            rule.matches.lowercase_in_place();
        }

        Ok(self)
    }
}

fn config_error(reason: String) -> WelliError {
    WelliError::ConfigError { reason }
}
