//! Keyword-dispatch responder implementation.
//!
//! `KeywordResponder` holds one validated `RuleTable` and implements the
//! `Responder` trait from welli-core.
//!
//! Selection algorithm:
//!
//! 1. Lowercase the message.
//! 2. Iterate rules in declaration order.
//! 3. Return the template of the first rule whose predicate holds. A later,
//!    more specific rule never overrides an earlier one.
//! 4. If no rule matched, return the table's fallback template.
//!
//! The chosen template is then interpolated with the caller's context.

use std::path::Path;

use tracing::debug;

use welli_contracts::{
    context::ChatContext,
    error::{WelliError, WelliResult},
};
use welli_core::{config::AssistantConfig, traits::Responder};

use crate::{rule::RuleTable, template};

const PATIENT_ASSISTANT_RULES: &str = include_str!("../rules/patient_assistant.toml");
const MEDICAL_ASSISTANT_RULES: &str = include_str!("../rules/medical_assistant.toml");

/// Which template a message resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    /// The matching rule's id, or `None` when the fallback was used.
    pub rule_id: Option<&'a str>,
    /// The uninterpolated template.
    pub template: &'a str,
}

impl Selection<'_> {
    pub fn is_fallback(&self) -> bool {
        self.rule_id.is_none()
    }
}

/// A `Responder` backed by an ordered keyword rule table.
///
/// ```rust,ignore
/// use welli_responder::KeywordResponder;
///
/// let responder = KeywordResponder::patient_assistant()?;
/// let reply = responder.respond("any headaches?", &ChatContext::for_subject("Sarah"));
/// ```
#[derive(Debug, Clone)]
pub struct KeywordResponder {
    table: RuleTable,
}

impl KeywordResponder {
    /// Build a responder from an in-memory table, validating it first.
    pub fn from_table(table: RuleTable) -> WelliResult<Self> {
        let table = table.validated()?;
        debug!(table = %table.name, rules = table.rules.len(), "rule table loaded");
        Ok(Self { table })
    }

    /// Parse `s` as a TOML rule table.
    ///
    /// Returns `WelliError::ConfigError` if the TOML is malformed, does not
    /// match the `RuleTable` schema, or fails validation.
    pub fn from_toml_str(s: &str) -> WelliResult<Self> {
        let table: RuleTable = toml::from_str(s).map_err(|e| WelliError::ConfigError {
            reason: format!("failed to parse rule table TOML: {}", e),
        })?;
        Self::from_table(table)
    }

    /// Read the file at `path` and parse it as a TOML rule table.
    pub fn from_file(path: &Path) -> WelliResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| WelliError::ConfigError {
            reason: format!("failed to read rule table '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The built-in table used by the per-patient assistant panel.
    pub fn patient_assistant() -> WelliResult<Self> {
        Self::from_toml_str(PATIENT_ASSISTANT_RULES)
    }

    /// The built-in table used by the standalone medical assistant page.
    pub fn medical_assistant() -> WelliResult<Self> {
        Self::from_toml_str(MEDICAL_ASSISTANT_RULES)
    }

    /// The patient panel's table: `config.patient_rules` if set, else built-in.
    pub fn for_patient_panel(config: &AssistantConfig) -> WelliResult<Self> {
        match &config.patient_rules {
            Some(path) => Self::from_file(path),
            None => Self::patient_assistant(),
        }
    }

    /// The medical page's table: `config.medical_rules` if set, else built-in.
    pub fn for_medical_page(config: &AssistantConfig) -> WelliResult<Self> {
        match &config.medical_rules {
            Some(path) => Self::from_file(path),
            None => Self::medical_assistant(),
        }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Resolve `message` to a template without interpolating it.
    pub fn select(&self, message: &str) -> Selection<'_> {
        let lowered = message.to_lowercase();

        for rule in &self.table.rules {
            if rule.matches.matches(&lowered) {
                debug!(table = %self.table.name, rule_id = %rule.id, "rule matched");
                return Selection {
                    rule_id: Some(&rule.id),
                    template: &rule.template,
                };
            }
        }

        debug!(table = %self.table.name, "no rule matched; using fallback");
        Selection {
            rule_id: None,
            template: &self.table.fallback,
        }
    }
}

impl Responder for KeywordResponder {
    /// Select a template for `message` and interpolate `ctx` into it.
    ///
    /// Total over all inputs: validation guarantees the fallback and every
    /// template are non-empty.
    fn respond(&self, message: &str, ctx: &ChatContext) -> String {
        template::render(self.select(message).template, ctx)
    }
}
