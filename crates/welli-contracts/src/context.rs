//! Per-invocation context handed to a responder.
//!
//! The context is intentionally narrow: a responder only ever sees the
//! subject's display name, never the full patient record.

use serde::{Deserialize, Serialize};

/// Read-only interpolation data supplied by the caller on every `respond`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContext {
    /// Display name of the patient the conversation is about, if any.
    pub subject_name: Option<String>,
}

impl ChatContext {
    /// Phrase used in place of a name when the conversation has no subject.
    pub const GENERIC_SUBJECT: &'static str = "the patient";

    /// Context for a conversation about a named patient.
    pub fn for_subject(name: impl Into<String>) -> Self {
        Self {
            subject_name: Some(name.into()),
        }
    }

    /// Context for a conversation with no particular patient.
    pub fn generic() -> Self {
        Self::default()
    }

    /// The text substituted for `{subject}` in response templates.
    ///
    /// Blank names are treated as absent.
    pub fn subject(&self) -> &str {
        match self.subject_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => Self::GENERIC_SUBJECT,
        }
    }
}
