//! Chat message types.
//!
//! A session's log is an ordered, append-only sequence of `ChatMessage`s.
//! The log lives only as long as the session that owns it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message in the chat log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Label shown above a message bubble.
    pub fn label(self) -> &'static str {
        match self {
            ChatRole::User => "You",
            ChatRole::Assistant => "AI Assistant",
        }
    }
}

/// One entry in a session's chat log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the message.
    pub role: ChatRole,
    /// Message body. Assistant bodies may span several lines and sections.
    pub content: String,
    /// Wall-clock time (UTC) the message was appended to the log.
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Build a message authored by the clinician.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Build a message authored by the assistant.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == ChatRole::User
    }
}
