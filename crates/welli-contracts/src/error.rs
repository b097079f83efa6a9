//! Error types for the Welli assistant crates.
//!
//! The responder itself is total and never fails. Errors come from loading
//! configuration, from driving a session outside its lifecycle, and from the
//! binaries' terminal I/O.

use thiserror::Error;

/// The unified error type for the Welli assistant.
#[derive(Debug, Error)]
pub enum WelliError {
    /// A rule table or assistant config is missing, malformed, or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A message was submitted to a session that has already been closed.
    #[error("chat session {session_id} is closed")]
    SessionClosed { session_id: String },

    /// The thinking delay could not be scheduled because no async runtime
    /// is running on the calling thread.
    #[error("async runtime unavailable: {reason}")]
    RuntimeUnavailable { reason: String },

    /// Reading or writing a terminal stream failed.
    #[error("I/O error: {reason}")]
    Io { reason: String },

    /// A transcript or listing could not be rendered as JSON.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// A suggestion prompt was requested by an index the surface does not have.
    #[error("suggestion {index} does not exist ({available} available)")]
    UnknownSuggestion { index: usize, available: usize },
}

/// Convenience alias used throughout the Welli crates.
pub type WelliResult<T> = Result<T, WelliError>;
