//! Session identity and lifecycle types.
//!
//! A chat session moves `Idle → AwaitingResponse → Idle` once per accepted
//! message, and ends in `Closed` when its owning view is torn down.

use serde::{Deserialize, Serialize};

/// Unique identifier for one chat panel instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a session is in its exchange cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Ready to accept a message.
    Idle,
    /// A message was accepted and the simulated thinking delay is running.
    AwaitingResponse,
    /// The session was torn down. No further messages are accepted and no
    /// pending response will be delivered.
    Closed,
}

/// What happened to a submitted message.
///
/// Only `Accepted` changes the session. The other variants are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The message was appended and a response is scheduled.
    Accepted,
    /// The message was empty or whitespace-only.
    EmptyMessage,
    /// A previous exchange is still in flight.
    Busy,
}
