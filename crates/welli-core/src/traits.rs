//! Core trait definitions for the Welli assistant.
//!
//! A `Responder` maps one free-text message to one canned reply. The
//! session layer owns everything stateful around it: the message log, the
//! pending flag, and the simulated thinking delay.

use welli_contracts::context::ChatContext;

/// A pure message-to-reply function.
///
/// Implementations must be total: every input, including ones no rule
/// recognizes, yields a non-empty reply. They must also be free of side
/// effects, because the session may call them from a background task.
pub trait Responder: Send + Sync {
    /// Produce the reply for `message`, interpolating `ctx` into it.
    ///
    /// The conversation history is not consulted. Only the newest message
    /// decides the reply.
    fn respond(&self, message: &str, ctx: &ChatContext) -> String;
}

impl<R: Responder + ?Sized> Responder for std::sync::Arc<R> {
    fn respond(&self, message: &str, ctx: &ChatContext) -> String {
        (**self).respond(message, ctx)
    }
}
