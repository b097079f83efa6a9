//! The chat session: one panel's message log plus its pending flag.
//!
//! Each accepted message runs one exchange:
//!
//!   Idle → [append user message] → AwaitingResponse → [thinking delay]
//!        → [Responder::respond] → [append assistant message] → Idle
//!
//! While an exchange is in flight, further submissions are no-ops. The
//! thinking delay runs as a spawned tokio task guarded by a
//! `CancellationToken`. Closing the session (or dropping it) cancels the
//! token, so a reply is never written after the owning view is gone.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use welli_contracts::{
    context::ChatContext,
    error::{WelliError, WelliResult},
    message::ChatMessage,
    session::{SessionId, SessionPhase, SubmitOutcome},
};

use crate::traits::Responder;

/// Construction-time settings for a `ChatSession`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// How long the assistant "thinks" before its reply is appended.
    pub thinking_delay: Duration,
    /// Assistant message seeded into the log when the session opens.
    pub greeting: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            thinking_delay: Duration::from_millis(1500),
            greeting: None,
        }
    }
}

/// A single chat panel's conversation state.
///
/// The log and phase are owned exclusively by this session; nothing is
/// shared across sessions. All methods take `&self`, so a session can be
/// observed while its background exchange is running.
pub struct ChatSession {
    id: SessionId,
    responder: Arc<dyn Responder>,
    context: ChatContext,
    thinking_delay: Duration,
    log: Arc<Mutex<Vec<ChatMessage>>>,
    phase: Arc<watch::Sender<SessionPhase>>,
    cancel: CancellationToken,
}

impl ChatSession {
    /// Open a session that answers through `responder` using `context`.
    pub fn new(
        responder: Arc<dyn Responder>,
        context: ChatContext,
        options: SessionOptions,
    ) -> Self {
        let id = SessionId::new();
        let log: Vec<ChatMessage> = options
            .greeting
            .into_iter()
            .map(ChatMessage::assistant)
            .collect();
        let (phase, _) = watch::channel(SessionPhase::Idle);

        info!(
            session_id = %id,
            subject = %context.subject(),
            thinking_delay_ms = options.thinking_delay.as_millis() as u64,
            "chat session opened"
        );

        Self {
            id,
            responder,
            context,
            thinking_delay: options.thinking_delay,
            log: Arc::new(Mutex::new(log)),
            phase: Arc::new(phase),
            cancel: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn context(&self) -> &ChatContext {
        &self.context
    }

    /// Submit a clinician message.
    ///
    /// # Outcomes
    ///
    /// - Empty or whitespace-only → `Ok(EmptyMessage)`, nothing changes and
    ///   the responder is not invoked
    /// - An exchange already in flight → `Ok(Busy)`, nothing changes
    /// - Otherwise → `Ok(Accepted)`: the message is appended, the session
    ///   enters `AwaitingResponse`, and the reply is scheduled
    ///
    /// # Errors
    ///
    /// `SessionClosed` after `close()`. `RuntimeUnavailable` when called
    /// outside a tokio runtime; the session is left untouched in that case.
    pub fn submit(&self, message: &str) -> WelliResult<SubmitOutcome> {
        if self.phase() == SessionPhase::Closed {
            return Err(self.closed_error());
        }

        if message.trim().is_empty() {
            debug!(session_id = %self.id, "ignoring empty message");
            return Ok(SubmitOutcome::EmptyMessage);
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            WelliError::RuntimeUnavailable {
                reason: e.to_string(),
            }
        })?;

        // Claim the single in-flight slot. Only an Idle session may move on.
        let claimed = self.phase.send_if_modified(|phase| {
            if *phase == SessionPhase::Idle {
                *phase = SessionPhase::AwaitingResponse;
                true
            } else {
                false
            }
        });

        if !claimed {
            if self.phase() == SessionPhase::Closed {
                return Err(self.closed_error());
            }
            warn!(session_id = %self.id, "message submitted while awaiting a response; ignored");
            return Ok(SubmitOutcome::Busy);
        }

        {
            let mut log = self.lock_log();
            // close() cancels under this lock; a teardown that won the race owns the log.
            if self.cancel.is_cancelled() {
                return Err(self.closed_error());
            }
            log.push(ChatMessage::user(message));
        }
        debug!(session_id = %self.id, "message accepted, awaiting response");

        runtime.spawn(run_exchange(Exchange {
            session_id: self.id,
            message: message.to_string(),
            responder: Arc::clone(&self.responder),
            context: self.context.clone(),
            delay: self.thinking_delay,
            log: Arc::clone(&self.log),
            phase: Arc::clone(&self.phase),
            cancel: self.cancel.clone(),
        }));

        Ok(SubmitOutcome::Accepted)
    }

    /// Tear the session down.
    ///
    /// Cancels any pending reply and rejects future submissions. Calling
    /// this more than once is harmless.
    pub fn close(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        {
            // Held so a racing exchange either finished its write or sees the cancel.
            let _log = self.lock_log();
            self.cancel.cancel();
        }
        let previous = self.phase.send_replace(SessionPhase::Closed);
        info!(
            session_id = %self.id,
            dropped_pending_reply = previous == SessionPhase::AwaitingResponse,
            "chat session closed"
        );
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.phase() == SessionPhase::AwaitingResponse
    }

    /// True once the clinician has sent at least one message.
    pub fn has_user_messages(&self) -> bool {
        self.lock_log().iter().any(ChatMessage::is_user)
    }

    /// Snapshot of the message log, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock_log().clone()
    }

    /// Wait until no exchange is in flight.
    ///
    /// Resolves with the phase that ended the wait: `Idle`, or `Closed` if
    /// the session was torn down first.
    pub async fn wait_until_idle(&self) -> SessionPhase {
        let mut rx = self.phase.subscribe();
        let phase = match rx.wait_for(|phase| *phase != SessionPhase::AwaitingResponse).await {
            Ok(phase) => *phase,
            Err(_) => SessionPhase::Closed,
        };
        phase
    }

    fn lock_log(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn closed_error(&self) -> WelliError {
        WelliError::SessionClosed {
            session_id: self.id.to_string(),
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("context", &self.context)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

// ── Background exchange ───────────────────────────────────────────────────────

/// Everything the spawned reply task needs, moved out of the session.
struct Exchange {
    session_id: SessionId,
    message: String,
    responder: Arc<dyn Responder>,
    context: ChatContext,
    delay: Duration,
    log: Arc<Mutex<Vec<ChatMessage>>>,
    phase: Arc<watch::Sender<SessionPhase>>,
    cancel: CancellationToken,
}

async fn run_exchange(exchange: Exchange) {
    tokio::select! {
        biased;

        _ = exchange.cancel.cancelled() => {
            debug!(session_id = %exchange.session_id, "pending reply cancelled");
        }

        _ = tokio::time::sleep(exchange.delay) => {
            let reply = exchange.responder.respond(&exchange.message, &exchange.context);

            {
                let mut log = exchange.log.lock().unwrap_or_else(PoisonError::into_inner);
                // Teardown may have raced the timer.
                if exchange.cancel.is_cancelled() {
                    return;
                }
                log.push(ChatMessage::assistant(reply));
            }

            exchange.phase.send_if_modified(|phase| {
                if *phase == SessionPhase::AwaitingResponse {
                    *phase = SessionPhase::Idle;
                    true
                } else {
                    false
                }
            });
            debug!(session_id = %exchange.session_id, "reply delivered");
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::time::Duration;

    use welli_contracts::{
        context::ChatContext,
        error::WelliError,
        message::ChatRole,
        session::{SessionPhase, SubmitOutcome},
    };

    use crate::traits::Responder;

    use super::{ChatSession, SessionOptions};

    // ── Mock helpers ─────────────────────────────────────────────────────────

    /// Echoes the message and subject, and counts invocations.
    #[derive(Default)]
    struct EchoResponder {
        calls: AtomicUsize,
    }

    impl Responder for EchoResponder {
        fn respond(&self, message: &str, ctx: &ChatContext) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            format!("Reply for {}: {}", ctx.subject(), message.trim())
        }
    }

    fn open(responder: Arc<EchoResponder>, greeting: Option<&str>) -> ChatSession {
        ChatSession::new(
            responder,
            ChatContext::for_subject("Sarah Johnson"),
            SessionOptions {
                thinking_delay: Duration::from_millis(1500),
                greeting: greeting.map(str::to_string),
            },
        )
    }

    // ── Tests ────────────────────────────────────────────────────────────────

    #[test]
    fn greeting_is_seeded_as_first_assistant_message() {
        let session = open(Arc::default(), Some("How can I help?"));
        let log = session.messages();

        assert_eq!(log.len(), 1);
        assert_eq!(log[0].role, ChatRole::Assistant);
        assert_eq!(log[0].content, "How can I help?");
        assert!(!session.has_user_messages());
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_message_gets_exactly_one_reply_after_delay() {
        let responder = Arc::new(EchoResponder::default());
        let session = open(Arc::clone(&responder), None);
        let started = tokio::time::Instant::now();

        let outcome = session.submit("Any headaches?").unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted);
        assert!(session.is_awaiting_response());
        assert_eq!(session.messages().len(), 1, "user message is appended immediately");

        assert_eq!(session.wait_until_idle().await, SessionPhase::Idle);
        assert!(started.elapsed() >= Duration::from_millis(1500));

        let log = session.messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].role, ChatRole::User);
        assert_eq!(log[0].content, "Any headaches?");
        assert_eq!(log[1].role, ChatRole::Assistant);
        assert!(log[1].content.contains("Sarah Johnson"));
        assert_eq!(responder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn whitespace_message_is_a_no_op() {
        let responder = Arc::new(EchoResponder::default());
        let session = open(Arc::clone(&responder), Some("hello"));

        assert_eq!(session.submit("   ").unwrap(), SubmitOutcome::EmptyMessage);
        assert_eq!(session.submit("").unwrap(), SubmitOutcome::EmptyMessage);
        assert_eq!(session.submit("\n\t").unwrap(), SubmitOutcome::EmptyMessage);

        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(session.messages().len(), 1, "only the greeting remains");
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(responder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_while_awaiting_response_is_ignored() {
        let responder = Arc::new(EchoResponder::default());
        let session = open(Arc::clone(&responder), None);

        assert_eq!(session.submit("first").unwrap(), SubmitOutcome::Accepted);
        assert_eq!(session.submit("second").unwrap(), SubmitOutcome::Busy);
        assert_eq!(session.messages().len(), 1, "busy submit must not touch the log");

        session.wait_until_idle().await;
        let log = session.messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].content, "first");
        assert!(log[1].content.ends_with("first"));
        assert_eq!(responder.calls.load(Ordering::SeqCst), 1);

        // Back to Idle: the next message is accepted again.
        assert_eq!(session.submit("second").unwrap(), SubmitOutcome::Accepted);
        session.wait_until_idle().await;
        assert_eq!(session.messages().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn close_cancels_pending_reply() {
        let responder = Arc::new(EchoResponder::default());
        let session = open(Arc::clone(&responder), None);

        session.submit("risk factors?").unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        session.close();

        assert_eq!(session.wait_until_idle().await, SessionPhase::Closed);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(session.messages().len(), 1, "no reply may land after teardown");
        assert_eq!(responder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_session_never_invokes_responder() {
        let responder = Arc::new(EchoResponder::default());
        {
            let session = open(Arc::clone(&responder), None);
            session.submit("hello").unwrap();
        }

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(responder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_after_close_is_an_error() {
        let session = open(Arc::default(), None);
        session.close();
        session.close();

        match session.submit("hello") {
            Err(WelliError::SessionClosed { session_id }) => {
                assert_eq!(session_id, session.id().to_string());
            }
            other => panic!("expected SessionClosed, got {:?}", other),
        }
        assert!(session.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn wait_until_idle_resolves_immediately_without_pending_reply() {
        let session = open(Arc::default(), None);
        assert_eq!(session.wait_until_idle().await, SessionPhase::Idle);

        session.close();
        assert_eq!(session.wait_until_idle().await, SessionPhase::Closed);
    }

    /// Teardown racing the reply on worker threads: whatever the log held
    /// when `close` returned is all it ever holds.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn no_message_lands_after_close_returns() {
        for round in 0..200 {
            let session = ChatSession::new(
                Arc::new(EchoResponder::default()),
                ChatContext::generic(),
                SessionOptions {
                    thinking_delay: Duration::ZERO,
                    greeting: None,
                },
            );

            let _ = session.submit("hello");
            if round % 2 == 0 {
                tokio::task::yield_now().await;
            }
            session.close();
            let at_close = session.messages().len();

            tokio::time::sleep(Duration::from_millis(2)).await;
            assert_eq!(session.messages().len(), at_close, "round {round}");
            assert!(session.submit("again").is_err());
        }
    }

    #[test]
    fn submit_outside_runtime_leaves_session_untouched() {
        let session = open(Arc::default(), None);

        match session.submit("hello") {
            Err(WelliError::RuntimeUnavailable { .. }) => {}
            other => panic!("expected RuntimeUnavailable, got {:?}", other),
        }
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.messages().is_empty());
    }
}
