//! # welli-contracts
//!
//! Shared types for the Welli clinician assistant.
//!
//! Every other crate in the workspace imports from here. No behavior lives
//! in this crate beyond small constructors and accessors.

pub mod context;
pub mod error;
pub mod message;
pub mod session;

#[cfg(test)]
mod tests {
    use super::*;
    use context::ChatContext;
    use error::WelliError;
    use message::{ChatMessage, ChatRole};
    use session::{SessionId, SessionPhase, SubmitOutcome};

    // ── ChatContext ──────────────────────────────────────────────────────────

    #[test]
    fn context_for_subject_returns_name() {
        let ctx = ChatContext::for_subject("Sarah Johnson");
        assert_eq!(ctx.subject(), "Sarah Johnson");
    }

    #[test]
    fn context_generic_falls_back_to_generic_subject() {
        let ctx = ChatContext::generic();
        assert_eq!(ctx.subject(), "the patient");
        assert_eq!(ctx.subject(), ChatContext::GENERIC_SUBJECT);
    }

    #[test]
    fn context_blank_name_is_treated_as_absent() {
        let ctx = ChatContext::for_subject("   ");
        assert_eq!(ctx.subject(), ChatContext::GENERIC_SUBJECT);
    }

    // ── ChatMessage ──────────────────────────────────────────────────────────

    #[test]
    fn message_constructors_set_role() {
        let user = ChatMessage::user("hello");
        let assistant = ChatMessage::assistant("hi there");

        assert_eq!(user.role, ChatRole::User);
        assert!(user.is_user());
        assert_eq!(assistant.role, ChatRole::Assistant);
        assert!(!assistant.is_user());
        assert_eq!(assistant.content, "hi there");
    }

    #[test]
    fn chat_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert!(json.contains(r#""role":"user""#), "unexpected json: {json}");

        let role: ChatRole = serde_json::from_str(r#""assistant""#).unwrap();
        assert_eq!(role, ChatRole::Assistant);
    }

    // ── Session types ────────────────────────────────────────────────────────

    #[test]
    fn session_id_new_produces_unique_values() {
        let ids: std::collections::HashSet<String> =
            (0..100).map(|_| SessionId::new().to_string()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn session_phase_and_outcome_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&SessionPhase::AwaitingResponse).unwrap(),
            r#""awaiting_response""#
        );
        assert_eq!(
            serde_json::to_string(&SubmitOutcome::EmptyMessage).unwrap(),
            r#""empty_message""#
        );
    }

    // ── WelliError display messages ──────────────────────────────────────────

    #[test]
    fn error_config_error_display() {
        let err = WelliError::ConfigError {
            reason: "rule 'x' has no keywords".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("configuration error"));
        assert!(msg.contains("rule 'x' has no keywords"));
    }

    #[test]
    fn error_session_closed_display() {
        let err = WelliError::SessionClosed {
            session_id: "abc-123".to_string(),
        };
        assert!(err.to_string().contains("abc-123"));
        assert!(err.to_string().contains("closed"));
    }

    #[test]
    fn error_io_and_serialization_are_distinct_from_config() {
        let io = WelliError::Io {
            reason: "stdin closed".to_string(),
        };
        let ser = WelliError::Serialization {
            reason: "key must be a string".to_string(),
        };

        assert_eq!(io.to_string(), "I/O error: stdin closed");
        assert_eq!(ser.to_string(), "serialization error: key must be a string");
        assert!(!io.to_string().contains("configuration"));
        assert!(!ser.to_string().contains("configuration"));
    }

    #[test]
    fn error_unknown_suggestion_display() {
        let err = WelliError::UnknownSuggestion { index: 7, available: 5 };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains("5 available"));
    }
}
