//! The two chat surfaces of the dashboard.
//!
//! - The **patient assistant panel** opens from a patient profile and talks
//!   about that patient by name.
//! - The **medical assistant page** is a standalone page with no subject.
//!
//! Both wrap a `ChatSession` around whatever `Responder` they are given, so
//! the same rule table yields the same text on either surface, differing
//! only in the interpolated subject.

use std::sync::Arc;

use tracing::info;

use welli_contracts::{
    context::ChatContext,
    error::{WelliError, WelliResult},
    message::ChatMessage,
    session::{SessionPhase, SubmitOutcome},
};
use welli_core::{config::AssistantConfig, session::ChatSession, traits::Responder};

use crate::mock_data::Patient;

/// Which chat surface a `ChatSurface` renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    PatientPanel,
    MedicalPage,
}

const PATIENT_SUGGESTIONS: [&str; 5] = [
    "What risk factors does the patient have for cardiovascular disease?",
    "Suggest follow-up tests for the patient's hypertension",
    "Identify possible causes for the patient's headaches",
    "What medication alternatives could be considered?",
    "Analyze family history for genetic patterns",
];

const MEDICAL_SUGGESTIONS: [&str; 5] = [
    "Help me diagnose a patient with chest pain",
    "What are the latest treatment options for type 2 diabetes?",
    "Analyze this lab report for abnormalities",
    "Suggest alternative medications for hypertension",
    "What are the risk factors for cardiovascular disease?",
];

const MEDICAL_GREETING: &str = "Hello! I'm your AI medical assistant. I can help you with:\n\n\
- Diagnosing patient symptoms\n\
- Suggesting treatment options\n\
- Analyzing medical reports\n\
- Providing drug information\n\
- Researching medical conditions\n\n\
How can I assist you today?";

impl SurfaceKind {
    pub fn title(self) -> &'static str {
        match self {
            SurfaceKind::PatientPanel => "AI Diagnostic Assistant",
            SurfaceKind::MedicalPage => "AI Medical Assistant",
        }
    }

    /// Prompts offered until the clinician sends a first message.
    pub fn suggestions(self) -> &'static [&'static str] {
        match self {
            SurfaceKind::PatientPanel => &PATIENT_SUGGESTIONS,
            SurfaceKind::MedicalPage => &MEDICAL_SUGGESTIONS,
        }
    }

    /// Footer shown under the input line.
    pub fn disclaimer(self) -> &'static str {
        match self {
            SurfaceKind::PatientPanel => {
                "This is an AI assistant to help with diagnosis. Always use your clinical judgment."
            }
            SurfaceKind::MedicalPage => {
                "This is an AI assistant to help with medical tasks. Always use your clinical judgment."
            }
        }
    }

    /// Label of the indicator shown while a reply is pending.
    pub fn pending_label(self) -> &'static str {
        match self {
            SurfaceKind::PatientPanel => "Analyzing patient data",
            SurfaceKind::MedicalPage => "Analyzing data",
        }
    }

    /// First assistant message. The patient panel names its subject.
    pub fn greeting(self, ctx: &ChatContext) -> String {
        match self {
            SurfaceKind::PatientPanel => format!(
                "I'm analyzing {}'s medical history and current symptoms. How can I help with your diagnosis?",
                ctx.subject()
            ),
            SurfaceKind::MedicalPage => MEDICAL_GREETING.to_string(),
        }
    }
}

/// A chat surface: its presentation strings plus the session behind it.
#[derive(Debug)]
pub struct ChatSurface {
    kind: SurfaceKind,
    session: ChatSession,
}

impl ChatSurface {
    /// Open the assistant panel for `patient`.
    pub fn patient_panel(
        patient: &Patient,
        responder: Arc<dyn Responder>,
        config: &AssistantConfig,
    ) -> Self {
        info!(patient_id = %patient.id, "opening patient assistant panel");
        Self::open(
            SurfaceKind::PatientPanel,
            ChatContext::for_subject(patient.name.clone()),
            responder,
            config,
        )
    }

    /// Open the standalone medical assistant page.
    pub fn medical_page(responder: Arc<dyn Responder>, config: &AssistantConfig) -> Self {
        Self::open(SurfaceKind::MedicalPage, ChatContext::generic(), responder, config)
    }

    fn open(
        kind: SurfaceKind,
        context: ChatContext,
        responder: Arc<dyn Responder>,
        config: &AssistantConfig,
    ) -> Self {
        let greeting = kind.greeting(&context);
        let session = ChatSession::new(responder, context, config.session_options(Some(greeting)));
        Self { kind, session }
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Who the conversation is about: the patient's name, or "the patient".
    pub fn subject(&self) -> &str {
        self.session.context().subject()
    }

    /// Send what the clinician typed.
    pub fn send(&self, text: &str) -> WelliResult<SubmitOutcome> {
        self.session.submit(text)
    }

    /// Send the suggestion prompt at `index`.
    ///
    /// Suggestions remain addressable after they are hidden.
    pub fn send_suggestion(&self, index: usize) -> WelliResult<SubmitOutcome> {
        let suggestions = self.kind.suggestions();
        let prompt = suggestions.get(index).ok_or(WelliError::UnknownSuggestion {
            index,
            available: suggestions.len(),
        })?;
        self.session.submit(prompt)
    }

    /// Suggestions are shown until the first user message.
    pub fn suggestions_visible(&self) -> bool {
        !self.session.has_user_messages()
    }

    /// True while the pending indicator should be shown.
    pub fn is_analyzing(&self) -> bool {
        self.session.is_awaiting_response()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.session.messages()
    }

    /// Wait for the in-flight reply, if any, and return the newest message.
    pub async fn wait_for_reply(&self) -> Option<ChatMessage> {
        if self.session.wait_until_idle().await == SessionPhase::Closed {
            return None;
        }
        self.session.messages().pop()
    }

    /// Tear the surface down, dropping any pending reply.
    pub fn close(&self) {
        self.session.close();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use welli_contracts::{
        context::ChatContext,
        error::WelliError,
        message::ChatRole,
        session::SubmitOutcome,
    };
    use welli_core::{config::AssistantConfig, traits::Responder};
    use welli_responder::{template, KeywordResponder};

    use super::{ChatSurface, SurfaceKind};
    use crate::mock_data::find_patient;

    fn patient_table() -> Arc<KeywordResponder> {
        Arc::new(KeywordResponder::patient_assistant().unwrap())
    }

    fn medical_table() -> Arc<KeywordResponder> {
        Arc::new(KeywordResponder::medical_assistant().unwrap())
    }

    #[test]
    fn patient_panel_greets_by_name() {
        let panel = ChatSurface::patient_panel(
            &find_patient("1"),
            patient_table(),
            &AssistantConfig::default(),
        );

        let log = panel.messages();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].role, ChatRole::Assistant);
        assert_eq!(
            log[0].content,
            "I'm analyzing Sarah Johnson's medical history and current symptoms. How can I help with your diagnosis?"
        );
        assert!(panel.suggestions_visible());
        assert!(!panel.is_analyzing());
        assert_eq!(panel.subject(), "Sarah Johnson");
    }

    #[test]
    fn medical_page_greets_generically() {
        let page = ChatSurface::medical_page(medical_table(), &AssistantConfig::default());
        let greeting = &page.messages()[0].content;

        assert!(greeting.starts_with("Hello! I'm your AI medical assistant."));
        assert!(greeting.contains("- Analyzing medical reports\n"));
        assert!(greeting.ends_with("How can I assist you today?"));
        assert_eq!(page.kind().pending_label(), "Analyzing data");
        assert_eq!(page.subject(), ChatContext::GENERIC_SUBJECT);
    }

    #[tokio::test(start_paused = true)]
    async fn suggestion_hides_suggestions_and_gets_a_reply() {
        let panel = ChatSurface::patient_panel(
            &find_patient("1"),
            patient_table(),
            &AssistantConfig::default(),
        );

        assert_eq!(panel.send_suggestion(0).unwrap(), SubmitOutcome::Accepted);
        assert!(!panel.suggestions_visible());
        assert!(panel.is_analyzing());

        let reply = panel.wait_for_reply().await.unwrap();
        assert_eq!(reply.role, ChatRole::Assistant);
        assert!(reply.content.contains("RECOMMENDATION:"));
        assert!(reply.content.contains("Sarah Johnson"));
        assert!(!panel.is_analyzing());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_suggestion_is_an_error() {
        let page = ChatSurface::medical_page(medical_table(), &AssistantConfig::default());

        match page.send_suggestion(5) {
            Err(WelliError::UnknownSuggestion { index, available }) => {
                assert_eq!(index, 5);
                assert_eq!(available, 5);
            }
            other => panic!("expected UnknownSuggestion, got {:?}", other),
        }
        assert!(page.suggestions_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_leaves_surface_unchanged() {
        let page = ChatSurface::medical_page(medical_table(), &AssistantConfig::default());

        assert_eq!(page.send("   ").unwrap(), SubmitOutcome::EmptyMessage);
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;

        assert_eq!(page.messages().len(), 1);
        assert!(page.suggestions_visible());
        assert!(!page.is_analyzing());
    }

    /// Same table, same input: both surfaces produce the same text apart
    /// from the interpolated subject.
    #[tokio::test(start_paused = true)]
    async fn surfaces_sharing_a_table_reply_identically() {
        let responder = patient_table();
        let config = AssistantConfig::default();
        let patient = find_patient("2");

        let panel = ChatSurface::patient_panel(&patient, responder.clone(), &config);
        let page = ChatSurface::medical_page(responder.clone(), &config);

        for suggestion in SurfaceKind::PatientPanel.suggestions() {
            panel.send(suggestion).unwrap();
            page.send(suggestion).unwrap();
            let panel_reply = panel.wait_for_reply().await.unwrap().content;
            let page_reply = page.wait_for_reply().await.unwrap().content;

            let selected = responder.select(suggestion).template;
            assert_eq!(
                panel_reply,
                template::render(selected, &ChatContext::for_subject("Robert Chen"))
            );
            assert_eq!(page_reply, template::render(selected, &ChatContext::generic()));
            assert_eq!(
                panel_reply.replace("Robert Chen", ChatContext::GENERIC_SUBJECT),
                page_reply,
                "message: {suggestion}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn closed_surface_drops_pending_reply() {
        let panel = ChatSurface::patient_panel(
            &find_patient("3"),
            patient_table(),
            &AssistantConfig::default(),
        );

        panel.send("headaches?").unwrap();
        panel.close();

        assert!(panel.wait_for_reply().await.is_none());
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert_eq!(panel.messages().len(), 2, "greeting and user message only");
        assert!(panel.send("again").is_err());
    }

    #[test]
    fn responder_is_reused_not_copied() {
        let responder: Arc<dyn Responder> = patient_table();
        let config = AssistantConfig::default();
        let _panel = ChatSurface::patient_panel(&find_patient("1"), responder.clone(), &config);
        let _page = ChatSurface::medical_page(responder.clone(), &config);

        assert_eq!(Arc::strong_count(&responder), 3);
    }
}
