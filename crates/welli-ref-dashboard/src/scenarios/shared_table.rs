//! Scenario 3: Shared Rule Table
//!
//! Both surfaces are handed the same patient-assistant table and the same
//! prompts. Their replies must match line for line, except that the panel
//! names its patient where the page says "the patient".

use std::sync::Arc;

use welli_contracts::{context::ChatContext, error::WelliResult};
use welli_core::{config::AssistantConfig, traits::Responder};
use welli_responder::KeywordResponder;

use crate::{
    mock_data::find_patient,
    surfaces::{ChatSurface, SurfaceKind},
};

use super::exchange;

/// One prompt's replies from both surfaces.
#[derive(Debug, Clone)]
pub struct PairedReply {
    pub prompt: String,
    pub panel_reply: String,
    pub page_reply: String,
}

impl PairedReply {
    /// True when the replies differ only by the interpolated subject.
    pub fn consistent(&self, subject_name: &str) -> bool {
        self.panel_reply.replace(subject_name, ChatContext::GENERIC_SUBJECT) == self.page_reply
    }
}

/// Send every patient-panel prompt through both surfaces.
pub async fn paired_replies(
    config: &AssistantConfig,
    patient_id: &str,
) -> WelliResult<(String, Vec<PairedReply>)> {
    let responder: Arc<dyn Responder> = Arc::new(KeywordResponder::for_patient_panel(config)?);
    let patient = find_patient(patient_id);

    let panel = ChatSurface::patient_panel(&patient, Arc::clone(&responder), config);
    let page = ChatSurface::medical_page(responder, config);

    let mut pairs = Vec::new();
    for prompt in SurfaceKind::PatientPanel.suggestions() {
        exchange(&panel, prompt).await?;
        exchange(&page, prompt).await?;

        let last = |surface: &ChatSurface| {
            surface.messages().pop().map(|m| m.content).unwrap_or_default()
        };
        pairs.push(PairedReply {
            prompt: prompt.to_string(),
            panel_reply: last(&panel),
            page_reply: last(&page),
        });
    }

    panel.close();
    page.close();
    Ok((patient.name, pairs))
}

/// Run Scenario 3 and print a per-prompt consistency summary.
pub async fn run_scenario(config: &AssistantConfig) -> WelliResult<()> {
    println!("=== Scenario 3: Shared Rule Table ===");
    println!("  Both surfaces answer from the patient-assistant table.");
    println!();

    let (subject, pairs) = paired_replies(config, "2").await?;
    for pair in &pairs {
        let status = if pair.consistent(&subject) { "CONSISTENT" } else { "MISMATCH" };
        println!("  [{}] {}", status, pair.prompt);
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use welli_core::config::AssistantConfig;

    use super::paired_replies;

    #[tokio::test(start_paused = true)]
    async fn both_surfaces_agree_modulo_subject() {
        let (subject, pairs) = paired_replies(&AssistantConfig::default(), "4").await.unwrap();

        assert_eq!(subject, "Michael Wilson");
        assert_eq!(pairs.len(), 5);
        for pair in &pairs {
            assert!(pair.consistent(&subject), "prompt: {}", pair.prompt);
            assert!(pair.panel_reply.contains("Michael Wilson"), "prompt: {}", pair.prompt);
            assert!(!pair.page_reply.contains("Michael Wilson"), "prompt: {}", pair.prompt);
        }
    }
}
