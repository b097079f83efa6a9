//! Scenario 1: Patient Assistant Panel
//!
//! Opens the assistant panel on Sarah Johnson's profile and walks through
//! every suggestion prompt, then shows the two no-op paths:
//!
//! - a blank message, which leaves the log untouched
//! - a message sent while a reply is pending, which is ignored

use std::sync::Arc;

use welli_contracts::{
    error::WelliResult,
    message::ChatMessage,
    session::SubmitOutcome,
};
use welli_core::config::AssistantConfig;
use welli_responder::KeywordResponder;

use crate::{mock_data::find_patient, surfaces::ChatSurface, surfaces::SurfaceKind};

use super::{exchange, print_transcript};

/// Play the scripted conversation and return the final transcript.
pub async fn conversation(config: &AssistantConfig) -> WelliResult<Vec<ChatMessage>> {
    let responder = Arc::new(KeywordResponder::for_patient_panel(config)?);
    let patient = find_patient("1");
    let panel = ChatSurface::patient_panel(&patient, responder, config);

    for index in 0..SurfaceKind::PatientPanel.suggestions().len() {
        panel.send_suggestion(index)?;
        panel.wait_for_reply().await;
    }

    exchange(&panel, "   ").await?;

    // A second message while the first is pending is dropped.
    if panel.send("Any other concerns?")? == SubmitOutcome::Accepted {
        panel.send("This one is ignored")?;
        panel.wait_for_reply().await;
    }

    let transcript = panel.messages();
    panel.close();
    Ok(transcript)
}

/// Run Scenario 1 and print its transcript.
pub async fn run_scenario(config: &AssistantConfig) -> WelliResult<()> {
    println!("=== Scenario 1: Patient Assistant Panel ===");
    println!("  Patient: Sarah Johnson (id 1)");
    println!();

    let transcript = conversation(config).await?;
    print_transcript(&transcript);

    println!("  {}", SurfaceKind::PatientPanel.disclaimer());
    println!();
    Ok(())
}
