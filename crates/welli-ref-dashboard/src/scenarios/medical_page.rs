//! Scenario 2: Medical Assistant Page
//!
//! Opens the standalone assistant page and sends each suggestion prompt,
//! followed by one free-text question no rule recognizes.

use std::sync::Arc;

use welli_contracts::{error::WelliResult, message::ChatMessage};
use welli_core::config::AssistantConfig;
use welli_responder::KeywordResponder;

use crate::surfaces::{ChatSurface, SurfaceKind};

use super::{exchange, print_transcript};

/// Play the scripted conversation and return the final transcript.
pub async fn conversation(config: &AssistantConfig) -> WelliResult<Vec<ChatMessage>> {
    let responder = Arc::new(KeywordResponder::for_medical_page(config)?);
    let page = ChatSurface::medical_page(responder, config);

    for prompt in SurfaceKind::MedicalPage.suggestions() {
        exchange(&page, prompt).await?;
    }
    exchange(&page, "What can you do?").await?;

    let transcript = page.messages();
    page.close();
    Ok(transcript)
}

/// Run Scenario 2 and print its transcript.
pub async fn run_scenario(config: &AssistantConfig) -> WelliResult<()> {
    println!("=== Scenario 2: Medical Assistant Page ===");
    println!();

    let transcript = conversation(config).await?;
    print_transcript(&transcript);

    println!("  {}", SurfaceKind::MedicalPage.disclaimer());
    println!();
    Ok(())
}
