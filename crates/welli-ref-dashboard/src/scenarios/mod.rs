//! Scripted conversations for the dashboard reference runtime.
//!
//! Each scenario opens real chat surfaces backed by the keyword responder,
//! plays a fixed script through them, and prints the transcript.

pub mod medical_page;
pub mod patient_panel;
pub mod shared_table;

use welli_contracts::{
    error::WelliResult,
    message::{ChatMessage, ChatRole},
    session::SubmitOutcome,
};

use crate::surfaces::ChatSurface;

/// Send `text` and wait for its reply.
///
/// Returns the outcome of the send; blank or busy sends return immediately.
pub(crate) async fn exchange(surface: &ChatSurface, text: &str) -> WelliResult<SubmitOutcome> {
    let outcome = surface.send(text)?;
    if outcome == SubmitOutcome::Accepted {
        surface.wait_for_reply().await;
    }
    Ok(outcome)
}

/// Print a transcript, indenting multi-line bodies under their author.
pub fn print_transcript(messages: &[ChatMessage]) {
    for message in messages {
        let marker = match message.role {
            ChatRole::User => ">>",
            ChatRole::Assistant => "<<",
        };
        println!("  {} {}", marker, message.role.label());
        for line in message.content.lines() {
            println!("     {}", line);
        }
        println!();
    }
}
