//! # welli-responder
//!
//! A TOML-driven, first-match keyword responder for the Welli assistant.
//!
//! ## Overview
//!
//! This crate provides [`KeywordResponder`], which implements the
//! [`Responder`](welli_core::traits::Responder) trait. Rules are declared in
//! a TOML table, evaluated in order against the lowercased message, and the
//! first matching rule's template is returned. If no rule matches, the
//! table's fallback is returned, so the responder answers every message.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use welli_responder::KeywordResponder;
//!
//! let responder = KeywordResponder::patient_assistant()?;
//! // Hand `Arc::new(responder)` to `welli_core::ChatSession::new(...)`.
//! ```
//!
//! ## Built-in tables
//!
//! Two tables ship with the crate, one per chat surface: `patient_assistant`
//! for the per-patient panel and `medical_assistant` for the standalone page.

pub mod engine;
pub mod rule;
pub mod template;

pub use engine::{KeywordResponder, Selection};
pub use rule::{KeywordMatch, ResponseRule, RuleTable};

// ── Tests ─────────────────────────────────────────────────────────────────────
