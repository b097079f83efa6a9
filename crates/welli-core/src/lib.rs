//! # welli-core
//!
//! The chat runtime for the Welli clinician assistant.
//!
//! This crate provides:
//! - The `Responder` trait, the pure message-to-reply seam
//! - `ChatSession`, which owns one message log and drives the
//!   `Idle → AwaitingResponse → Idle` cycle with a cancelable thinking delay
//! - `AssistantConfig`, the TOML-loaded runtime settings
//!
//! ## Usage
//!
//! ```rust,ignore
//! use welli_core::{ChatSession, SessionOptions, traits::Responder};
//! ```

pub mod config;
pub mod session;
pub mod traits;

pub use config::AssistantConfig;
pub use session::{ChatSession, SessionOptions};
