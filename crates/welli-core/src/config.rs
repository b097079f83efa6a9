//! Assistant configuration loaded from TOML.
//!
//! ```toml
//! thinking_delay_ms = 1500
//! patient_rules = "rules/patient_assistant.toml"
//! medical_rules = "rules/medical_assistant.toml"
//! ```
//!
//! Every key is optional. Absent rule paths mean the built-in tables are used.
//! Relative rule paths in a file loaded with `from_file` are resolved against
//! that file's directory; `from_toml_str` leaves them as written.

use std::{path::Path, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::debug;

use welli_contracts::error::{WelliError, WelliResult};

use crate::session::SessionOptions;

/// Runtime knobs shared by both chat surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssistantConfig {
    /// Fixed, non-cancelable-by-user latency before a reply is shown.
    pub thinking_delay_ms: u64,

    /// Rule table for the per-patient assistant panel.
    pub patient_rules: Option<PathBuf>,

    /// Rule table for the standalone medical assistant page.
    pub medical_rules: Option<PathBuf>,
}

impl AssistantConfig {
    pub const DEFAULT_THINKING_DELAY_MS: u64 = 1500;

    /// Parse `s` as TOML assistant configuration.
    pub fn from_toml_str(s: &str) -> WelliResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| WelliError::ConfigError {
            reason: format!("failed to parse assistant config TOML: {}", e),
        })?;
        debug!(thinking_delay_ms = config.thinking_delay_ms, "assistant config loaded");
        Ok(config)
    }

    /// Read the file at `path` and parse it as assistant configuration.
    pub fn from_file(path: &Path) -> WelliResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| WelliError::ConfigError {
            reason: format!("failed to read assistant config '{}': {}", path.display(), e),
        })?;
        let mut config = Self::from_toml_str(&contents)?;
        if let Some(base) = path.parent() {
            config.resolve_rule_paths(base);
        }
        Ok(config)
    }

    fn resolve_rule_paths(&mut self, base: &Path) {
        for rules in [&mut self.patient_rules, &mut self.medical_rules] {
            if let Some(path) = rules.as_mut().filter(|p| p.is_relative()) {
                *path = base.join(&*path);
            }
        }
    }

    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }

    /// Session options for a surface that opens with `greeting`.
    pub fn session_options(&self, greeting: Option<String>) -> SessionOptions {
        SessionOptions {
            thinking_delay: self.thinking_delay(),
            greeting,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            thinking_delay_ms: Self::DEFAULT_THINKING_DELAY_MS,
            patient_rules: None,
            medical_rules: None,
        }
    }
}
