//! Engine configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Time allowed between two chords of a sequence, in milliseconds.
    pub sequence_timeout_ms: u64,
    /// Reject ambiguous bindings at bind time. Turning this off skips the
    /// standalone/sequence and duplicate-exclusive checks; bindings that
    /// would have been rejected are accepted and dispatched as registered.
    pub validate_conflicts: bool,
    /// Ignore CapsLock key-downs. For platforms that repeat CapsLock
    /// key-down and never send its key-up.
    pub inert_caps_lock: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sequence_timeout_ms: 1000,
            validate_conflicts: true,
            inert_caps_lock: false,
        }
    }
}

impl EngineConfig {
    /// Parse from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn sequence_timeout(&self) -> Duration {
        Duration::from_millis(self.sequence_timeout_ms)
    }

    pub fn with_sequence_timeout(mut self, timeout: Duration) -> Self {
        self.sequence_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_conflicts = validate;
        self
    }

    pub fn with_inert_caps_lock(mut self, inert: bool) -> Self {
        self.inert_caps_lock = inert;
        self
    }
}
