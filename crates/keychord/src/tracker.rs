//! Held keys and modifier state

use std::collections::HashSet;

use crate::chord::Modifiers;
use crate::key::{self, KeyId};

/// Tracks which non-modifier keys are down and the modifier mask of the
/// last key-down.
#[derive(Debug, Clone, Default)]
pub struct KeyTracker {
    down: HashSet<KeyId>,
    modifiers: Modifiers,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down. The modifier mask is taken from the event as is,
    /// never accumulated, so a lost key-up cannot leave a modifier stuck.
    pub fn key_down(&mut self, key: &KeyId, modifiers: Modifiers) {
        self.modifiers = modifiers;
        if !key.is_modifier() && self.down.insert(key.clone()) {
            tracing::trace!(key = %key, held = self.down.len(), "key held");
        }
    }

    /// Record a key-up by raw key name.
    ///
    /// Releasing Meta forgets every held key: operating systems routinely
    /// swallow the key-ups of keys pressed during a Meta chord (`cmd+z`).
    pub fn key_up(&mut self, raw: &str) {
        let key = key::resolve(raw);
        if key.is_meta() {
            self.down.clear();
        } else {
            self.down.remove(&key);
        }
    }

    /// Forget everything, e.g. after the window regains focus.
    pub fn clear(&mut self) {
        self.down.clear();
        self.modifiers = Modifiers::empty();
    }

    pub fn down_keys(&self) -> &HashSet<KeyId> {
        &self.down
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[cfg(test)]
    pub(crate) fn is_down(&self, key: &str) -> bool {
        self.down.contains(key)
    }
}
