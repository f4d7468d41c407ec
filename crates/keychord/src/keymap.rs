//! Keymap definitions
//!
//! A keymap is a JSON list of `{ "key", "command", "scope"?, "exclusive"? }`
//! entries. Commands are names; the host turns them into handlers when the
//! keymap is applied to an engine.

use std::path::Path;

use anyhow::{anyhow, Context as _};
use serde::{Deserialize, Serialize};

use crate::binding::{BindOptions, KeyHandler};
use crate::engine::ShortcutEngine;

/// One keymap entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeymapEntry {
    /// Shortcut string (e.g., "ctrl+shift+p", "g i")
    pub key: String,
    /// Command to run
    pub command: String,
    /// Scope to bind in; the default scope when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exclusive: bool,
}

impl KeymapEntry {
    pub fn new(key: &str, command: &str) -> Self {
        Self {
            key: key.to_string(),
            command: command.to_string(),
            scope: None,
            exclusive: false,
        }
    }

    pub fn in_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    fn options(&self) -> BindOptions {
        BindOptions {
            scope: self.scope.clone(),
            exclusive: self.exclusive,
        }
    }
}

/// A keymap (ordered set of entries)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keymap {
    entries: Vec<KeymapEntry>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid keymap JSON")
    }

    /// Load a keymap file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read keymap {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("failed to load keymap {}", path.display()))
    }

    pub fn push(&mut self, entry: KeymapEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[KeymapEntry] {
        &self.entries
    }

    /// Shortcuts bound to `command`
    pub fn keys_for(&self, command: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.command == command)
            .map(|entry| entry.key.as_str())
            .collect()
    }

    /// Bind every entry, in order, resolving commands through `lookup`.
    ///
    /// Stops at the first unknown command or rejected binding. Entries
    /// applied before it stay bound.
    pub fn apply<F>(&self, engine: &ShortcutEngine, lookup: F) -> anyhow::Result<usize>
    where
        F: Fn(&str) -> Option<KeyHandler>,
    {
        for (index, entry) in self.entries.iter().enumerate() {
            let handler = lookup(&entry.command).ok_or_else(|| {
                anyhow!("keymap entry {index} (`{}`): unknown command `{}`", entry.key, entry.command)
            })?;
            engine
                .bind_with(&entry.key, entry.options(), handler)
                .with_context(|| format!("keymap entry {index} (`{}` -> `{}`)", entry.key, entry.command))?;
        }

        tracing::debug!(entries = self.entries.len(), "keymap applied");
        Ok(self.entries.len())
    }
}

impl FromIterator<KeymapEntry> for Keymap {
    fn from_iter<I: IntoIterator<Item = KeymapEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
