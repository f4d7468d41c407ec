//! Binding table
//!
//! Bindings are filed under the trigger key of their leading chord, so a
//! key-down only has to look at one bucket. Insertion enforces the two
//! table invariants:
//!
//! - within a scope, a leading chord is either standalone or the start of
//!   sequences, never both;
//! - a shortcut has at most one exclusive binding per scope.

use std::collections::{BTreeSet, HashMap};

use crate::binding::{same_handler, Binding, BindingId, KeyHandler};
use crate::key::KeyId;
use crate::shortcut::Shortcut;

/// Binding would make dispatch ambiguous
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("Cannot bind sequence `{candidate}`: standalone shortcut `{existing}` with the same start already exists in scope `{scope}`")]
    StandaloneExists {
        scope: String,
        candidate: String,
        existing: String,
    },
    #[error("Cannot bind standalone shortcut `{candidate}`: sequence `{existing}` starting with it already exists in scope `{scope}`")]
    SequenceExists {
        scope: String,
        candidate: String,
        existing: String,
    },
    #[error("Conflicting exclusive binding for `{candidate}` in scope `{scope}`: `{existing}` is already exclusive")]
    DuplicateExclusive {
        scope: String,
        candidate: String,
        existing: String,
    },
}

/// Key-indexed bindings
#[derive(Debug)]
pub struct BindingTable {
    entries: HashMap<KeyId, Vec<Binding>>,
    next_id: u64,
    validate: bool,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::with_validation(true)
    }

    /// `validate = false` skips conflict detection entirely.
    pub fn with_validation(validate: bool) -> Self {
        Self {
            entries: HashMap::new(),
            next_id: 0,
            validate,
        }
    }

    /// Add a binding. Either the binding is appended or nothing changes.
    pub fn insert(
        &mut self,
        scope: String,
        shortcut: Shortcut,
        handler: KeyHandler,
        exclusive: bool,
        spec: String,
    ) -> Result<BindingId, ConflictError> {
        if self.validate {
            if let Some(list) = self.entries.get(shortcut.key()) {
                check_conflicts(list, &scope, &shortcut, exclusive, &spec)?;
            }
        }

        let id = BindingId(self.next_id);
        self.next_id += 1;

        self.entries
            .entry(shortcut.key().clone())
            .or_default()
            .push(Binding {
                id,
                scope,
                handler,
                shortcut,
                exclusive,
                spec,
            });

        Ok(id)
    }

    /// Remove bindings with this scope and shortcut, optionally only those
    /// registered with `handler`. Returns the removed ids.
    pub fn remove_matching(
        &mut self,
        scope: &str,
        shortcut: &Shortcut,
        handler: Option<&KeyHandler>,
    ) -> Vec<BindingId> {
        let key = shortcut.key();
        let Some(list) = self.entries.get_mut(key) else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        list.retain(|binding| {
            let hit = binding.matches_shape(scope, shortcut)
                && handler.is_none_or(|h| same_handler(h, &binding.handler));
            if hit {
                removed.push(binding.id);
            }
            !hit
        });

        if list.is_empty() {
            self.entries.remove(key);
        }
        removed
    }

    /// Remove every binding in `scope`.
    pub fn remove_scope(&mut self, scope: &str) -> Vec<BindingId> {
        let mut removed = Vec::new();
        for list in self.entries.values_mut() {
            list.retain(|binding| {
                let hit = binding.scope == scope;
                if hit {
                    removed.push(binding.id);
                }
                !hit
            });
        }
        self.entries.retain(|_, list| !list.is_empty());
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Bindings filed under `key`, in registration order.
    pub fn lookup(&self, key: &KeyId) -> &[Binding] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bindings with exactly this scope and shortcut.
    pub fn find<'a>(
        &'a self,
        scope: &'a str,
        shortcut: &'a Shortcut,
    ) -> impl Iterator<Item = &'a Binding> + 'a {
        self.lookup(shortcut.key())
            .iter()
            .filter(move |binding| binding.matches_shape(scope, shortcut))
    }

    /// One rendered shortcut string per distinct shortcut bound in `scope`.
    pub fn scope_keys(&self, scope: &str) -> Vec<String> {
        self.entries
            .values()
            .flatten()
            .filter(|binding| binding.scope == scope)
            .map(|binding| binding.shortcut.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Total number of bindings.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::new()
    }
}

fn check_conflicts(
    list: &[Binding],
    scope: &str,
    shortcut: &Shortcut,
    exclusive: bool,
    spec: &str,
) -> Result<(), ConflictError> {
    let same_start = list
        .iter()
        .filter(|binding| binding.scope == scope && binding.shortcut.first() == shortcut.first());

    for existing in same_start {
        let conflict = if !existing.is_sequence() && shortcut.is_sequence() {
            ConflictError::StandaloneExists {
                scope: scope.to_string(),
                candidate: spec.to_string(),
                existing: existing.spec.clone(),
            }
        } else if existing.is_sequence() && !shortcut.is_sequence() {
            ConflictError::SequenceExists {
                scope: scope.to_string(),
                candidate: spec.to_string(),
                existing: existing.spec.clone(),
            }
        } else if exclusive && existing.exclusive && existing.shortcut == *shortcut {
            ConflictError::DuplicateExclusive {
                scope: scope.to_string(),
                candidate: spec.to_string(),
                existing: existing.spec.clone(),
            }
        } else {
            continue;
        };
        return Err(conflict);
    }

    Ok(())
}
