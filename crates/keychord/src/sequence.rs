//! Multi-chord sequence tracking
//!
//! Sequences in flight are kept in a flat list and only re-examined on the
//! next key-down: there is no timer. Each key-down runs, in order:
//!
//! 1. expiry of sequences whose last step is older than the timeout;
//! 2. advancement of the survivors (a miss cancels, a hit on the last
//!    chord completes and fires);
//! 3. creation of new sequences for bindings whose first chord matches.
//!
//! Any of those happening counts as sequence activity, which suppresses
//! standalone dispatch for the same key-down.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use smallvec::SmallVec;

use crate::binding::{Binding, BindingId, KeyHandler};
use crate::chord::Modifiers;
use crate::key::KeyId;
use crate::table::BindingTable;

/// Default time allowed between two chords of a sequence.
pub const SEQUENCE_TIMEOUT: Duration = Duration::from_millis(1000);

/// A sequence binding that has matched its first chords.
#[derive(Debug, Clone)]
pub struct ActiveSequence {
    binding: Binding,
    /// Index of the chord expected next; the leading chord is 0.
    next: usize,
    started_at: Instant,
}

impl ActiveSequence {
    #[cfg(test)]
    pub(crate) fn next_index(&self) -> usize {
        self.next
    }
}

/// Result of feeding one key-down to the sequence machine.
#[derive(Default)]
pub struct Advance {
    /// A sequence started, advanced or completed.
    pub activity: bool,
    /// Handlers of completed sequences, in completion order.
    pub fired: SmallVec<[KeyHandler; 1]>,
}

#[derive(Debug)]
pub struct SequenceMachine {
    active: Vec<ActiveSequence>,
    timeout: Duration,
}

impl SequenceMachine {
    pub fn new(timeout: Duration) -> Self {
        Self {
            active: Vec::new(),
            timeout,
        }
    }

    pub fn advance(
        &mut self,
        key: &KeyId,
        modifiers: Modifiers,
        down: &HashSet<KeyId>,
        now: Instant,
        table: &BindingTable,
        scope: &str,
    ) -> Advance {
        let mut outcome = Advance::default();

        let timeout = self.timeout;
        let before = self.active.len();
        self.active
            .retain(|seq| now.saturating_duration_since(seq.started_at) <= timeout);
        if self.active.len() < before {
            tracing::trace!(expired = before - self.active.len(), "sequences timed out");
        }

        self.active.retain_mut(|seq| {
            if seq.binding.scope != scope {
                return false;
            }
            let Some(chord) = seq.binding.shortcut.chord(seq.next) else {
                return false;
            };
            if !chord.matches(key, modifiers, down) {
                return false;
            }

            outcome.activity = true;
            if seq.next + 1 == seq.binding.shortcut.chord_count() {
                tracing::debug!(spec = %seq.binding.spec, scope = %seq.binding.scope, "sequence completed");
                outcome.fired.push(seq.binding.handler.clone());
                return false;
            }

            seq.next += 1;
            seq.started_at = now;
            true
        });

        let starts = table.lookup(key).iter().filter(|binding| {
            binding.is_sequence()
                && binding.scope == scope
                && binding.shortcut.first().matches(key, modifiers, down)
        });
        for binding in starts {
            tracing::trace!(spec = %binding.spec, "sequence started");
            self.active.push(ActiveSequence {
                binding: binding.clone(),
                next: 1,
                started_at: now,
            });
            outcome.activity = true;
        }

        outcome
    }

    /// Drop sequences belonging to removed bindings.
    pub fn cancel(&mut self, removed: &[BindingId]) {
        if !removed.is_empty() {
            self.active.retain(|seq| !removed.contains(&seq.binding.id));
        }
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    #[cfg(test)]
    pub(crate) fn active(&self) -> &[ActiveSequence] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl Default for SequenceMachine {
    fn default() -> Self {
        Self::new(SEQUENCE_TIMEOUT)
    }
}
