//! Shortcut engine
//!
//! Owns the binding table, the key tracker and the sequence machine of one
//! event source, and dispatches that source's events. All work happens
//! synchronously inside the source's callbacks. Handlers are collected
//! under the state lock and run after it is released, so a handler may call
//! back into the engine.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use smallvec::{smallvec, SmallVec};

use crate::binding::{BindOptions, Binding, BindingId, KeyHandler, DEFAULT_SCOPE};
use crate::config::EngineConfig;
use crate::event::{EventSource, KeyEvent, ListenerId};
use crate::key::{self, KeyId};
use crate::sequence::SequenceMachine;
use crate::shortcut::{ParseError, Shortcut};
use crate::table::BindingTable;
use crate::tracker::KeyTracker;
use crate::BindError;

/// Decides whether a key-down is considered at all.
pub type Filter = Arc<dyn Fn(&KeyEvent) -> bool + Send + Sync>;

/// Default filter: ignore keys typed into editable elements.
pub fn default_filter(event: &KeyEvent) -> bool {
    !event.is_editable_target()
}

/// Point-in-time view of the engine's live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Held non-modifier keys, sorted.
    pub down_keys: Vec<KeyId>,
    pub modifiers: crate::Modifiers,
    pub active_sequences: usize,
}

/// Keyboard shortcut engine bound to one event source.
///
/// Cloning yields another handle to the same engine.
#[derive(Clone)]
pub struct ShortcutEngine {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<EngineState>,
    filter: Filter,
    config: EngineConfig,
    registration: Mutex<Option<Registration>>,
}

struct EngineState {
    table: BindingTable,
    tracker: KeyTracker,
    sequences: SequenceMachine,
    scope: String,
}

/// Listeners this engine added to its source.
struct Registration {
    source: Weak<dyn EventSource>,
    listeners: [ListenerId; 3],
}

impl Registration {
    fn release(self) {
        if let Some(source) = self.source.upgrade() {
            for id in self.listeners {
                source.remove_listener(id);
            }
        }
    }
}

impl ShortcutEngine {
    /// Attach to `source` with the default filter and configuration.
    pub fn new<S: EventSource + 'static>(source: &Arc<S>) -> Self {
        Self::create(source, EngineConfig::default(), Arc::new(default_filter))
    }

    pub fn with_filter<S, F>(source: &Arc<S>, filter: F) -> Self
    where
        S: EventSource + 'static,
        F: Fn(&KeyEvent) -> bool + Send + Sync + 'static,
    {
        Self::create(source, EngineConfig::default(), Arc::new(filter))
    }

    pub fn with_config<S: EventSource + 'static>(source: &Arc<S>, config: EngineConfig) -> Self {
        Self::create(source, config, Arc::new(default_filter))
    }

    /// Attach to `source`. The source only keeps weak references to the
    /// engine and the engine only a weak reference to the source.
    pub fn create<S: EventSource + 'static>(source: &Arc<S>, config: EngineConfig, filter: Filter) -> Self {
        let inner = Arc::new(Inner {
            state: Mutex::new(EngineState {
                table: BindingTable::with_validation(config.validate_conflicts),
                tracker: KeyTracker::new(),
                sequences: SequenceMachine::new(config.sequence_timeout()),
                scope: DEFAULT_SCOPE.to_string(),
            }),
            filter,
            config,
            registration: Mutex::new(None),
        });

        let weak = Arc::downgrade(&inner);
        let key_down = {
            let weak = weak.clone();
            source.on_key_down(Arc::new(move |event: &KeyEvent| {
                if let Some(inner) = weak.upgrade() {
                    inner.key_down(event);
                }
            }))
        };
        let key_up = {
            let weak = weak.clone();
            source.on_key_up(Arc::new(move |event: &KeyEvent| {
                if let Some(inner) = weak.upgrade() {
                    inner.key_up(event);
                }
            }))
        };
        let focus = source.on_focus(Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.state.lock().reset();
            }
        }));

        let source: Arc<dyn EventSource> = source.clone();
        *inner.registration.lock() = Some(Registration {
            source: Arc::downgrade(&source),
            listeners: [key_down, key_up, focus],
        });

        tracing::debug!(timeout_ms = inner.config.sequence_timeout_ms, "shortcut engine attached");
        Self { inner }
    }

    /// Bind `spec` in the default scope.
    pub fn bind(&self, spec: &str, handler: KeyHandler) -> Result<BindingId, BindError> {
        self.bind_with(spec, BindOptions::new(), handler)
    }

    /// Bind `spec` in `scope`.
    pub fn bind_in(&self, spec: &str, scope: &str, handler: KeyHandler) -> Result<BindingId, BindError> {
        self.bind_with(spec, BindOptions::new().scope(scope), handler)
    }

    pub fn bind_with(
        &self,
        spec: &str,
        options: BindOptions,
        handler: KeyHandler,
    ) -> Result<BindingId, BindError> {
        let shortcut = Shortcut::parse(spec)?;
        let scope = options.scope_or_default().to_string();

        let result = self.inner.state.lock().table.insert(
            scope.clone(),
            shortcut,
            handler,
            options.exclusive,
            spec.to_string(),
        );

        match &result {
            Ok(_) => tracing::debug!(spec, scope = %scope, exclusive = options.exclusive, "bound shortcut"),
            Err(err) => tracing::debug!(spec, scope = %scope, error = %err, "bind rejected"),
        }
        Ok(result?)
    }

    /// Remove `handler`'s bindings of `spec` in `scope` (default scope when
    /// `None`). Returns how many bindings were removed.
    pub fn unbind(&self, spec: &str, scope: Option<&str>, handler: &KeyHandler) -> Result<usize, ParseError> {
        self.remove(spec, scope.unwrap_or(DEFAULT_SCOPE), Some(handler))
    }

    /// Remove every binding of `spec` in `scope`, whatever the handler.
    pub fn unbind_unsafe(&self, spec: &str, scope: Option<&str>) -> Result<usize, ParseError> {
        self.remove(spec, scope.unwrap_or(DEFAULT_SCOPE), None)
    }

    fn remove(&self, spec: &str, scope: &str, handler: Option<&KeyHandler>) -> Result<usize, ParseError> {
        let shortcut = Shortcut::parse(spec)?;
        let mut state = self.inner.state.lock();
        let removed = state.table.remove_matching(scope, &shortcut, handler);
        state.sequences.cancel(&removed);

        tracing::debug!(spec, scope, removed = removed.len(), "unbound shortcut");
        Ok(removed.len())
    }

    /// Remove every binding in `scope`.
    pub fn unbind_scope(&self, scope: &str) -> usize {
        let mut state = self.inner.state.lock();
        let removed = state.table.remove_scope(scope);
        state.sequences.cancel(&removed);

        tracing::debug!(scope, removed = removed.len(), "unbound scope");
        removed.len()
    }

    /// Remove every binding and forget held keys and sequences.
    pub fn unbind_all(&self) {
        let mut state = self.inner.state.lock();
        state.table.clear();
        state.reset();
        tracing::debug!("unbound all shortcuts");
    }

    pub fn set_scope(&self, scope: impl Into<String>) {
        let scope = scope.into();
        tracing::debug!(scope = %scope, "scope changed");
        self.inner.state.lock().scope = scope;
    }

    pub fn scope(&self) -> String {
        self.inner.state.lock().scope.clone()
    }

    /// Whether `spec` is bound in `scope` (active scope when `None`).
    /// Unparseable specs are never bound.
    pub fn is_bound(&self, spec: &str, scope: Option<&str>) -> bool {
        let Ok(shortcut) = Shortcut::parse(spec) else {
            return false;
        };
        let state = self.inner.state.lock();
        let scope = scope.unwrap_or(&state.scope);
        state.table.find(scope, &shortcut).next().is_some()
    }

    /// Shortcut strings bound in `scope` (active scope when `None`).
    pub fn bound_keys(&self, scope: Option<&str>) -> Vec<String> {
        let state = self.inner.state.lock();
        state.table.scope_keys(scope.unwrap_or(&state.scope))
    }

    /// Handlers bound to `spec` in `scope` (active scope when `None`), in
    /// registration order.
    pub fn handlers(&self, spec: &str, scope: Option<&str>) -> Vec<KeyHandler> {
        let Ok(shortcut) = Shortcut::parse(spec) else {
            return Vec::new();
        };
        let state = self.inner.state.lock();
        let scope = scope.unwrap_or(&state.scope);
        state
            .table
            .find(scope, &shortcut)
            .map(|binding| Arc::clone(&binding.handler))
            .collect()
    }

    /// Forget held keys and in-flight sequences, as on window focus.
    pub fn reset(&self) {
        self.inner.state.lock().reset();
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.inner.state.lock();
        let mut down_keys: Vec<KeyId> = state.tracker.down_keys().iter().cloned().collect();
        down_keys.sort();
        Snapshot {
            down_keys,
            modifiers: state.tracker.modifiers(),
            active_sequences: state.sequences.len(),
        }
    }

    /// Number of sequences in flight.
    pub fn active_sequences(&self) -> usize {
        self.inner.state.lock().sequences.len()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Still listening to its event source.
    pub fn is_attached(&self) -> bool {
        self.inner.registration.lock().is_some()
    }

    /// Deregister from the event source and drop all state. Idempotent.
    pub fn destroy(&self) {
        {
            let mut state = self.inner.state.lock();
            state.table.clear();
            state.reset();
        }

        let registration = self.inner.registration.lock().take();
        if let Some(registration) = registration {
            registration.release();
            tracing::debug!("shortcut engine destroyed");
        }
    }
}

impl Inner {
    fn key_down(&self, event: &KeyEvent) {
        if !(self.filter)(event) {
            tracing::trace!(key = %event.key, "key-down filtered");
            return;
        }

        let key = key::resolve(&event.key);
        if self.config.inert_caps_lock && key == key::CAPS_LOCK {
            return;
        }

        let fired = self.state.lock().key_down(&key, event);
        for handler in fired {
            handler(event);
        }
    }

    fn key_up(&self, event: &KeyEvent) {
        self.state.lock().tracker.key_up(&event.key);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(registration) = self.registration.get_mut().take() {
            registration.release();
        }
    }
}

impl EngineState {
    /// Update tracking and sequences for a key-down and pick the handlers
    /// to run.
    fn key_down(&mut self, key: &KeyId, event: &KeyEvent) -> SmallVec<[KeyHandler; 2]> {
        self.tracker.key_down(key, event.modifiers);
        // Holding a modifier between two chords of a sequence is not a step.
        if key.is_modifier() {
            return SmallVec::new();
        }

        let modifiers = self.tracker.modifiers();
        let down = self.tracker.down_keys();

        let advance = self
            .sequences
            .advance(key, modifiers, down, event.time, &self.table, &self.scope);
        if advance.activity {
            return advance.fired.into_iter().collect();
        }

        let matching: SmallVec<[&Binding; 4]> = self
            .table
            .lookup(key)
            .iter()
            .filter(|binding| {
                !binding.is_sequence()
                    && binding.scope == self.scope
                    && binding.shortcut.first().matches(key, modifiers, down)
            })
            .collect();

        if let Some(primary) = matching.iter().find(|binding| binding.exclusive) {
            return smallvec![Arc::clone(&primary.handler)];
        }
        matching.iter().map(|binding| Arc::clone(&binding.handler)).collect()
    }

    fn reset(&mut self) {
        self.tracker.clear();
        self.sequences.clear();
    }
}
