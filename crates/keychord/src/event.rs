//! Keyboard events and event sources
//!
//! An [`EventSource`] is whatever delivers key-down, key-up and window focus
//! notifications to the engine: a DOM document behind a wasm bridge, a
//! winit window, a terminal reader. [`Document`] is an in-memory source for
//! headless hosts and tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::{Mutex, RwLock};

use crate::chord::Modifiers;
use crate::key;

/// A physical key event.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    /// Raw platform key name (`"a"`, `"ArrowLeft"`, `"Meta"`).
    pub key: String,
    /// Modifier flags as reported by the event itself.
    pub modifiers: Modifiers,
    /// Element the event was aimed at, if the host knows.
    pub target: Option<Target>,
    /// Auto-repeat from a held key.
    pub repeat: bool,
    /// When the event happened.
    pub time: Instant,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::empty(),
            target: None,
            repeat: false,
            time: Instant::now(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn at(mut self, time: Instant) -> Self {
        self.time = time;
        self
    }

    /// Whether the target accepts text input.
    pub fn is_editable_target(&self) -> bool {
        self.target.as_ref().is_some_and(Target::is_editable)
    }
}

/// Event target element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub tag_name: String,
    pub content_editable: bool,
}

impl Target {
    pub fn element(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            content_editable: false,
        }
    }

    pub fn content_editable(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            content_editable: true,
        }
    }

    pub fn is_editable(&self) -> bool {
        self.content_editable
            || ["INPUT", "SELECT", "TEXTAREA"]
                .iter()
                .any(|tag| self.tag_name.eq_ignore_ascii_case(tag))
    }
}

/// Listener for key-down / key-up
pub type KeyListener = Arc<dyn Fn(&KeyEvent) + Send + Sync>;

/// Listener for window focus
pub type FocusListener = Arc<dyn Fn() + Send + Sync>;

/// Registration handle returned by an [`EventSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Something that delivers keyboard and focus events.
pub trait EventSource: Send + Sync {
    fn on_key_down(&self, listener: KeyListener) -> ListenerId;

    fn on_key_up(&self, listener: KeyListener) -> ListenerId;

    /// Focus gained by the window that owns this source.
    fn on_focus(&self, listener: FocusListener) -> ListenerId;

    /// Deregister a listener. Returns false if it was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;
}

#[derive(Default)]
struct Listeners {
    key_down: Vec<(ListenerId, KeyListener)>,
    key_up: Vec<(ListenerId, KeyListener)>,
    focus: Vec<(ListenerId, FocusListener)>,
}

/// In-memory event source.
///
/// Besides delivering prebuilt events, it can act as a keyboard:
/// [`press`](Document::press) and [`release`](Document::release) keep the
/// modifier flags the way a browser reports them (a modifier's own key-down
/// already carries its flag, its key-up no longer does).
#[derive(Default)]
pub struct Document {
    listeners: RwLock<Listeners>,
    next_id: AtomicU64,
    held: Mutex<Modifiers>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a key-down to every listener.
    pub fn key_down(&self, event: &KeyEvent) {
        // Listeners may deregister themselves; never call them under the lock.
        let listeners: Vec<KeyListener> = self
            .listeners
            .read()
            .key_down
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    /// Deliver a key-up to every listener.
    pub fn key_up(&self, event: &KeyEvent) {
        let listeners: Vec<KeyListener> = self
            .listeners
            .read()
            .key_up
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    /// Deliver a window focus notification.
    pub fn focus(&self) {
        let listeners: Vec<FocusListener> = self
            .listeners
            .read()
            .focus
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    /// Press a key now.
    pub fn press(&self, key: &str) -> KeyEvent {
        self.press_at(key, Instant::now())
    }

    /// Press a key at the given instant.
    pub fn press_at(&self, key: &str, time: Instant) -> KeyEvent {
        let flag = Modifiers::for_key(&key::resolve(key));
        let modifiers = {
            let mut held = self.held.lock();
            held.insert(flag);
            *held
        };

        let event = KeyEvent::new(key).with_modifiers(modifiers).at(time);
        self.key_down(&event);
        event
    }

    /// Release a key.
    pub fn release(&self, key: &str) -> KeyEvent {
        let flag = Modifiers::for_key(&key::resolve(key));
        let modifiers = {
            let mut held = self.held.lock();
            held.remove(flag);
            *held
        };

        let event = KeyEvent::new(key).with_modifiers(modifiers);
        self.key_up(&event);
        event
    }

    /// Modifiers currently held on the simulated keyboard.
    #[cfg(test)]
    pub(crate) fn held_modifiers(&self) -> Modifiers {
        *self.held.lock()
    }

    /// Number of registered listeners of all kinds.
    pub fn listener_count(&self) -> usize {
        let listeners = self.listeners.read();
        listeners.key_down.len() + listeners.key_up.len() + listeners.focus.len()
    }

    fn allocate_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl EventSource for Document {
    fn on_key_down(&self, listener: KeyListener) -> ListenerId {
        let id = self.allocate_id();
        self.listeners.write().key_down.push((id, listener));
        id
    }

    fn on_key_up(&self, listener: KeyListener) -> ListenerId {
        let id = self.allocate_id();
        self.listeners.write().key_up.push((id, listener));
        id
    }

    fn on_focus(&self, listener: FocusListener) -> ListenerId {
        let id = self.allocate_id();
        self.listeners.write().focus.push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.key_down.len() + listeners.key_up.len() + listeners.focus.len();
        listeners.key_down.retain(|(existing, _)| *existing != id);
        listeners.key_up.retain(|(existing, _)| *existing != id);
        listeners.focus.retain(|(existing, _)| *existing != id);
        let after = listeners.key_down.len() + listeners.key_up.len() + listeners.focus.len();
        after < before
    }
}
