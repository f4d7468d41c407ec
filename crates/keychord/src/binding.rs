//! Registered bindings

use std::fmt;
use std::sync::Arc;

use crate::event::KeyEvent;
use crate::shortcut::Shortcut;

/// Scope every binding lands in unless told otherwise.
pub const DEFAULT_SCOPE: &str = "all";

/// Handler invoked with the event that fired the binding.
///
/// Identity is the `Arc` allocation: keep a clone around to unbind later.
pub type KeyHandler = Arc<dyn Fn(&KeyEvent) + Send + Sync>;

/// Wrap a closure as a [`KeyHandler`].
pub fn handler<F>(f: F) -> KeyHandler
where
    F: Fn(&KeyEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Same handler, by allocation.
pub fn same_handler(a: &KeyHandler, b: &KeyHandler) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Unique id of a binding inside one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub(crate) u64);

/// Options for [`ShortcutEngine::bind_with`](crate::ShortcutEngine::bind_with).
#[derive(Debug, Clone, Default)]
pub struct BindOptions {
    /// Scope to bind in; `None` means [`DEFAULT_SCOPE`].
    pub scope: Option<String>,
    /// When matched, suppress every other matching handler.
    pub exclusive: bool,
}

impl BindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    pub(crate) fn scope_or_default(&self) -> &str {
        self.scope.as_deref().unwrap_or(DEFAULT_SCOPE)
    }
}

/// A shortcut bound to a handler within a scope.
#[derive(Clone)]
pub struct Binding {
    pub(crate) id: BindingId,
    pub scope: String,
    pub handler: KeyHandler,
    pub shortcut: Shortcut,
    pub exclusive: bool,
    /// Shortcut string as passed to `bind`.
    pub spec: String,
}

impl Binding {
    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn is_sequence(&self) -> bool {
        self.shortcut.is_sequence()
    }

    /// Same scope and same shortcut (leading chord and every tail chord).
    pub fn matches_shape(&self, scope: &str, shortcut: &Shortcut) -> bool {
        self.scope == scope && self.shortcut == *shortcut
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .field("shortcut", &self.shortcut.to_string())
            .field("exclusive", &self.exclusive)
            .field("spec", &self.spec)
            .finish()
    }
}
