//! # Keychord
//!
//! Keyboard shortcut engine: single keys, modifier chords, multi-key chords
//! (`a+b+c`) and timed key sequences (`g i`, `cmd+k cmd+s`), grouped into
//! named scopes of which one is active at a time.
//!
//! ```ignore
//! let doc = Arc::new(Document::new());
//! let engine = ShortcutEngine::new(&doc);
//! engine.bind("cmd+k cmd+s", keychord::handler(|_| save()))?;
//! ```

pub mod binding;
pub mod chord;
pub mod config;
pub mod engine;
pub mod event;
pub mod key;
pub mod keymap;
pub mod sequence;
pub mod shortcut;
pub mod table;
pub mod tracker;

use std::sync::Arc;

use once_cell::sync::Lazy;

pub use binding::{handler, same_handler, BindOptions, Binding, BindingId, KeyHandler, DEFAULT_SCOPE};
pub use chord::{Chord, Modifiers};
pub use config::EngineConfig;
pub use engine::{default_filter, Filter, ShortcutEngine, Snapshot};
pub use event::{Document, EventSource, KeyEvent, ListenerId, Target};
pub use key::KeyId;
pub use keymap::{Keymap, KeymapEntry};
pub use sequence::SEQUENCE_TIMEOUT;
pub use shortcut::{ParseError, Shortcut};
pub use table::ConflictError;

/// Bind errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

static DOCUMENT: Lazy<Arc<Document>> = Lazy::new(|| Arc::new(Document::new()));

static GLOBAL: Lazy<ShortcutEngine> = Lazy::new(|| ShortcutEngine::new(&*DOCUMENT));

/// Process-wide in-memory event source.
pub fn document() -> &'static Arc<Document> {
    &DOCUMENT
}

/// Default engine, attached to [`document`].
pub fn global() -> &'static ShortcutEngine {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_instance() {
        assert!(Arc::ptr_eq(document(), document()));
        assert!(global().is_attached());

        let scope = "keychord-lib-test";
        global()
            .bind_in("ctrl+alt+f9", scope, handler(|_| {}))
            .unwrap();
        assert!(global().is_bound("ctrl+alt+f9", Some(scope)));
        assert_eq!(global().unbind_scope(scope), 1);
    }

    #[test]
    fn test_bind_error_display() {
        let err = BindError::from(ParseError::Empty);
        assert_eq!(err.to_string(), ParseError::Empty.to_string());
    }
}
