//! Canonical key identifiers
//!
//! Every key name that enters the engine, whether it comes from a live
//! keyboard event (`"ArrowLeft"`, `"MetaRight"`, `"Z"`) or from an authored
//! shortcut token (`"left"`, `"cmd"`, `"z"`), is folded through [`resolve`]
//! into one lowercase identifier. Both paths share this table so that the
//! authored and live spellings of a key always meet.

use std::borrow::Borrow;
use std::fmt;

use smol_str::SmolStr;

pub const SHIFT: &str = "shift";
pub const ALT: &str = "alt";
pub const CONTROL: &str = "control";
pub const META: &str = "meta";
pub const CAPS_LOCK: &str = "capslock";
pub const SPACE: &str = " ";
pub const PLUS: &str = "+";

/// A normalized name for one physical key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(SmolStr);

impl KeyId {
    pub fn resolve(raw: &str) -> Self {
        resolve(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shift, Alt, Control or Meta.
    pub fn is_modifier(&self) -> bool {
        matches!(self.as_str(), SHIFT | ALT | CONTROL | META)
    }

    pub fn is_meta(&self) -> bool {
        self.as_str() == META
    }

    /// Token that reparses to this key inside a shortcut string.
    pub fn token(&self) -> &str {
        match self.as_str() {
            SPACE => "space",
            PLUS => "plus",
            other => other,
        }
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl Borrow<str> for KeyId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for KeyId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for KeyId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Normalize a raw key name or shortcut token.
///
/// Unknown names pass through lowercased.
pub fn resolve(raw: &str) -> KeyId {
    let folded = raw.to_lowercase();
    let canonical = match folded.as_str() {
        // Modifiers
        "shift" | "⇧" => SHIFT,
        "alt" | "option" | "⌥" => ALT,
        "ctrl" | "control" | "⌃" => CONTROL,
        "meta" | "metaleft" | "metaright" | "os" | "contextmenu" | "cmd" | "command" | "⌘" => META,
        "capslock" => CAPS_LOCK,

        // Editing and whitespace
        "backspace" => "backspace",
        "tab" => "tab",
        "clear" => "clear",
        "enter" | "return" => "enter",
        "esc" | "escape" => "escape",
        "space" | "spacebar" | " " => SPACE,
        "del" | "delete" => "delete",
        "ins" | "insert" => "insert",

        // Navigation
        "left" | "arrowleft" => "arrowleft",
        "up" | "arrowup" => "arrowup",
        "right" | "arrowright" => "arrowright",
        "down" | "arrowdown" => "arrowdown",
        "home" => "home",
        "end" => "end",
        "pageup" => "pageup",
        "pagedown" => "pagedown",

        // Punctuation by name
        "comma" => ",",
        "period" => ".",
        "minus" => "-",
        "equal" => "=",
        "plus" => PLUS,
        "slash" => "/",
        "backslash" => "\\",
        "semicolon" => ";",
        "quote" => "'",
        "backquote" => "`",
        "bracketleft" => "[",
        "bracketright" => "]",

        _ => return KeyId(SmolStr::new(folded)),
    };
    KeyId(SmolStr::new(canonical))
}
