//! Chord types

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::key::{self, KeyId};
use crate::shortcut::ParseError;

bitflags::bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

impl Modifiers {
    /// Build from the four flags a keyboard event reports.
    pub fn from_flags(shift: bool, alt: bool, ctrl: bool, meta: bool) -> Self {
        let mut modifiers = Self::empty();
        modifiers.set(Self::SHIFT, shift);
        modifiers.set(Self::ALT, alt);
        modifiers.set(Self::CTRL, ctrl);
        modifiers.set(Self::META, meta);
        modifiers
    }

    /// The flag a modifier key sets, or empty for any other key.
    pub fn for_key(key: &KeyId) -> Self {
        match key.as_str() {
            key::SHIFT => Self::SHIFT,
            key::ALT => Self::ALT,
            key::CONTROL => Self::CTRL,
            key::META => Self::META,
            _ => Self::empty(),
        }
    }

    /// Shortcut tokens in display order.
    pub fn tokens(self) -> impl Iterator<Item = &'static str> {
        [
            (Self::CTRL, "ctrl"),
            (Self::ALT, "alt"),
            (Self::SHIFT, "shift"),
            (Self::META, "cmd"),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, token)| token)
    }
}

/// One set of keys held together, e.g. `ctrl+shift+p` or `a+b+c`.
///
/// Equality compares the modifier mask, the key *set* and the trigger key
/// (the last one written). The order of the other keys does not matter.
#[derive(Debug, Clone)]
pub struct Chord {
    modifiers: Modifiers,
    keys: SmallVec<[KeyId; 2]>,
    trigger: KeyId,
}

impl Chord {
    /// Parse one `+`-joined chord token.
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        let mut modifiers = Modifiers::empty();
        let mut keys: SmallVec<[KeyId; 2]> = SmallVec::new();

        for part in token.split('+') {
            if part.is_empty() {
                return Err(ParseError::EmptyKey(token.to_string()));
            }

            let key = key::resolve(part);
            let flag = Modifiers::for_key(&key);
            if !flag.is_empty() {
                modifiers |= flag;
                continue;
            }

            // A repeated key moves to the end so the trigger stays last.
            if let Some(pos) = keys.iter().position(|k| *k == key) {
                keys.remove(pos);
            }
            keys.push(key);
        }

        let trigger = keys
            .last()
            .cloned()
            .ok_or_else(|| ParseError::MissingKey(token.to_string()))?;

        Ok(Self { modifiers, keys, trigger })
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Non-modifier keys, in written order.
    pub fn keys(&self) -> &[KeyId] {
        &self.keys
    }

    /// The key whose press completes this chord.
    pub fn trigger(&self) -> &KeyId {
        &self.trigger
    }

    /// Exact match: the event key is the trigger, the modifier mask is equal
    /// (extra modifiers do not match) and the held keys are exactly this set.
    pub fn matches(&self, key: &KeyId, modifiers: Modifiers, down: &HashSet<KeyId>) -> bool {
        self.trigger == *key
            && self.modifiers == modifiers
            && self.keys.len() == down.len()
            && self.keys.iter().all(|k| down.contains(k))
    }
}

/// Same modifiers, same key set and same trigger: two chords are equal
/// exactly when they fire on the same physical key presses.
impl PartialEq for Chord {
    fn eq(&self, other: &Self) -> bool {
        self.modifiers == other.modifiers
            && self.trigger == other.trigger
            && self.keys.len() == other.keys.len()
            && self.keys.iter().all(|k| other.keys.contains(k))
    }
}

impl Eq for Chord {}

impl FromStr for Chord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim())
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = self.modifiers.tokens().collect();
        parts.extend(self.keys.iter().map(KeyId::token));

        write!(f, "{}", parts.join("+"))
    }
}
