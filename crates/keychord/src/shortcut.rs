//! Shortcut strings
//!
//! A shortcut is one chord (`cmd+shift+z`) or a sequence of chords separated
//! by whitespace (`g i`, `cmd+k cmd+s`). The first chord's trigger key is
//! the key the binding table files the shortcut under.

use std::fmt;
use std::str::FromStr;

use crate::chord::Chord;
use crate::key::KeyId;

/// Shortcut string could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Empty shortcut")]
    Empty,
    #[error("Chord has no non-modifier key: {0}")]
    MissingKey(String),
    #[error("Chord contains an empty key: {0}")]
    EmptyKey(String),
}

/// A parsed shortcut: leading chord plus the chords that must follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    first: Chord,
    tail: Vec<Chord>,
}

impl Shortcut {
    pub fn parse(spec: &str) -> Result<Self, ParseError> {
        let mut chords = spec.split_whitespace();
        let first = chords.next().ok_or(ParseError::Empty)?;

        Ok(Self {
            first: Chord::parse(first)?,
            tail: chords.map(Chord::parse).collect::<Result<_, _>>()?,
        })
    }

    /// Table key: the trigger of the leading chord.
    pub fn key(&self) -> &KeyId {
        self.first.trigger()
    }

    pub fn first(&self) -> &Chord {
        &self.first
    }

    /// Chords after the first, in order. Empty for a standalone shortcut.
    pub fn tail(&self) -> &[Chord] {
        &self.tail
    }

    pub fn is_sequence(&self) -> bool {
        !self.tail.is_empty()
    }

    /// Total number of chords.
    pub fn chord_count(&self) -> usize {
        1 + self.tail.len()
    }

    /// Chord at `index` counting the leading chord as 0.
    pub fn chord(&self, index: usize) -> Option<&Chord> {
        match index {
            0 => Some(&self.first),
            n => self.tail.get(n - 1),
        }
    }
}

impl FromStr for Shortcut {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for chord in &self.tail {
            write!(f, " {}", chord)?;
        }
        Ok(())
    }
}
