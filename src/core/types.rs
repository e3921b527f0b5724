// src/core/types.rs
use crate::core::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Index of a word inside a [`crate::core::dictionary::DictionaryIndex`].
pub type WordId = usize;

/// One on-screen key. Built once at layout load and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    /// Committed character or action name, e.g. `"a"` or `"backspace"`.
    pub id: String,
    pub label: String,
    pub bounds: Rect,
    pub center: Point,
    /// Non-letter key (shift, enter, ...).
    pub is_special: bool,
}

impl Key {
    pub fn new(id: impl Into<String>, label: impl Into<String>, bounds: Rect, is_special: bool) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            center: bounds.center(),
            bounds,
            is_special,
        }
    }

    /// True for single ASCII letter keys.
    pub fn is_alpha(&self) -> bool {
        self.letter().is_some()
    }

    /// The lowercase letter this key types, if it is a letter key.
    pub fn letter(&self) -> Option<char> {
        let mut chars = self.id.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    }
}

/// A dictionary entry. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryWord {
    /// Lowercase ASCII letters only.
    pub word: String,
    /// Lower = more common.
    pub frequency_rank: u32,
    pub first_char: char,
    pub last_char: char,
    pub length: usize,
}

impl DictionaryWord {
    /// Builds an entry from an already validated lowercase word.
    pub(crate) fn new(word: String, frequency_rank: u32) -> Self {
        let bytes = word.as_bytes();
        let first_char = bytes[0] as char;
        let last_char = bytes[bytes.len() - 1] as char;
        let length = bytes.len();
        Self { word, frequency_rank, first_char, last_char, length }
    }
}

/// One smoothed sample of an active gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// Window-space position (for rendering the trail).
    pub window: Point,
    /// Layout-space position (for key mapping).
    pub layout: Point,
    /// Milliseconds, caller's clock.
    pub timestamp: u64,
}
