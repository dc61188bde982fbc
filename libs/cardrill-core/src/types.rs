//! Core types for flashcard lessons.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A trimmed piece of text on one side of a flashcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word(String);

impl Word {
    /// Create a word, trimming surrounding whitespace.
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the word holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Word {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Word {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A question/answer pair.
///
/// Equality and hashing only look at the two words; `source` is display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: Word,
    pub back: Word,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Flashcard {
    pub fn new(front: impl Into<Word>, back: impl Into<Word>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            source: None,
        }
    }

    /// Tag the card with the set it was read from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The question side.
    pub fn question(&self) -> &Word {
        &self.front
    }

    /// The answer side, also the key for word statistics.
    pub fn answer(&self) -> &Word {
        &self.back
    }
}

impl PartialEq for Flashcard {
    fn eq(&self, other: &Self) -> bool {
        self.front == other.front && self.back == other.back
    }
}

impl Eq for Flashcard {}

impl Hash for Flashcard {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.front.hash(state);
        self.back.hash(state);
    }
}

/// A named, ordered list of flashcards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardSet {
    pub name: String,
    pub cards: Vec<Flashcard>,
}

impl FlashcardSet {
    pub fn new(name: impl Into<String>, cards: Vec<Flashcard>) -> Self {
        Self {
            name: name.into(),
            cards,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Concatenate several sets (e.g. every file of a directory) under one name.
    pub fn merge(name: impl Into<String>, sets: impl IntoIterator<Item = FlashcardSet>) -> Self {
        Self {
            name: name.into(),
            cards: sets.into_iter().flat_map(|set| set.cards).collect(),
        }
    }
}
