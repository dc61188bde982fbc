//! Per-word learning history.

use crate::error::CodecError;
use crate::types::{Flashcard, Word};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What is known about one answer word from its latest lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordStats {
    pub last_learned: DateTime<Utc>,
    #[serde(with = "duration_days")]
    pub interval_before_last_learned: Duration,
    /// Mistakes made in the last lesson that included the word.
    pub mistakes: u32,
}

/// Stats for the whole library, keyed by answer word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibraryStats {
    words: HashMap<Word, WordStats>,
}

impl LibraryStats {
    pub fn new(words: HashMap<Word, WordStats>) -> Self {
        Self { words }
    }

    pub fn get(&self, word: &Word) -> Option<&WordStats> {
        self.words.get(word)
    }

    pub fn insert(&mut self, word: Word, stats: WordStats) -> Option<WordStats> {
        self.words.insert(word, stats)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Word, &WordStats)> {
        self.words.iter()
    }

    /// Keep only the entries for the given cards' answers.
    pub fn filter<'a>(&self, cards: impl IntoIterator<Item = &'a Flashcard>) -> Self {
        let words = cards
            .into_iter()
            .filter_map(|card| {
                self.words
                    .get(card.answer())
                    .map(|stats| (card.answer().clone(), stats.clone()))
            })
            .collect();
        Self { words }
    }

    /// Merge a lesson's delta into this snapshot; delta entries win.
    pub fn update(&self, delta: &LibraryStats) -> Self {
        let mut words = self.words.clone();
        words.extend(
            delta
                .words
                .iter()
                .map(|(word, stats)| (word.clone(), stats.clone())),
        );
        Self { words }
    }

    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        serde_json::from_str(json).map_err(CodecError::Stats)
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        serde_json::to_string_pretty(self).map_err(CodecError::Stats)
    }
}

impl FromIterator<(Word, WordStats)> for LibraryStats {
    fn from_iter<T: IntoIterator<Item = (Word, WordStats)>>(iter: T) -> Self {
        Self {
            words: iter.into_iter().collect(),
        }
    }
}

/// Durations stored as fractional days.
pub(crate) mod duration_days {
    use chrono::Duration;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    const MILLIS_PER_DAY: f64 = 86_400_000.0;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.num_milliseconds() as f64 / MILLIS_PER_DAY)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let days = f64::deserialize(deserializer)?;
        let millis = (days * MILLIS_PER_DAY).round();
        // `as` saturates, so anything beyond i64 must be caught before the cast
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return Err(D::Error::custom(format!("interval of {days} days is out of range")));
        }
        Duration::try_milliseconds(millis as i64)
            .ok_or_else(|| D::Error::custom(format!("interval of {days} days is out of range")))
    }
}
