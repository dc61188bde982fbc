//! Duplicate detection for the card editor and for lesson warnings.

use crate::types::Flashcard;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// Identity of a card being edited, independent of its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(Uuid);

impl CardId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A card as the editor sees it: raw text, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftCard {
    pub id: CardId,
    pub source: Option<String>,
    pub question: String,
    pub answer: String,
}

impl DraftCard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: CardId::new(),
            source: None,
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Same card with new text.
    pub fn with_text(&self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: self.id,
            source: self.source.clone(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A card sharing text with the one being looked up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duplicate {
    /// `None` for reference cards read from other sets.
    pub id: Option<CardId>,
    pub source: Option<String>,
    pub question: String,
    pub answer: String,
}

impl From<&DraftCard> for Duplicate {
    fn from(card: &DraftCard) -> Self {
        Self {
            id: Some(card.id),
            source: card.source.clone(),
            question: card.question.clone(),
            answer: card.answer.clone(),
        }
    }
}

impl From<&Flashcard> for Duplicate {
    fn from(card: &Flashcard) -> Self {
        Self {
            id: None,
            source: card.source.clone(),
            question: card.front.to_string(),
            answer: card.back.to_string(),
        }
    }
}

/// Reverse indices from question and answer text to the cards holding them.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    by_question: HashMap<String, HashSet<Duplicate>>,
    by_answer: HashMap<String, HashSet<Duplicate>>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a card. Blank text is not indexed.
    pub fn add_card(&mut self, card: &DraftCard) {
        self.insert(Duplicate::from(card));
    }

    /// Drop a card as it was last added. Unknown cards are ignored.
    pub fn remove_card(&mut self, card: &DraftCard) {
        self.remove(&Duplicate::from(card));
    }

    /// Replace the indexed text of a card in one step.
    pub fn update_card(&mut self, old: &DraftCard, new: &DraftCard) {
        self.remove_card(old);
        self.add_card(new);
    }

    /// Other cards with exactly the same question text.
    pub fn question_duplicates_of(&self, card: &DraftCard) -> Vec<Duplicate> {
        Self::others(self.by_question.get(&card.question), card)
    }

    /// Other cards with exactly the same answer text.
    pub fn answer_duplicates_of(&self, card: &DraftCard) -> Vec<Duplicate> {
        Self::others(self.by_answer.get(&card.answer), card)
    }

    /// Swap the cards of the surrounding library area.
    ///
    /// Previously loaded reference cards are dropped; cards from
    /// `exclude_source` (the file being edited) are skipped since the editor
    /// indexes its own drafts.
    pub fn set_reference_cards<'a>(
        &mut self,
        cards: impl IntoIterator<Item = &'a Flashcard>,
        exclude_source: Option<&str>,
    ) {
        for entries in self.by_question.values_mut().chain(self.by_answer.values_mut()) {
            entries.retain(|entry| entry.id.is_some());
        }
        self.by_question.retain(|_, entries| !entries.is_empty());
        self.by_answer.retain(|_, entries| !entries.is_empty());

        let mut added = 0usize;
        for card in cards {
            if exclude_source.is_some() && card.source.as_deref() == exclude_source {
                continue;
            }
            self.insert(Duplicate::from(card));
            added += 1;
        }
        tracing::debug!(added, "reference cards indexed");
    }

    fn insert(&mut self, entry: Duplicate) {
        if !entry.question.trim().is_empty() {
            self.by_question
                .entry(entry.question.clone())
                .or_default()
                .insert(entry.clone());
        }
        if !entry.answer.trim().is_empty() {
            self.by_answer
                .entry(entry.answer.clone())
                .or_default()
                .insert(entry);
        }
    }

    fn remove(&mut self, entry: &Duplicate) {
        remove_entry(&mut self.by_question, &entry.question, entry);
        remove_entry(&mut self.by_answer, &entry.answer, entry);
    }

    fn others(entries: Option<&HashSet<Duplicate>>, card: &DraftCard) -> Vec<Duplicate> {
        entries
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.id != Some(card.id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn remove_entry(index: &mut HashMap<String, HashSet<Duplicate>>, key: &str, entry: &Duplicate) {
    if let Some(entries) = index.get_mut(key) {
        entries.remove(entry);
        if entries.is_empty() {
            index.remove(key);
        }
    }
}

/// Cards whose question or answer occurs more than once in `cards`, in input order.
pub fn find_duplicates(cards: &[Flashcard]) -> Vec<&Flashcard> {
    let mut fronts: HashMap<&str, usize> = HashMap::new();
    let mut backs: HashMap<&str, usize> = HashMap::new();
    for card in cards {
        *fronts.entry(card.front.as_str()).or_default() += 1;
        *backs.entry(card.back.as_str()).or_default() += 1;
    }
    cards
        .iter()
        .filter(|card| fronts[card.front.as_str()] > 1 || backs[card.back.as_str()] > 1)
        .collect()
}

/// Human-readable lines for [`find_duplicates`], empty when there are none.
pub fn duplicate_warnings(cards: &[Flashcard]) -> Vec<String> {
    let duplicates = find_duplicates(cards);
    if duplicates.is_empty() {
        return Vec::new();
    }
    std::iter::once("The following duplicate words were detected".to_string())
        .chain(duplicates.into_iter().map(|card| {
            format!(
                "{}:{}:{}",
                card.source.as_deref().unwrap_or(""),
                card.front,
                card.back
            )
        }))
        .collect()
}
