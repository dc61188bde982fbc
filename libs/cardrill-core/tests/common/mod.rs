//! Shared fixtures for integration tests.

#![allow(dead_code)]

use cardrill_core::{Flashcard, FlashcardSet, Question, Word};
use chrono::{DateTime, TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

pub const ANIMALS: &str = "\u{FEFF}der Hund | the dog\n\
die Katze | the cat\n\
\n\
das Pferd | \"the horse\"\n";

pub const HOUSE: &str = "das Haus\nthe house\n\ndie Tür\nthe door\n";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 16, 10, 0, 0).unwrap()
}

pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Looks up the right answer for a question, like a user who knows the set.
pub struct AnswerKey(HashMap<Word, Word>);

impl AnswerKey {
    pub fn new(set: &FlashcardSet) -> Self {
        Self(
            set.cards
                .iter()
                .map(|card: &Flashcard| (card.front.clone(), card.back.clone()))
                .collect(),
        )
    }

    pub fn answer(&self, question: &Question) -> Word {
        self.0[&question.word].clone()
    }
}
