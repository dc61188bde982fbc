//! Lesson state machines.
//!
//! A lesson walks the user through a [`LessonDeck`] until every card is
//! known. Two variants share the question/answer protocol of [`Lesson`]:
//! - [`SimpleLesson`] asks every card, then retries the mistakes round by round.
//! - [`CramLesson`] moves cards through five Leitner levels; any mistake sends
//!   a card back to level one.
//!
//! Both record how many mistakes were made per answer word so the caller can
//! merge the outcome into the library stats afterwards.

pub mod cram;
pub mod simple;

pub use cram::{CramLesson, CramLessonResult, CramLevel};
pub use simple::{SimpleLesson, SimpleLessonResult};

use crate::matching::answers_match;
use crate::scheduler::LessonDeck;
use crate::settings::interval_fallback;
use crate::stats::{LibraryStats, WordStats};
use crate::types::{Flashcard, Word};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A question shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub word: Word,
}

/// Outcome of answering a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub question: Word,
    /// `None` when the user gave up.
    pub your_answer: Option<Word>,
    pub correct_answer: Word,
    pub is_correct: bool,
}

/// Progress snapshot of either lesson variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LessonResult {
    Simple(SimpleLessonResult),
    Cram(CramLessonResult),
}

/// The protocol shared by both lesson variants.
///
/// Calls must be made in order from one thread; a lesson is not meant to be
/// shared. Calling [`Lesson::answer`] without a pending question, or
/// [`Lesson::update_answered_card`] without a fresh answer, is a bug in the
/// caller and panics.
pub trait Lesson {
    /// Name of the deck this lesson runs on.
    fn name(&self) -> &str;

    /// The question to answer next, or `None` once the lesson is over.
    ///
    /// Asking again before answering returns the same question.
    fn next_question(&mut self) -> Option<Question>;

    /// Answer the pending question. `None` means "I don't know".
    fn answer(&mut self, answer: Option<&Word>) -> AnswerResult;

    /// Replace the text of the card that was just answered, e.g. to fix a
    /// typo in the set, and re-evaluate the answer against it.
    fn update_answered_card(&mut self, card: Flashcard) -> AnswerResult;

    /// Current progress.
    fn result(&self) -> LessonResult;

    /// Whether the lesson has reached its terminal state.
    fn is_finished(&self) -> bool;

    /// Updated stats for every word answered so far, to be merged into the library.
    fn stats(&self) -> LibraryStats;
}

/// Which lesson variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonKind {
    #[default]
    Simple,
    Cram,
}

impl LessonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Cram => "cram",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "simple" => Some(Self::Simple),
            "cram" => Some(Self::Cram),
            _ => None,
        }
    }
}

/// Start a lesson of the given kind.
pub fn start_lesson<R: Rng + 'static>(
    kind: LessonKind,
    deck: LessonDeck,
    now: DateTime<Utc>,
    rng: R,
) -> Box<dyn Lesson> {
    tracing::debug!(kind = kind.as_str(), name = %deck.name, cards = deck.len(), "starting lesson");
    match kind {
        LessonKind::Simple => Box::new(SimpleLesson::new(deck, now, rng)),
        LessonKind::Cram => Box::new(CramLesson::new(deck, now, rng)),
    }
}

#[derive(Debug, Clone)]
struct LastAnswer {
    card: usize,
    your_answer: Option<Word>,
    is_correct: bool,
}

/// Answer bookkeeping shared by both variants. Cards are referred to by
/// their position in the deck.
#[derive(Debug, Clone)]
pub(crate) struct LessonLog {
    name: String,
    cards: Vec<Flashcard>,
    previous: Vec<Option<WordStats>>,
    started_at: DateTime<Utc>,
    mistakes: Vec<Option<u32>>,
    last_answer: Option<LastAnswer>,
}

impl LessonLog {
    pub(crate) fn new(deck: LessonDeck, started_at: DateTime<Utc>) -> Self {
        let previous = deck
            .cards
            .iter()
            .map(|card| deck.stats.get(card.answer()).cloned())
            .collect();
        let mistakes = vec![None; deck.cards.len()];
        Self {
            name: deck.name,
            cards: deck.cards,
            previous,
            started_at,
            mistakes,
            last_answer: None,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn len(&self) -> usize {
        self.cards.len()
    }

    pub(crate) fn question(&self, card: usize) -> Question {
        let flashcard = &self.cards[card];
        Question {
            source: flashcard.source.clone(),
            word: flashcard.front.clone(),
        }
    }

    /// Evaluate an answer to `card` and count a mistake if it is wrong.
    pub(crate) fn record(&mut self, card: usize, answer: Option<&Word>) -> AnswerResult {
        let is_correct = answers_match(answer, self.cards[card].answer());
        let mistakes = self.mistakes[card].get_or_insert(0);
        if !is_correct {
            *mistakes += 1;
        }
        tracing::trace!(card, is_correct, "answer recorded");
        self.last_answer = Some(LastAnswer {
            card,
            your_answer: answer.cloned(),
            is_correct,
        });
        self.result_for(card, answer.cloned(), is_correct)
    }

    /// Swap in new text for the card answered last and re-evaluate.
    ///
    /// Returns the card's position, whether the answer counted as correct
    /// before, and the new outcome.
    pub(crate) fn amend(&mut self, card: Flashcard) -> (usize, bool, AnswerResult) {
        let LastAnswer {
            card: position,
            your_answer,
            is_correct: was_correct,
        } = self
            .last_answer
            .clone()
            .expect("cannot update a card before it has been answered");

        let source = card.source.or_else(|| self.cards[position].source.clone());
        self.cards[position] = Flashcard { source, ..card };

        let is_correct = answers_match(your_answer.as_ref(), self.cards[position].answer());
        if let Some(mistakes) = self.mistakes[position].as_mut() {
            match (was_correct, is_correct) {
                (true, false) => *mistakes += 1,
                (false, true) => *mistakes = mistakes.saturating_sub(1),
                _ => {}
            }
        }
        self.last_answer = Some(LastAnswer {
            card: position,
            your_answer: your_answer.clone(),
            is_correct,
        });
        (
            position,
            was_correct,
            self.result_for(position, your_answer, is_correct),
        )
    }

    /// Forget the last answer; it can no longer be amended.
    pub(crate) fn seal(&mut self) {
        self.last_answer = None;
    }

    pub(crate) fn stats(&self) -> LibraryStats {
        let mut words: HashMap<Word, WordStats> = HashMap::new();
        for (position, mistakes) in self.mistakes.iter().enumerate() {
            let Some(mistakes) = mistakes else {
                continue;
            };
            let interval = self.previous[position]
                .as_ref()
                .map(|previous| (self.started_at - previous.last_learned).max(Duration::zero()))
                .unwrap_or_else(interval_fallback);
            words
                .entry(self.cards[position].answer().clone())
                .or_insert(WordStats {
                    last_learned: self.started_at,
                    interval_before_last_learned: interval,
                    mistakes: 0,
                })
                .mistakes += mistakes;
        }
        LibraryStats::new(words)
    }

    fn result_for(&self, card: usize, your_answer: Option<Word>, is_correct: bool) -> AnswerResult {
        let flashcard = &self.cards[card];
        AnswerResult {
            source: flashcard.source.clone(),
            question: flashcard.front.clone(),
            your_answer,
            correct_answer: flashcard.back.clone(),
            is_correct,
        }
    }
}
