//! Leitner-style cram lesson.
//!
//! Cards start at level 1. A correct answer moves a card one level up, a
//! correct answer at level 5 masters it, and any mistake sends it back to
//! level 1. The lesson works through one level at a time: when the cards
//! of the current level have all been asked, it continues with the lowest
//! level that still holds cards.

use super::{AnswerResult, Lesson, LessonLog, LessonResult, Question};
use crate::scheduler::LessonDeck;
use crate::stats::LibraryStats;
use crate::types::{Flashcard, Word};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const LEVEL_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CramLevel {
    L1,
    L2,
    L3,
    L4,
    L5,
}

impl CramLevel {
    pub const ALL: [CramLevel; LEVEL_COUNT] = [Self::L1, Self::L2, Self::L3, Self::L4, Self::L5];

    /// 1 to 5.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// The level a correctly answered card moves to; `None` means mastered.
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    fn index(self) -> usize {
        match self {
            Self::L1 => 0,
            Self::L2 => 1,
            Self::L3 => 2,
            Self::L4 => 3,
            Self::L5 => 4,
        }
    }
}

impl From<CramLevel> for u8 {
    fn from(level: CramLevel) -> Self {
        level.number()
    }
}

impl TryFrom<u8> for CramLevel {
    type Error = String;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        number
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index as usize).copied())
            .ok_or_else(|| format!("cram level must be between 1 and {LEVEL_COUNT}, got {number}"))
    }
}

impl fmt::Display for CramLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.number())
    }
}

/// Progress of a [`CramLesson`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CramLessonResult {
    /// Level currently being worked through.
    pub level: CramLevel,
    /// Number of cards at each level, lowest first.
    pub counts: [usize; LEVEL_COUNT],
    pub mastered: usize,
}

impl CramLessonResult {
    pub fn count(&self, level: CramLevel) -> usize {
        self.counts[level.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum::<usize>() + self.mastered
    }
}

pub struct CramLesson<R> {
    log: LessonLog,
    rng: R,
    levels: [BTreeSet<usize>; LEVEL_COUNT],
    level: CramLevel,
    queue: Vec<usize>,
    position: usize,
    current: Option<usize>,
    /// Level the last answered card was at when it was asked.
    answered_at: Option<CramLevel>,
}

impl<R: Rng> CramLesson<R> {
    pub fn new(deck: LessonDeck, now: DateTime<Utc>, mut rng: R) -> Self {
        let log = LessonLog::new(deck, now);
        let mut queue: Vec<usize> = (0..log.len()).collect();
        queue.shuffle(&mut rng);
        let mut levels: [BTreeSet<usize>; LEVEL_COUNT] = Default::default();
        levels[CramLevel::L1.index()].extend(queue.iter().copied());
        Self {
            log,
            rng,
            levels,
            level: CramLevel::L1,
            queue,
            position: 0,
            current: None,
            answered_at: None,
        }
    }

    fn cards_at(&mut self, level: CramLevel) -> &mut BTreeSet<usize> {
        &mut self.levels[level.index()]
    }

    /// Continue with the lowest level holding cards. Leaves the queue empty
    /// when every card is mastered.
    fn enter_lowest_level(&mut self) {
        self.position = 0;
        self.queue.clear();
        let Some(level) = CramLevel::ALL
            .into_iter()
            .find(|level| !self.levels[level.index()].is_empty())
        else {
            tracing::debug!(name = self.log.name(), "all cards mastered");
            return;
        };

        self.level = level;
        self.queue.extend(self.levels[level.index()].iter().copied());
        self.queue.shuffle(&mut self.rng);
        tracing::debug!(%level, cards = self.queue.len(), "entering cram level");
    }

    fn move_card(&mut self, card: usize, from: Option<CramLevel>, to: Option<CramLevel>) {
        if let Some(from) = from {
            self.cards_at(from).remove(&card);
        }
        if let Some(to) = to {
            self.cards_at(to).insert(card);
        }
    }
}

/// Where a card answered at `level` ends up; `None` means mastered.
fn destination(level: CramLevel, is_correct: bool) -> Option<CramLevel> {
    if is_correct {
        level.next()
    } else {
        Some(CramLevel::L1)
    }
}

impl<R: Rng> Lesson for CramLesson<R> {
    fn name(&self) -> &str {
        self.log.name()
    }

    fn next_question(&mut self) -> Option<Question> {
        self.log.seal();
        self.answered_at = None;
        if let Some(card) = self.current {
            return Some(self.log.question(card));
        }
        if self.position >= self.queue.len() {
            self.enter_lowest_level();
        }

        let card = *self.queue.get(self.position)?;
        self.position += 1;
        self.current = Some(card);
        Some(self.log.question(card))
    }

    fn answer(&mut self, answer: Option<&Word>) -> AnswerResult {
        let card = self
            .current
            .take()
            .expect("cannot answer without a pending question");

        let result = self.log.record(card, answer);
        let level = self.level;
        self.move_card(card, Some(level), destination(level, result.is_correct));
        self.answered_at = Some(level);
        result
    }

    fn update_answered_card(&mut self, card: Flashcard) -> AnswerResult {
        let (position, was_correct, result) = self.log.amend(card);
        if was_correct != result.is_correct {
            if let Some(level) = self.answered_at {
                self.move_card(
                    position,
                    destination(level, was_correct),
                    destination(level, result.is_correct),
                );
            }
        }
        result
    }

    fn result(&self) -> LessonResult {
        let counts = std::array::from_fn(|index| self.levels[index].len());
        let mastered = self.log.len() - self.levels.iter().map(BTreeSet::len).sum::<usize>();
        LessonResult::Cram(CramLessonResult {
            level: self.level,
            counts,
            mastered,
        })
    }

    fn is_finished(&self) -> bool {
        self.levels.iter().all(BTreeSet::is_empty)
    }

    fn stats(&self) -> LibraryStats {
        self.log.stats()
    }
}
