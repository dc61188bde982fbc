//! Linear lesson with retry rounds.
//!
//! Round one asks every card once. Each following round asks again only the
//! cards missed in the previous one, until a round ends without mistakes.

use super::{AnswerResult, Lesson, LessonLog, LessonResult, Question};
use crate::scheduler::LessonDeck;
use crate::stats::LibraryStats;
use crate::types::{Flashcard, Word};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// Progress of a [`SimpleLesson`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleLessonResult {
    /// Current round, starting at 1.
    pub round: u32,
    /// Whether this round only retries earlier mistakes.
    pub correcting_mistakes: bool,
    pub total: usize,
    /// Cards answered correctly in their latest attempt.
    pub correct: usize,
    /// Cards missed in this round, waiting for the next one.
    pub incorrect: usize,
    /// Cards still to be asked this round, the pending one included.
    pub remaining: usize,
}

pub struct SimpleLesson<R> {
    log: LessonLog,
    rng: R,
    remaining: VecDeque<usize>,
    incorrect: BTreeSet<usize>,
    round: u32,
    current: Option<usize>,
    step: usize,
    last_seen: Vec<Option<usize>>,
}

impl<R: Rng> SimpleLesson<R> {
    pub fn new(deck: LessonDeck, now: DateTime<Utc>, mut rng: R) -> Self {
        let log = LessonLog::new(deck, now);
        let mut order: Vec<usize> = (0..log.len()).collect();
        order.shuffle(&mut rng);
        let last_seen = vec![None; log.len()];
        Self {
            log,
            rng,
            remaining: order.into(),
            incorrect: BTreeSet::new(),
            round: 1,
            current: None,
            step: 0,
            last_seen,
        }
    }

    fn start_next_round(&mut self) {
        let missed: Vec<usize> = std::mem::take(&mut self.incorrect).into_iter().collect();
        self.round += 1;
        tracing::debug!(round = self.round, cards = missed.len(), "starting next round");
        self.remaining = self.reshuffle(missed).into();
    }

    /// Shuffle, then move cards seen too recently to the back so the same
    /// card is not asked twice in a row across rounds.
    fn reshuffle(&mut self, mut cards: Vec<usize>) -> Vec<usize> {
        cards.shuffle(&mut self.rng);
        let window = cards.len() / 3;
        let (recent, rest): (Vec<_>, Vec<_>) = cards
            .into_iter()
            .enumerate()
            .partition(|&(position, card)| self.steps_since_seen(card) + position < window);
        rest.into_iter()
            .chain(recent)
            .map(|(_, card)| card)
            .collect()
    }

    fn steps_since_seen(&self, card: usize) -> usize {
        match self.last_seen[card] {
            Some(step) => self.step - step,
            None => self.log.len(),
        }
    }
}

impl<R: Rng> Lesson for SimpleLesson<R> {
    fn name(&self) -> &str {
        self.log.name()
    }

    fn next_question(&mut self) -> Option<Question> {
        self.log.seal();
        if let Some(card) = self.current {
            return Some(self.log.question(card));
        }
        if self.remaining.is_empty() && !self.incorrect.is_empty() {
            self.start_next_round();
        }

        let card = *self.remaining.front()?;
        self.step += 1;
        self.last_seen[card] = Some(self.step);
        self.current = Some(card);
        Some(self.log.question(card))
    }

    fn answer(&mut self, answer: Option<&Word>) -> AnswerResult {
        let card = self
            .current
            .take()
            .expect("cannot answer without a pending question");
        self.remaining.pop_front();

        let result = self.log.record(card, answer);
        if !result.is_correct {
            self.incorrect.insert(card);
        } else if self.is_finished() {
            tracing::debug!(name = self.log.name(), rounds = self.round, "lesson finished");
        }
        result
    }

    fn update_answered_card(&mut self, card: Flashcard) -> AnswerResult {
        let (position, was_correct, result) = self.log.amend(card);
        match (was_correct, result.is_correct) {
            (true, false) => {
                self.incorrect.insert(position);
            }
            (false, true) => {
                self.incorrect.remove(&position);
            }
            _ => {}
        }
        result
    }

    fn result(&self) -> LessonResult {
        let total = self.log.len();
        let remaining = self.remaining.len();
        let incorrect = self.incorrect.len();
        LessonResult::Simple(SimpleLessonResult {
            round: self.round,
            correcting_mistakes: self.round > 1,
            total,
            correct: total - remaining - incorrect,
            incorrect,
            remaining,
        })
    }

    fn is_finished(&self) -> bool {
        self.remaining.is_empty() && self.incorrect.is_empty()
    }

    fn stats(&self) -> LibraryStats {
        self.log.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn lesson(size: usize, seed: u64) -> SimpleLesson<ChaCha8Rng> {
        SimpleLesson::new(deck(size), now(), ChaCha8Rng::seed_from_u64(seed))
    }

    fn progress(lesson: &SimpleLesson<ChaCha8Rng>) -> SimpleLessonResult {
        match lesson.result() {
            LessonResult::Simple(result) => result,
            other => panic!("unexpected result {other:?}"),
        }
    }

    fn expected(round: u32, total: usize, correct: usize, incorrect: usize, remaining: usize) -> SimpleLessonResult {
        SimpleLessonResult {
            round,
            correcting_mistakes: round > 1,
            total,
            correct,
            incorrect,
            remaining,
        }
    }

    #[test]
    fn lesson_without_mistakes() {
        let mut lesson = lesson(3, 1);
        assert_eq!(progress(&lesson), expected(1, 3, 0, 0, 3));

        for answered in 1..=3 {
            let question = lesson.next_question().unwrap();
            assert_eq!(progress(&lesson).remaining, 4 - answered);
            let result = lesson.answer(Some(&answer_to(&question)));
            assert!(result.is_correct);
            assert_eq!(result.question, question.word);
            assert_eq!(progress(&lesson), expected(1, 3, answered, 0, 3 - answered));
        }

        assert_eq!(lesson.next_question(), None);
        assert!(lesson.is_finished());
        assert_eq!(progress(&lesson), expected(1, 3, 3, 0, 0));
    }

    #[test]
    fn every_card_is_asked_once_in_first_round() {
        let mut lesson = lesson(5, 4);
        let mut asked = Vec::new();
        while let Some(question) = lesson.next_question() {
            lesson.answer(Some(&answer_to(&question)));
            asked.push(question.word.to_string());
        }
        asked.sort();
        assert_eq!(asked, vec!["q1", "q2", "q3", "q4", "q5"]);
    }

    #[test]
    fn missed_card_comes_back_next_round() {
        let mut lesson = lesson(3, 2);
        let first = lesson.next_question().unwrap();
        lesson.answer(Some(&answer_to(&first)));
        let second = lesson.next_question().unwrap();
        lesson.answer(Some(&answer_to(&second)));
        let third = lesson.next_question().unwrap();
        let missed = lesson.answer(Some(&wrong()));
        assert!(!missed.is_correct);
        assert_eq!(missed.correct_answer, answer_to(&third));
        assert_eq!(progress(&lesson), expected(1, 3, 2, 1, 0));
        assert!(!lesson.is_finished());

        assert!(!progress(&lesson).correcting_mistakes);

        let retry = lesson.next_question().unwrap();
        assert_eq!(retry, third);
        assert_eq!(progress(&lesson), expected(2, 3, 2, 0, 1));
        assert!(progress(&lesson).correcting_mistakes);

        lesson.answer(Some(&answer_to(&retry)));
        assert_eq!(lesson.next_question(), None);
        assert_eq!(progress(&lesson), expected(2, 3, 3, 0, 0));
    }

    #[test]
    fn giving_up_counts_as_mistake() {
        let mut lesson = lesson(1, 0);
        lesson.next_question().unwrap();
        let result = lesson.answer(None);
        assert!(!result.is_correct);
        assert_eq!(result.your_answer, None);
        assert_eq!(progress(&lesson).incorrect, 1);
    }

    #[test]
    fn asking_twice_returns_the_same_question() {
        let mut lesson = lesson(4, 9);
        let first = lesson.next_question();
        assert_eq!(lesson.next_question(), first);
        assert_eq!(progress(&lesson).remaining, 4);
    }

    #[test]
    fn empty_deck_is_finished_at_once() {
        let mut lesson = lesson(0, 0);
        assert!(lesson.is_finished());
        assert_eq!(lesson.next_question(), None);
        assert_eq!(progress(&lesson), expected(1, 0, 0, 0, 0));
        assert!(lesson.stats().is_empty());
    }

    #[test]
    #[should_panic(expected = "without a pending question")]
    fn answer_without_question_panics() {
        let mut lesson = lesson(2, 0);
        lesson.answer(Some(&wrong()));
    }

    #[test]
    #[should_panic(expected = "without a pending question")]
    fn answering_twice_panics() {
        let mut lesson = lesson(2, 0);
        let question = lesson.next_question().unwrap();
        lesson.answer(Some(&answer_to(&question)));
        lesson.answer(Some(&answer_to(&question)));
    }

    #[test]
    fn recent_card_is_not_repeated_first() {
        for seed in 0..20 {
            let mut lesson = lesson(15, seed);
            let mut last = None;
            for _ in 0..15 {
                let question = lesson.next_question().unwrap();
                lesson.answer(Some(&wrong()));
                last = Some(question);
            }
            let next_round = lesson.next_question().unwrap();
            assert_eq!(progress(&lesson).round, 2);
            assert_ne!(Some(next_round), last, "seed {seed}");
        }
    }

    #[test]
    fn stats_after_lesson_with_retries() {
        let mut lesson = lesson(2, 5);
        let first = lesson.next_question().unwrap();
        lesson.answer(Some(&wrong()));
        let second = lesson.next_question().unwrap();
        lesson.answer(Some(&answer_to(&second)));
        let retry = lesson.next_question().unwrap();
        lesson.answer(Some(&answer_to(&retry)));
        assert!(lesson.is_finished());

        let stats = lesson.stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats.get(&answer_to(&first)).map(|s| s.mistakes), Some(1));
        assert_eq!(stats.get(&answer_to(&second)).map(|s| s.mistakes), Some(0));
        assert!(stats.iter().all(|(_, s)| s.last_learned == now()));
    }

    #[test]
    fn corrected_card_leaves_the_retry_list() {
        let mut lesson = lesson(2, 3);
        let question = lesson.next_question().unwrap();
        let typed = Word::new("the dog");
        assert!(!lesson.answer(Some(&typed)).is_correct);
        assert_eq!(progress(&lesson).incorrect, 1);

        let fixed = lesson.update_answered_card(Flashcard::new(question.word.clone(), "the dog"));
        assert!(fixed.is_correct);
        assert_eq!(fixed.correct_answer, typed);
        assert_eq!(progress(&lesson), expected(1, 2, 1, 0, 1));

        let stats = lesson.stats();
        assert_eq!(stats.get(&typed).map(|s| s.mistakes), Some(0));
        assert_eq!(stats.get(&answer_to(&question)), None);
    }

    #[test]
    fn changed_answer_can_turn_a_hit_into_a_miss() {
        let mut lesson = lesson(1, 3);
        let question = lesson.next_question().unwrap();
        lesson.answer(Some(&answer_to(&question)));
        let changed = lesson.update_answered_card(Flashcard::new(question.word.clone(), "something else"));
        assert!(!changed.is_correct);
        assert!(!lesson.is_finished());

        assert_eq!(lesson.next_question().map(|q| q.word), Some(question.word));
        assert_eq!(progress(&lesson).round, 2);
    }

    #[test]
    #[should_panic(expected = "before it has been answered")]
    fn update_after_moving_on_panics() {
        let mut lesson = lesson(2, 3);
        let question = lesson.next_question().unwrap();
        lesson.answer(Some(&answer_to(&question)));
        lesson.next_question();
        lesson.update_answered_card(Flashcard::new("q", "a"));
    }
}
