//! Word selection for the next lesson.
//!
//! Every card gets an estimated due time: the last time its answer was
//! learned plus the interval before that, stretched or shrunk by how many
//! mistakes were made last time. Cards are ranked by that time and the
//! earliest ones make up the lesson, so the most "forgotten" words come first.
//!
//! Words learned more recently than their bucket's minimum interval rank
//! after all others. They are still taken when the pool is too small.

use crate::settings::{interval_fallback, last_learned_fallback, LessonSettings};
use crate::stats::{LibraryStats, WordStats};
use crate::types::{Flashcard, FlashcardSet};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cards chosen for one lesson, with the stats they were chosen by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDeck {
    pub name: String,
    pub cards: Vec<Flashcard>,
    pub stats: LibraryStats,
}

impl LessonDeck {
    /// A deck holding the whole set, in file order.
    pub fn all(set: &FlashcardSet, stats: &LibraryStats) -> Self {
        Self {
            name: set.name.clone(),
            cards: set.cards.clone(),
            stats: stats.filter(&set.cards),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// When a word with the given history should ideally be learned again.
///
/// Words never learned are treated as learned a year ago with a one day interval.
pub fn estimated_next_due(
    stats: Option<&WordStats>,
    settings: &LessonSettings,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let (last_learned, interval, mistakes) = history(stats, now);
    advance(last_learned, scale(interval, settings.multiplier_for(mistakes)))
}

/// Whether a word was learned too recently to be asked again before others.
pub fn is_very_recent(
    stats: Option<&WordStats>,
    settings: &LessonSettings,
    now: DateTime<Utc>,
) -> bool {
    let (last_learned, _, mistakes) = history(stats, now);
    now.signed_duration_since(last_learned) < settings.min_interval_for(mistakes)
}

/// Pick and order the cards for the next lesson.
///
/// The pool is shuffled before a stable sort by due time so that equally due
/// words come out in random order. Very recent words sort last. At most `max_words_per_lesson` cards are
/// taken, earliest due first.
pub fn select_lesson_cards<R: Rng + ?Sized>(
    set: &FlashcardSet,
    stats: &LibraryStats,
    settings: &LessonSettings,
    now: DateTime<Utc>,
    rng: &mut R,
) -> LessonDeck {
    let mut ranked: Vec<((bool, DateTime<Utc>), &Flashcard)> = set
        .cards
        .iter()
        .map(|card| {
            let word_stats = stats.get(card.answer());
            let (last_learned, interval, mistakes) = history(word_stats, now);
            let mut factor = settings.multiplier_for(mistakes);
            if settings.randomness > 0.0 {
                factor *= 1.0 + settings.randomness * rng.gen_range(-1.0..1.0);
            }
            let due = advance(last_learned, scale(interval, factor));
            ((is_very_recent(word_stats, settings, now), due), card)
        })
        .collect();

    ranked.shuffle(rng);
    ranked.sort_by_key(|(key, _)| *key);

    let cards: Vec<Flashcard> = ranked
        .into_iter()
        .take(settings.max_words_per_lesson)
        .map(|(_, card)| card.clone())
        .collect();

    tracing::debug!(
        name = %set.name,
        pool = set.len(),
        selected = cards.len(),
        "lesson cards selected"
    );

    LessonDeck {
        name: set.name.clone(),
        stats: stats.filter(&cards),
        cards,
    }
}

fn history(stats: Option<&WordStats>, now: DateTime<Utc>) -> (DateTime<Utc>, Duration, u32) {
    match stats {
        Some(stats) => (
            stats.last_learned,
            stats.interval_before_last_learned,
            stats.mistakes,
        ),
        None => (now - last_learned_fallback(), interval_fallback(), 0),
    }
}

/// Saturates at the bounds of `Duration`.
fn scale(interval: Duration, factor: f64) -> Duration {
    let millis = (interval.num_milliseconds() as f64 * factor).round();
    if millis >= 0.0 {
        Duration::try_milliseconds(millis as i64).unwrap_or(Duration::MAX)
    } else {
        Duration::try_milliseconds(millis as i64).unwrap_or(Duration::MIN)
    }
}

/// Saturates at the bounds of `DateTime<Utc>`.
fn advance(from: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    from.checked_add_signed(by).unwrap_or(if by < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
