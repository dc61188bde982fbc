//! Lesson configuration.

use crate::error::CodecError;
use crate::stats::duration_days;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// How long ago a never-learned word is assumed to have been learned.
pub const LAST_LEARNED_FALLBACK_DAYS: i64 = 365;

/// Interval assumed for a word with no history.
pub const INTERVAL_FALLBACK_DAYS: i64 = 1;

pub fn last_learned_fallback() -> Duration {
    Duration::days(LAST_LEARNED_FALLBACK_DAYS)
}

pub fn interval_fallback() -> Duration {
    Duration::days(INTERVAL_FALLBACK_DAYS)
}

const MAX_WORDS_RANGE: RangeInclusive<usize> = 3..=100;
const NO_MISTAKES_RANGE: RangeInclusive<f64> = 1.0..=100.0;
const ONE_MISTAKE_RANGE: RangeInclusive<f64> = 0.1..=10.0;
const MANY_MISTAKES_RANGE: RangeInclusive<f64> = 0.01..=1.0;
const RANDOMNESS_RANGE: RangeInclusive<f64> = 0.0..=0.99;

/// Settings for word selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonSettings {
    pub max_words_per_lesson: usize,
    pub interval_multiplier_no_mistakes: f64,
    pub interval_multiplier_one_mistake: f64,
    pub interval_multiplier_many_mistakes: f64,
    /// A word learned more recently than this (by mistake bucket) is ranked
    /// after every other word, whatever its due time.
    #[serde(with = "duration_days")]
    pub min_interval_no_mistakes: Duration,
    #[serde(with = "duration_days")]
    pub min_interval_one_mistake: Duration,
    #[serde(with = "duration_days")]
    pub min_interval_many_mistakes: Duration,
    /// Relative jitter applied to each word's interval, 0 disables it.
    pub randomness: f64,
}

impl Default for LessonSettings {
    fn default() -> Self {
        Self {
            max_words_per_lesson: 30,
            interval_multiplier_no_mistakes: 1.5,
            interval_multiplier_one_mistake: 1.0,
            interval_multiplier_many_mistakes: 0.5,
            min_interval_no_mistakes: Duration::days(5),
            min_interval_one_mistake: Duration::hours(3),
            min_interval_many_mistakes: Duration::hours(1),
            randomness: 0.0,
        }
    }
}

impl LessonSettings {
    /// Interval multiplier for a word missed `mistakes` times last lesson.
    pub fn multiplier_for(&self, mistakes: u32) -> f64 {
        match mistakes {
            0 => self.interval_multiplier_no_mistakes,
            1 => self.interval_multiplier_one_mistake,
            _ => self.interval_multiplier_many_mistakes,
        }
    }

    /// Minimum interval for a word missed `mistakes` times last lesson.
    pub fn min_interval_for(&self, mistakes: u32) -> Duration {
        match mistakes {
            0 => self.min_interval_no_mistakes,
            1 => self.min_interval_one_mistake,
            _ => self.min_interval_many_mistakes,
        }
    }

    /// Clamp every value into its allowed range.
    pub fn validated(self) -> Self {
        Self {
            max_words_per_lesson: clamp_usize(
                "max_words_per_lesson",
                self.max_words_per_lesson,
                MAX_WORDS_RANGE,
            ),
            interval_multiplier_no_mistakes: clamp_f64(
                "interval_multiplier_no_mistakes",
                self.interval_multiplier_no_mistakes,
                NO_MISTAKES_RANGE,
            ),
            interval_multiplier_one_mistake: clamp_f64(
                "interval_multiplier_one_mistake",
                self.interval_multiplier_one_mistake,
                ONE_MISTAKE_RANGE,
            ),
            interval_multiplier_many_mistakes: clamp_f64(
                "interval_multiplier_many_mistakes",
                self.interval_multiplier_many_mistakes,
                MANY_MISTAKES_RANGE,
            ),
            min_interval_no_mistakes: clamp_interval(
                "min_interval_no_mistakes",
                self.min_interval_no_mistakes,
            ),
            min_interval_one_mistake: clamp_interval(
                "min_interval_one_mistake",
                self.min_interval_one_mistake,
            ),
            min_interval_many_mistakes: clamp_interval(
                "min_interval_many_mistakes",
                self.min_interval_many_mistakes,
            ),
            randomness: clamp_f64("randomness", self.randomness, RANDOMNESS_RANGE),
        }
    }

    /// Parse settings saved by the shell. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        let settings: Self = serde_json::from_str(json).map_err(CodecError::Settings)?;
        Ok(settings.validated())
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        serde_json::to_string_pretty(self).map_err(CodecError::Settings)
    }
}

fn clamp_usize(key: &str, value: usize, range: RangeInclusive<usize>) -> usize {
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        tracing::warn!(key, value, clamped, "lesson setting out of range");
    }
    clamped
}

fn clamp_interval(key: &str, value: Duration) -> Duration {
    let clamped = value.clamp(Duration::hours(1), Duration::days(100));
    if clamped != value {
        tracing::warn!(key, %value, %clamped, "lesson setting out of range");
    }
    clamped
}

fn clamp_f64(key: &str, value: f64, range: RangeInclusive<f64>) -> f64 {
    // NaN falls back to the lower bound
    let clamped = if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    };
    if clamped != value {
        tracing::warn!(key, value, clamped, "lesson setting out of range");
    }
    clamped
}
