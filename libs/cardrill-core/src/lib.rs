//! Core of a flashcard trainer for language learners.
//!
//! Provides:
//! - Parser for plain-text flashcard sets (blank-line or delimiter separated)
//! - Word selection by estimated due time for the next lesson
//! - Lesson state machines (linear retry and Leitner-style cram)
//! - Per-word stats and lesson settings, with JSON snapshots for the shell
//! - Duplicate detection for the card editor
//!
//! Reading files, persisting stats and any UI are left to the caller.

pub mod duplicates;
pub mod error;
pub mod lesson;
pub mod matching;
pub mod parser;
pub mod scheduler;
pub mod settings;
pub mod stats;
pub mod types;

pub use duplicates::{duplicate_warnings, find_duplicates, CardId, DraftCard, Duplicate, DuplicateIndex};
pub use error::{CodecError, ParseError, Result};
pub use lesson::{
    start_lesson, AnswerResult, CramLesson, CramLessonResult, CramLevel, Lesson, LessonKind,
    LessonResult, Question, SimpleLesson, SimpleLessonResult,
};
pub use matching::{answers_match, compare_answers, MatchResult};
pub use parser::{format_cards, parse, parse_content, SetFormat};
pub use scheduler::{estimated_next_due, is_very_recent, select_lesson_cards, LessonDeck};
pub use settings::LessonSettings;
pub use stats::{LibraryStats, WordStats};
pub use types::{Flashcard, FlashcardSet, Word};
