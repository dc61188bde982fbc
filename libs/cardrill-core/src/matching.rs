//! Answer matching for typed answers.

use crate::types::Word;
use serde::{Deserialize, Serialize};

/// Result of comparing a typed answer to the correct answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    /// Letters of the typed answer, if one was given.
    pub typed_normalized: Option<String>,
    /// Letters of the correct answer.
    pub correct_normalized: String,
}

/// Compare a typed answer to the correct one.
///
/// Only letters take part in the comparison, case-sensitively; spaces,
/// punctuation and digits are ignored. A missing answer (the user gave up)
/// never matches.
pub fn compare_answers(typed: Option<&Word>, correct: &Word) -> MatchResult {
    let typed_normalized = typed.map(|word| normalize_answer(word.as_str()));
    let correct_normalized = normalize_answer(correct.as_str());
    let is_correct = typed_normalized.as_deref() == Some(correct_normalized.as_str());

    MatchResult {
        is_correct,
        typed_normalized,
        correct_normalized,
    }
}

/// Shorthand for `compare_answers(..).is_correct`.
pub fn answers_match(typed: Option<&Word>, correct: &Word) -> bool {
    compare_answers(typed, correct).is_correct
}

/// Strip everything but alphabetic characters.
pub fn normalize_answer(s: &str) -> String {
    s.chars().filter(|c| c.is_alphabetic()).collect()
}
