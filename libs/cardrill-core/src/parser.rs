//! Plain-text parser for flashcard set files.
//!
//! # Formats
//! Blank-line separated, question on the first line and answer on the second:
//! ```text
//! der Hund
//! the dog
//!
//! die Katze
//! the cat
//! ```
//!
//! Or one card per line with a delimiter character that occurs exactly once
//! on every non-blank line. The delimiter is detected automatically:
//! ```text
//! der Hund | the dog
//! die Katze | the cat
//! ```
//!
//! The blank-line layout takes priority when it fits.

use crate::error::{ParseError, Result};
use crate::types::{Flashcard, FlashcardSet, Word};
use std::collections::BTreeSet;

const BOM: char = '\u{FEFF}';

/// Delimiters trusted when a file is also a valid single blank-line card.
const SEPARATORS: [char; 7] = ['\t', '|', ';', ':', ',', '=', '/'];

/// Which layout a set file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetFormat {
    BlankLineSeparated,
    Delimited(char),
}

/// Parse the text of a whole file.
pub fn parse_content(name: &str, content: &str) -> Result<FlashcardSet> {
    let lines: Vec<&str> = content.lines().collect();
    parse(name, &lines)
}

/// Parse decoded lines into a flashcard set named `name`.
///
/// Every card is tagged with `name` as its source. Parsing is all-or-nothing.
pub fn parse<S: AsRef<str>>(name: &str, lines: &[S]) -> Result<FlashcardSet> {
    let format = detect_format(lines).ok_or_else(|| ParseError::NoDelimiter {
        name: name.to_string(),
    })?;

    let cards: Vec<Flashcard> = match format {
        SetFormat::BlankLineSeparated => parse_blank_line_separated(lines),
        SetFormat::Delimited(delimiter) => parse_delimited(lines, delimiter),
    }
    .into_iter()
    .map(|card| card.with_source(name))
    .collect();

    tracing::debug!(name, ?format, cards = cards.len(), "parsed flashcard set");
    Ok(FlashcardSet::new(name, cards))
}

/// Figure out the layout of the given lines, if any fits.
///
/// A file holding a single two-line group is ambiguous: `a|b` over `c|d`
/// reads as two delimited cards when a common separator fits. Other
/// punctuation such as `'` or `?` keeps it a single card.
pub fn detect_format<S: AsRef<str>>(lines: &[S]) -> Option<SetFormat> {
    if is_blank_line_separated(lines) {
        if non_blank_lines(lines).count() == 2 {
            let separator = delimiter_candidates(lines)
                .into_iter()
                .find(|c| SEPARATORS.contains(c));
            if let Some(delimiter) = separator {
                return Some(SetFormat::Delimited(delimiter));
            }
        }
        Some(SetFormat::BlankLineSeparated)
    } else {
        delimiter_candidates(lines)
            .into_iter()
            .next()
            .map(SetFormat::Delimited)
    }
}

/// Write cards in the blank-line layout.
pub fn format_cards(cards: &[Flashcard]) -> String {
    cards
        .iter()
        .map(|card| format!("{}\n{}\n", card.front, card.back))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Every group between blank lines must hold exactly two lines.
fn is_blank_line_separated<S: AsRef<str>>(lines: &[S]) -> bool {
    let mut group = 0;
    for line in lines.iter().map(AsRef::as_ref).chain(std::iter::once("")) {
        if is_blank(line) {
            if group != 0 && group != 2 {
                return false;
            }
            group = 0;
        } else {
            group += 1;
        }
    }
    true
}

fn parse_blank_line_separated<S: AsRef<str>>(lines: &[S]) -> Vec<Flashcard> {
    let mut cards = Vec::new();
    let mut group: Vec<Word> = Vec::with_capacity(2);
    for line in lines.iter().map(AsRef::as_ref).chain(std::iter::once("")) {
        if is_blank(line) {
            if let [front, back] = group.as_slice() {
                cards.push(Flashcard::new(front.clone(), back.clone()));
            }
            group.clear();
        } else {
            group.push(parse_word(line));
        }
    }
    cards
}

fn non_blank_lines<S: AsRef<str>>(lines: &[S]) -> impl Iterator<Item = &str> {
    lines.iter().map(AsRef::as_ref).filter(|line| !is_blank(line))
}

/// Characters that occur exactly once on every non-blank line, lowest first.
fn delimiter_candidates<S: AsRef<str>>(lines: &[S]) -> BTreeSet<char> {
    let mut candidates: Option<BTreeSet<char>> = None;
    for line in non_blank_lines(lines) {
        let once = chars_occurring_once(line);
        let remaining = match candidates {
            None => once,
            Some(previous) => previous.intersection(&once).copied().collect(),
        };
        if remaining.is_empty() {
            return remaining;
        }
        candidates = Some(remaining);
    }
    candidates.unwrap_or_default()
}

fn chars_occurring_once(line: &str) -> BTreeSet<char> {
    let mut once = BTreeSet::new();
    let mut repeated = BTreeSet::new();
    for c in line.chars() {
        if !repeated.contains(&c) && !once.insert(c) {
            once.remove(&c);
            repeated.insert(c);
        }
    }
    once
}

fn parse_delimited<S: AsRef<str>>(lines: &[S], delimiter: char) -> Vec<Flashcard> {
    non_blank_lines(lines)
        .map(|line| {
            // the detected delimiter occurs exactly once per non-blank line
            let (front, back) = line.split_once(delimiter).unwrap_or((line, ""));
            Flashcard::new(parse_word(front), parse_word(back))
        })
        .collect()
}

fn parse_word(s: &str) -> Word {
    Word::new(s.trim_matches(|c: char| {
        c.is_whitespace() || c == '"' || c == '\u{201C}' || c == '\u{201D}' || c == BOM
    }))
}
