//! Error types for cardrill-core.

use thiserror::Error;

/// Result type alias using ParseError.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can occur while reading a flashcard set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Neither the blank-line layout nor any single delimiter fits the input.
    #[error(
        "{name}: could not determine the delimiter character. \
         It must appear once and only once in every non-blank line, but there was no such character"
    )]
    NoDelimiter { name: String },
}

impl ParseError {
    /// Name of the flashcard set that failed to parse.
    pub fn source_name(&self) -> &str {
        match self {
            Self::NoDelimiter { name } => name,
        }
    }
}

/// Errors raised when decoding settings or stats snapshots handed over by the shell.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid lesson settings: {0}")]
    Settings(#[source] serde_json::Error),

    #[error("invalid stats snapshot: {0}")]
    Stats(#[source] serde_json::Error),
}
