use thiserror::Error;

/// Reasons a search result is refused before it reaches a result panel.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The result carried no usable file name.
    #[error("search result has an empty file name")]
    EmptyFileName,

    /// The spam score was not a finite value in `0.0..=1.0`.
    #[error("spam score {score} for '{name}' is outside 0.0..=1.0")]
    InvalidSpamScore { name: String, score: f32 },

    /// A content hash could not be parsed.
    #[error("invalid content hash '{value}': {reason}")]
    InvalidHash { value: String, reason: &'static str },
}
