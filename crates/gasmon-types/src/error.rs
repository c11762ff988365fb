//! Error types for data parsing in gasmon-types.

use thiserror::Error;

/// Errors that can occur when parsing gasmon keys and values.
///
/// Frame decoding never produces this error (see [`crate::frame`]); it is
/// raised only for the calendar keys that identify aggregates.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A day key was not a valid `YYYY-MM-DD` calendar date.
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A month key was not a valid `YYYY-MM` calendar month.
    #[error("Invalid month '{0}': expected YYYY-MM")]
    InvalidMonth(String),

    /// A pollutant name was not recognized.
    #[error("Unknown pollutant: {0}")]
    UnknownPollutant(String),
}

/// Result type alias using gasmon-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
