//! Error types for gasmon-core.
//!
//! # Error Recovery
//!
//! | Error Type | Effect on resident data | Typical handling |
//! |------------|-------------------------|------------------|
//! | [`Error::Store`] | No durable effect | Log, report, keep running |
//! | [`Error::CorruptTier`] | Tier left as is | Report; export or clear the tier by hand |
//! | [`Error::Serialization`] | Nothing written | Report |
//! | [`Error::Parse`] | Nothing written | Report |
//! | [`Error::Io`] | Nothing written | Report |
//!
//! None of these abort a long-running collector: ingestion logs the failure
//! and keeps consuming frames.

use thiserror::Error;

use crate::tier::Tier;

/// Errors raised by the rollup engine.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The persistence collaborator failed or is unavailable.
    #[error("Storage error: {0}")]
    Store(#[from] gasmon_store::Error),

    /// A tier holds content that does not decode into its entity type.
    #[error("The {tier} tier holds data that cannot be decoded: {source}")]
    CorruptTier {
        /// The tier that failed to decode.
        tier: Tier,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Encoding a tier for persistence failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A date or month key could not be parsed.
    #[error(transparent)]
    Parse(#[from] gasmon_types::ParseError),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a corrupt-tier error.
    pub fn corrupt(tier: Tier, source: serde_json::Error) -> Self {
        Self::CorruptTier { tier, source }
    }

    /// `true` when the failure came from the storage layer rather than the data.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Io(_))
    }
}

/// Result type alias using gasmon-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
