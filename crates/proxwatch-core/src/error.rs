//! Error types shared across the proximity engine.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while processing prediction events.
#[derive(Error, Debug)]
pub enum Error {
    /// A coordinate was malformed or out of range. Rejected before any
    /// state change; the request fails with no partial effect.
    #[error("invalid location: field '{field}': {reason}")]
    InvalidLocation {
        /// The offending field ("latitude" or "longitude").
        field: &'static str,
        /// Description of what's wrong.
        reason: String,
    },

    /// A referenced actor or event does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing store for events/notifications cannot be reached.
    /// The only retryable condition; callers should back off and retry.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}
