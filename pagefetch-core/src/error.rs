//! Core error types for `pagefetch`.

use thiserror::Error;

/// Core error type for request model operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Fetcher type name is not one of the supported backends.
    #[error("Unsupported fetcher type: {0}")]
    UnsupportedType(String),

    /// Request URL could not be parsed.
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The URL as given.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// HTTP method other than GET or POST.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),
}
