//! Error types for the meme-search crate.
//!
//! All errors carry stable string messages suitable for the per-provider
//! error map of a [`crate::SearchReport`]. Cookies and other credential
//! material never appear in error messages.

/// Errors that can occur during meme search operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The requested provider identifier is not registered.
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    /// A provider did not produce an outcome before its deadline.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// The parent operation was cancelled before the provider finished.
    #[error("search cancelled: {0}")]
    Cancelled(String),

    /// An HTTP request to a provider failed at the transport or status level.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A provider response did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The caller supplied an empty search keyword.
    #[error("keyword cannot be empty")]
    EmptyKeyword,

    /// Invalid provider or search configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for meme-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
