//! Error types for limn.

use thiserror::Error;

/// Result type for limn operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for limn operations.
///
/// Only [`Error::Config`] ever reaches the caller of
/// [`Orchestrator::process`](crate::Orchestrator::process). Backend failures
/// and timeouts are recovered inside the strategies and surfaced as
/// `failed_backends` entries on the result.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid configuration: unknown backend id, weight <= 0, bad mode
    /// label, or out-of-range threshold. Fatal, raised before any backend
    /// is invoked.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A backend returned an error or malformed output. Non-fatal; the
    /// backend is excluded from the call that observed it.
    #[error("Backend error: {0}")]
    Backend(String),

    /// A backend exceeded its per-invocation timeout. Non-fatal; handled
    /// like [`Error::Backend`].
    #[error("Backend timeout: {0}")]
    Timeout(String),

    /// Extraction failure reported by an [`Extractor`](crate::Extractor)
    /// implementation.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Error::Backend(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create an extraction error.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Error::Extraction(msg.into())
    }

    /// True for failures that strategies recover from locally.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Backend(_) | Error::Timeout(_) | Error::Extraction(_)
        )
    }
}
