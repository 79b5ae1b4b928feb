//! Client-side error taxonomy for persona submissions.

use std::time::Duration;
use thiserror::Error;

/// Errors a submission (or one persona's call within it) can settle with.
///
/// A per-persona failure is contained to that persona's slot; only
/// `Validation` aborts a submission before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Rejected client-side; no request was issued.
    #[error("{0}")]
    Validation(String),

    /// The proxy was reached but answered with a failure status. The
    /// message is surfaced verbatim in the persona's pane. A proxy with no
    /// upstream credential configured reports itself through this variant
    /// too; the client does not special-case proxy internals.
    #[error("{0}")]
    Proxy(String),

    /// The proxy could not be reached at all.
    #[error("Network error: {0}")]
    Transport(String),

    /// The call exceeded the configured deadline. No retry is attempted.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_message_is_verbatim() {
        let err = DomainError::Proxy("rate limited".to_string());
        assert_eq!(err.to_string(), "rate limited");
    }

    #[test]
    fn test_timeout_is_distinct_from_proxy() {
        let err = DomainError::Timeout(Duration::from_secs(60));
        assert!(err.to_string().contains("timed out"));
        assert_ne!(err, DomainError::Proxy("timed out".to_string()));
    }
}
