//! Generation Client Port
//!
//! Abstract interface for one persona call through the proxy endpoint.
//! The concrete implementation lives with the front end (HTTP); tests plug
//! in mocks.

use async_trait::async_trait;

use crate::domain::{DomainError, SubmissionRequest};

/// Shown in place of an empty or absent upstream answer.
pub const EMPTY_RESPONSE_PLACEHOLDER: &str = "No response.";

/// One prompt to one persona, one response. No retry: a failed attempt
/// surfaces immediately to the caller.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Sends a single request to the proxy and resolves to the generated
    /// text. Implementations must replace an empty success payload with
    /// [`EMPTY_RESPONSE_PLACEHOLDER`] and must not mutate shared state.
    async fn generate(&self, request: &SubmissionRequest) -> Result<String, DomainError>;
}
