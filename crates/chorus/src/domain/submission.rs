//! Submission payloads: the prompt, the persona name, the optional image.

use serde::{Deserialize, Serialize};

/// Image attached to a submission. At most one at a time; picking a new
/// file replaces the prior value wholesale. Field names match the proxy
/// wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedImage {
    pub mime_type: String,
    pub base64: String,
}

impl AttachedImage {
    pub fn new(mime_type: impl Into<String>, base64: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64: base64.into(),
        }
    }
}

/// One outgoing call to the proxy, constructed per persona per submission
/// and dropped once the call settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    /// Non-empty by construction: the orchestrator validates before fan-out.
    pub prompt: String,
    /// The persona's display name, not its id.
    pub persona_name: String,
    /// Shared across all personas of one submission, never consumed.
    pub image: Option<AttachedImage>,
}
