//! Result-slot states and outcomes.

use serde::{Deserialize, Serialize};

/// Lifecycle of one persona's slot within a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// Allocated; the call has not settled yet.
    Pending,
    /// The call succeeded and the response is (being) revealed.
    Rendered,
    /// The call failed; the pane shows the error.
    Failed,
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotStatus::Pending => write!(f, "pending"),
            SlotStatus::Rendered => write!(f, "rendered"),
            SlotStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Settled result fed into a slot, one per persona call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    Success(String),
    Failure(String),
}
