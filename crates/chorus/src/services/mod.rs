//! Services: the orchestrator, the slot surface, the reveal engine, and
//! the session gate.

pub mod orchestrator;
pub mod reveal;
pub mod session;
pub mod surface;

pub use orchestrator::{PersonaStatus, SubmissionOrchestrator, SubmissionReport};
pub use reveal::{start_reveal, RevealHandle, DEFAULT_PACE};
pub use session::SessionGate;
pub use surface::SurfaceManager;
