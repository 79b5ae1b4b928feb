//! Domain types: personas, submissions, slots, errors.

pub mod errors;
pub mod persona;
pub mod slot;
pub mod submission;

pub use errors::DomainError;
pub use persona::{Persona, PersonaRegistry};
pub use slot::{SlotOutcome, SlotStatus};
pub use submission::{AttachedImage, SubmissionRequest};
