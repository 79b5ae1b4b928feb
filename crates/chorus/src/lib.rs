//! Chorus Domain Library
//!
//! Core types and orchestration for fanning a single prompt out to several
//! AI personas (cosmetic labels over one upstream model) and rendering each
//! answer independently, pane by pane.
//!
//! # Architecture
//!
//! - **Domain** (`domain/`): personas, submissions, slots, the error taxonomy
//! - **Ports** (`ports/`): the traits front ends and HTTP clients plug into
//!   - `GenerationClient`: one prompt to one persona through the proxy
//!   - `RenderTarget` / `SurfaceFactory`: per-slot display sinks
//! - **Services** (`services/`): the working parts
//!   - `SubmissionOrchestrator`: concurrent fan-out, per-slot settlement
//!   - `SurfaceManager`: the slot registry behind tabs and panes
//!   - `reveal`: the cancellable typewriter
//!   - `SessionGate`: the local login/consent flag

pub mod domain;
pub mod ports;
pub mod services;

// Re-export commonly used types
pub use domain::{
    AttachedImage, DomainError, Persona, PersonaRegistry, SlotOutcome, SlotStatus,
    SubmissionRequest,
};
pub use ports::{
    GenerationClient, MemoryPane, RenderTarget, SurfaceFactory, EMPTY_RESPONSE_PLACEHOLDER,
};
pub use services::{
    start_reveal, PersonaStatus, RevealHandle, SessionGate, SubmissionOrchestrator,
    SubmissionReport, SurfaceManager, DEFAULT_PACE,
};
