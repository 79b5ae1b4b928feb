//! Ports: abstract interfaces the front end and HTTP clients implement.

pub mod generation;
pub mod render;

pub use generation::{GenerationClient, EMPTY_RESPONSE_PLACEHOLDER};
pub use render::{MemoryPane, RenderTarget, SurfaceFactory};
