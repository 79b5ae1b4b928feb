//! Result surface: the slot registry behind tabs and panes.
//!
//! The manager owns all slot state in memory; the visual layer is a pure
//! projection of this registry and is never queried back for state. Every
//! allocation stamps a submission generation, and writes carrying a stale
//! generation are discarded instead of landing in reallocated panes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::{Persona, SlotOutcome, SlotStatus};
use crate::ports::{RenderTarget, SurfaceFactory};

use super::reveal::{start_reveal, RevealHandle, DEFAULT_PACE};

/// One tab/pane pair tracking a single persona's response.
struct Slot {
    persona_id: String,
    status: SlotStatus,
    pane: Arc<dyn RenderTarget>,
    reveal: Option<RevealHandle>,
    active: bool,
}

struct SurfaceState {
    generation: u64,
    slots: Vec<Slot>,
}

/// Creates, activates, and updates slots. One instance serves consecutive
/// (and overlapping) submissions; each `allocate` rebuilds the slot set
/// wholesale.
pub struct SurfaceManager {
    factory: Arc<dyn SurfaceFactory>,
    pace: Duration,
    state: Mutex<SurfaceState>,
}

impl SurfaceManager {
    pub fn new(factory: Arc<dyn SurfaceFactory>) -> Self {
        Self {
            factory,
            pace: DEFAULT_PACE,
            state: Mutex::new(SurfaceState {
                generation: 0,
                slots: Vec::new(),
            }),
        }
    }

    /// Overrides the reveal pacing (tests run at zero).
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Tears down all prior slots (cancelling their reveals) and creates
    /// one pending slot per persona, in the given order.
    ///
    /// Returns `false` without touching the slots when `generation` is
    /// older than the current one: submissions fetch their generation
    /// before allocating, and a newer submission may get here first.
    pub fn allocate(&self, generation: u64, personas: &[Persona]) -> bool {
        let mut state = self.state.lock().unwrap();
        if generation < state.generation {
            tracing::debug!(
                generation,
                current = state.generation,
                "refusing allocation for superseded submission"
            );
            return false;
        }
        for slot in &state.slots {
            if let Some(reveal) = &slot.reveal {
                reveal.cancel();
            }
        }
        state.generation = generation;
        state.slots = personas
            .iter()
            .map(|persona| {
                let pane = self.factory.create_pane(persona);
                pane.show_pending();
                Slot {
                    persona_id: persona.id.clone(),
                    status: SlotStatus::Pending,
                    pane,
                    reveal: None,
                    active: false,
                }
            })
            .collect();
        true
    }

    /// Marks exactly one tab/pane pair active. No-op for an unknown id;
    /// idempotent for a known one.
    pub fn activate(&self, persona_id: &str) {
        let mut state = self.state.lock().unwrap();
        if !state.slots.iter().any(|s| s.persona_id == persona_id) {
            return;
        }
        for slot in &mut state.slots {
            let active = slot.persona_id == persona_id;
            if slot.active != active {
                slot.active = active;
                slot.pane.set_active(active);
            }
        }
    }

    /// Feeds a settled call into its slot. Returns `false` when the write
    /// was discarded: stale generation or unknown persona.
    pub fn update_slot(&self, generation: u64, persona_id: &str, outcome: SlotOutcome) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.generation != generation {
            tracing::debug!(
                persona = persona_id,
                generation,
                current = state.generation,
                "discarding stale slot update"
            );
            return false;
        }
        let pace = self.pace;
        let Some(slot) = state.slots.iter_mut().find(|s| s.persona_id == persona_id) else {
            return false;
        };
        if let Some(reveal) = slot.reveal.take() {
            reveal.cancel();
        }
        match outcome {
            SlotOutcome::Success(text) => {
                slot.status = SlotStatus::Rendered;
                slot.reveal = Some(start_reveal(Arc::clone(&slot.pane), text, pace));
            }
            SlotOutcome::Failure(message) => {
                slot.status = SlotStatus::Failed;
                slot.pane.show_error(&message);
            }
        }
        true
    }

    /// Waits for every in-flight reveal to run to completion.
    pub async fn finish_reveals(&self) {
        let handles: Vec<RevealHandle> = {
            let mut state = self.state.lock().unwrap();
            state.slots.iter_mut().filter_map(|s| s.reveal.take()).collect()
        };
        for handle in handles {
            handle.finished().await;
        }
    }

    /// Slot statuses in allocation order.
    pub fn statuses(&self) -> Vec<(String, SlotStatus)> {
        let state = self.state.lock().unwrap();
        state
            .slots
            .iter()
            .map(|s| (s.persona_id.clone(), s.status))
            .collect()
    }

    /// Identifier of the active tab/pane pair, if any.
    pub fn active_persona(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .slots
            .iter()
            .find(|s| s.active)
            .map(|s| s.persona_id.clone())
    }

    /// The pane allocated for a persona in the current generation.
    pub fn pane(&self, persona_id: &str) -> Option<Arc<dyn RenderTarget>> {
        let state = self.state.lock().unwrap();
        state
            .slots
            .iter()
            .find(|s| s.persona_id == persona_id)
            .map(|s| Arc::clone(&s.pane))
    }
}
