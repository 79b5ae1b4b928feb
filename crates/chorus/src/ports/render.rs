//! Render Port
//!
//! Per-slot display sinks. The surface manager owns the slot state; a
//! `RenderTarget` is the opaque handle one slot draws into, and a
//! `SurfaceFactory` mints a matched tab/pane pair per allocated slot.

use std::sync::{Arc, Mutex};

use crate::domain::Persona;

/// Display sink for one tab/pane pair.
///
/// Calls arrive from the reveal task as well as the surface manager, so
/// implementations must be internally synchronized.
pub trait RenderTarget: Send + Sync {
    /// Marks the pane visible (active tab) or hidden.
    fn set_active(&self, active: bool);

    /// Shows the "thinking" placeholder.
    fn show_pending(&self);

    /// Drops prior content ahead of a fresh reveal and shows the cursor
    /// marker.
    fn clear(&self);

    /// Appends one revealed character behind the cursor marker.
    fn push_char(&self, ch: char);

    /// Removes the cursor marker once the final character has landed.
    fn hide_cursor(&self);

    /// Replaces the pane content with a visibly distinct error message.
    fn show_error(&self, message: &str);

    /// Current pane content, cursor marker excluded.
    fn contents(&self) -> String;
}

/// Creates one pane per allocated slot.
pub trait SurfaceFactory: Send + Sync {
    fn create_pane(&self, persona: &Persona) -> Arc<dyn RenderTarget>;
}

/// In-memory pane: buffers everything, renders nothing.
///
/// Backs headless surfaces and the hidden (inactive) panes of the terminal
/// front end, which are projected only after their reveal completes.
#[derive(Debug, Default)]
pub struct MemoryPane {
    state: Mutex<PaneState>,
}

#[derive(Debug, Default)]
struct PaneState {
    content: String,
    cursor_visible: bool,
    pending: bool,
    active: bool,
    error: Option<String>,
}

impl MemoryPane {
    pub fn is_active(&self) -> bool {
        self.state.lock().unwrap().active
    }

    pub fn is_pending(&self) -> bool {
        self.state.lock().unwrap().pending
    }

    pub fn is_cursor_visible(&self) -> bool {
        self.state.lock().unwrap().cursor_visible
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().unwrap().error.clone()
    }
}

impl RenderTarget for MemoryPane {
    fn set_active(&self, active: bool) {
        self.state.lock().unwrap().active = active;
    }

    fn show_pending(&self) {
        let mut state = self.state.lock().unwrap();
        state.pending = true;
        state.content.clear();
        state.error = None;
    }

    fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.content.clear();
        state.pending = false;
        state.error = None;
        state.cursor_visible = true;
    }

    fn push_char(&self, ch: char) {
        self.state.lock().unwrap().content.push(ch);
    }

    fn hide_cursor(&self) {
        self.state.lock().unwrap().cursor_visible = false;
    }

    fn show_error(&self, message: &str) {
        let mut state = self.state.lock().unwrap();
        state.pending = false;
        state.cursor_visible = false;
        state.error = Some(message.to_string());
        state.content = format!("Error: {message}");
    }

    fn contents(&self) -> String {
        self.state.lock().unwrap().content.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_resets_content_and_shows_cursor() {
        let pane = MemoryPane::default();
        pane.show_pending();
        assert!(pane.is_pending());

        pane.clear();
        pane.push_char('h');
        pane.push_char('i');
        assert_eq!(pane.contents(), "hi");
        assert!(pane.is_cursor_visible());
        assert!(!pane.is_pending());

        pane.hide_cursor();
        assert!(!pane.is_cursor_visible());
    }

    #[test]
    fn test_error_replaces_content() {
        let pane = MemoryPane::default();
        pane.clear();
        pane.push_char('x');
        pane.show_error("rate limited");
        assert_eq!(pane.contents(), "Error: rate limited");
        assert_eq!(pane.error().as_deref(), Some("rate limited"));
        assert!(!pane.is_cursor_visible());
    }
}
