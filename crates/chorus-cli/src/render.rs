//! Terminal panes: the active tab reveals live, hidden tabs buffer.
//!
//! The surface manager owns slot state; these panes are its terminal
//! projection. Exactly one pane is active at a time and types straight to
//! stdout with a cursor marker, mirroring the tab the browser UI keeps
//! visible. Inactive panes accumulate into a buffer and are printed in
//! selection order once every reveal has finished.

use std::io::{self, Write as _};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::Colorize;

use chorus::services::SubmissionReport;
use chorus::{MemoryPane, Persona, PersonaRegistry, RenderTarget, SlotStatus, SurfaceFactory, SurfaceManager};

const CURSOR: &str = "▋";

/// Creates one terminal pane per allocated slot.
pub struct TerminalSurface;

impl SurfaceFactory for TerminalSurface {
    fn create_pane(&self, persona: &Persona) -> Arc<dyn RenderTarget> {
        Arc::new(TerminalPane::new(persona.display_name.clone()))
    }
}

/// One persona's pane. All content is buffered; the active pane echoes it
/// to stdout as it is revealed.
pub struct TerminalPane {
    display_name: String,
    buffer: MemoryPane,
    live: AtomicBool,
}

impl TerminalPane {
    fn new(display_name: String) -> Self {
        Self {
            display_name,
            buffer: MemoryPane::default(),
            live: AtomicBool::new(false),
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::Relaxed)
    }

    fn flush() {
        let _ = io::stdout().flush();
    }
}

impl RenderTarget for TerminalPane {
    fn set_active(&self, active: bool) {
        self.live.store(active, Ordering::Relaxed);
        self.buffer.set_active(active);
        if active {
            println!();
            println!("{}", pane_header(&self.display_name));
            if self.buffer.is_pending() {
                print!("{}", "Thinking...".dimmed());
                Self::flush();
            }
        }
    }

    fn show_pending(&self) {
        self.buffer.show_pending();
    }

    fn clear(&self) {
        self.buffer.clear();
        if self.is_live() {
            // Erase the pending line and open the content line.
            print!("\r\x1b[K{}", CURSOR.dimmed());
            Self::flush();
        }
    }

    fn push_char(&self, ch: char) {
        self.buffer.push_char(ch);
        if self.is_live() {
            if ch == '\n' {
                print!("\u{8} \u{8}\n{}", CURSOR.dimmed());
            } else {
                print!("\u{8}{ch}{}", CURSOR.dimmed());
            }
            Self::flush();
        }
    }

    fn hide_cursor(&self) {
        self.buffer.hide_cursor();
        if self.is_live() {
            println!("\u{8} \u{8}");
            Self::flush();
        }
    }

    fn show_error(&self, message: &str) {
        self.buffer.show_error(message);
        if self.is_live() {
            print!("\r\x1b[K");
            println!("{}", format!("Error: {message}").red());
            Self::flush();
        }
    }

    fn contents(&self) -> String {
        self.buffer.contents()
    }
}

fn pane_header(display_name: &str) -> String {
    format!("── {} ──", display_name).cyan().bold().to_string()
}

/// Prints the panes the live reveal kept hidden, in selection order.
pub fn project_hidden_panes(
    surface: &SurfaceManager,
    registry: &PersonaRegistry,
    report: &SubmissionReport,
) {
    let active = surface.active_persona();
    for outcome in &report.outcomes {
        if active.as_deref() == Some(outcome.persona_id.as_str()) {
            continue;
        }
        let Some(persona) = registry.get(&outcome.persona_id) else {
            continue;
        };
        let Some(pane) = surface.pane(&outcome.persona_id) else {
            continue;
        };

        println!();
        println!("{}", pane_header(&persona.display_name));
        match outcome.status {
            SlotStatus::Rendered => println!("{}", pane.contents()),
            SlotStatus::Failed => println!("{}", pane.contents().red()),
            SlotStatus::Pending => println!("{}", "No response received.".dimmed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_pane_buffers_without_side_effects() {
        let pane = TerminalPane::new("Gemini Pro".to_string());
        pane.show_pending();
        pane.clear();
        for ch in "Hi there".chars() {
            pane.push_char(ch);
        }
        pane.hide_cursor();

        assert_eq!(pane.contents(), "Hi there");
    }

    #[test]
    fn test_error_content_is_marked() {
        let pane = TerminalPane::new("Claude".to_string());
        pane.show_pending();
        pane.show_error("rate limited");
        assert!(pane.contents().contains("rate limited"));
    }
}
