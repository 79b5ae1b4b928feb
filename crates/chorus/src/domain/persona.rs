//! Persona definitions and the static registry.
//!
//! A persona is a label only: every persona resolves to the same upstream
//! model, differing by the name woven into the prompt preamble.

use serde::{Deserialize, Serialize};

/// A cosmetic AI label shown as one tab/pane pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Unique, stable identifier (checkbox/tab key).
    pub id: String,
    /// Name shown to the user and sent to the proxy as `aiName`.
    pub display_name: String,
}

impl Persona {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Ordered, read-only persona registry, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
}

impl PersonaRegistry {
    pub fn new(personas: Vec<Persona>) -> Self {
        Self { personas }
    }

    /// The stock persona set.
    pub fn builtin() -> Self {
        Self::new(vec![
            Persona::new("gemini", "Gemini Pro"),
            Persona::new("chatgpt", "ChatGPT"),
            Persona::new("deepseek", "DeepSeek"),
            Persona::new("claude", "Claude"),
        ])
    }

    /// All personas, in display order.
    pub fn list(&self) -> &[Persona] {
        &self.personas
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
