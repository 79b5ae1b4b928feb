//! Local session flag and cookie-consent choice.
//!
//! An engagement gate, not a security control: nothing server-side trusts
//! it, and it must never be relied on to protect the proxy credential.
//! Only explicit login/logout actions flip the flag; the orchestrator
//! never mutates it. The front end persists this struct (the analog of
//! browser local storage) and shows the consent banner exactly once.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGate {
    #[serde(default)]
    logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cookie_consent: Option<bool>,
}

impl SessionGate {
    /// Whether submissions are allowed.
    pub fn is_authorized(&self) -> bool {
        self.logged_in
    }

    pub fn log_in(&mut self) {
        self.logged_in = true;
    }

    pub fn log_out(&mut self) {
        self.logged_in = false;
    }

    /// True until the user has answered the banner once.
    pub fn needs_consent_banner(&self) -> bool {
        self.cookie_consent.is_none()
    }

    pub fn record_consent(&mut self, accepted: bool) {
        self.cookie_consent = Some(accepted);
    }

    pub fn consent(&self) -> Option<bool> {
        self.cookie_consent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_logged_out() {
        let gate = SessionGate::default();
        assert!(!gate.is_authorized());
        assert!(gate.needs_consent_banner());
    }

    #[test]
    fn test_login_logout_cycle() {
        let mut gate = SessionGate::default();
        gate.log_in();
        assert!(gate.is_authorized());
        gate.log_out();
        assert!(!gate.is_authorized());
    }

    #[test]
    fn test_consent_banner_shows_once() {
        let mut gate = SessionGate::default();
        gate.record_consent(false);
        assert!(!gate.needs_consent_banner());
        assert_eq!(gate.consent(), Some(false));
    }
}
