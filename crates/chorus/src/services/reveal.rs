//! Timed character-by-character reveal.
//!
//! Each reveal is an independent spawned task: concurrent reveals against
//! different panes never interfere. A reveal is not restartable; the
//! surface manager supersedes one by cancelling it and starting a new one
//! against the same pane.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::ports::RenderTarget;

/// Default pacing between revealed characters.
pub const DEFAULT_PACE: Duration = Duration::from_millis(15);

/// Handle to an in-flight reveal.
///
/// Dropping the handle detaches the task; call [`RevealHandle::cancel`] to
/// stop future scheduling before starting a replacement reveal.
#[derive(Debug)]
pub struct RevealHandle {
    handle: JoinHandle<()>,
}

impl RevealHandle {
    /// Stops the reveal at the next pacing boundary. Already-revealed
    /// characters stay on the pane until the successor clears it.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits until the final character has been revealed, or until the
    /// reveal was cancelled.
    pub async fn finished(self) {
        let _ = self.handle.await;
    }
}

/// Clears `target`, then reveals `text` one character at a time at the
/// given pace, hiding the cursor marker after the final character.
pub fn start_reveal(target: Arc<dyn RenderTarget>, text: String, pace: Duration) -> RevealHandle {
    let handle = tokio::spawn(async move {
        target.clear();
        for ch in text.chars() {
            if !pace.is_zero() {
                tokio::time::sleep(pace).await;
            }
            target.push_char(ch);
        }
        target.hide_cursor();
    });
    RevealHandle { handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MemoryPane;

    #[tokio::test(start_paused = true)]
    async fn test_reveal_completes_with_exact_text() {
        let pane = Arc::new(MemoryPane::default());
        let handle = start_reveal(pane.clone(), "Hi there".to_string(), DEFAULT_PACE);
        handle.finished().await;

        assert_eq!(pane.contents(), "Hi there");
        assert!(!pane.is_cursor_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_reveals_do_not_interfere() {
        let left = Arc::new(MemoryPane::default());
        let right = Arc::new(MemoryPane::default());
        let a = start_reveal(left.clone(), "aaaa".to_string(), DEFAULT_PACE);
        let b = start_reveal(right.clone(), "bb".to_string(), DEFAULT_PACE);
        a.finished().await;
        b.finished().await;

        assert_eq!(left.contents(), "aaaa");
        assert_eq!(right.contents(), "bb");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_future_characters() {
        let pane = Arc::new(MemoryPane::default());
        let handle = start_reveal(pane.clone(), "abcdef".to_string(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(25)).await;
        handle.cancel();
        handle.finished().await;

        let shown = pane.contents();
        assert!(shown.len() < "abcdef".len());
        assert!("abcdef".starts_with(&shown));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_reveal_supersedes_cancelled_one() {
        let pane = Arc::new(MemoryPane::default());
        let first = start_reveal(pane.clone(), "old old old".to_string(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(35)).await;
        first.cancel();
        first.finished().await;

        let second = start_reveal(pane.clone(), "new".to_string(), Duration::from_millis(10));
        second.finished().await;

        assert_eq!(pane.contents(), "new");
        assert!(!pane.is_cursor_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_pace_reveals_everything() {
        let pane = Arc::new(MemoryPane::default());
        let handle = start_reveal(pane.clone(), "instant".to_string(), Duration::ZERO);
        handle.finished().await;
        assert_eq!(pane.contents(), "instant");
    }
}
