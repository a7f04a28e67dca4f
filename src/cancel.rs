//! Caller-side cancellation for in-flight fetches.
//!
//! A [`CancelToken`] is handed down from the inbound request (for example an
//! aborted connection) so a fetch can stop promptly: the executor races the
//! token at both suspension points, aborting the in-flight attempt and
//! skipping any pending backoff sleep.

use std::sync::Arc;
use tokio::sync::watch;

/// Clone-able, awaitable cancellation flag. Level-triggered: once cancelled,
/// every present and future waiter observes it.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    /// Flip the token to cancelled and wake every waiter.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Check the flag without waiting.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once [`cancel`](Self::cancel) has been called; pend forever
    /// otherwise.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow_and_update() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
        // The sender lives inside every clone of this token, so the channel
        // cannot close while `self` is alive.
        std::future::pending::<()>().await
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
