// ABOUTME: Write-once cell fanning a single transport failure out to every stage and waiter
// ABOUTME: Grounded in the pack's sqlx-core dependency on event-listener for wake-all semantics

use std::sync::OnceLock;

use tokio::sync::Notify;

use crate::error::Error;

/// A write-once cell of [`Error`]. Once set, it stays set and every reader
/// observes the same value forever.
#[derive(Default)]
pub struct TransportErrorLatch {
    error: OnceLock<Error>,
    notify: Notify,
}

impl TransportErrorLatch {
    pub fn new() -> Self {
        Self {
            error: OnceLock::new(),
            notify: Notify::new(),
        }
    }

    /// Install `err` if the latch is still empty. Returns `true` if this
    /// call won the race.
    pub fn set(&self, err: Error) -> bool {
        let won = self.error.set(err).is_ok();
        // wake everyone regardless of who won; losers just re-read the
        // already-installed value.
        self.notify.notify_waiters();
        won
    }

    pub fn get(&self) -> Option<Error> {
        self.error.get().cloned()
    }

    /// Resolve once the latch is set. No-op immediately if it already is.
    pub async fn wait(&self) -> Error {
        loop {
            if let Some(err) = self.get() {
                return err;
            }
            let notified = self.notify.notified();
            // re-check after registering interest to avoid missing a set()
            // that raced in between the first `get()` and this call.
            if let Some(err) = self.get() {
                return err;
            }
            notified.await;
        }
    }
}
