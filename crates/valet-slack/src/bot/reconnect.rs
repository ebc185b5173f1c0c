//! Idempotent reconnect request signal.
//!
//! Several independent detectors (disconnect events, read failures, the
//! liveness watchdog) may ask for the current session to be replaced. The
//! signal holds at most one pending request: raising while one is pending is
//! a no-op, and no raiser ever blocks.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A single-slot, non-blocking teardown-and-reopen request.
///
/// # Examples
///
/// ```
/// use valet_slack::bot::ReconnectSignal;
///
/// let signal = ReconnectSignal::new();
/// assert!(signal.raise());
/// assert!(!signal.raise()); // already pending, dropped
/// ```
#[derive(Debug, Default)]
pub struct ReconnectSignal {
    pending: AtomicBool,
    notify: Notify,
}

impl ReconnectSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal.
    ///
    /// Returns `false` when a request is already pending; the duplicate is
    /// dropped and exactly one teardown cycle will follow.
    pub fn raise(&self) -> bool {
        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.notify.notify_one();
            true
        } else {
            false
        }
    }

    /// Waits until the signal is raised and consumes the pending request.
    pub async fn wait(&self) {
        loop {
            if self.pending.swap(false, Ordering::AcqRel) {
                return;
            }
            self.notify.notified().await;
        }
    }
}
