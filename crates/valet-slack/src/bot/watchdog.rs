//! Liveness watchdog for a single session.
//!
//! The gateway proves application-level liveness with periodic Ping frames.
//! The read loop forwards each one as a keepalive tick; if no tick arrives
//! within the window, the connection is open but dead and the session is
//! torn down. This is the only detector for that failure mode — a silently
//! dropped connection raises no transport error.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Window within which at least one keepalive must be observed.
pub(crate) const KEEPALIVE_WINDOW: Duration = Duration::from_secs(180);

/// Runs until the session is cancelled or the window elapses without a
/// keepalive, in which case the session token is cancelled exactly once.
pub(crate) async fn run_watchdog(token: CancellationToken, mut keepalive: mpsc::Receiver<()>) {
    loop {
        tokio::select! {
            () = token.cancelled() => {
                debug!("stopping watchdog");
                return;
            }
            () = tokio::time::sleep(KEEPALIVE_WINDOW) => {
                warn!(
                    window_secs = KEEPALIVE_WINDOW.as_secs(),
                    "no keepalive within window, closing session"
                );
                token.cancel();
                return;
            }
            tick = keepalive.recv() => {
                // Each observed keepalive re-arms the window.
                if tick.is_none() {
                    debug!("keepalive channel closed, stopping watchdog");
                    return;
                }
            }
        }
    }
}
