//! Frame pump for a single session.
//!
//! Pulls frames off the read half of the WebSocket, decodes text frames into
//! typed events, and hands them to the event loop one at a time. Transient
//! read failures are retried a bounded number of times; malformed individual
//! frames are dropped without killing the connection.

use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::event::{DecodeError, Event};

/// Consecutive read failures tolerated before the session is torn down.
pub(crate) const MAX_READ_FAILURES: u32 = 3;

/// Pause between read retries.
pub(crate) const READ_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Runs until the session is cancelled, the frame source ends for good, or
/// the failure budget is exhausted (which cancels the session token).
///
/// Events are forwarded over `events` with a blocking send: if the event
/// loop is busy, reading stalls rather than dropping or reordering events.
/// Ping frames become keepalive ticks for the watchdog.
pub(crate) async fn run_read_loop<S, E>(
    token: CancellationToken,
    mut frames: S,
    events: mpsc::Sender<Event>,
    keepalive: mpsc::Sender<()>,
) where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    let mut failures = 0u32;
    loop {
        if failures >= MAX_READ_FAILURES {
            error!(failures, "giving up reading from the session");
            token.cancel();
            return;
        }

        let next = tokio::select! {
            () = token.cancelled() => {
                info!("stopping read loop");
                return;
            }
            next = frames.next() => next,
        };

        let message = match next {
            Some(Ok(message)) => {
                failures = 0;
                message
            }
            Some(Err(e)) => {
                failures += 1;
                error!(error = %e, failures, "failed to read from the session");
                backoff(&token).await;
                continue;
            }
            None => {
                failures += 1;
                warn!(failures, "session stream ended");
                backoff(&token).await;
                continue;
            }
        };

        match message {
            Message::Text(text) => match Event::decode(text.as_str()) {
                Ok(event) => {
                    tokio::select! {
                        () = token.cancelled() => {
                            info!("stopping read loop");
                            return;
                        }
                        sent = events.send(event) => {
                            if sent.is_err() {
                                debug!("event channel closed, stopping read loop");
                                return;
                            }
                        }
                    }
                }
                Err(DecodeError::UnknownType(kind)) => {
                    warn!(kind, "dropping event of unknown type");
                }
                Err(e) => {
                    error!(error = %e, "dropping undecodable frame");
                }
            },
            Message::Ping(_) => {
                // A pending tick already re-arms the watchdog; drop extras.
                let _ = keepalive.try_send(());
            }
            Message::Close(frame) => {
                info!(?frame, "received close frame");
            }
            _ => {}
        }
    }
}

async fn backoff(token: &CancellationToken) {
    tokio::select! {
        () = token.cancelled() => {}
        () = tokio::time::sleep(READ_RETRY_BACKOFF) => {}
    }
}

#[cfg(test)]
mod tests {
    use futures::channel::mpsc as frame_mpsc;
    use tokio_tungstenite::tungstenite::Bytes;

    use super::*;

    type Frame = Result<Message, String>;

    fn spawn_read_loop(
        token: CancellationToken,
        frames: frame_mpsc::UnboundedReceiver<Frame>,
        events: mpsc::Sender<Event>,
        keepalive: mpsc::Sender<()>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(run_read_loop(token, frames, events, keepalive))
    }

    #[test]
    fn test_should_verify_retry_constants() {
        assert_eq!(MAX_READ_FAILURES, 3);
        assert_eq!(READ_RETRY_BACKOFF, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_should_tear_down_after_three_consecutive_read_failures() {
        let token = CancellationToken::new();
        let (frame_tx, frame_rx) = frame_mpsc::unbounded();
        let (event_tx, _event_rx) = mpsc::channel(1);
        let (keepalive_tx, _keepalive_rx) = mpsc::channel(1);
        let read_loop = spawn_read_loop(token.clone(), frame_rx, event_tx, keepalive_tx);

        for _ in 0..3 {
            frame_tx
                .unbounded_send(Err("connection reset".to_string()))
                .expect("send frame");
        }

        read_loop.await.expect("read loop");
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_should_reset_failure_counter_after_successful_read() {
        let token = CancellationToken::new();
        let (frame_tx, frame_rx) = frame_mpsc::unbounded();
        let (event_tx, _event_rx) = mpsc::channel(1);
        let (keepalive_tx, mut keepalive_rx) = mpsc::channel(1);
        let read_loop = spawn_read_loop(token.clone(), frame_rx, event_tx, keepalive_tx);

        // Four failures in total, but never three in a row.
        for _ in 0..2 {
            frame_tx
                .unbounded_send(Err("timeout".to_string()))
                .expect("send frame");
        }
        frame_tx
            .unbounded_send(Ok(Message::Ping(Bytes::new())))
            .expect("send frame");
        for _ in 0..2 {
            frame_tx
                .unbounded_send(Err("timeout".to_string()))
                .expect("send frame");
        }
        frame_tx
            .unbounded_send(Ok(Message::Ping(Bytes::new())))
            .expect("send frame");

        keepalive_rx.recv().await.expect("keepalive tick");
        assert!(!token.is_cancelled());

        // Ending the stream counts as failures and exhausts the budget.
        drop(frame_tx);
        read_loop.await.expect("read loop");
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_should_drop_undecodable_frames_and_preserve_event_order() {
        let token = CancellationToken::new();
        let (frame_tx, frame_rx) = frame_mpsc::unbounded();
        let (event_tx, mut event_rx) = mpsc::channel(1);
        let (keepalive_tx, _keepalive_rx) = mpsc::channel(1);
        let read_loop = spawn_read_loop(token.clone(), frame_rx, event_tx, keepalive_tx);

        frame_tx
            .unbounded_send(Ok(Message::Text("not json".into())))
            .expect("send frame");
        frame_tx
            .unbounded_send(Ok(Message::Text(r#"{"type":"surprise"}"#.into())))
            .expect("send frame");
        frame_tx
            .unbounded_send(Ok(Message::Text(
                r#"{"type":"hello","num_connections":1}"#.into(),
            )))
            .expect("send frame");
        frame_tx
            .unbounded_send(Ok(Message::Text(
                r#"{"type":"slash_commands","envelope_id":"E1","payload":{}}"#.into(),
            )))
            .expect("send frame");

        // Only the decodable frames arrive, in receive order.
        assert!(matches!(
            event_rx.recv().await.expect("event"),
            Event::Hello(_)
        ));
        match event_rx.recv().await.expect("event") {
            Event::Command(command) => assert_eq!(command.envelope_id, "E1"),
            other => panic!("expected command, got {other:?}"),
        }
        assert!(!token.is_cancelled());

        token.cancel();
        read_loop.await.expect("read loop");
    }

    #[tokio::test]
    async fn test_should_forward_ping_as_keepalive_tick() {
        let token = CancellationToken::new();
        let (frame_tx, frame_rx) = frame_mpsc::unbounded();
        let (event_tx, _event_rx) = mpsc::channel(1);
        let (keepalive_tx, mut keepalive_rx) = mpsc::channel(1);
        let read_loop = spawn_read_loop(token.clone(), frame_rx, event_tx, keepalive_tx);

        frame_tx
            .unbounded_send(Ok(Message::Ping(Bytes::from_static(b"ka"))))
            .expect("send frame");
        keepalive_rx.recv().await.expect("keepalive tick");

        token.cancel();
        read_loop.await.expect("read loop");
    }

    #[tokio::test]
    async fn test_should_stop_promptly_on_cancellation() {
        let token = CancellationToken::new();
        let (_frame_tx, frame_rx) = frame_mpsc::unbounded::<Frame>();
        let (event_tx, _event_rx) = mpsc::channel(1);
        let (keepalive_tx, _keepalive_rx) = mpsc::channel(1);
        let read_loop = spawn_read_loop(token.clone(), frame_rx, event_tx, keepalive_tx);

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), read_loop)
            .await
            .expect("stopped in time")
            .expect("join");
    }
}
