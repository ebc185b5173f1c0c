//! Event dispatch and envelope acknowledgment for a single session.
//!
//! Consumes decoded events in receive order. Command and interactive
//! envelopes are handed to the application handler as fire-and-forget tasks
//! (handler bodies make their own outbound calls and must not stall the
//! loop), then acknowledged on the same connection. Acknowledgments are
//! written in event-receipt order, not handler-completion order.

use std::sync::Arc;

use futures::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::event::Event;

use super::{EventHandler, ReconnectSignal};

/// Upper bound on concurrently running handler tasks.
///
/// A burst of envelopes beyond this bound makes the event loop wait for a
/// permit before spawning the next handler; no event is ever dropped.
pub(crate) const MAX_INFLIGHT_HANDLERS: usize = 64;

/// Runs until the session is cancelled or the event channel closes.
///
/// This loop is the only writer on the session: every acknowledgment goes
/// through `sink`, exactly once per command/interactive envelope, whether or
/// not the handler succeeds.
pub(crate) async fn run_event_loop<W, H>(
    token: CancellationToken,
    mut sink: W,
    mut events: mpsc::Receiver<Event>,
    handler: Arc<H>,
    reconnect: Arc<ReconnectSignal>,
    handler_limit: Arc<Semaphore>,
) where
    W: Sink<Message> + Unpin,
    W::Error: std::fmt::Display,
    H: EventHandler,
{
    loop {
        let event = tokio::select! {
            () = token.cancelled() => {
                info!("stopping event loop");
                return;
            }
            event = events.recv() => match event {
                Some(event) => event,
                None => {
                    info!("event channel closed, stopping event loop");
                    return;
                }
            },
        };

        match event {
            Event::Hello(hello) => {
                info!(
                    connections = hello.connection_count,
                    host = hello.debug_info.host,
                    app_id = hello.connection_info.app_id,
                    "connected to the gateway"
                );
            }
            Event::Disconnect(disconnect) => {
                info!(reason = disconnect.reason, "gateway requested reconnect");
                if !reconnect.raise() {
                    warn!("reconnect signal already pending, dropping duplicate");
                }
            }
            Event::Command(event) => {
                let Some(permit) = acquire_permit(&token, &handler_limit).await else {
                    return;
                };
                let handler = Arc::clone(&handler);
                let payload = event.payload;
                tokio::spawn(async move {
                    let _permit = permit;
                    handler.handle_command_event(payload).await;
                });
                acknowledge(&mut sink, &event.envelope_id).await;
            }
            Event::Interactive(event) => {
                let Some(permit) = acquire_permit(&token, &handler_limit).await else {
                    return;
                };
                let handler = Arc::clone(&handler);
                let payload = event.payload;
                tokio::spawn(async move {
                    let _permit = permit;
                    handler.handle_interactive_event(payload).await;
                });
                acknowledge(&mut sink, &event.envelope_id).await;
            }
        }
    }
}

/// Waits for a handler slot, giving up only when the session is cancelled.
async fn acquire_permit(
    token: &CancellationToken,
    handler_limit: &Arc<Semaphore>,
) -> Option<OwnedSemaphorePermit> {
    tokio::select! {
        () = token.cancelled() => {
            info!("stopping event loop");
            None
        }
        permit = Arc::clone(handler_limit).acquire_owned() => permit.ok(),
    }
}

/// Echoes an envelope's correlation id back on the session.
async fn acknowledge<W>(sink: &mut W, envelope_id: &str)
where
    W: Sink<Message> + Unpin,
    W::Error: std::fmt::Display,
{
    let ack = serde_json::json!({ "envelope_id": envelope_id });
    if let Err(e) = sink.send(Message::Text(ack.to_string().into())).await {
        error!(error = %e, envelope_id, "failed to acknowledge envelope");
    }
}
