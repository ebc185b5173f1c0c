//! Socket Mode connection supervision.
//!
//! [`Bot`] owns the outer control loop: it performs the `apps.connections.open`
//! handshake, opens a WebSocket session against the returned one-time URL,
//! and runs the session's read loop, event loop, and liveness watchdog
//! concurrently under a per-session cancellation scope. When any of them
//! ends the session — read failures, a gateway disconnect request, or a
//! keepalive timeout — the session is torn down and a fresh one is opened.
//! Only cancelling the supervisor's own scope stops the loop; there is no
//! cap on reconnect attempts, since gateway outages are expected to be
//! transient and must be survived indefinitely.

mod event_loop;
mod read_loop;
mod reconnect;
mod watchdog;

pub use reconnect::ReconnectSignal;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::SlackClient;
use crate::error::SlackError;
use crate::payload::{InteractivePayload, SlashCommandPayload};

use event_loop::{run_event_loop, MAX_INFLIGHT_HANDLERS};
use read_loop::run_read_loop;
use watchdog::run_watchdog;

/// Type alias for the WebSocket stream with optional TLS.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Handoff depth between the read loop and the event loop. A single slot
/// preserves event order and lets the read loop exert backpressure instead
/// of dropping events.
const EVENT_QUEUE_DEPTH: usize = 1;

/// Application-side consumer of dispatched events.
///
/// Both methods are fire-and-forget from the engine's point of view: the
/// event loop spawns them as tasks and observes no return value. Handlers
/// report their own failures and must tolerate duplicate delivery (a missed
/// acknowledgment makes the gateway redeliver).
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle_command_event(&self, payload: SlashCommandPayload);

    async fn handle_interactive_event(&self, payload: InteractivePayload);
}

/// One Socket Mode connection. Owned by a single supervisor iteration and
/// never reused across reconnects.
struct Session {
    stream: WsStream,
    opened_at: Instant,
}

impl Session {
    async fn open(url: &str) -> Result<Self, SlackError> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| SlackError::WebSocket(format!("WebSocket connect failed: {e}")))?;
        Ok(Self {
            stream,
            opened_at: Instant::now(),
        })
    }
}

/// Supervises the persistent Socket Mode connection.
///
/// # Examples
///
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use valet_slack::api::SlackClient;
/// use valet_slack::bot::{Bot, EventHandler};
/// use valet_slack::payload::{InteractivePayload, SlashCommandPayload};
///
/// struct NoopHandler;
///
/// #[async_trait::async_trait]
/// impl EventHandler for NoopHandler {
///     async fn handle_command_event(&self, _payload: SlashCommandPayload) {}
///     async fn handle_interactive_event(&self, _payload: InteractivePayload) {}
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SlackClient::new("xapp-1-token".into(), "xoxb-token".into());
/// let bot = Bot::new(client, NoopHandler);
/// bot.run(CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
pub struct Bot<H> {
    client: SlackClient,
    handler: Arc<H>,
    reconnect: Arc<ReconnectSignal>,
    handler_limit: Arc<Semaphore>,
}

impl<H: EventHandler> Bot<H> {
    /// Creates a supervisor around a Web API client and an event handler.
    pub fn new(client: SlackClient, handler: H) -> Self {
        Self {
            client,
            handler: Arc::new(handler),
            reconnect: Arc::new(ReconnectSignal::new()),
            handler_limit: Arc::new(Semaphore::new(MAX_INFLIGHT_HANDLERS)),
        }
    }

    /// Runs the reconnect loop until `shutdown` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `SlackError` when the Socket Mode handshake or the WebSocket
    /// connect fails. There is no internal retry for either: the caller is
    /// expected to treat this as fatal and restart the process.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), SlackError> {
        loop {
            if shutdown.is_cancelled() {
                info!("shutdown requested, leaving the connection loop");
                return Ok(());
            }

            let url = self.client.connections_open().await?;
            info!("obtained connection URL, opening session");
            let session = Session::open(&url).await?;
            self.run_session(&shutdown, session).await;
        }
    }

    /// Runs one session to completion.
    ///
    /// All three loops plus the reconnect listener share a child token; each
    /// loop cancels it on exit, so the first one to end the session drags
    /// the others down with it and teardown happens exactly once.
    async fn run_session(&self, shutdown: &CancellationToken, session: Session) {
        let token = shutdown.child_token();
        let Session { stream, opened_at } = session;
        let (sink, stream) = stream.split();
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let (keepalive_tx, keepalive_rx) = mpsc::channel(1);

        let mut tasks = JoinSet::new();
        {
            let token = token.clone();
            tasks.spawn(async move {
                run_read_loop(token.clone(), stream, event_tx, keepalive_tx).await;
                token.cancel();
            });
        }
        {
            let token = token.clone();
            let handler = Arc::clone(&self.handler);
            let reconnect = Arc::clone(&self.reconnect);
            let handler_limit = Arc::clone(&self.handler_limit);
            tasks.spawn(async move {
                run_event_loop(
                    token.clone(),
                    sink,
                    event_rx,
                    handler,
                    reconnect,
                    handler_limit,
                )
                .await;
                token.cancel();
            });
        }
        {
            let token = token.clone();
            tasks.spawn(run_watchdog(token, keepalive_rx));
        }
        {
            let token = token.clone();
            let reconnect = Arc::clone(&self.reconnect);
            tasks.spawn(async move {
                tokio::select! {
                    () = reconnect.wait() => token.cancel(),
                    () = token.cancelled() => {}
                }
            });
        }

        while tasks.join_next().await.is_some() {}
        info!(
            elapsed_secs = opened_at.elapsed().as_secs(),
            "session closed"
        );
    }
}
