//! End-to-end Socket Mode session exercise against an in-process gateway:
//! handshake, hello, command dispatch, envelope acknowledgment, and a
//! disconnect-driven reconnect, all without leaving the test process.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use valet_slack::api::SlackClient;
use valet_slack::bot::{Bot, EventHandler};
use valet_slack::payload::{InteractivePayload, SlashCommandPayload};

struct CapturingHandler {
    commands: mpsc::UnboundedSender<SlashCommandPayload>,
}

#[async_trait]
impl EventHandler for CapturingHandler {
    async fn handle_command_event(&self, payload: SlashCommandPayload) {
        let _ = self.commands.send(payload);
    }

    async fn handle_interactive_event(&self, _payload: InteractivePayload) {}
}

/// Accepts WebSocket connections and scripts the gateway side: the first
/// session delivers hello plus one command envelope, records the ack, and
/// then requests a disconnect; later sessions just greet and idle.
fn spawn_gateway(
    listener: TcpListener,
    session_tx: mpsc::UnboundedSender<usize>,
    ack_tx: mpsc::UnboundedSender<String>,
) {
    tokio::spawn(async move {
        let sessions = AtomicUsize::new(0);
        loop {
            let Ok((stream, _addr)) = listener.accept().await else {
                return;
            };
            let session = sessions.fetch_add(1, Ordering::SeqCst);
            let _ = session_tx.send(session);
            let ack_tx = ack_tx.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                let _ = ws
                    .send(Message::Text(
                        r#"{"type":"hello","num_connections":1}"#.into(),
                    ))
                    .await;

                if session == 0 {
                    let envelope = serde_json::json!({
                        "type": "slash_commands",
                        "envelope_id": "E1",
                        "accepts_response_payload": false,
                        "payload": {
                            "command": "/valet",
                            "text": "weather",
                            "user_id": "U1",
                            "channel_id": "C1",
                            "response_url": "https://example.invalid/hook",
                        },
                    });
                    let _ = ws.send(Message::Text(envelope.to_string().into())).await;

                    while let Some(Ok(message)) = ws.next().await {
                        if let Message::Text(text) = message {
                            let _ = ack_tx.send(text.as_str().to_string());
                            break;
                        }
                    }

                    let _ = ws
                        .send(Message::Text(
                            r#"{"type":"disconnect","reason":"refresh_requested"}"#.into(),
                        ))
                        .await;
                }

                // Drain until the client tears the connection down.
                while ws.next().await.is_some() {}
            });
        }
    });
}

#[tokio::test]
async fn test_should_ack_commands_and_reconnect_after_disconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let (session_tx, mut session_rx) = mpsc::unbounded_channel();
    let (ack_tx, mut ack_rx) = mpsc::unbounded_channel();
    spawn_gateway(listener, session_tx, ack_tx);

    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apps.connections.open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "url": format!("ws://{addr}"),
        })))
        .mount(&api)
        .await;

    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    let client = SlackClient::with_base_url("xapp-1-test".into(), "xoxb-test".into(), api.uri());
    let bot = Bot::new(client, CapturingHandler { commands: command_tx });

    let shutdown = CancellationToken::new();
    let run = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { bot.run(shutdown).await })
    };

    // First session comes up.
    let first = timeout(Duration::from_secs(5), session_rx.recv())
        .await
        .expect("first session in time")
        .expect("session");
    assert_eq!(first, 0);

    // Exactly one acknowledgment, echoing the envelope id.
    let ack = timeout(Duration::from_secs(5), ack_rx.recv())
        .await
        .expect("ack in time")
        .expect("ack");
    let ack: serde_json::Value = serde_json::from_str(&ack).expect("ack json");
    assert_eq!(ack["envelope_id"], "E1");

    // The handler received the command payload.
    let payload = timeout(Duration::from_secs(5), command_rx.recv())
        .await
        .expect("dispatch in time")
        .expect("payload");
    assert_eq!(payload.text, "weather");
    assert_eq!(payload.channel_id, "C1");

    // The disconnect event closes the session and a fresh one opens,
    // without the supervisor returning.
    let second = timeout(Duration::from_secs(5), session_rx.recv())
        .await
        .expect("reconnect in time")
        .expect("session");
    assert_eq!(second, 1);
    assert!(!run.is_finished());

    shutdown.cancel();
    let result = timeout(Duration::from_secs(5), run)
        .await
        .expect("shutdown in time")
        .expect("join");
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_should_fail_fast_when_handshake_is_rejected() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apps.connections.open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": false,
            "error": "invalid_auth",
        })))
        .mount(&api)
        .await;

    let (command_tx, _command_rx) = mpsc::unbounded_channel();
    let client = SlackClient::with_base_url("xapp-1-test".into(), "xoxb-test".into(), api.uri());
    let bot = Bot::new(client, CapturingHandler { commands: command_tx });

    let err = bot
        .run(CancellationToken::new())
        .await
        .expect_err("handshake failure is fatal");
    assert!(err.to_string().contains("invalid_auth"));
}
