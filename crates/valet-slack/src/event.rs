//! Typed events decoded from Socket Mode frames.
//!
//! Every frame carries a `type` discriminator. Decoding probes the
//! discriminator first and then deserializes the concrete event, so an
//! unknown type is reported distinctly from malformed JSON and the dispatch
//! site can match exhaustively over a closed set of variants.

use serde::Deserialize;
use thiserror::Error;

use crate::payload::{InteractivePayload, SlashCommandPayload};

/// Error produced while decoding an inbound frame into an [`Event`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame's `type` field named an event this engine does not know.
    #[error("undefined event type: {0:?}")]
    UnknownType(String),

    /// The frame was not valid JSON, or a known event failed to deserialize.
    #[error("malformed event frame: {0}")]
    Json(#[from] serde_json::Error),
}

/// Connection metadata delivered with a `hello` event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionInfo {
    #[serde(default)]
    pub app_id: String,
}

/// Gateway-side debug metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebugInfo {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub started: String,
    #[serde(default)]
    pub build_number: u64,
    #[serde(rename = "approximate_connection_time", default)]
    pub connection_time: u64,
}

/// Sent by the gateway once per connection to confirm establishment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HelloEvent {
    #[serde(rename = "num_connections", default)]
    pub connection_count: u32,
    #[serde(default)]
    pub connection_info: ConnectionInfo,
    #[serde(default)]
    pub debug_info: DebugInfo,
}

/// Sent by the gateway when it wants this client to reconnect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisconnectEvent {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub debug_info: DebugInfo,
}

/// A slash command envelope. Must be acknowledged with its `envelope_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandEvent {
    #[serde(default)]
    pub envelope_id: String,
    #[serde(default)]
    pub accepts_response_payload: bool,
    #[serde(default)]
    pub payload: SlashCommandPayload,
}

/// An interactive component envelope. Must be acknowledged with its
/// `envelope_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractiveEvent {
    #[serde(default)]
    pub envelope_id: String,
    #[serde(default)]
    pub accepts_response_payload: bool,
    #[serde(default)]
    pub payload: InteractivePayload,
}

/// An inbound Socket Mode event.
///
/// # Examples
///
/// ```
/// use valet_slack::event::Event;
///
/// let event = Event::decode(r#"{"type":"hello","num_connections":2}"#).unwrap();
/// assert!(matches!(event, Event::Hello(hello) if hello.connection_count == 2));
/// ```
#[derive(Debug, Clone)]
pub enum Event {
    Hello(HelloEvent),
    Disconnect(DisconnectEvent),
    Command(CommandEvent),
    Interactive(InteractiveEvent),
}

impl Event {
    /// Decodes a raw text frame into a typed event.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownType`] for a discriminator outside the
    /// known set, and [`DecodeError::Json`] for malformed frames.
    pub fn decode(data: &str) -> Result<Self, DecodeError> {
        #[derive(Deserialize)]
        struct Discriminator {
            #[serde(rename = "type", default)]
            kind: String,
        }

        let discriminator: Discriminator = serde_json::from_str(data)?;
        match discriminator.kind.as_str() {
            "hello" => Ok(Self::Hello(serde_json::from_str(data)?)),
            "disconnect" => Ok(Self::Disconnect(serde_json::from_str(data)?)),
            "slash_commands" => Ok(Self::Command(serde_json::from_str(data)?)),
            "interactive" => Ok(Self::Interactive(serde_json::from_str(data)?)),
            other => Err(DecodeError::UnknownType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_decode_hello_event() {
        let event = Event::decode(
            r#"{"type":"hello","num_connections":1,"debug_info":{"host":"wss-111"}}"#,
        )
        .expect("decode");
        match event {
            Event::Hello(hello) => {
                assert_eq!(hello.connection_count, 1);
                assert_eq!(hello.debug_info.host, "wss-111");
            }
            other => panic!("expected hello, got {other:?}"),
        }
    }

    #[test]
    fn test_should_decode_hello_event_with_empty_envelope_id() {
        let event = Event::decode(r#"{"type":"hello","envelope_id":"","payload":{}}"#)
            .expect("decode");
        assert!(matches!(event, Event::Hello(_)));
    }

    #[test]
    fn test_should_decode_disconnect_event() {
        let event = Event::decode(r#"{"type":"disconnect","reason":"refresh_requested"}"#)
            .expect("decode");
        match event {
            Event::Disconnect(disconnect) => assert_eq!(disconnect.reason, "refresh_requested"),
            other => panic!("expected disconnect, got {other:?}"),
        }
    }

    #[test]
    fn test_should_decode_command_event() {
        let event = Event::decode(
            r#"{
                "type": "slash_commands",
                "envelope_id": "E1",
                "accepts_response_payload": false,
                "payload": {"command": "/valet", "text": "holidays", "channel_id": "C1"}
            }"#,
        )
        .expect("decode");
        match event {
            Event::Command(command) => {
                assert_eq!(command.envelope_id, "E1");
                assert_eq!(command.payload.text, "holidays");
                assert_eq!(command.payload.channel_id, "C1");
            }
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn test_should_decode_interactive_event() {
        let event = Event::decode(
            r#"{
                "type": "interactive",
                "envelope_id": "E2",
                "payload": {
                    "type": "block_actions",
                    "actions": [{"type": "button", "action_id": "done"}]
                }
            }"#,
        )
        .expect("decode");
        match event {
            Event::Interactive(interactive) => {
                assert_eq!(interactive.envelope_id, "E2");
                assert_eq!(interactive.payload.actions.len(), 1);
            }
            other => panic!("expected interactive, got {other:?}"),
        }
    }

    #[test]
    fn test_should_reject_unknown_event_type() {
        let err = Event::decode(r#"{"type":"surprise"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownType(kind) if kind == "surprise"));
    }

    #[test]
    fn test_should_reject_missing_event_type() {
        let err = Event::decode(r#"{"envelope_id":"E1"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownType(kind) if kind.is_empty()));
    }

    #[test]
    fn test_should_reject_malformed_frame() {
        let err = Event::decode("not json").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_should_default_missing_command_payload() {
        let event = Event::decode(r#"{"type":"slash_commands","envelope_id":"E3"}"#)
            .expect("decode");
        match event {
            Event::Command(command) => assert!(command.payload.text.is_empty()),
            other => panic!("expected command, got {other:?}"),
        }
    }
}
