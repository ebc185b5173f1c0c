//! Payload types carried inside Socket Mode envelopes and the outbound
//! response payload posted back to a `response_url`.
//!
//! Field sets follow the Slack interaction payload contracts:
//! <https://api.slack.com/interactivity/slash-commands> and
//! <https://api.slack.com/reference/interaction-payloads/block-actions>.

use serde::{Deserialize, Serialize};

use crate::blockkit::{Block, ElementKind, Text};

/// Data delivered with a slash command invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlashCommandPayload {
    /// The app's unique identifier.
    #[serde(default)]
    pub api_app_id: String,

    /// The user who triggered the command.
    #[serde(default)]
    pub user_id: String,

    /// The command that was entered (e.g. `/valet`).
    #[serde(default)]
    pub command: String,

    /// Everything the user typed after the command itself.
    #[serde(default)]
    pub text: String,

    /// Temporary webhook URL for generating message responses.
    #[serde(default)]
    pub response_url: String,

    /// Short-lived ID that allows opening a modal.
    #[serde(default)]
    pub trigger_id: String,

    #[serde(default)]
    pub team_id: String,

    #[serde(default)]
    pub channel_id: String,

    #[serde(default)]
    pub enterprise_id: String,
}

/// The user behind an interactive event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractiveUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub team_id: String,
}

/// The channel an interactive event originated from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractiveChannel {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// The surface containing the interactive component.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractiveContainer {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message_ts: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub is_ephemeral: bool,
}

/// The option picked in a select menu.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectedOption {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub text: Text,
}

/// One interactive component action (button click, select choice).
#[derive(Debug, Clone, Deserialize)]
pub struct InteractiveAction {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub action_id: String,
    #[serde(default)]
    pub block_id: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub selected_option: SelectedOption,
}

/// Data delivered with an interactive event.
///
/// A single payload can carry multiple actions; each one is routed
/// independently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractivePayload {
    /// Payload kind (`block_actions` for in-message components).
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Short-lived ID that allows opening a modal.
    #[serde(default)]
    pub trigger_id: String,

    #[serde(default)]
    pub user: InteractiveUser,

    #[serde(default)]
    pub channel: InteractiveChannel,

    #[serde(default)]
    pub container: InteractiveContainer,

    #[serde(default)]
    pub actions: Vec<InteractiveAction>,

    /// Short-lived webhook for responding to the interaction.
    #[serde(default)]
    pub response_url: String,
}

/// Who can see a response message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseVisibility {
    /// Visible to everyone in the channel.
    InChannel,
    /// Visible only to the interacting user.
    Ephemeral,
}

/// A response posted back to an event's `response_url`.
///
/// Defaults to an ephemeral message. `text` is the fallback body shown when
/// `blocks` cannot be rendered.
///
/// # Examples
///
/// ```
/// use valet_slack::payload::ResponsePayload;
///
/// let payload = ResponsePayload {
///     replace_original: true,
///     ..Default::default()
/// };
/// let value = serde_json::to_value(&payload).unwrap();
/// assert_eq!(value["replace_original"], true);
/// assert_eq!(value["delete_original"], false);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponsePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseVisibility>,

    pub text: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,

    /// Another un-threaded message to reply to.
    #[serde(rename = "thread_ts", skip_serializing_if = "Option::is_none")]
    pub thread_timestamp: Option<String>,

    /// Delete the message the interaction came from.
    pub delete_original: bool,

    /// Replace the message the interaction came from.
    pub replace_original: bool,
}
