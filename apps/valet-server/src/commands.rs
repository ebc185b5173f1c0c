//! Slash command routing.
//!
//! Maps the text of a `/valet <text>` invocation onto a fixed set of
//! commands and posts the matching response to the command's callback URL.
//! Unrecognized text falls back to the guidance response. The router is
//! stateless; delivery failure is handled (and swallowed) by
//! [`respond`](crate::respond::respond).

use tracing::debug;

use valet_slack::payload::{ResponsePayload, SlashCommandPayload};

use crate::messages;
use crate::respond::respond;
use crate::state::AppState;

/// A recognized `/valet` command.
///
/// # Examples
///
/// ```
/// use valet_server::commands::Command;
///
/// assert_eq!(Command::parse("weather"), Command::Forecast);
/// assert_eq!(Command::parse(""), Command::Empty);
/// assert_eq!(Command::parse("make me a sandwich"), Command::Undefined);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// No text after the command; shows the feature overview.
    Empty,
    /// `help` — feature overview.
    Manual,
    /// `holidays` — holiday calendar for this and next month.
    HolidayCalendar,
    /// `weather` — ultra-short-term forecast.
    Forecast,
    /// `standup` — this week's standup notes.
    StandupList,
    /// `summary` — generated summary of this week's standup notes.
    StandupSummary,
    /// `config` — per-channel notification settings.
    Config,
    /// Anything else; routed to the guidance response.
    Undefined,
}

impl Command {
    /// Maps command text onto a command. Exact matches only.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "" => Self::Empty,
            "help" => Self::Manual,
            "holidays" => Self::HolidayCalendar,
            "weather" => Self::Forecast,
            "standup" => Self::StandupList,
            "summary" => Self::StandupSummary,
            "config" => Self::Config,
            _ => Self::Undefined,
        }
    }
}

/// Builds and delivers the response for a slash command invocation.
pub async fn respond_command(state: &AppState, payload: &SlashCommandPayload) {
    let command = Command::parse(&payload.text);
    debug!(
        ?command,
        user = %payload.user_id,
        channel = %payload.channel_id,
        "routing slash command"
    );

    let blocks = match command {
        Command::Empty | Command::Manual => messages::manual(),
        Command::HolidayCalendar => messages::holiday_calendar(state).await,
        Command::Forecast => messages::forecast(state).await,
        Command::StandupList => {
            messages::standup_list(state, &payload.channel_id, &payload.user_id).await
        }
        Command::StandupSummary => {
            messages::standup_summary(state, &payload.channel_id, &payload.user_id).await
        }
        Command::Config => messages::channel_config(state, &payload.channel_id).await,
        Command::Undefined => messages::guide(),
    };

    respond(
        state.http(),
        &payload.response_url,
        &ResponsePayload {
            blocks,
            replace_original: true,
            ..Default::default()
        },
    )
    .await;
}
