//! Interactive action routing.
//!
//! Dispatches first on the action's element kind (button vs. select), then
//! on its identifier. Buttons backed by a slow downstream call first post an
//! "in progress" placeholder, then the real response; both replace the
//! original message so the placeholder is overwritten, never appended.

use tracing::warn;

use valet_slack::blockkit::{Block, ElementKind};
use valet_slack::payload::{InteractiveAction, InteractivePayload, ResponsePayload};

use crate::messages;
use crate::respond::respond;
use crate::state::AppState;

pub const BUTTON_DONE: &str = "done";
pub const BUTTON_MANUAL: &str = "help";
pub const BUTTON_HOLIDAY_CALENDAR: &str = "holidays";
pub const BUTTON_FORECAST: &str = "weather";
pub const BUTTON_STANDUP_LIST: &str = "standup_list";
pub const BUTTON_STANDUP_SUMMARY: &str = "standup_summary";
pub const BUTTON_CONFIG: &str = "config";

pub const SELECT_STANDUP_REMINDER: &str = "standup_reminder_enable";
pub const SELECT_WEEKLY_DIGEST: &str = "weekly_digest_enable";

/// Routes every action in an interactive payload.
pub async fn respond_actions(state: &AppState, payload: &InteractivePayload) {
    for action in &payload.actions {
        respond_action(state, payload, action).await;
    }
}

async fn respond_action(state: &AppState, payload: &InteractivePayload, action: &InteractiveAction) {
    match action.kind {
        ElementKind::Button => respond_button(state, payload, action).await,
        ElementKind::StaticSelect => respond_select(state, payload, action).await,
        ElementKind::Unknown => {
            warn!(action_id = %action.action_id, "undefined action kind");
        }
    }
}

async fn respond_button(
    state: &AppState,
    payload: &InteractivePayload,
    action: &InteractiveAction,
) {
    match action.action_id.as_str() {
        BUTTON_DONE => {
            respond(
                state.http(),
                &payload.response_url,
                &ResponsePayload {
                    delete_original: true,
                    ..Default::default()
                },
            )
            .await;
        }
        BUTTON_MANUAL => {
            replace_with(state, &payload.response_url, messages::manual()).await;
        }
        BUTTON_HOLIDAY_CALENDAR => {
            respond_progress(state, &payload.response_url).await;
            replace_with(state, &payload.response_url, messages::holiday_calendar(state).await)
                .await;
        }
        BUTTON_FORECAST => {
            respond_progress(state, &payload.response_url).await;
            replace_with(state, &payload.response_url, messages::forecast(state).await).await;
        }
        BUTTON_STANDUP_LIST => {
            respond_progress(state, &payload.response_url).await;
            let blocks =
                messages::standup_list(state, &payload.container.channel_id, &payload.user.id)
                    .await;
            replace_with(state, &payload.response_url, blocks).await;
        }
        BUTTON_STANDUP_SUMMARY => {
            respond_progress(state, &payload.response_url).await;
            let blocks =
                messages::standup_summary(state, &payload.container.channel_id, &payload.user.id)
                    .await;
            replace_with(state, &payload.response_url, blocks).await;
        }
        BUTTON_CONFIG => {
            respond_progress(state, &payload.response_url).await;
            let blocks = messages::channel_config(state, &payload.channel.id).await;
            replace_with(state, &payload.response_url, blocks).await;
        }
        other => {
            warn!(action_id = other, "undefined button action");
        }
    }
}

async fn respond_select(
    state: &AppState,
    payload: &InteractivePayload,
    action: &InteractiveAction,
) {
    let channel = &payload.container.channel_id;
    match action.action_id.as_str() {
        SELECT_STANDUP_REMINDER => {
            let enabled = action.selected_option.value == "on";
            if let Err(e) = state
                .services()
                .settings
                .set_standup_reminder(channel, enabled)
                .await
            {
                warn!(error = %e, channel = %channel, "failed to update standup reminder setting");
            }
            let blocks = messages::channel_config(state, channel).await;
            replace_with(state, &payload.response_url, blocks).await;
        }
        SELECT_WEEKLY_DIGEST => {
            let enabled = action.selected_option.value == "on";
            if let Err(e) = state
                .services()
                .settings
                .set_weekly_digest(channel, enabled)
                .await
            {
                warn!(error = %e, channel = %channel, "failed to update weekly digest setting");
            }
            let blocks = messages::channel_config(state, channel).await;
            replace_with(state, &payload.response_url, blocks).await;
        }
        other => {
            warn!(action_id = other, "undefined select action");
        }
    }
}

async fn respond_progress(state: &AppState, url: &str) {
    replace_with(state, url, messages::progress()).await;
}

async fn replace_with(state: &AppState, url: &str, blocks: Vec<Block>) {
    respond(
        state.http(),
        url,
        &ResponsePayload {
            blocks,
            replace_original: true,
            ..Default::default()
        },
    )
    .await;
}
