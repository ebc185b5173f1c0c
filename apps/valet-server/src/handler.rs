//! Event handler wiring the Socket Mode engine to the responders.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use valet_slack::bot::EventHandler;
use valet_slack::payload::{InteractivePayload, SlashCommandPayload};

use crate::actions;
use crate::commands;
use crate::state::AppState;

/// Consumes dispatched events and drives the command/action routers.
///
/// Every invocation runs as its own fire-and-forget task inside the engine;
/// failures are logged where they happen and never bubble back.
#[derive(Debug)]
pub struct ValetHandler {
    state: Arc<AppState>,
}

impl ValetHandler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl EventHandler for ValetHandler {
    #[instrument(
        skip(self, payload),
        fields(user = %payload.user_id, channel = %payload.channel_id)
    )]
    async fn handle_command_event(&self, payload: SlashCommandPayload) {
        commands::respond_command(&self.state, &payload).await;
    }

    #[instrument(skip(self, payload), fields(user = %payload.user.id))]
    async fn handle_interactive_event(&self, payload: InteractivePayload) {
        actions::respond_actions(&self.state, &payload).await;
    }
}
