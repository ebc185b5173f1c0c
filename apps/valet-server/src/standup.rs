//! Collection of a user's standup notes for the current week.
//!
//! The settings store records the timestamp of every standup prompt message
//! the bot posts. For each prompt since the most recent Monday, the user's
//! first reply in its thread is collected. Thread lookups run concurrently;
//! a failed lookup only loses that day's entry.

use tracing::{error, warn};

use crate::clock;
use crate::state::AppState;

/// Returns `(message_ts, text)` pairs ordered by timestamp.
pub async fn collect_messages(state: &AppState, channel: &str, user: &str) -> Vec<(f64, String)> {
    let history = match state.services().settings.standup_history(channel).await {
        Ok(history) => history,
        Err(e) => {
            error!(error = %e, channel, "failed to load standup history");
            return Vec::new();
        }
    };

    let horizon = clock::last_monday(clock::now()).timestamp() as f64;
    let recent: Vec<f64> = history.into_iter().filter(|ts| *ts >= horizon).collect();
    if recent.is_empty() {
        return Vec::new();
    }

    let lookups = recent.into_iter().map(|ts| async move {
        match state.slack().list_replies(channel, ts).await {
            Ok(replies) => replies
                .into_iter()
                .find(|reply| reply.user == user)
                .map(|reply| (ts, reply.text)),
            Err(e) => {
                warn!(error = %e, channel, ts, "failed to list replies");
                None
            }
        }
    });

    let mut messages: Vec<(f64, String)> = futures::future::join_all(lookups)
        .await
        .into_iter()
        .flatten()
        .collect();
    messages.sort_by(|a, b| a.0.total_cmp(&b.0));
    messages
}
