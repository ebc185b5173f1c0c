//! In-memory channel settings store.
//!
//! Keeps per-channel notification flags and the recorded standup message
//! history behind the [`SettingsStore`] trait. Uses [`DashMap`] for
//! lock-free concurrent access from handler tasks. State does not survive a
//! restart; a durable backing store can replace this behind the same trait.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::error::ServerError;

use super::{ChannelSettings, SettingsStore};

/// Standup prompts retained per channel (two weeks of daily prompts).
const STANDUP_HISTORY_LIMIT: usize = 14;

/// In-memory [`SettingsStore`] implementation.
///
/// # Examples
///
/// ```
/// use valet_server::services::settings::MemorySettingsStore;
///
/// let store = MemorySettingsStore::new();
/// store.record_standup_message("C123", 1735516800.0001);
/// ```
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: DashMap<String, ChannelSettings>,
    history: DashMap<String, Vec<f64>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a standup prompt message posted to a channel. The oldest
    /// entries fall off beyond [`STANDUP_HISTORY_LIMIT`].
    pub fn record_standup_message(&self, channel: &str, ts: f64) {
        debug!(channel, ts, "recording standup message");
        let mut history = self.history.entry(channel.to_string()).or_default();
        history.push(ts);
        if history.len() > STANDUP_HISTORY_LIMIT {
            let excess = history.len() - STANDUP_HISTORY_LIMIT;
            history.drain(..excess);
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn channel_settings(&self, channel: &str) -> Result<ChannelSettings, ServerError> {
        Ok(self
            .settings
            .get(channel)
            .map(|entry| *entry.value())
            .unwrap_or_default())
    }

    async fn set_standup_reminder(
        &self,
        channel: &str,
        enabled: bool,
    ) -> Result<(), ServerError> {
        debug!(channel, enabled, "updating standup reminder setting");
        self.settings
            .entry(channel.to_string())
            .or_default()
            .standup_reminder = enabled;
        Ok(())
    }

    async fn set_weekly_digest(&self, channel: &str, enabled: bool) -> Result<(), ServerError> {
        debug!(channel, enabled, "updating weekly digest setting");
        self.settings
            .entry(channel.to_string())
            .or_default()
            .weekly_digest = enabled;
        Ok(())
    }

    async fn standup_history(&self, channel: &str) -> Result<Vec<f64>, ServerError> {
        Ok(self
            .history
            .get(channel)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_should_default_settings_for_unknown_channel() {
        let store = MemorySettingsStore::new();
        let settings = store.channel_settings("C999").await.expect("settings");
        assert_eq!(settings, ChannelSettings::default());
    }

    #[tokio::test]
    async fn test_should_toggle_standup_reminder() {
        let store = MemorySettingsStore::new();
        store
            .set_standup_reminder("C123", true)
            .await
            .expect("enable");
        assert!(store.channel_settings("C123").await.expect("settings").standup_reminder);

        store
            .set_standup_reminder("C123", false)
            .await
            .expect("disable");
        assert!(!store.channel_settings("C123").await.expect("settings").standup_reminder);
    }

    #[tokio::test]
    async fn test_should_keep_flags_independent() {
        let store = MemorySettingsStore::new();
        store.set_weekly_digest("C123", true).await.expect("enable");
        let settings = store.channel_settings("C123").await.expect("settings");
        assert!(settings.weekly_digest);
        assert!(!settings.standup_reminder);
    }

    #[tokio::test]
    async fn test_should_return_recorded_history() {
        let store = MemorySettingsStore::new();
        store.record_standup_message("C123", 100.0);
        store.record_standup_message("C123", 200.0);
        store.record_standup_message("C456", 300.0);

        let history = store.standup_history("C123").await.expect("history");
        assert_eq!(history, vec![100.0, 200.0]);
        assert!(store.standup_history("C000").await.expect("history").is_empty());
    }

    #[tokio::test]
    async fn test_should_drop_oldest_history_beyond_retention() {
        let store = MemorySettingsStore::new();
        for day in 0..20 {
            store.record_standup_message("C123", f64::from(day));
        }

        let history = store.standup_history("C123").await.expect("history");
        assert_eq!(history.len(), STANDUP_HISTORY_LIMIT);
        assert_eq!(history[0], 6.0);
        assert_eq!(history[STANDUP_HISTORY_LIMIT - 1], 19.0);
    }
}
