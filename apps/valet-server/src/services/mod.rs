//! Collaborator interfaces consumed by the responders.
//!
//! The routers and message builders only talk to these narrow traits; the
//! modules below provide the default implementations (public-data portal,
//! Anthropic Messages API, in-memory settings). Tests substitute fakes.

pub mod anthropic;
pub mod portal;
pub mod settings;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServerError;

/// One public holiday inside a queried month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    /// Day of month (1-31).
    pub day: u32,
    pub name: String,
}

/// One hour of the ultra-short-term forecast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastEntry {
    /// Forecast timestamp in `YYYYMMDDHHMM`.
    pub time: String,
    /// Temperature in °C.
    pub temperature: i32,
    /// Sky condition label.
    pub sky: String,
    /// Precipitation form label.
    pub precipitation: String,
}

/// Per-channel notification flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelSettings {
    pub standup_reminder: bool,
    pub weekly_digest: bool,
}

/// Source of public holiday data.
#[async_trait]
pub trait HolidayCalendar: Send + Sync {
    async fn list_holidays(&self, year: i32, month: u32) -> Result<Vec<Holiday>, ServerError>;
}

/// Source of short-term weather data.
#[async_trait]
pub trait WeatherForecast: Send + Sync {
    async fn ultra_short_forecast(&self) -> Result<Vec<ForecastEntry>, ServerError>;
}

/// Text generation for standup summaries.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, texts: &[String]) -> Result<String, ServerError>;
}

/// Per-channel settings and recorded standup message history.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn channel_settings(&self, channel: &str) -> Result<ChannelSettings, ServerError>;

    async fn set_standup_reminder(&self, channel: &str, enabled: bool)
        -> Result<(), ServerError>;

    async fn set_weekly_digest(&self, channel: &str, enabled: bool) -> Result<(), ServerError>;

    /// Timestamps of the standup prompt messages posted to a channel.
    async fn standup_history(&self, channel: &str) -> Result<Vec<f64>, ServerError>;
}

/// Bundle of all collaborators, shared across handler tasks.
#[derive(Clone)]
pub struct Services {
    pub holidays: Arc<dyn HolidayCalendar>,
    pub forecast: Arc<dyn WeatherForecast>,
    pub generator: Arc<dyn TextGenerator>,
    pub settings: Arc<dyn SettingsStore>,
}
