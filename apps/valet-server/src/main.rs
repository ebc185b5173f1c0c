//! Valet Slack assistant — Socket Mode entry point.
//!
//! Connects to Slack via outbound WebSocket (Socket Mode), receives slash
//! commands and interactive actions, and answers with holiday calendars,
//! weather, standup digests, and channel settings.

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use valet_server::config;
use valet_server::handler::ValetHandler;
use valet_server::services::anthropic::AnthropicClient;
use valet_server::services::portal::PortalClient;
use valet_server::services::settings::MemorySettingsStore;
use valet_server::services::Services;
use valet_server::state::AppState;
use valet_slack::api::SlackClient;
use valet_slack::bot::Bot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("valet_server=info".parse()?)
                .add_directive("valet_slack=info".parse()?),
        )
        .init();

    let config_path = config::default_config_path().context("Failed to determine config path")?;
    let server_config = config::ServerConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    info!("configuration loaded");

    let slack = SlackClient::new(
        server_config.slack.app_token.clone(),
        server_config.slack.bot_token.clone(),
    );
    let portal = Arc::new(PortalClient::new(server_config.portal.clone()));
    let services = Services {
        holidays: Arc::clone(&portal) as Arc<dyn valet_server::services::HolidayCalendar>,
        forecast: portal as Arc<dyn valet_server::services::WeatherForecast>,
        generator: Arc::new(AnthropicClient::new(server_config.anthropic.clone())),
        settings: Arc::new(MemorySettingsStore::new()),
    };
    let state = Arc::new(AppState::new(services, slack.clone()));

    // Cancel the root scope on SIGINT/SIGTERM; every live session scope is
    // derived from it and winds down with the current session.
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let ctrl_c = tokio::signal::ctrl_c();
            #[cfg(unix)]
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("register SIGTERM handler");

            #[cfg(unix)]
            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT, shutting down...");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, shutting down...");
                }
            }

            #[cfg(not(unix))]
            {
                ctrl_c.await.ok();
                info!("received SIGINT, shutting down...");
            }

            shutdown.cancel();
        });
    }

    let bot = Bot::new(slack, ValetHandler::new(state));
    info!("starting socket mode connection");
    bot.run(shutdown)
        .await
        .context("Socket Mode event loop failed")?;

    info!("server shut down cleanly");
    Ok(())
}
