//! Server configuration types and loading.
//!
//! Defines [`ServerConfig`] which is loaded from `~/.valet/config.yml`.
//! Contains Slack API tokens, the public-data portal credentials, and the
//! text-generation API settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ServerError;

/// Top-level server configuration loaded from `~/.valet/config.yml`.
///
/// # Examples
///
/// ```
/// use valet_server::config::ServerConfig;
///
/// let yaml = r#"
/// slack:
///   app_token: "xapp-1-test"
///   bot_token: "xoxb-test"
/// portal:
///   service_key: "key"
/// "#;
///
/// let config: ServerConfig = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(config.slack.app_token, "xapp-1-test");
/// assert_eq!(config.portal.grid_x, 60);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Slack API token configuration.
    pub slack: SlackConfig,

    /// Public-data portal configuration (holidays, forecasts).
    #[serde(default)]
    pub portal: PortalConfig,

    /// Text-generation API configuration (standup summaries).
    #[serde(default)]
    pub anthropic: AnthropicConfig,
}

/// Slack API token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// App-level token for Socket Mode (`xapp-...`).
    pub app_token: String,

    /// Bot User OAuth Token for Web API calls (`xoxb-...`).
    pub bot_token: String,
}

/// Public-data portal configuration.
///
/// `grid_x`/`grid_y` address the forecast grid cell the bot reports on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_portal_base_url")]
    pub base_url: String,

    /// Service key issued by the portal.
    #[serde(default)]
    pub service_key: String,

    #[serde(default = "default_grid_x")]
    pub grid_x: i32,

    #[serde(default = "default_grid_y")]
    pub grid_y: i32,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_portal_base_url(),
            service_key: String::new(),
            grid_x: default_grid_x(),
            grid_y: default_grid_y(),
        }
    }
}

/// Text-generation API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_anthropic_model")]
    pub model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: default_anthropic_base_url(),
            api_key: String::new(),
            model: default_anthropic_model(),
        }
    }
}

fn default_portal_base_url() -> String {
    "https://apis.data.go.kr".to_string()
}

fn default_grid_x() -> i32 {
    60
}

fn default_grid_y() -> i32 {
    123
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_anthropic_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

/// Returns the default configuration directory path (`~/.valet/`).
///
/// # Errors
///
/// Returns `ServerError::Config` if the `HOME` environment variable is not set.
pub fn default_config_dir() -> Result<PathBuf, ServerError> {
    let home = std::env::var("HOME")
        .map_err(|_| ServerError::Config("HOME environment variable not set".into()))?;
    Ok(PathBuf::from(home).join(".valet"))
}

/// Returns the default configuration file path (`~/.valet/config.yml`).
///
/// # Errors
///
/// Returns `ServerError::Config` if the `HOME` environment variable is not set.
pub fn default_config_path() -> Result<PathBuf, ServerError> {
    Ok(default_config_dir()?.join("config.yml"))
}

impl ServerConfig {
    /// Loads configuration from the given YAML file path.
    ///
    /// Validates that the required Slack tokens are present after loading.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if the file cannot be read, contains
    /// invalid YAML, or has malformed token values.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        info!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("Cannot read config at {}: {e}", path.display()))
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            ServerError::Config(format!("Invalid YAML in config at {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates that required fields are present and well-formed.
    fn validate(&self) -> Result<(), ServerError> {
        if self.slack.app_token.is_empty() {
            return Err(ServerError::Config(
                "slack.app_token must not be empty".into(),
            ));
        }
        if !self.slack.app_token.starts_with("xapp-") {
            return Err(ServerError::Config(
                "slack.app_token must start with 'xapp-'".into(),
            ));
        }
        if self.slack.bot_token.is_empty() {
            return Err(ServerError::Config(
                "slack.bot_token must not be empty".into(),
            ));
        }
        if !self.slack.bot_token.starts_with("xoxb-") {
            return Err(ServerError::Config(
                "slack.bot_token must start with 'xoxb-'".into(),
            ));
        }
        Ok(())
    }
}
