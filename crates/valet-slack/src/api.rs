//! Thin async client for the Slack Web API methods this bot needs.
//!
//! Wraps `reqwest::Client` and provides typed methods for the handful of
//! endpoints in use: `apps.connections.open` (Socket Mode handshake, app
//! token) and `conversations.replies` (thread history, bot token).

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::SlackError;

/// Base URL for the Slack Web API.
const SLACK_API_BASE: &str = "https://slack.com/api";

/// Async client for Slack Web API calls.
///
/// # Examples
///
/// ```
/// use valet_slack::api::SlackClient;
///
/// let client = SlackClient::new("xapp-1-test".into(), "xoxb-test".into());
/// // client.connections_open().await?;
/// ```
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
    app_token: String,
    bot_token: String,
}

/// Generic Slack API response envelope for deserialization.
#[derive(Debug, Deserialize)]
struct SlackApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    messages: Option<Vec<Reply>>,
}

/// One message in a thread, as returned by `conversations.replies`.
#[derive(Debug, Clone, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ts: String,
}

impl SlackClient {
    /// Creates a client against the production Slack API.
    pub fn new(app_token: String, bot_token: String) -> Self {
        Self::with_base_url(app_token, bot_token, SLACK_API_BASE.to_string())
    }

    /// Creates a client against an alternative base URL (tests).
    pub fn with_base_url(app_token: String, bot_token: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            app_token,
            bot_token,
        }
    }

    /// Opens a Socket Mode connection and returns the one-time WebSocket URL.
    ///
    /// Uses the app-level token (`xapp-...`) rather than the bot token.
    ///
    /// # Errors
    ///
    /// Returns `SlackError::Api` if the request fails or the API reports an
    /// error.
    pub async fn connections_open(&self) -> Result<String, SlackError> {
        debug!("opening socket mode connection");
        let resp = self
            .http
            .post(format!("{}/apps.connections.open", self.base_url))
            .bearer_auth(&self.app_token)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .send()
            .await
            .map_err(|e| {
                SlackError::Api(format!("apps.connections.open request failed: {e}"))
            })?;

        let api_resp: SlackApiResponse = resp.json().await.map_err(|e| {
            SlackError::Api(format!("apps.connections.open response parse failed: {e}"))
        })?;

        if !api_resp.ok {
            return Err(SlackError::Api(format!(
                "apps.connections.open error: {}",
                api_resp.error.unwrap_or_default()
            )));
        }

        api_resp.url.ok_or_else(|| {
            SlackError::Api("apps.connections.open response missing 'url'".into())
        })
    }

    /// Lists the replies in a message thread.
    ///
    /// `ts` is the parent message timestamp as delivered by Slack (seconds
    /// with microsecond fraction).
    ///
    /// # Errors
    ///
    /// Returns `SlackError::Api` if the request fails or the API reports an
    /// error.
    pub async fn list_replies(&self, channel: &str, ts: f64) -> Result<Vec<Reply>, SlackError> {
        debug!(channel, ts, "listing thread replies");
        let ts_param = format!("{ts:.6}");
        let resp = self
            .http
            .get(format!("{}/conversations.replies", self.base_url))
            .bearer_auth(&self.bot_token)
            .query(&[("channel", channel), ("ts", ts_param.as_str())])
            .send()
            .await
            .map_err(|e| {
                SlackError::Api(format!("conversations.replies request failed: {e}"))
            })?;

        let api_resp: SlackApiResponse = resp.json().await.map_err(|e| {
            SlackError::Api(format!("conversations.replies response parse failed: {e}"))
        })?;

        if !api_resp.ok {
            let error_msg = api_resp.error.as_deref().unwrap_or("unknown");
            warn!(channel, error = error_msg, "Slack API error");
            return Err(SlackError::Api(format!(
                "conversations.replies error: {error_msg}"
            )));
        }

        Ok(api_resp.messages.unwrap_or_default())
    }
}
