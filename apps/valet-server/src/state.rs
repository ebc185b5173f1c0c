//! Shared application state for the valet-server.
//!
//! [`AppState`] is passed (as `Arc<AppState>`) into the event handler and
//! from there to every responder: the collaborator services, the Slack Web
//! API client, and the HTTP client used for `response_url` callbacks.

use valet_slack::api::SlackClient;

use crate::services::Services;

/// Shared application state, passed as `Arc<AppState>` to all responders.
pub struct AppState {
    services: Services,
    slack: SlackClient,
    http: reqwest::Client,
}

impl AppState {
    /// Creates the application state with the given collaborators.
    pub fn new(services: Services, slack: SlackClient) -> Self {
        Self {
            services,
            slack,
            http: reqwest::Client::new(),
        }
    }

    /// Returns the collaborator services.
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Returns the Slack Web API client.
    pub fn slack(&self) -> &SlackClient {
        &self.slack
    }

    /// Returns the HTTP client used for callback responses.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
