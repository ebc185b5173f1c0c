//! Error types for the valet-server application.
//!
//! Defines [`ServerError`] as the primary error type for configuration and
//! collaborator calls. Uses `thiserror` for ergonomic error definitions
//! following the project convention.

use thiserror::Error;

/// Error type for valet-server operations.
///
/// # Examples
///
/// ```
/// use valet_server::error::ServerError;
///
/// let err = ServerError::Config("missing app_token".into());
/// assert!(err.to_string().contains("missing app_token"));
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServerError {
    /// A configuration error (missing or invalid config file/values).
    #[error("Config error: {0}")]
    Config(String),

    /// An error from the public-data portal (holidays, forecasts).
    #[error("Data portal error: {0}")]
    Portal(String),

    /// An error from the text-generation API.
    #[error("Text generation error: {0}")]
    Generation(String),

    /// An error from the channel settings store.
    #[error("Settings error: {0}")]
    Settings(String),

    /// An error from the Slack Web API or Socket Mode engine.
    #[error(transparent)]
    Slack(#[from] valet_slack::error::SlackError),

    /// A JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_display_config_error() {
        let err = ServerError::Config("token missing".into());
        assert_eq!(err.to_string(), "Config error: token missing");
    }

    #[test]
    fn test_should_display_portal_error() {
        let err = ServerError::Portal("service key rejected".into());
        assert_eq!(err.to_string(), "Data portal error: service key rejected");
    }

    #[test]
    fn test_should_convert_from_slack_error() {
        let err: ServerError = valet_slack::error::SlackError::Api("nope".into()).into();
        assert!(err.to_string().contains("nope"));
    }
}
