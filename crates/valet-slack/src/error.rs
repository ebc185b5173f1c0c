//! Error types for the Socket Mode engine.
//!
//! Defines [`SlackError`] as the primary error type for Web API calls and
//! WebSocket transport. Uses `thiserror` for ergonomic error definitions
//! following the project convention.

use thiserror::Error;

/// Error type for Slack Web API and Socket Mode operations.
///
/// # Examples
///
/// ```
/// use valet_slack::error::SlackError;
///
/// let err = SlackError::Api("invalid_auth".into());
/// assert!(err.to_string().contains("invalid_auth"));
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SlackError {
    /// An error from a Slack Web API call.
    #[error("Slack API error: {0}")]
    Api(String),

    /// A WebSocket transport error (connection, read, write).
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// A JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
