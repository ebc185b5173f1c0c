//! Delivery of responses to an event's `response_url`.
//!
//! Delivery is fire-and-forget: failures are logged and swallowed, never
//! retried — the triggering command can simply be re-issued. When Slack
//! rejects the blocks themselves, the request body is logged base64-encoded
//! for offline diagnosis.

use base64::Engine as _;
use tracing::{error, info};

use valet_slack::payload::ResponsePayload;

/// Posts a response payload to a callback URL.
pub async fn respond(http: &reqwest::Client, url: &str, payload: &ResponsePayload) {
    let body = match serde_json::to_vec(payload) {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "failed to encode response payload");
            return;
        }
    };

    let response = match http
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body.clone())
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "failed to deliver response");
            return;
        }
    };

    let status = response.status();
    if status.is_success() {
        return;
    }

    match response.text().await {
        Ok(message) => {
            error!(status = %status, message = %message, "response delivery rejected");
            if message.contains("invalid_blocks") {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&body);
                info!(body_base64 = %encoded, "rejected request body");
            }
        }
        Err(e) => {
            error!(status = %status, error = %e, "response delivery rejected");
        }
    }
}
