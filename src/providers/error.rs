//! Transport-level errors from the completion endpoint.

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// A request that never produced a usable HTTP success response.
///
/// Both variants are retried within a model's attempt budget and then cause a
/// switch to the next fallback model.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection, timeout, or body-read failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Completion API error ({status}): {message}")]
    Status { status: StatusCode, message: String },
}

impl ProviderError {
    /// HTTP status, when the endpoint answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Request(e) => e.status(),
            Self::Status { status, .. } => Some(*status),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to the
/// raw body text.
pub fn parse_error_message(body: &str) -> String {
    if body.trim().is_empty() {
        return String::from("(empty body)");
    }

    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}
