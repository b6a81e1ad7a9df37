//! Per-model attempt loop.
//!
//! Every failure kind is retried until the model's budget is spent: transport
//! errors, non-success statuses, empty content, and unparseable bodies alike.
//! The first non-empty answer short-circuits the loop.

use std::fmt;

use tracing::{debug, info, warn};

use super::{CompletionClient, CompletionOutcome, CompletionParams};
use crate::config::RetryConfig;

/// Outcome of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    EmptyContent,
    MalformedResponse,
    /// Transport or HTTP-status failure, with the error text.
    TransportFailure(String),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::EmptyContent => "empty_content",
            Self::MalformedResponse => "malformed_response",
            Self::TransportFailure(_) => "transport_failure",
        }
    }
}

/// One call to the completion client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub model: String,
    /// 1-based index within the model's budget.
    pub index: u32,
    pub outcome: AttemptOutcome,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}: {}", self.model, self.index, self.outcome.kind())
    }
}

/// Try `model` up to `retry.max_attempts` times.
///
/// Every attempt is appended to `attempts`. Returns the first non-empty text.
pub async fn attempt_model(
    client: &dyn CompletionClient,
    model: &str,
    prompt: &str,
    params: CompletionParams,
    retry: &RetryConfig,
    attempts: &mut Vec<Attempt>,
) -> Option<String> {
    let max_attempts = retry.max_attempts.max(1);

    for attempt in 0..max_attempts {
        let index = attempt + 1;
        info!(model, attempt = index, max_attempts, "Attempting model");

        let outcome = match client.complete(model, prompt, params).await {
            Ok(CompletionOutcome::Success(text)) => {
                attempts.push(Attempt {
                    model: model.to_string(),
                    index,
                    outcome: AttemptOutcome::Success,
                });
                info!(model, attempt = index, "Success using model");
                return Some(text);
            }
            Ok(CompletionOutcome::EmptyContent) => {
                warn!(model, attempt = index, max_attempts, "Empty content received");
                AttemptOutcome::EmptyContent
            }
            Ok(CompletionOutcome::MalformedResponse) => {
                warn!(
                    model,
                    attempt = index,
                    max_attempts,
                    "Unparseable response body received"
                );
                AttemptOutcome::MalformedResponse
            }
            Err(error) => {
                warn!(
                    model,
                    attempt = index,
                    max_attempts,
                    error = %error,
                    "Attempt failed"
                );
                AttemptOutcome::TransportFailure(error.to_string())
            }
        };

        attempts.push(Attempt {
            model: model.to_string(),
            index,
            outcome,
        });

        if index < max_attempts {
            let delay = retry.delay_for_attempt(attempt);
            if !delay.is_zero() {
                debug!(model, delay_ms = delay.as_millis() as u64, "Waiting before retry");
                tokio::time::sleep(delay).await;
            }
        }
    }

    None
}
