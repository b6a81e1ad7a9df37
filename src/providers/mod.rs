//! # Completion providers
//!
//! A [`CompletionClient`] issues exactly one chat completion request and
//! classifies the result. It never retries; the attempt loop in [`retry`] and
//! the model fallback in [`fallback`] sit on top of it.
//!
//! ```text
//! FallbackInvoker::invoke
//!   └── for each model in [selected, fallbacks...]
//!         └── retry::attempt_model (up to max_attempts)
//!               └── CompletionClient::complete (single HTTP request)
//! ```

pub mod error;
pub mod fallback;
pub mod open_ai;
pub mod retry;
#[cfg(test)]
pub mod test_utils;

use async_trait::async_trait;
pub use error::ProviderError;
pub use fallback::{
    EXHAUSTION_SENTINEL, FallbackInvoker, InvocationOutcome, InvocationReport,
    build_attempt_sequence,
};
pub use open_ai::OpenAICompatibleProvider;
pub use retry::{Attempt, AttemptOutcome};
use serde::Serialize;
use serde_json::Value;

use crate::config::ApiConfig;

/// Result of a completion request that reached the endpoint successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Non-empty, trimmed message content.
    Success(String),
    /// Valid JSON without usable content at `choices[0].message.content`.
    EmptyContent,
    /// The body was not JSON at all.
    MalformedResponse,
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for CompletionParams {
    fn from(config: &ApiConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Single-shot chat completion against one model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `prompt` as a single user message to `model`.
    ///
    /// `Err` covers transport and HTTP-status failures only; a reachable
    /// endpoint with unusable output is reported through [`CompletionOutcome`].
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<CompletionOutcome, ProviderError>;
}

/// Request body for the chat completions endpoint.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ChatCompletionRequest<'a> {
    /// A request carrying one user message.
    pub fn user(model: &'a str, prompt: &'a str, params: CompletionParams) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }
}

/// Classify a successful response body.
pub fn extract_content(body: &[u8]) -> CompletionOutcome {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return CompletionOutcome::MalformedResponse;
    };

    match value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
    {
        Some(text) if !text.is_empty() => CompletionOutcome::Success(text.to_string()),
        _ => CompletionOutcome::EmptyContent,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_extract_content_trims() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "  Hello!\n"}}]});
        assert_eq!(
            extract_content(body.to_string().as_bytes()),
            CompletionOutcome::Success("Hello!".into())
        );
    }

    #[test]
    fn test_extract_content_empty_shapes() {
        let cases = [
            json!({"choices": []}),
            json!({"choices": [{"message": {"content": ""}}]}),
            json!({"choices": [{"message": {"content": "   "}}]}),
            json!({"choices": [{"message": {"content": null}}]}),
            json!({"choices": [{"message": {}}]}),
            json!({"error": {"message": "oops"}}),
            json!("just a string"),
        ];
        for body in cases {
            assert_eq!(
                extract_content(body.to_string().as_bytes()),
                CompletionOutcome::EmptyContent,
                "body: {body}"
            );
        }
    }

    #[test]
    fn test_extract_content_not_json() {
        assert_eq!(
            extract_content(b"<html>502 Bad Gateway</html>"),
            CompletionOutcome::MalformedResponse
        );
        assert_eq!(extract_content(b""), CompletionOutcome::MalformedResponse);
    }

    #[test]
    fn test_request_payload_shape() {
        let params = CompletionParams {
            temperature: 0.5,
            max_tokens: 64,
        };
        let request = ChatCompletionRequest::user("gpt-4.1-mini", "Hi", params);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gpt-4.1-mini",
                "messages": [{"role": "user", "content": "Hi"}],
                "temperature": 0.5,
                "max_tokens": 64
            })
        );
    }

    #[test]
    fn test_params_from_api_config() {
        let params = CompletionParams::default();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.max_tokens, 1000);
    }
}
