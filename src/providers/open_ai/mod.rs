//! OpenAI-compatible chat completions client.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use http::header::AUTHORIZATION;

use super::{
    ChatCompletionRequest, CompletionClient, CompletionOutcome, CompletionParams, ProviderError,
    error::parse_error_message, extract_content,
};
use crate::config::{ApiConfig, ApiCredential};

/// Sends chat completion requests to a single endpoint URL with a bearer token.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleProvider {
    http: reqwest::Client,
    url: String,
    credential: ApiCredential,
    headers: HashMap<String, String>,
    timeout: Duration,
}

impl OpenAICompatibleProvider {
    /// Create a provider with its own HTTP client.
    pub fn from_config(config: &ApiConfig, credential: ApiCredential) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http, config, credential))
    }

    /// Create a provider on a shared HTTP client.
    pub fn with_client(http: reqwest::Client, config: &ApiConfig, credential: ApiCredential) -> Self {
        Self {
            http,
            url: config.url.clone(),
            credential,
            headers: config.headers.clone(),
            timeout: config.timeout(),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Add auth, configured headers and timeout to a request.
    fn build_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header(AUTHORIZATION, format!("Bearer {}", self.credential.expose()));

        let request = self.headers.iter().fold(request, |req, (key, value)| {
            req.header(key.as_str(), value.as_str())
        });

        request.timeout(self.timeout)
    }

    /// Turn a non-success status into an error carrying the provider's message.
    async fn check_response(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ProviderError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        Err(ProviderError::Status {
            status,
            message: parse_error_message(&body),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAICompatibleProvider {
    #[tracing::instrument(
        skip(self, prompt, params),
        fields(provider = "openai", operation = "chat_completion", model = %model)
    )]
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<CompletionOutcome, ProviderError> {
        let payload = ChatCompletionRequest::user(model, prompt, params);

        let response = self
            .build_request(self.http.post(&self.url))
            .json(&payload)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let body = response.bytes().await?;

        let outcome = extract_content(&body);
        if outcome == CompletionOutcome::MalformedResponse {
            tracing::debug!(body_len = body.len(), "Response body is not JSON");
        }

        Ok(outcome)
    }
}
