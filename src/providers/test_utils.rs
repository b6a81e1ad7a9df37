//! Test utilities for provider and invoker tests.
//!
//! - [`ScriptedClient`]: an in-memory [`CompletionClient`] with a per-model
//!   script of outcomes and a log of every call.
//! - [`SequentialResponder`]: a wiremock responder returning different
//!   responses on successive calls.

// Not every helper is used by every test module.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering as AtomicOrdering},
    },
};

use async_trait::async_trait;
use http::StatusCode;
use wiremock::ResponseTemplate;

use super::{CompletionClient, CompletionOutcome, CompletionParams, ProviderError};

/// One scripted reaction of [`ScriptedClient`].
#[derive(Debug, Clone)]
pub enum Step {
    Text(String),
    Empty,
    Malformed,
    Fail,
}

impl Step {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    fn into_result(self) -> Result<CompletionOutcome, ProviderError> {
        match self {
            Self::Text(text) => Ok(CompletionOutcome::Success(text)),
            Self::Empty => Ok(CompletionOutcome::EmptyContent),
            Self::Malformed => Ok(CompletionOutcome::MalformedResponse),
            Self::Fail => Err(ProviderError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "scripted failure".into(),
            }),
        }
    }
}

/// In-memory completion client.
///
/// Each model replays its script in order and then repeats the last step.
/// Models without a script always fail, like an endpoint rejecting an unknown
/// model id.
#[derive(Default)]
pub struct ScriptedClient {
    scripts: HashMap<String, Vec<Step>>,
    cursors: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, model: &str, steps: Vec<Step>) -> Self {
        assert!(!steps.is_empty(), "script for {model} must not be empty");
        self.scripts.insert(model.to_string(), steps);
        self
    }

    /// Models called, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, model: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|m| *m == model).count()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        model: &str,
        _prompt: &str,
        _params: CompletionParams,
    ) -> Result<CompletionOutcome, ProviderError> {
        self.calls.lock().unwrap().push(model.to_string());

        let Some(steps) = self.scripts.get(model) else {
            return Step::Fail.into_result();
        };

        let mut cursors = self.cursors.lock().unwrap();
        let cursor = cursors.entry(model.to_string()).or_insert(0);
        let step = steps[(*cursor).min(steps.len() - 1)].clone();
        *cursor += 1;

        step.into_result()
    }
}

/// A chat completions success response with the given content.
pub fn chat_response(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/json")
        .set_body_json(serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        }))
}

/// Internal state for SequentialResponder, wrapped in Arc for sharing.
struct SequentialResponderState {
    responses: Vec<ResponseTemplate>,
    call_count: AtomicUsize,
}

/// A wiremock responder that returns different responses on successive calls.
///
/// Clones share one call counter, so a clone kept by the test can be checked
/// after the original is mounted.
#[derive(Clone)]
pub struct SequentialResponder {
    state: Arc<SequentialResponderState>,
}

impl SequentialResponder {
    /// Each call returns the next response in order.
    /// After exhausting the list, it repeats the last response.
    pub fn new(responses: Vec<ResponseTemplate>) -> Self {
        assert!(
            !responses.is_empty(),
            "SequentialResponder requires at least one response"
        );
        Self {
            state: Arc::new(SequentialResponderState {
                responses,
                call_count: AtomicUsize::new(0),
            }),
        }
    }

    /// Fail `fail_count` times with a 500 error, then return `success_response`.
    pub fn fail_then_succeed(fail_count: usize, success_response: ResponseTemplate) -> Self {
        let mut responses = vec![server_error(); fail_count];
        responses.push(success_response);
        Self::new(responses)
    }

    /// Always fail with a 500 error.
    pub fn always_fail() -> Self {
        Self::new(vec![server_error()])
    }

    /// Get the number of times this responder has been called.
    pub fn call_count(&self) -> usize {
        self.state.call_count.load(AtomicOrdering::SeqCst)
    }
}

impl wiremock::Respond for SequentialResponder {
    fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
        let count = self.state.call_count.fetch_add(1, AtomicOrdering::SeqCst);
        let idx = count.min(self.state.responses.len() - 1);
        self.state.responses[idx].clone()
    }
}

fn server_error() -> ResponseTemplate {
    ResponseTemplate::new(500)
        .insert_header("content-type", "application/json")
        .set_body_json(serde_json::json!({
            "error": {
                "type": "server_error",
                "message": "Internal server error. Please try again later.",
                "code": "internal_error"
            }
        }))
}
