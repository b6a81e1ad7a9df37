//! Model fallback.
//!
//! A prompt is tried against an ordered attempt sequence: the selected model
//! followed by its catalogued fallbacks. Each model gets the full retry budget
//! before the invoker switches to the next one. The first non-empty answer
//! wins; if every model is exhausted the invocation reports
//! [`InvocationOutcome::Exhausted`] instead of raising.
//!
//! Fallback lists may name models that the catalog does not know. Those are
//! handled per [`UnknownModelPolicy`]; the selected model is always attempted.

use std::{fmt, sync::Arc};

use tracing::{info, warn};

use super::{
    CompletionClient, CompletionParams,
    retry::{Attempt, attempt_model},
};
use crate::{
    catalog::ModelCatalog,
    config::{RetryConfig, RouterConfig, UnknownModelPolicy},
    routing::select_model,
};

/// Text shown in place of a response when every model failed.
pub const EXHAUSTION_SENTINEL: &str = "[Failed after trying all similar models]";

/// Final result of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    Completed { text: String, model: String },
    Exhausted,
}

impl InvocationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Completed { text, .. } => Some(text),
            Self::Exhausted => None,
        }
    }

    /// Model that produced the answer.
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Completed { model, .. } => Some(model),
            Self::Exhausted => None,
        }
    }

    /// The answer, or [`EXHAUSTION_SENTINEL`].
    pub fn text_or_sentinel(&self) -> &str {
        self.text().unwrap_or(EXHAUSTION_SENTINEL)
    }
}

impl fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text_or_sentinel())
    }
}

/// Everything that happened while invoking one prompt.
#[derive(Debug, Clone)]
pub struct InvocationReport {
    /// Model chosen by selection or explicit preference.
    pub selected_model: String,
    /// Models in the order they were (or would have been) tried.
    pub sequence: Vec<String>,
    /// Every attempt made, in order.
    pub attempts: Vec<Attempt>,
    pub outcome: InvocationOutcome,
}

impl InvocationReport {
    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    pub fn attempts_for(&self, model: &str) -> usize {
        self.attempts.iter().filter(|a| a.model == model).count()
    }

    /// The model that answered, or the selected model on exhaustion.
    pub fn model_used(&self) -> &str {
        self.outcome.model().unwrap_or(&self.selected_model)
    }
}

/// Build the ordered list of models to try for `selected`.
///
/// Duplicates are kept. Uncatalogued fallbacks are dropped under
/// [`UnknownModelPolicy::Skip`].
pub fn build_attempt_sequence(
    selected: &str,
    catalog: &ModelCatalog,
    policy: UnknownModelPolicy,
) -> Vec<String> {
    let mut sequence = vec![selected.to_string()];

    for fallback in catalog.fallbacks_for(selected) {
        if !catalog.contains(fallback) && policy == UnknownModelPolicy::Skip {
            warn!(
                model = %selected,
                fallback = %fallback,
                "Skipping fallback: model not in catalog"
            );
            continue;
        }
        sequence.push(fallback.clone());
    }

    sequence
}

/// Runs a prompt across the attempt sequence until one model answers.
#[derive(Clone)]
pub struct FallbackInvoker {
    client: Arc<dyn CompletionClient>,
    catalog: Arc<ModelCatalog>,
    retry: RetryConfig,
    params: CompletionParams,
    unknown_models: UnknownModelPolicy,
}

impl FallbackInvoker {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        catalog: Arc<ModelCatalog>,
        retry: RetryConfig,
        params: CompletionParams,
    ) -> Self {
        Self {
            client,
            catalog,
            retry,
            params,
            unknown_models: UnknownModelPolicy::default(),
        }
    }

    /// Wire an invoker from loaded configuration.
    pub fn from_config(
        client: Arc<dyn CompletionClient>,
        catalog: Arc<ModelCatalog>,
        config: &RouterConfig,
    ) -> Self {
        Self::new(
            client,
            catalog,
            config.retry.clone(),
            CompletionParams::from(&config.api),
        )
        .with_unknown_model_policy(config.routing.unknown_models)
    }

    pub fn with_unknown_model_policy(mut self, policy: UnknownModelPolicy) -> Self {
        self.unknown_models = policy;
        self
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Attempt sequence for a model, using this invoker's policy.
    pub fn sequence_for(&self, selected: &str) -> Vec<String> {
        build_attempt_sequence(selected, &self.catalog, self.unknown_models)
    }

    /// Invoke `prompt`, using `preferred` when given and keyword selection
    /// otherwise.
    pub async fn invoke(&self, prompt: &str, preferred: Option<&str>) -> InvocationReport {
        let selected = preferred.unwrap_or_else(|| select_model(prompt)).to_string();
        let sequence = self.sequence_for(&selected);
        info!(selected = %selected, models = ?sequence, "Trying models in order");

        let mut attempts = Vec::new();
        let mut completed = None;

        for (position, model) in sequence.iter().enumerate() {
            if position > 0 {
                info!(from = %sequence[position - 1], to = %model, "Switching to fallback model");
            }

            if let Some(text) = attempt_model(
                self.client.as_ref(),
                model,
                prompt,
                self.params,
                &self.retry,
                &mut attempts,
            )
            .await
            {
                completed = Some(InvocationOutcome::Completed {
                    text,
                    model: model.clone(),
                });
                break;
            }
        }

        let outcome = completed.unwrap_or_else(|| {
            warn!(
                selected = %selected,
                attempts = attempts.len(),
                "All models failed"
            );
            InvocationOutcome::Exhausted
        });

        InvocationReport {
            selected_model: selected,
            sequence,
            attempts,
            outcome,
        }
    }
}
