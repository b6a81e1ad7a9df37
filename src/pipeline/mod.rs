//! Two-stage request pipeline: select a model, then call it with fallback.
//!
//! Each stage takes its input by reference and returns a new record, so the
//! stages can be run and tested on their own:
//!
//! ```text
//! prompt ──select_stage──▶ Selection ──call_stage──▶ PipelineResult { RequestState, report }
//! ```

mod memory;

pub use memory::{ConversationMemory, Exchange};

use crate::{
    providers::{FallbackInvoker, InvocationOutcome, InvocationReport},
    routing::select_model,
};

/// Output of the select stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub prompt: String,
    pub model: String,
}

impl Selection {
    /// Select by keyword heuristics.
    pub fn for_prompt(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        let model = select_model(&prompt).to_string();
        Self { prompt, model }
    }

    /// Use a caller-chosen model.
    pub fn explicit(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
        }
    }
}

/// The composed record for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestState {
    pub prompt: String,
    /// Model that answered, or the selected model when every model failed.
    pub model: Option<String>,
    /// The answer, or the exhaustion sentinel.
    pub response: Option<String>,
}

/// What a pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub state: RequestState,
    pub report: InvocationReport,
}

impl PipelineResult {
    pub fn outcome(&self) -> &InvocationOutcome {
        &self.report.outcome
    }

    pub fn is_completed(&self) -> bool {
        self.report.outcome.is_completed()
    }

    pub fn model(&self) -> &str {
        self.report.model_used()
    }

    pub fn response(&self) -> &str {
        self.report.outcome.text_or_sentinel()
    }
}

/// Select stage.
pub fn select_stage(prompt: &str) -> Selection {
    Selection::for_prompt(prompt)
}

/// Call stage: invoke the selected model and its fallbacks.
pub async fn call_stage(invoker: &FallbackInvoker, selection: &Selection) -> PipelineResult {
    let report = invoker
        .invoke(&selection.prompt, Some(&selection.model))
        .await;

    let state = RequestState {
        prompt: selection.prompt.clone(),
        model: Some(report.model_used().to_string()),
        response: Some(report.outcome.text_or_sentinel().to_string()),
    };

    PipelineResult { state, report }
}

/// Runs prompts through selection and invocation, recording successes.
pub struct Pipeline {
    invoker: FallbackInvoker,
    memory: Option<ConversationMemory>,
}

impl Pipeline {
    pub fn new(invoker: FallbackInvoker) -> Self {
        Self {
            invoker,
            memory: None,
        }
    }

    /// Record successful exchanges in a conversation memory.
    pub fn with_memory(mut self) -> Self {
        self.memory = Some(ConversationMemory::new());
        self
    }

    pub fn invoker(&self) -> &FallbackInvoker {
        &self.invoker
    }

    pub fn memory(&self) -> Option<&ConversationMemory> {
        self.memory.as_ref()
    }

    /// Select a model for `prompt` and invoke it.
    pub async fn run(&mut self, prompt: &str) -> PipelineResult {
        let selection = select_stage(prompt);
        self.execute(&selection).await
    }

    /// Invoke `prompt` on an explicit model, skipping keyword selection.
    pub async fn run_with_model(&mut self, prompt: &str, model: &str) -> PipelineResult {
        let selection = Selection::explicit(prompt, model);
        self.execute(&selection).await
    }

    async fn execute(&mut self, selection: &Selection) -> PipelineResult {
        let result = call_stage(&self.invoker, selection).await;

        if let Some(memory) = self.memory.as_mut()
            && let InvocationOutcome::Completed { text, model } = result.outcome()
        {
            memory.record(&selection.prompt, text, model);
        }

        result
    }
}
