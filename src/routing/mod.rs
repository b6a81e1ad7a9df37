//! Model selection.
//!
//! Prompts are routed to a model by keyword heuristics. Keyword groups are
//! checked in a fixed order and the first group with any keyword present (as a
//! case-insensitive substring) wins:
//!
//! | group                 | keywords                  | model                   |
//! |-----------------------|---------------------------|-------------------------|
//! | creative-writing      | poem, story, creative     | `gpt-4.1-nano`          |
//! | speed                 | quick, fast, simple       | `gemini-2.0-flash`      |
//! | summarization         | summarize, rewrite        | `mistral-saba-24b`      |
//! | code-logic            | code, debug, logic        | `deepseek-r1-distilled` |
//! | multimodal            | image, multimodal         | `llama-4-maverick`      |
//! | analytical-comparison | compare, analyze          | `llama-3.3-70b`         |
//! | conversational        | conversation, chat        | `qwen-qwq-32b`          |
//! | professional          | professional, business    | `gemini-2.5-pro-exp`    |
//! | brief-factual         | scout, brief              | `llama-4-scout`         |
//!
//! Anything else goes to [`DEFAULT_MODEL`]. A prompt asking for a "poem about
//! code" therefore lands on the creative-writing model: order is the tie-break.
//!
//! Callers may bypass the heuristic with an explicit model, which is checked by
//! [`validate_model_override`] before any request is built.

use thiserror::Error;

/// A keyword group and the model it routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordGroup {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub model: &'static str,
}

impl KeywordGroup {
    /// Whether any keyword occurs in an already lower-cased prompt.
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|kw| lowered.contains(kw))
    }
}

/// Keyword groups in match order.
pub const KEYWORD_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        name: "creative-writing",
        keywords: &["poem", "story", "creative"],
        model: "gpt-4.1-nano",
    },
    KeywordGroup {
        name: "speed",
        keywords: &["quick", "fast", "simple"],
        model: "gemini-2.0-flash",
    },
    KeywordGroup {
        name: "summarization",
        keywords: &["summarize", "rewrite"],
        model: "mistral-saba-24b",
    },
    KeywordGroup {
        name: "code-logic",
        keywords: &["code", "debug", "logic"],
        model: "deepseek-r1-distilled",
    },
    KeywordGroup {
        name: "multimodal",
        keywords: &["image", "multimodal"],
        model: "llama-4-maverick",
    },
    KeywordGroup {
        name: "analytical-comparison",
        keywords: &["compare", "analyze"],
        model: "llama-3.3-70b",
    },
    KeywordGroup {
        name: "conversational",
        keywords: &["conversation", "chat"],
        model: "qwen-qwq-32b",
    },
    KeywordGroup {
        name: "professional",
        keywords: &["professional", "business"],
        model: "gemini-2.5-pro-exp",
    },
    KeywordGroup {
        name: "brief-factual",
        keywords: &["scout", "brief"],
        model: "llama-4-scout",
    },
];

/// Model used when no keyword group matches.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Maximum length for an explicit model identifier.
const MAX_MODEL_ID_LENGTH: usize = 128;

/// First keyword group matching the prompt, if any.
pub fn matching_group(prompt: &str) -> Option<&'static KeywordGroup> {
    let lowered = prompt.to_lowercase();
    KEYWORD_GROUPS.iter().find(|group| group.matches(&lowered))
}

/// Pick a model identifier for a prompt.
pub fn select_model(prompt: &str) -> &'static str {
    matching_group(prompt).map_or(DEFAULT_MODEL, |group| group.model)
}

/// Check an explicit model identifier supplied by a caller.
///
/// The identifier does not have to be catalogued; the endpoint decides whether
/// it exists. Only obviously malformed input is rejected here.
pub fn validate_model_override(model: &str) -> Result<(), RoutingError> {
    if model.trim().is_empty() {
        return Err(RoutingError::EmptyModel);
    }
    if model.len() > MAX_MODEL_ID_LENGTH {
        return Err(RoutingError::InvalidModel(format!(
            "exceeds maximum length of {MAX_MODEL_ID_LENGTH} characters"
        )));
    }
    if model.chars().any(char::is_control) {
        return Err(RoutingError::InvalidModel(
            "contains control characters".to_string(),
        ));
    }
    Ok(())
}

/// Error for an unusable explicit model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("No model specified")]
    EmptyModel,

    #[error("Invalid model identifier: {0}")]
    InvalidModel(String),
}
