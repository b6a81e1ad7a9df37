//! Read-only model catalog with fallback lookup.
//!
//! The catalog is assembled once at startup (built-in table plus any config
//! overrides) and never mutated afterwards, so it is shared behind an `Arc`
//! without locking.

use std::collections::HashMap;

use super::types::{FallbackTable, ModelEntry};
use crate::config::CatalogConfig;

/// Built-in models and the capability each one is routed for.
const BUILTIN_MODELS: &[(&str, &str)] = &[
    ("gpt-4.1-nano", "creative content"),
    ("gpt-4.1-mini", "lightweight creative"),
    ("llama-3.3-70b", "deep reasoning"),
    ("llama-4-scout", "fast factual"),
    ("llama-4-maverick", "multimodal"),
    ("deepseek-r1-distilled", "code / logic"),
    ("gemini-2.5-pro-exp", "professional"),
    ("gemini-2.0-flash", "fast answers"),
    ("gemini-2.0-flash-001", "enhanced flash"),
    ("qwen-qwq-32b", "dialogue"),
    ("mistral-saba-24b", "summarization"),
];

/// Built-in similar-model lists.
///
/// `gemini-2.0-flash-exp` is intentionally absent from `BUILTIN_MODELS`; the
/// invoker has to cope with fallbacks the catalog does not know.
const BUILTIN_FALLBACKS: &[(&str, &[&str])] = &[
    ("gpt-4.1-nano", &["gpt-4.1-mini"]),
    ("gpt-4.1-mini", &["gpt-4.1-nano"]),
    ("llama-3.3-70b", &["llama-4-scout"]),
    ("llama-4-scout", &["llama-3.3-70b"]),
    ("llama-4-maverick", &["qwen-qwq-32b"]),
    ("deepseek-r1-distilled", &["gemini-2.0-flash"]),
    ("gemini-2.5-pro-exp", &["gemini-2.0-flash-exp"]),
    ("gemini-2.0-flash", &["gemini-2.0-flash-001"]),
    ("qwen-qwq-32b", &["llama-4-maverick"]),
    ("mistral-saba-24b", &["gpt-4.1-mini"]),
];

/// Model catalog: identifier → capability label, identifier → fallbacks.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    /// Entries in insertion order, for stable listings.
    entries: Vec<ModelEntry>,
    /// Map from model id to its position in `entries`.
    index: HashMap<String, usize>,
    fallbacks: FallbackTable,
}

impl ModelCatalog {
    /// Build a catalog from explicit entries and fallback lists.
    ///
    /// A later entry with the same identifier replaces the earlier one.
    pub fn new(entries: impl IntoIterator<Item = ModelEntry>, fallbacks: FallbackTable) -> Self {
        let mut catalog = Self {
            entries: Vec::new(),
            index: HashMap::new(),
            fallbacks,
        };
        for entry in entries {
            catalog.upsert(entry);
        }
        catalog
    }

    /// The catalog shipped with the router.
    pub fn builtin() -> Self {
        let entries = BUILTIN_MODELS
            .iter()
            .map(|(id, capability)| ModelEntry::new(*id, *capability));
        let fallbacks = BUILTIN_FALLBACKS
            .iter()
            .map(|(id, alternates)| {
                (
                    (*id).to_string(),
                    alternates.iter().map(|m| (*m).to_string()).collect(),
                )
            })
            .collect();

        Self::new(entries, fallbacks)
    }

    /// Apply `[catalog]` config on top of this catalog.
    ///
    /// Configured models are added (or replace a built-in entry with the same
    /// id). A configured fallback list replaces the existing list for that id.
    pub fn with_overrides(mut self, config: &CatalogConfig) -> Self {
        for entry in &config.models {
            self.upsert(entry.clone());
        }
        for (id, alternates) in &config.fallbacks {
            self.fallbacks.insert(id.clone(), alternates.clone());
        }
        self
    }

    fn upsert(&mut self, entry: ModelEntry) {
        match self.index.get(&entry.id) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.index.insert(entry.id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ModelEntry> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    /// Capability label for a model, if it is catalogued.
    pub fn capability(&self, id: &str) -> Option<&str> {
        self.get(id).map(|entry| entry.capability.as_str())
    }

    /// Ordered fallbacks for a model. Empty when the id has no list.
    pub fn fallbacks_for(&self, id: &str) -> &[String] {
        self.fallbacks.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
