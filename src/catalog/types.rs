//! Types for the model catalog.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A model the router knows about, keyed by its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelEntry {
    /// Model identifier sent to the completion endpoint (e.g. "gpt-4.1-nano").
    pub id: String,

    /// What the model is picked for (e.g. "creative content").
    pub capability: String,
}

impl ModelEntry {
    pub fn new(id: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capability: capability.into(),
        }
    }
}

/// Ordered alternates per model identifier.
///
/// Lists are not required to be symmetric, and may name identifiers that are
/// absent from the catalog.
pub type FallbackTable = HashMap<String, Vec<String>>;
