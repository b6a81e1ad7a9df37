use serde::{Deserialize, Serialize};

use crate::catalog::{FallbackTable, ModelEntry};

/// Model routing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// What to do with fallback identifiers missing from the catalog.
    #[serde(default)]
    pub unknown_models: UnknownModelPolicy,
}

/// Handling of fallback identifiers that are not catalogued.
///
/// The selected model itself is always attempted regardless of this policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownModelPolicy {
    /// Leave them out of the attempt sequence and log a warning.
    #[default]
    Skip,
    /// Try them like any other model.
    Attempt,
}

/// Catalog additions and overrides.
///
/// ```toml
/// [catalog]
/// models = [{ id = "gemini-2.0-flash-exp", capability = "experimental flash" }]
///
/// [catalog.fallbacks]
/// "gpt-4.1-mini" = ["gpt-4.1-nano", "gemini-2.0-flash"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Extra models, or replacements for built-in entries with the same id.
    #[serde(default)]
    pub models: Vec<ModelEntry>,

    /// Fallback lists replacing the built-in list for each key.
    #[serde(default)]
    pub fallbacks: FallbackTable,
}
