//! Model catalog: which models exist, what each is for, and which similar
//! models to try when one fails.
//!
//! # Usage
//!
//! ```rust
//! use prompt_router::catalog::ModelCatalog;
//!
//! let catalog = ModelCatalog::builtin();
//! assert_eq!(catalog.capability("mistral-saba-24b"), Some("summarization"));
//! assert_eq!(catalog.fallbacks_for("gpt-4.1-nano"), ["gpt-4.1-mini"]);
//! ```

mod registry;
mod types;

pub use registry::ModelCatalog;
pub use types::{FallbackTable, ModelEntry};
