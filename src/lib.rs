//! Keyword-routed prompts over an OpenAI-compatible chat completions API.
//!
//! A prompt is matched against keyword groups to pick a model, then sent to
//! that model with a bounded number of attempts. When a model keeps failing or
//! returning empty content, its similar models from the catalog are tried in
//! order. Every attempt is logged; the first non-empty answer wins.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use prompt_router::{
//!     catalog::ModelCatalog,
//!     config::RouterConfig,
//!     pipeline::Pipeline,
//!     providers::{FallbackInvoker, OpenAICompatibleProvider},
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RouterConfig::load(None)?;
//! let client = OpenAICompatibleProvider::from_config(&config.api, config.credential()?)?;
//! let catalog = ModelCatalog::builtin().with_overrides(&config.catalog);
//! let invoker = FallbackInvoker::from_config(Arc::new(client), Arc::new(catalog), &config);
//!
//! let mut pipeline = Pipeline::new(invoker).with_memory();
//! let result = pipeline.run("Summarize this: AI is transforming industries.").await;
//! println!("{} answered: {}", result.model(), result.response());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod observability;
pub mod pipeline;
pub mod providers;
#[cfg(feature = "csv-export")]
pub mod results;
pub mod routing;

#[cfg(test)]
mod tests;
