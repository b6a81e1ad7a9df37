//! Observability: structured logging to the console and the interaction log.
//!
//! Every attempt, model switch, success, and exhaustion is emitted as a
//! `tracing` event. The subscriber installed here renders those events on
//! stderr and appends them to the interaction log file.

mod tracing_init;

pub use tracing_init::*;
