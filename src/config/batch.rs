use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// Batch harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// CSV file the results are written to (truncated on each run).
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Pause between prompts in milliseconds.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            pause_ms: default_pause_ms(),
        }
    }
}

impl BatchConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("model_test_results.csv")
}

fn default_pause_ms() -> u64 {
    1000
}
