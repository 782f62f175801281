//! Rate-limited progress reporting.
//!
//! The reporter aggregates "segments translated" notifications and lets an
//! update through at most once per `min_interval_ms`, plus a final one when
//! the job ends.

mod reporter;

pub use reporter::{ProgressReporter, ProgressUpdate};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for progress reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Minimum time between two progress updates in milliseconds.
    #[serde(default = "default_min_interval")]
    pub min_interval_ms: u64,
}

fn default_min_interval() -> u64 {
    1000
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval(),
        }
    }
}

impl ProgressConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval_ms = interval.as_millis() as u64;
        self
    }
}
