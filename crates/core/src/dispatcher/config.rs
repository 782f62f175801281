//! Configuration for the dispatcher module.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the translation dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Number of parallel translation workers.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Upper bound for the characters of one batch.
    #[serde(default = "default_max_batch_characters")]
    pub max_batch_characters: usize,

    /// Attempts per batch for non-timeout failures.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Cooldown after a timeout, per worker, in milliseconds.
    #[serde(default = "default_timeout_cooldown")]
    pub timeout_cooldown_per_worker_ms: u64,

    /// Consecutive timeouts that abort the job (default: concurrency * 3).
    #[serde(default)]
    pub max_consecutive_failures: Option<u32>,
}

fn default_concurrency() -> usize {
    1
}

fn default_max_batch_characters() -> usize {
    crate::segmenter::DEFAULT_MAX_BATCH_CHARACTERS
}

fn default_max_attempts() -> u32 {
    5
}

fn default_timeout_cooldown() -> u64 {
    3000 // 3 seconds
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_batch_characters: default_max_batch_characters(),
            max_attempts: default_max_attempts(),
            timeout_cooldown_per_worker_ms: default_timeout_cooldown(),
            max_consecutive_failures: None,
        }
    }
}

impl DispatcherConfig {
    /// Ceiling of the job-wide consecutive failure counter.
    pub fn failure_ceiling(&self) -> u32 {
        self.max_consecutive_failures
            .unwrap_or(self.concurrency.max(1) as u32 * 3)
    }

    /// Sleep after a timeout before retrying the same batch.
    ///
    /// Scales with concurrency: more workers put more load on a busy service.
    pub fn timeout_cooldown(&self) -> Duration {
        Duration::from_millis(self.timeout_cooldown_per_worker_ms * self.concurrency.max(1) as u64)
    }

    /// Sets the number of parallel workers.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the batch character limit.
    pub fn with_max_batch_characters(mut self, max: usize) -> Self {
        self.max_batch_characters = max;
        self
    }

    /// Sets the attempts per batch.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the per-worker timeout cooldown.
    pub fn with_timeout_cooldown_per_worker(mut self, cooldown: Duration) -> Self {
        self.timeout_cooldown_per_worker_ms = cooldown.as_millis() as u64;
        self
    }

    /// Sets an explicit failure ceiling.
    pub fn with_max_consecutive_failures(mut self, max: u32) -> Self {
        self.max_consecutive_failures = Some(max);
        self
    }
}
