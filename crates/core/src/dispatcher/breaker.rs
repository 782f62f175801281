//! Job-wide circuit breaker over consecutive timeouts.

use std::sync::atomic::{AtomicU32, Ordering};

use super::error::DispatchError;

/// Counts consecutive timeouts across all workers of a run.
///
/// Checked before every attempt; once the counter reaches the ceiling every
/// worker fails with [`DispatchError::ConsecutiveFailureLimit`] regardless of
/// its own retry budget. Any successful response resets it.
#[derive(Debug)]
pub struct CircuitBreaker {
    failures: AtomicU32,
    ceiling: u32,
}

impl CircuitBreaker {
    pub fn new(ceiling: u32) -> Self {
        Self {
            failures: AtomicU32::new(0),
            ceiling,
        }
    }

    /// Returns the current count, or an error when the ceiling is reached.
    pub fn check(&self) -> Result<u32, DispatchError> {
        let failures = self.failures.load(Ordering::SeqCst);
        if failures >= self.ceiling {
            return Err(DispatchError::ConsecutiveFailureLimit {
                failures,
                limit: self.ceiling,
            });
        }
        Ok(failures)
    }

    /// Records a timeout and returns the new count.
    pub fn record_timeout(&self) -> u32 {
        self.failures.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn record_success(&self) {
        self.failures.store(0, Ordering::SeqCst);
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }
}
