//! Error types for the dispatcher module.

use thiserror::Error;

use crate::translation::TranslationError;

/// Errors that terminate a dispatch run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// One batch failed on every allowed attempt.
    #[error("Batch {batch} failed after {attempts} attempts: {last_error}")]
    RetryExhausted {
        batch: usize,
        attempts: u32,
        #[source]
        last_error: TranslationError,
    },

    /// Too many consecutive timeouts across the whole job.
    #[error("Consecutive failure limit reached ({failures}/{limit})")]
    ConsecutiveFailureLimit { failures: u32, limit: u32 },

    /// The run was halted through its stop handle.
    #[error("Translation cancelled")]
    Cancelled,
}

impl DispatchError {
    /// Whether the run ended because of a halt rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Short label for metrics, logs and status reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RetryExhausted { .. } => "retry_exhausted",
            Self::ConsecutiveFailureLimit { .. } => "consecutive_failure_limit",
            Self::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_retry_exhausted_keeps_source() {
        let err = DispatchError::RetryExhausted {
            batch: 3,
            attempts: 5,
            last_error: TranslationError::RequestFailed("refused".to_string()),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Batch 3 failed after 5 attempts"));
        assert_eq!(err.kind(), "retry_exhausted");
    }

    #[test]
    fn test_cancelled_is_not_failure_kind() {
        assert!(DispatchError::Cancelled.is_cancelled());
        assert!(!DispatchError::ConsecutiveFailureLimit {
            failures: 3,
            limit: 3
        }
        .is_cancelled());
    }
}
