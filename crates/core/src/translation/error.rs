//! Error types for the translation module.

use thiserror::Error;

/// Errors returned by a single translation call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// The service is busy and timed out the request (HTTP 504).
    #[error("Translation service timed out")]
    Timeout,

    /// The request could not be completed (connection, client timeout, ...).
    #[error("Translation request failed: {0}")]
    RequestFailed(String),

    /// The service answered with a non-success status other than 504.
    #[error("Translation service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response could not be decoded or did not match the request.
    #[error("Malformed translation response: {0}")]
    MalformedResponse(String),
}

impl TranslationError {
    /// Whether this is the service's busy signal.
    ///
    /// Timeouts are retried after a cooldown and count toward the
    /// job-wide failure limit; everything else is a transient error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::RequestFailed(_) => "request_failed",
            Self::Http { .. } => "http",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }
}
