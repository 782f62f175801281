use thiserror::Error;

/// Errors from the file translation service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JobServiceError {
    /// Connection-level failure.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Task {0} has no source file")]
    NoSourceFile(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for JobServiceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
