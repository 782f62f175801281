use thiserror::Error;

use crate::dispatcher::DispatchError;
use crate::format::FormatError;
use crate::segmenter::SegmentError;

/// Errors that fail a translation job.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The document contained no text.
    #[error(transparent)]
    NoContent(#[from] SegmentError),

    #[error("Document format error: {0}")]
    Format(#[from] FormatError),

    #[error("Translation failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// `run` was called on a controller that already ran a job.
    #[error("Pipeline already started")]
    AlreadyStarted,
}

impl PipelineError {
    /// Short label used in `Failed` events and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoContent(_) => "no_content",
            Self::Format(e) => e.kind(),
            Self::Dispatch(e) => e.kind(),
            Self::AlreadyStarted => "already_started",
        }
    }
}
