use thiserror::Error;

use crate::format::FormatError;
use crate::job_service::{JobServiceError, TaskSubstatus};
use crate::pipeline::PipelineError;

/// Errors that end a task.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Invalid task id: {0}")]
    InvalidTaskId(String),

    #[error("Task {0} is already running")]
    AlreadyRunning(String),

    #[error("Job service error: {0}")]
    JobService(#[from] JobServiceError),

    #[error("Document format error: {0}")]
    Format(#[from] FormatError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TaskError {
    /// Substatus reported to the job service.
    pub fn substatus(&self) -> TaskSubstatus {
        match self {
            Self::Format(FormatError::BadFile(_))
            | Self::Pipeline(PipelineError::Format(FormatError::BadFile(_))) => {
                TaskSubstatus::BadFileError
            }
            Self::Format(FormatError::UnknownFileType(_)) => TaskSubstatus::UnknownFileTypeError,
            Self::Pipeline(PipelineError::NoContent(_)) => TaskSubstatus::NoTextExtractedError,
            Self::Pipeline(PipelineError::Dispatch(_)) => TaskSubstatus::TranslationFailedError,
            _ => TaskSubstatus::UnknownError,
        }
    }
}
