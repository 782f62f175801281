//! Client for the file translation service.
//!
//! The service owns task metadata (languages, domain, status, progress) and
//! the task's files. The worker reads the metadata, downloads the source
//! file, reports status and progress, and uploads the translated file.

mod error;
mod http;
mod traits;
mod types;

pub use error::JobServiceError;
pub use http::HttpJobService;
pub use traits::JobService;
pub use types::{
    DownloadedFile, FileCategory, MetadataPayload, MetadataUpdate, TaskFile, TaskMetadata,
    TaskStatus, TaskSubstatus,
};
