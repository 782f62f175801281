use async_trait::async_trait;
use std::path::Path;

use super::error::JobServiceError;
use super::types::{DownloadedFile, FileCategory, MetadataUpdate, TaskMetadata};

/// Task metadata and file storage of the file translation service.
#[async_trait]
pub trait JobService: Send + Sync {
    /// Fetch the current metadata of a task.
    async fn get_metadata(&self, task_id: &str) -> Result<TaskMetadata, JobServiceError>;

    /// Merge `update` into the last known metadata and store it.
    async fn update_metadata(
        &self,
        task_id: &str,
        update: MetadataUpdate,
    ) -> Result<TaskMetadata, JobServiceError>;

    /// Save the task's source file into `dir`.
    async fn download_source(
        &self,
        task_id: &str,
        dir: &Path,
    ) -> Result<DownloadedFile, JobServiceError>;

    /// Attach a local file to the task.
    async fn upload_file(
        &self,
        task_id: &str,
        path: &Path,
        category: FileCategory,
    ) -> Result<(), JobServiceError>;

    /// Forget cached state of a finished task.
    async fn release(&self, _task_id: &str) {}
}
