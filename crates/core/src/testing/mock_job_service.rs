//! Mock job service for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::job_service::{
    DownloadedFile, FileCategory, JobService, JobServiceError, MetadataUpdate, TaskMetadata,
    TaskStatus,
};

/// A recorded upload for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub task_id: String,
    pub category: FileCategory,
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Mock implementation of the JobService trait.
///
/// Provides controllable behavior for testing:
/// - Register tasks with metadata and source file content
/// - Track metadata updates and uploads for assertions
/// - Simulate failures of the next operation
#[derive(Debug, Clone, Default)]
pub struct MockJobService {
    metadata: Arc<RwLock<HashMap<String, TaskMetadata>>>,
    /// Source file content by task.
    sources: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    updates: Arc<RwLock<Vec<(String, MetadataUpdate)>>>,
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<JobServiceError>>>,
}

impl MockJobService {
    /// Create a new mock job service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task with its metadata and source file content.
    pub async fn add_task(&self, task_id: &str, metadata: TaskMetadata, source: impl Into<Vec<u8>>) {
        self.metadata
            .write()
            .await
            .insert(task_id.to_string(), metadata);
        self.sources
            .write()
            .await
            .insert(task_id.to_string(), source.into());
    }

    /// Current stored metadata of a task.
    pub async fn metadata(&self, task_id: &str) -> Option<TaskMetadata> {
        self.metadata.read().await.get(task_id).cloned()
    }

    /// Get all recorded updates of a task, in order.
    pub async fn recorded_updates(&self, task_id: &str) -> Vec<MetadataUpdate> {
        self.updates
            .read()
            .await
            .iter()
            .filter(|(id, _)| id == task_id)
            .map(|(_, update)| update.clone())
            .collect()
    }

    /// Statuses a task went through, in order.
    pub async fn status_history(&self, task_id: &str) -> Vec<TaskStatus> {
        self.recorded_updates(task_id)
            .await
            .into_iter()
            .filter_map(|u| u.status)
            .collect()
    }

    /// Get all recorded uploads.
    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: JobServiceError) {
        *self.next_error.write().await = Some(error);
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<JobServiceError> {
        self.next_error.write().await.take()
    }

    async fn stored(&self, task_id: &str) -> Result<TaskMetadata, JobServiceError> {
        self.metadata
            .read()
            .await
            .get(task_id)
            .cloned()
            .ok_or_else(|| JobServiceError::Http {
                status: 404,
                body: format!("task {} not found", task_id),
            })
    }
}

#[async_trait]
impl JobService for MockJobService {
    async fn get_metadata(&self, task_id: &str) -> Result<TaskMetadata, JobServiceError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.stored(task_id).await
    }

    async fn update_metadata(
        &self,
        task_id: &str,
        update: MetadataUpdate,
    ) -> Result<TaskMetadata, JobServiceError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let mut metadata = self.stored(task_id).await?;
        metadata.apply(&update);
        self.metadata
            .write()
            .await
            .insert(task_id.to_string(), metadata.clone());
        self.updates
            .write()
            .await
            .push((task_id.to_string(), update));
        Ok(metadata)
    }

    async fn download_source(
        &self,
        task_id: &str,
        dir: &Path,
    ) -> Result<DownloadedFile, JobServiceError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let metadata = self.stored(task_id).await?;
        let source = metadata
            .source_file()
            .ok_or_else(|| JobServiceError::NoSourceFile(task_id.to_string()))?;
        let content = self
            .sources
            .read()
            .await
            .get(task_id)
            .cloned()
            .unwrap_or_default();

        let storage_name = source.storage_name();
        let path = dir.join(&storage_name);
        tokio::fs::write(&path, content).await?;
        Ok(DownloadedFile { path, storage_name })
    }

    async fn upload_file(
        &self,
        task_id: &str,
        path: &Path,
        category: FileCategory,
    ) -> Result<(), JobServiceError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let content = tokio::fs::read(path).await?;
        self.uploads.write().await.push(RecordedUpload {
            task_id: task_id.to_string(),
            category,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            content,
        });
        Ok(())
    }
}
