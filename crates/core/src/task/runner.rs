use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::dispatcher::{Dispatcher, DispatcherConfig, StopHandle};
use crate::format::FormatRegistry;
use crate::job_service::{FileCategory, JobService, MetadataUpdate, TaskStatus};
use crate::pipeline::{create_event_channel, JobOutcome, PipelineController, TranslationJob};
use crate::progress::ProgressConfig;
use crate::translation::{TextType, TranslationClient};

use super::error::TaskError;
use super::listener;

/// Buffer of the per-task event channel.
const EVENT_BUFFER: usize = 64;

/// How a task ended without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed {
        translated_segments: usize,
        domain: Option<String>,
    },
    Halted,
}

/// Runs file translation tasks.
///
/// Cheap to share behind an `Arc`; every running task is tracked so it can
/// be halted with [`TaskRunner::stop`].
pub struct TaskRunner {
    job_service: Arc<dyn JobService>,
    translation: Arc<dyn TranslationClient>,
    formats: FormatRegistry,
    dispatcher: DispatcherConfig,
    progress: ProgressConfig,
    text_type: TextType,
    work_dir: PathBuf,
    active: Arc<RwLock<HashMap<String, StopHandle>>>,
}

impl TaskRunner {
    pub fn new(
        job_service: Arc<dyn JobService>,
        translation: Arc<dyn TranslationClient>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            job_service,
            translation,
            formats: FormatRegistry::default(),
            dispatcher: DispatcherConfig::default(),
            progress: ProgressConfig::default(),
            text_type: TextType::default(),
            work_dir: work_dir.into(),
            active: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Build a runner using the dispatcher, progress and worker settings of `config`.
    pub fn from_config(
        job_service: Arc<dyn JobService>,
        translation: Arc<dyn TranslationClient>,
        config: &Config,
    ) -> Self {
        Self::new(job_service, translation, config.worker.work_dir.clone())
            .with_dispatcher_config(config.dispatcher.clone())
            .with_progress_config(config.progress.clone())
            .with_text_type(config.translation.text_type)
    }

    pub fn with_formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_dispatcher_config(mut self, config: DispatcherConfig) -> Self {
        self.dispatcher = config;
        self
    }

    pub fn with_progress_config(mut self, config: ProgressConfig) -> Self {
        self.progress = config;
        self
    }

    pub fn with_text_type(mut self, text_type: TextType) -> Self {
        self.text_type = text_type;
        self
    }

    /// Halt a running task. Returns false if the task is not running.
    pub async fn stop(&self, task_id: &str) -> bool {
        match self.active.read().await.get(task_id) {
            Some(stop) => {
                info!(task_id, "Stopping task");
                stop.stop();
                true
            }
            None => false,
        }
    }

    /// Halt every running task.
    pub async fn stop_all(&self) {
        for (task_id, stop) in self.active.read().await.iter() {
            info!(task_id = %task_id, "Stopping task");
            stop.stop();
        }
    }

    pub async fn is_running(&self, task_id: &str) -> bool {
        self.active.read().await.contains_key(task_id)
    }

    /// Ids of running tasks, sorted.
    pub async fn active_tasks(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.active.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Register a task as running before it starts.
    ///
    /// Lets callers reject duplicates synchronously and run the task later
    /// with [`TaskRunner::run_registered`].
    pub async fn register(&self, task_id: &str) -> Result<StopHandle, TaskError> {
        validate_task_id(task_id)?;

        let mut active = self.active.write().await;
        if active.contains_key(task_id) {
            return Err(TaskError::AlreadyRunning(task_id.to_string()));
        }
        let stop = StopHandle::new();
        active.insert(task_id.to_string(), stop.clone());
        Ok(stop)
    }

    /// Run a task to its end.
    pub async fn run(&self, task_id: &str) -> Result<TaskOutcome, TaskError> {
        let stop = self.register(task_id).await?;
        self.run_registered(task_id, stop).await
    }

    /// Run a task previously registered with [`TaskRunner::register`].
    pub async fn run_registered(
        &self,
        task_id: &str,
        stop: StopHandle,
    ) -> Result<TaskOutcome, TaskError> {
        let started = Instant::now();
        let task_dir = self.work_dir.join(task_id);
        let mut temp_files = Vec::new();

        info!(task_id, "Starting file translation task");
        let result = self.execute(task_id, &stop, &task_dir, &mut temp_files).await;

        match result {
            Ok(TaskOutcome::Halted) => {
                self.report(task_id, MetadataUpdate::status(TaskStatus::Cancelled))
                    .await;
            }
            Ok(TaskOutcome::Completed { .. }) => {}
            Err(ref e) => {
                error!(task_id, error = %e, substatus = ?e.substatus(), "File translation task failed");
                self.report(task_id, MetadataUpdate::error(e.substatus()))
                    .await;
            }
        }

        cleanup(task_id, &task_dir, &temp_files).await;
        self.job_service.release(task_id).await;
        self.active.write().await.remove(task_id);

        info!(
            task_id,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "File translation task finished"
        );
        result
    }

    async fn execute(
        &self,
        task_id: &str,
        stop: &StopHandle,
        task_dir: &Path,
        temp_files: &mut Vec<PathBuf>,
    ) -> Result<TaskOutcome, TaskError> {
        self.job_service
            .update_metadata(task_id, MetadataUpdate::status(TaskStatus::Initializing))
            .await?;
        let metadata = self.job_service.get_metadata(task_id).await?;

        let source_dir = task_dir.join("source");
        let result_dir = task_dir.join("result");
        tokio::fs::create_dir_all(&source_dir).await?;
        tokio::fs::create_dir_all(&result_dir).await?;

        let downloaded = self.job_service.download_source(task_id, &source_dir).await?;
        let format = self.formats.resolve_path(&downloaded.path)?;
        info!(task_id, format = format.name(), "Resolved document format");

        let document = tokio::fs::read(&downloaded.path).await?;

        let (events, rx) = create_event_channel(EVENT_BUFFER);
        let listener = tokio::spawn(listener::listen(Arc::clone(&self.job_service), rx));

        let dispatcher = Dispatcher::new(Arc::clone(&self.translation), self.dispatcher.clone())
            .with_text_type(self.text_type);
        let controller = PipelineController::new(dispatcher, self.progress.clone())
            .with_events(events)
            .with_stop_handle(stop.clone());

        let mut job = TranslationJob::new(task_id, metadata.languages());
        job.domain = metadata.fixed_domain();

        let result = controller.run(&job, format.as_ref(), &document).await;
        // Closes the event channel so the listener drains and returns.
        drop(controller);
        match listener.await {
            Ok(artifacts) => temp_files.extend(artifacts),
            Err(e) => warn!(task_id, error = %e, "Event listener failed"),
        }

        let translated = match result? {
            JobOutcome::Halted => return Ok(TaskOutcome::Halted),
            JobOutcome::Completed(translated) => translated,
        };

        let result_path = result_dir.join(&downloaded.storage_name);
        tokio::fs::write(&result_path, &translated.document).await?;
        self.job_service
            .upload_file(task_id, &result_path, FileCategory::Translated)
            .await?;

        self.job_service
            .update_metadata(
                task_id,
                MetadataUpdate::status(TaskStatus::Completed)
                    .with_translated_segments(translated.translated_segments),
            )
            .await?;

        Ok(TaskOutcome::Completed {
            translated_segments: translated.translated_segments,
            domain: translated.domain,
        })
    }

    /// Send a final status; failures are logged only.
    async fn report(&self, task_id: &str, update: MetadataUpdate) {
        if let Err(e) = self.job_service.update_metadata(task_id, update).await {
            error!(task_id, error = %e, "Failed to report task status");
        }
    }
}

/// Task ids become directory names.
fn validate_task_id(task_id: &str) -> Result<(), TaskError> {
    let valid = !task_id.is_empty()
        && task_id != "."
        && task_id != ".."
        && task_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(TaskError::InvalidTaskId(task_id.to_string()))
    }
}

/// Remove temporary files and the task directory.
async fn cleanup(task_id: &str, task_dir: &Path, temp_files: &[PathBuf]) {
    info!(task_id, "Cleaning up temporary files");

    for path in temp_files {
        match tokio::fs::remove_file(path).await {
            Ok(()) => info!(task_id, path = %path.display(), "Removed temporary file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(task_id, path = %path.display(), "Temporary file already gone");
            }
            Err(e) => warn!(task_id, path = %path.display(), error = %e, "Unable to remove file"),
        }
    }

    if let Err(e) = tokio::fs::remove_dir_all(task_dir).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(task_id, dir = %task_dir.display(), error = %e, "Unable to remove directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockJobService, MockTranslationClient};

    #[test]
    fn test_validate_task_id() {
        assert!(validate_task_id("6c1f0b2e-task_1.v2").is_ok());
        assert!(validate_task_id("").is_err());
        assert!(validate_task_id("..").is_err());
        assert!(validate_task_id("a/b").is_err());
        assert!(validate_task_id("a b").is_err());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let runner = TaskRunner::new(
            Arc::new(MockJobService::new()),
            Arc::new(MockTranslationClient::new()),
            dir.path(),
        );

        runner.register("task-1").await.unwrap();
        assert!(matches!(
            runner.register("task-1").await,
            Err(TaskError::AlreadyRunning(_))
        ));
        assert_eq!(runner.active_tasks().await, vec!["task-1"]);
        assert!(runner.stop("task-1").await);
        assert!(!runner.stop("task-2").await);
    }

    #[tokio::test]
    async fn test_unknown_task_reports_nothing_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = MockJobService::new();
        let runner = TaskRunner::new(
            Arc::new(jobs.clone()),
            Arc::new(MockTranslationClient::new()),
            dir.path(),
        );

        let err = runner.run("missing").await.unwrap_err();
        assert!(matches!(err, TaskError::JobService(_)));
        assert!(!runner.is_running("missing").await);
        assert!(!dir.path().join("missing").exists());
    }

    #[tokio::test]
    async fn test_completed_task_uploads_result() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = MockJobService::new();
        jobs.add_task("task-1", fixtures::task_metadata("en", "lv", ".txt"), "Hello\nWorld\n")
            .await;
        let client = MockTranslationClient::new();
        client.set_prefix("lv:").await;
        let runner = TaskRunner::new(Arc::new(jobs.clone()), Arc::new(client), dir.path());

        let outcome = runner.run("task-1").await.unwrap();
        assert_eq!(
            outcome,
            TaskOutcome::Completed {
                translated_segments: 2,
                domain: Some("general".to_string())
            }
        );

        let uploads = jobs.recorded_uploads().await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].category, FileCategory::Translated);
        assert_eq!(uploads[0].file_name, "Source.txt");
        assert_eq!(uploads[0].content, b"lv:Hello\nlv:World\n".to_vec());
        assert!(!dir.path().join("task-1").exists());
    }
}
