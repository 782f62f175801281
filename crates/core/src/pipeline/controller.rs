//! Pipeline controller: extraction, dispatch and reassembly of one job.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::dispatcher::{DispatchError, Dispatcher, StopHandle};
use crate::format::DocumentFormat;
use crate::metrics;
use crate::progress::{ProgressConfig, ProgressReporter, ProgressUpdate};
use crate::segmenter::segment;

use super::error::PipelineError;
use super::events::JobEvent;
use super::handle::JobEventHandle;
use super::types::{JobOutcome, JobState, TranslatedDocument, TranslationJob};

/// Runs one translation job through its states.
///
/// `Created -> Extracting -> Translating -> Completed | Failed | Halted`.
/// A controller is single use; create one per job.
pub struct PipelineController {
    dispatcher: Dispatcher,
    progress: ProgressConfig,
    events: Option<JobEventHandle>,
    stop: StopHandle,
    state: Arc<RwLock<JobState>>,
}

impl PipelineController {
    pub fn new(dispatcher: Dispatcher, progress: ProgressConfig) -> Self {
        Self {
            dispatcher,
            progress,
            events: None,
            stop: StopHandle::new(),
            state: Arc::new(RwLock::new(JobState::Created)),
        }
    }

    /// Sets the handle lifecycle events are sent to.
    pub fn with_events(mut self, events: JobEventHandle) -> Self {
        self.events = Some(events);
        self
    }

    /// Use an existing stop handle, e.g. one registered before the job started.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Handle that halts this job from any task.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub async fn state(&self) -> JobState {
        *self.state.read().await
    }

    /// Translate `document` with `format`.
    ///
    /// Returns the reassembled document, or [`JobOutcome::Halted`] when the
    /// job was stopped. Failures are returned as errors after the `Failed`
    /// event was emitted.
    pub async fn run(
        &self,
        job: &TranslationJob,
        format: &dyn DocumentFormat,
        document: &[u8],
    ) -> Result<JobOutcome, PipelineError> {
        {
            let mut state = self.state.write().await;
            if *state != JobState::Created {
                return Err(PipelineError::AlreadyStarted);
            }
            *state = JobState::Extracting;
        }

        let started = Instant::now();
        let result = self.execute(job, format, document).await;
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(JobOutcome::Completed(translated)) => {
                self.set_state(JobState::Completed).await;
                info!(
                    job_id = %job.id,
                    segments = translated.translated_segments,
                    elapsed_secs = elapsed,
                    "Translation job completed"
                );
                self.emit(
                    job,
                    JobEvent::Completed {
                        translated_segments: translated.translated_segments,
                    },
                )
                .await;
                record_outcome("completed", elapsed);
                Ok(JobOutcome::Completed(translated))
            }
            Ok(JobOutcome::Halted) | Err(PipelineError::Dispatch(DispatchError::Cancelled)) => {
                self.set_state(JobState::Halted).await;
                info!(job_id = %job.id, "Translation job halted");
                self.emit(job, JobEvent::Halted).await;
                record_outcome("halted", elapsed);
                Ok(JobOutcome::Halted)
            }
            Err(e) => {
                self.set_state(JobState::Failed).await;
                error!(job_id = %job.id, kind = e.kind(), error = %e, "Translation job failed");
                self.emit(
                    job,
                    JobEvent::Failed {
                        kind: e.kind().to_string(),
                    },
                )
                .await;
                record_outcome("failed", elapsed);
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        job: &TranslationJob,
        format: &dyn DocumentFormat,
        document: &[u8],
    ) -> Result<JobOutcome, PipelineError> {
        if self.stop.is_stopped() {
            return Ok(JobOutcome::Halted);
        }

        self.emit(job, JobEvent::ExtractionStarted).await;
        debug!(job_id = %job.id, format = format.name(), "Extracting segments");
        let extraction = format.extract(document)?;
        for path in extraction.temp_artifacts {
            self.emit(job, JobEvent::TempArtifactCreated { path }).await;
        }

        let segments = extraction.segments;
        let max_batch_characters = self.dispatcher.config().max_batch_characters;
        let batches = segment(&segments, max_batch_characters)?;
        let oversized = batches
            .iter()
            .filter(|b| b.is_oversized_singleton(max_batch_characters))
            .count();
        if oversized > 0 {
            warn!(
                job_id = %job.id,
                oversized,
                max_batch_characters,
                "Segments over the batch limit are sent on their own"
            );
        }

        self.set_state(JobState::Translating).await;
        info!(
            job_id = %job.id,
            segments = segments.len(),
            batches = batches.len(),
            source = %job.languages.source,
            target = %job.languages.target,
            "Translating document"
        );
        self.emit(job, JobEvent::Started).await;
        self.emit(
            job,
            JobEvent::Progress {
                domain: job.domain.clone(),
                segment_count: Some(segments.len()),
                segments_translated: Some(0),
            },
        )
        .await;

        let mut run = self.dispatcher.run(
            &segments,
            batches,
            job.languages.clone(),
            job.domain.clone(),
            self.stop.clone(),
        );
        let mut reporter = ProgressReporter::new(&self.progress, segments.len());
        let mut translations = vec![String::new(); segments.len()];

        while let Some(result) = run.next().await {
            let output = result?;
            let count = output.segment_indices.len();
            for (index, translation) in output.segment_indices.into_iter().zip(output.translations) {
                translations[index] = translation;
            }
            metrics::SEGMENTS_TRANSLATED.inc_by(count as u64);

            if let Some(update) = reporter.record(count) {
                self.emit_progress(job, run.domain(), update).await;
            }
        }

        let domain = run.domain().map(String::from);
        if let Some(update) = reporter.finish() {
            self.emit_progress(job, domain.as_deref(), update).await;
        }

        self.emit(job, JobEvent::PostprocessStarted).await;
        let lines: Vec<String> = segments
            .iter()
            .zip(translations)
            .map(|(segment, translation)| translation + segment.terminator.as_str())
            .collect();
        let document = format.reassemble(document, &lines)?;

        Ok(JobOutcome::Completed(TranslatedDocument {
            document,
            domain,
            segment_count: segments.len(),
            translated_segments: reporter.segments_translated(),
        }))
    }

    async fn emit_progress(&self, job: &TranslationJob, domain: Option<&str>, update: ProgressUpdate) {
        debug!(
            job_id = %job.id,
            translated = update.segments_translated,
            total = update.segment_count,
            "Progress"
        );
        self.emit(
            job,
            JobEvent::Progress {
                domain: domain.map(String::from),
                segment_count: Some(update.segment_count),
                segments_translated: Some(update.segments_translated),
            },
        )
        .await;
    }

    async fn emit(&self, job: &TranslationJob, event: JobEvent) {
        if let Some(ref events) = self.events {
            events.emit(&job.id, event).await;
        }
    }

    async fn set_state(&self, state: JobState) {
        *self.state.write().await = state;
    }
}

fn record_outcome(outcome: &str, elapsed: f64) {
    metrics::JOBS_TOTAL.with_label_values(&[outcome]).inc();
    metrics::JOB_DURATION
        .with_label_values(&[outcome])
        .observe(elapsed);
}
