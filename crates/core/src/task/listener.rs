//! Mirrors pipeline events into task metadata updates.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::job_service::{JobService, MetadataUpdate, TaskStatus};
use crate::pipeline::{JobEvent, JobEventEnvelope};

/// Metadata update for an event, if the event is reported at all.
pub(super) fn update_for(event: &JobEvent) -> Option<MetadataUpdate> {
    match event {
        JobEvent::ExtractionStarted => Some(MetadataUpdate::status(TaskStatus::Extracting)),
        JobEvent::Started => Some(MetadataUpdate::status(TaskStatus::Translating)),
        JobEvent::PostprocessStarted => Some(MetadataUpdate::status(TaskStatus::Saving)),
        JobEvent::Progress {
            domain,
            segment_count,
            segments_translated,
        } => {
            let update = MetadataUpdate {
                segments: *segment_count,
                translated_segments: *segments_translated,
                domain: domain.clone(),
                ..Default::default()
            };
            (!update.is_empty()).then_some(update)
        }
        // Final statuses are set by the runner once the result is stored.
        JobEvent::TempArtifactCreated { .. }
        | JobEvent::Completed { .. }
        | JobEvent::Halted
        | JobEvent::Failed { .. } => None,
    }
}

/// Consume events until the channel closes.
///
/// Returns the temporary files reported by the pipeline.
pub(super) async fn listen(
    job_service: Arc<dyn JobService>,
    mut rx: mpsc::Receiver<JobEventEnvelope>,
) -> Vec<PathBuf> {
    let mut temp_artifacts = Vec::new();

    while let Some(envelope) = rx.recv().await {
        let task_id = envelope.job_id.as_str();
        debug!(task_id, event = ?envelope.event, "Job event");

        if let JobEvent::TempArtifactCreated { ref path } = envelope.event {
            info!(task_id, path = %path.display(), "Temporary file created");
            temp_artifacts.push(path.clone());
            continue;
        }

        if let Some(update) = update_for(&envelope.event) {
            if let Err(e) = job_service.update_metadata(task_id, update).await {
                warn!(task_id, error = %e, "Failed to report task progress");
            }
        }
    }

    temp_artifacts
}
