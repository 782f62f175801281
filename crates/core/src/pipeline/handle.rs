use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::JobEvent;

/// Envelope wrapping a job event with metadata
#[derive(Debug, Clone)]
pub struct JobEventEnvelope {
    pub timestamp: DateTime<Utc>,
    pub job_id: String,
    pub event: JobEvent,
}

/// Handle for emitting job events
///
/// This is cheaply cloneable and can be shared across tasks.
/// Events are delivered in emission order to a single listener.
#[derive(Clone)]
pub struct JobEventHandle {
    tx: mpsc::Sender<JobEventEnvelope>,
}

impl JobEventHandle {
    /// Create a new event handle from a channel sender
    pub fn new(tx: mpsc::Sender<JobEventEnvelope>) -> Self {
        Self { tx }
    }

    /// Emit an event
    ///
    /// Waits for channel capacity. If the listener is gone the error is
    /// logged but the caller is not failed.
    pub async fn emit(&self, job_id: &str, event: JobEvent) {
        let envelope = JobEventEnvelope {
            timestamp: Utc::now(),
            job_id: job_id.to_string(),
            event,
        };
        if let Err(e) = self.tx.send(envelope).await {
            tracing::warn!(job_id, "Failed to emit job event: {}", e);
        }
    }
}

/// Create an event channel: the handle for the controller and the receiver
/// for the listener task.
pub fn create_event_channel(buffer: usize) -> (JobEventHandle, mpsc::Receiver<JobEventEnvelope>) {
    let (tx, rx) = mpsc::channel(buffer);
    (JobEventHandle::new(tx), rx)
}
