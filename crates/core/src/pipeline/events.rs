use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle events emitted by the pipeline controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    ExtractionStarted,
    /// Segments extracted, translation starting.
    Started,
    Progress {
        domain: Option<String>,
        segment_count: Option<usize>,
        segments_translated: Option<usize>,
    },
    /// A temporary file the consumer must remove when the job ends.
    TempArtifactCreated {
        path: PathBuf,
    },
    PostprocessStarted,
    Completed {
        translated_segments: usize,
    },
    Halted,
    Failed {
        kind: String,
    },
}

impl JobEvent {
    /// Whether this event ends the job.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Halted | Self::Failed { .. }
        )
    }
}
