//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service traits,
//! allowing end-to-end testing of the worker without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use doctrans_core::testing::{fixtures, MockJobService, MockTranslationClient};
//!
//! let client = MockTranslationClient::new();
//! let jobs = MockJobService::new();
//! jobs.add_task("task-1", fixtures::task_metadata("en", "lv", ".txt"), "Hello\n").await;
//!
//! // Build a TaskRunner with the mocks...
//! ```

mod mock_job_service;
mod mock_translation_client;

pub use mock_job_service::{MockJobService, RecordedUpload};
pub use mock_translation_client::{LatencyFn, MockTranslationClient};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::job_service::{TaskFile, TaskMetadata, TaskStatus, TaskSubstatus};
    use crate::segmenter::{Segment, Terminator};

    /// Create task metadata with a single source file.
    pub fn task_metadata(src_lang: &str, trg_lang: &str, extension: &str) -> TaskMetadata {
        TaskMetadata {
            src_lang: src_lang.to_string(),
            trg_lang: trg_lang.to_string(),
            domain: None,
            segments: 0,
            translated_segments: 0,
            status: TaskStatus::Initializing,
            substatus: TaskSubstatus::Unspecified,
            files: vec![TaskFile {
                id: "source-file".to_string(),
                category: "Source".to_string(),
                extension: extension.to_string(),
            }],
        }
    }

    /// Create LF-terminated segments from texts.
    pub fn segments(texts: &[&str]) -> Vec<Segment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Segment::new(i, *t, Terminator::Lf))
            .collect()
    }

    /// Create a plain text document with one line per text.
    pub fn plain_text_document(lines: usize) -> String {
        (0..lines).map(|i| format!("Line number {}\n", i)).collect()
    }
}
