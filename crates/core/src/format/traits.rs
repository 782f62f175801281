use std::path::PathBuf;

use crate::segmenter::Segment;

use super::error::FormatError;

/// Segments extracted from a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Segments in document order, `segments[i].index == i`.
    pub segments: Vec<Segment>,
    /// Intermediate files created during extraction, removed when the job ends.
    pub temp_artifacts: Vec<PathBuf>,
}

impl Extraction {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            temp_artifacts: Vec::new(),
        }
    }
}

/// A document format the pipeline can translate.
pub trait DocumentFormat: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Extract translatable segments in document order.
    fn extract(&self, document: &[u8]) -> Result<Extraction, FormatError>;

    /// Rebuild the document from translated lines.
    ///
    /// `lines[i]` is the translation of segment `i` followed by its original
    /// terminator.
    fn reassemble(&self, document: &[u8], lines: &[String]) -> Result<Vec<u8>, FormatError>;
}
