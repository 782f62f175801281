//! Types for the segmenter module.

use serde::{Deserialize, Serialize};

/// Line terminator that followed a segment in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminator {
    /// Last line of a document without a trailing newline.
    #[default]
    None,
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
}

impl Terminator {
    /// The literal characters this terminator stands for.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// A single translatable unit of text (one line of the extracted document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Position in source order.
    pub index: usize,
    /// Text sent for translation. Never contains the terminator.
    pub text: String,
    /// Terminator restored after translation.
    pub terminator: Terminator,
}

impl Segment {
    pub fn new(index: usize, text: impl Into<String>, terminator: Terminator) -> Self {
        Self {
            index,
            text: text.into(),
            terminator,
        }
    }

    /// Character count used for batch sizing (Unicode scalar values).
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// A bounded group of segments sent together in one translation request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Batch {
    /// Segment indices in source order.
    pub segment_indices: Vec<usize>,
    /// Sum of the segments' character counts.
    pub char_count: usize,
}

impl Batch {
    /// Number of segments in the batch.
    pub fn len(&self) -> usize {
        self.segment_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segment_indices.is_empty()
    }

    /// Whether this batch holds a single segment larger than the limit.
    pub fn is_oversized_singleton(&self, max_batch_characters: usize) -> bool {
        self.segment_indices.len() == 1 && self.char_count > max_batch_characters
    }

    /// Collect the texts of this batch, in order, from the full segment list.
    pub fn texts(&self, segments: &[Segment]) -> Vec<String> {
        self.segment_indices
            .iter()
            .map(|&i| segments[i].text.clone())
            .collect()
    }

    pub(super) fn add(&mut self, segment: &Segment, chars: usize) {
        self.segment_indices.push(segment.index);
        self.char_count += chars;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminator_literals() {
        assert_eq!(Terminator::None.as_str(), "");
        assert_eq!(Terminator::Lf.as_str(), "\n");
        assert_eq!(Terminator::CrLf.as_str(), "\r\n");
    }

    #[test]
    fn test_char_count_counts_scalars_not_bytes() {
        let segment = Segment::new(0, "žāļš", Terminator::Lf);
        assert_eq!(segment.char_count(), 4);
        assert_eq!(segment.text.len(), 8);
    }

    #[test]
    fn test_batch_texts_follow_indices() {
        let segments = vec![
            Segment::new(0, "a", Terminator::Lf),
            Segment::new(1, "b", Terminator::Lf),
            Segment::new(2, "c", Terminator::None),
        ];
        let batch = Batch {
            segment_indices: vec![1, 2],
            char_count: 2,
        };
        assert_eq!(batch.texts(&segments), vec!["b", "c"]);
    }
}
