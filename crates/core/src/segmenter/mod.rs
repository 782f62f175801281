//! Segmenter: partitions ordered segments into character-bounded batches.
//!
//! Batching is greedy: segments are appended to the current batch while the
//! running character count stays within the limit. A segment that would
//! overflow closes the current batch and opens the next one. A segment that
//! is larger than the limit on its own becomes a singleton batch; it is never
//! split or dropped.

mod types;

pub use types::{Batch, Segment, Terminator};

use thiserror::Error;

/// Default upper bound for the characters of one batch.
pub const DEFAULT_MAX_BATCH_CHARACTERS: usize = 500;

/// Errors that can occur while segmenting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// The extracted document contained no segments.
    #[error("No text content to translate")]
    NoContent,
}

/// Partition `segments` into ordered batches of at most `max_batch_characters`.
///
/// `segments[i].index` must equal `i`; batches reference segments by index.
pub fn segment(segments: &[Segment], max_batch_characters: usize) -> Result<Vec<Batch>, SegmentError> {
    if segments.is_empty() {
        return Err(SegmentError::NoContent);
    }

    let mut batches = Vec::new();
    let mut current = Batch::default();

    for segment in segments {
        let chars = segment.char_count();

        if current.char_count + chars > max_batch_characters {
            if current.is_empty() {
                // Oversized segment on an empty batch: emit it alone.
                current.add(segment, chars);
                batches.push(std::mem::take(&mut current));
            } else {
                batches.push(std::mem::take(&mut current));
                current.add(segment, chars);
            }
        } else {
            current.add(segment, chars);
        }
    }

    if !current.is_empty() {
        batches.push(current);
    }

    Ok(batches)
}
