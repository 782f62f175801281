//! Pipeline controller for one translation job.
//!
//! Composes a [`DocumentFormat`](crate::format::DocumentFormat), the
//! segmenter and the [`Dispatcher`](crate::dispatcher::Dispatcher):
//! extract segments, batch them, translate in order, reassemble. Lifecycle
//! events go to a [`JobEventHandle`]; the controller does not know who
//! listens.

mod controller;
mod error;
mod events;
mod handle;
mod types;

pub use controller::PipelineController;
pub use error::PipelineError;
pub use events::JobEvent;
pub use handle::{create_event_channel, JobEventEnvelope, JobEventHandle};
pub use types::{JobOutcome, JobState, TranslatedDocument, TranslationJob};
