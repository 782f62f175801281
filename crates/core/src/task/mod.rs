//! Task runner: one file translation task end to end.
//!
//! Fetches task metadata, downloads the source file, runs the pipeline while
//! mirroring its events into task status updates, uploads the result and
//! always cleans up the task's working files.

mod error;
mod listener;
mod runner;

pub use error::TaskError;
pub use runner::{TaskOutcome, TaskRunner};
