pub mod config;
pub mod dispatcher;
pub mod format;
pub mod job_service;
pub mod metrics;
pub mod pipeline;
pub mod progress;
pub mod segmenter;
pub mod task;
pub mod testing;
pub mod translation;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use dispatcher::{DispatchError, Dispatcher, DispatcherConfig, StopHandle};
pub use pipeline::{JobEvent, JobOutcome, JobState, PipelineController, PipelineError};
pub use task::{TaskError, TaskOutcome, TaskRunner};
