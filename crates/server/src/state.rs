use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use doctrans_core::{Config, SanitizedConfig, TaskRunner};

/// Shared application state
pub struct AppState {
    config: Config,
    runner: Arc<TaskRunner>,
    shutting_down: AtomicBool,
}

impl AppState {
    pub fn new(config: Config, runner: Arc<TaskRunner>) -> Self {
        Self {
            config,
            runner,
            shutting_down: AtomicBool::new(false),
        }
    }

    pub fn runner(&self) -> &Arc<TaskRunner> {
        &self.runner
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Ready until shutdown starts.
    pub fn is_ready(&self) -> bool {
        !self.shutting_down.load(Ordering::SeqCst)
    }

    pub fn begin_shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
    }
}
