use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Translation and job service URLs are set
/// - Dispatcher limits are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.translation.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "translation.url cannot be empty".to_string(),
        ));
    }

    if config.job_service.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "job_service.url cannot be empty".to_string(),
        ));
    }

    let dispatcher = &config.dispatcher;
    if dispatcher.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "dispatcher.concurrency cannot be 0".to_string(),
        ));
    }
    if dispatcher.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "dispatcher.max_attempts cannot be 0".to_string(),
        ));
    }
    if dispatcher.max_batch_characters == 0 {
        return Err(ConfigError::ValidationError(
            "dispatcher.max_batch_characters cannot be 0".to_string(),
        ));
    }
    if dispatcher.max_consecutive_failures == Some(0) {
        return Err(ConfigError::ValidationError(
            "dispatcher.max_consecutive_failures cannot be 0".to_string(),
        ));
    }

    Ok(())
}
