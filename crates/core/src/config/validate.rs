use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Catalog page size is at least 1
/// - Queue storage key is not empty
/// - Executor timeout and connectivity intervals are positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.catalog.page_size == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.page_size must be at least 1".to_string(),
        ));
    }

    if config.queue.storage_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "queue.storage_key cannot be empty".to_string(),
        ));
    }

    if config.executor.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "executor.timeout_secs must be greater than 0".to_string(),
        ));
    }

    if config.connectivity.poll_interval_ms == 0 || config.connectivity.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "connectivity intervals must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
