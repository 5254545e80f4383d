use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Upload size limit is positive
/// - Retention threshold and per-run budget are positive
/// - Storage root is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.upload.max_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "upload.max_bytes must be greater than 0".to_string(),
        ));
    }

    if config.retention.threshold_secs == 0 {
        return Err(ConfigError::ValidationError(
            "retention.threshold_secs must be greater than 0".to_string(),
        ));
    }

    if config.retention.max_files_per_run == 0 {
        return Err(ConfigError::ValidationError(
            "retention.max_files_per_run must be greater than 0".to_string(),
        ));
    }

    if config.retention.interval_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "retention.interval_secs cannot be 0".to_string(),
        ));
    }

    if config.storage.root.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.root cannot be empty".to_string(),
        ));
    }

    Ok(())
}
