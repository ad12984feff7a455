//! Configuration validation utilities.

use regex::Regex;

use super::error::{ConfigError, ConfigResult};
use super::schema::{CourierConfig, LifecycleConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &CourierConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_lifecycle_config(&config.lifecycle)?;
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Log filter module name cannot be blank: {module:?}"
        )));
    }

    Ok(())
}

/// Validates lifecycle settings.
fn validate_lifecycle_config(lifecycle: &LifecycleConfig) -> ConfigResult<()> {
    if lifecycle.binding.trim().is_empty() {
        return Err(ConfigError::missing_field("lifecycle.binding"));
    }

    if let Some(expiration) = &lifecycle.expiration {
        if expiration.max_age == 0 {
            return Err(ConfigError::validation(
                "Expiration max_age must be greater than 0",
            ));
        }
    }

    for filter in &lifecycle.filters {
        if filter.attribute.trim().is_empty() {
            return Err(ConfigError::missing_field("lifecycle.filters.attribute"));
        }
        if let Err(e) = Regex::new(&filter.pattern) {
            return Err(ConfigError::invalid_pattern(
                filter.attribute.as_str(),
                e.to_string(),
            ));
        }
    }

    Ok(())
}
