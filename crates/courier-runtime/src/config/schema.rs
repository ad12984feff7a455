//! Configuration schema definitions.

use std::collections::HashMap;
use std::path::PathBuf;

use courier_core::{LogLevel, TimeUnit};
use courier_framework::{
    DEFAULT_BINDING, ExpirationPolicy, FilterChain, FilterLink, LifecycleOptions,
};
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CourierConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Lifecycle engine settings.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line compact output.
    #[default]
    Compact,
    /// Default `tracing-subscriber` output.
    Full,
    /// Multi-line human friendly output.
    Pretty,
    /// Newline-delimited JSON.
    #[cfg(feature = "json-log")]
    Json,
}

/// Destination of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Requires [`LoggingConfig::file_path`].
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids in log lines.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line in log lines.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module level overrides, e.g. `courier_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            filters: HashMap::new(),
        }
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Maximum envelope age.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExpirationConfig {
    pub max_age: u64,
    #[serde(default)]
    pub unit: TimeUnit,
}

/// One `(attribute, pattern)` filter link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub attribute: String,
    pub pattern: String,
}

/// Lifecycle engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Host binding holding the raw envelope.
    #[serde(default = "default_binding")]
    pub binding: String,

    /// Escalate every rejection to an abort.
    #[serde(default = "default_abort_on_reject")]
    pub abort_on_reject: bool,

    /// Reject envelopes older than this. Unset means never.
    #[serde(default)]
    pub expiration: Option<ExpirationConfig>,

    /// Filter links, evaluated in order.
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            binding: default_binding(),
            abort_on_reject: default_abort_on_reject(),
            expiration: None,
            filters: Vec::new(),
        }
    }
}

fn default_binding() -> String {
    DEFAULT_BINDING.to_string()
}

fn default_abort_on_reject() -> bool {
    true
}

impl LifecycleConfig {
    /// Builds the engine options, compiling every filter pattern.
    pub fn to_options(&self) -> ConfigResult<LifecycleOptions> {
        let mut filter = FilterChain::new();
        for link in &self.filters {
            let compiled = FilterLink::new(link.attribute.as_str(), &link.pattern)
                .map_err(|e| ConfigError::invalid_pattern(link.attribute.as_str(), e.to_string()))?;
            filter.push(compiled);
        }

        let expiration = self
            .expiration
            .as_ref()
            .map_or(ExpirationPolicy::Never, |e| {
                ExpirationPolicy::max_age(e.max_age, e.unit)
            });

        Ok(LifecycleOptions {
            binding: self.binding.clone(),
            abort_on_reject: self.abort_on_reject,
            filter,
            expiration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = CourierConfig::default();
        assert_eq!(config.lifecycle.binding, "message");
        assert!(config.lifecycle.abort_on_reject);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_to_options() {
        let config = LifecycleConfig {
            abort_on_reject: false,
            expiration: Some(ExpirationConfig {
                max_age: 2,
                unit: TimeUnit::Hours,
            }),
            filters: vec![
                FilterConfig {
                    attribute: "type".into(),
                    pattern: "^com\\.example".into(),
                },
                FilterConfig {
                    attribute: "source".into(),
                    pattern: "^/orders".into(),
                },
            ],
            ..Default::default()
        };

        let options = config.to_options().unwrap();
        assert!(!options.abort_on_reject);
        assert_eq!(options.filter.len(), 2);
        assert_eq!(options.filter.get(1).map(FilterLink::attribute_name), Some("source"));
        assert_eq!(
            options.expiration,
            ExpirationPolicy::MaxAge(Duration::from_secs(7_200))
        );
    }

    #[test]
    fn test_bad_pattern_fails_conversion() {
        let config = LifecycleConfig {
            filters: vec![FilterConfig {
                attribute: "type".into(),
                pattern: "[".into(),
            }],
            ..Default::default()
        };
        assert!(matches!(
            config.to_options(),
            Err(ConfigError::InvalidPattern { attribute, .. }) if attribute == "type"
        ));
    }
}
