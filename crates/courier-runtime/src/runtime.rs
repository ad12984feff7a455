//! Runtime bootstrap.
//!
//! [`CourierRuntime`] turns a loaded [`CourierConfig`] into ready-to-run
//! [`MessageFunction`]s: it validates the configuration, installs logging
//! and compiles the lifecycle options once so every function built from it
//! shares the same filters and expiration policy.
//!
//! ```rust,ignore
//! use courier_runtime::CourierRuntime;
//!
//! let runtime = CourierRuntime::builder()
//!     .config_file("courier.toml")
//!     .build()?;
//!
//! let function = runtime.function::<CloudEvent, _>(Arc::new(Orders));
//! ```

use std::sync::Arc;

use courier_core::Envelope;
use courier_framework::{LifecycleOptions, LifecycleSource};
use tracing::info;

use crate::config::{ConfigLoader, CourierConfig, validate_config};
use crate::error::RuntimeResult;
use crate::function::MessageFunction;
use crate::logging;

/// Validated configuration plus the lifecycle options compiled from it.
#[derive(Debug, Clone)]
pub struct CourierRuntime {
    config: CourierConfig,
    options: LifecycleOptions,
}

impl CourierRuntime {
    /// Creates a runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Validates `config`, initializes logging and compiles lifecycle options.
    pub fn from_config(config: &CourierConfig) -> RuntimeResult<Self> {
        validate_config(config)?;
        logging::init_from_config(&config.logging);
        let options = config.lifecycle.to_options()?;

        info!(
            log_level = %config.logging.level,
            binding = %options.binding,
            abort_on_reject = options.abort_on_reject,
            filters = options.filter.len(),
            expiration = ?options.expiration,
            "Runtime initialized from configuration"
        );

        Ok(Self {
            config: config.clone(),
            options,
        })
    }

    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    /// The compiled lifecycle options.
    pub fn options(&self) -> &LifecycleOptions {
        &self.options
    }

    /// Builds a function for `source` using this runtime's options.
    pub fn function<E, S>(&self, source: Arc<S>) -> MessageFunction<E, S>
    where
        E: Envelope,
        S: LifecycleSource<E> + ?Sized + 'static,
    {
        MessageFunction::with_options(source, self.options.clone())
    }
}

/// Builder for [`CourierRuntime`].
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g. "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: CourierConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<CourierRuntime> {
        let config = self.config_loader.load()?;
        CourierRuntime::from_config(&config)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::{ConfigError, FilterConfig};
    use crate::error::RuntimeError;
    use crate::host::BindingContext;
    use async_trait::async_trait;
    use courier_core::{Binding, BoxError, CloudEvent};
    use courier_framework::{EventHandler, InvocationOutcome, MessageContext};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    #[async_trait]
    impl EventHandler for Counter {
        async fn on_event(&self, _ctx: &mut MessageContext<CloudEvent>) -> Result<(), BoxError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn isolated() -> RuntimeBuilder {
        let dir = std::env::temp_dir().join(format!("courier-runtime-{}", uuid::Uuid::new_v4()));
        CourierRuntime::builder().search_path(dir).without_env()
    }

    #[test]
    fn test_build_with_defaults() {
        let runtime = isolated().build().unwrap();
        assert_eq!(runtime.options().binding, "message");
        assert!(runtime.options().filter.is_empty());
    }

    #[test]
    fn test_invalid_config_fails() {
        let mut config = CourierConfig::default();
        config.lifecycle.filters.push(FilterConfig {
            attribute: "type".into(),
            pattern: "(".into(),
        });

        let err = isolated().merge(config).build().unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Config(ConfigError::InvalidPattern { .. })
        ));
    }

    #[tokio::test]
    async fn test_function_uses_runtime_options() {
        let mut config = CourierConfig::default();
        config.lifecycle.binding = "queue".into();
        let runtime = isolated().merge(config).build().unwrap();

        let counter = Arc::new(Counter::default());
        let function = runtime.function::<CloudEvent, Counter>(counter.clone());

        let event = CloudEvent::builder("t", "s").build().unwrap();
        let host =
            BindingContext::new().with_binding("queue", Binding::new(event.to_json().unwrap()));

        assert_eq!(function.execute(Arc::new(host)).await, InvocationOutcome::Completed);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }
}
