//! Configuration module for the Courier runtime.
//!
//! Loads logging and lifecycle settings from layered sources and validates
//! them before the lifecycle engine is built.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    CourierConfig, ExpirationConfig, FilterConfig, LifecycleConfig, LogFormat, LogOutput,
    LoggingConfig, SpanEventConfig,
};
pub use validation::validate_config;
