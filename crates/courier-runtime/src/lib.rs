//! Courier Runtime - hosting layer for the Courier message lifecycle.
//!
//! This crate provides:
//! - Layered configuration (`courier.toml`, `COURIER_*` environment variables)
//! - Logging setup on `tracing-subscriber`
//! - An in-memory host context ([`BindingContext`])
//! - The function entry point ([`MessageFunction`]) that runs INITIALIZE and
//!   PROCESS for each invocation
//! - Runtime bootstrap ([`CourierRuntime`])
//!
//! ```ignore
//! use courier_runtime::{BindingContext, CourierRuntime};
//!
//! let runtime = CourierRuntime::builder().build()?;
//! let function = runtime.function::<CloudEvent, _>(Arc::new(Orders));
//!
//! let host = BindingContext::new().with_binding("message", Binding::new(body));
//! let outcome = function.execute(Arc::new(host)).await;
//! ```

pub mod config;
pub mod error;
pub mod function;
pub mod host;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, CourierConfig, LifecycleConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use function::MessageFunction;
pub use host::BindingContext;
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{CourierRuntime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
