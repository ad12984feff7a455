//! Integration layer - contracts consumed from the hosting framework.
//!
//! - [`HostContext`] for binding lookup and logging
//! - [`LifeCycle`] phases and the [`LifecycleContext`] family

pub mod host;
pub mod lifecycle;

pub use host::{Binding, BindingValue, HostContext, LogLevel};
pub use lifecycle::{LifeCycle, LifecycleContext};
