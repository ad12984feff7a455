//! # Courier Framework
//!
//! The lifecycle engine that drives envelopes through INITIALIZE and PROCESS.
//!
//! - [`FilterChain`]: ordered AND-chain of attribute patterns
//! - [`ExpirationPolicy`]: maximum envelope age
//! - [`MessageContext`]: per-invocation state with independent `rejected`
//!   and `aborted` flags
//! - [`EventHandler`] / [`MessageHandler`]: application hooks, both exposed
//!   to the engine as a [`LifecycleSource`]
//! - [`MessageLifecycle`]: the engine itself
//! - [`LifecycleService`]: the engine as a `tower::Service`
//!
//! ## Example
//!
//! ```rust,ignore
//! use courier_framework::prelude::*;
//!
//! let lifecycle = MessageLifecycle::<CloudEvent, _>::new(Arc::new(MyHandler))
//!     .with_options(LifecycleOptions::default().abort_on_reject(false));
//!
//! let mut ctx = lifecycle.create_context(host);
//! lifecycle.do_lifecycle(LifeCycle::Initialize, &mut ctx).await?;
//! lifecycle.do_lifecycle(LifeCycle::Process, &mut ctx).await?;
//! ```

pub mod context;
pub mod expiration;
pub mod filter;
pub mod handler;
pub mod lifecycle;
pub mod service;

#[cfg(test)]
mod test_support;

pub use context::{InvocationOutcome, MessageContext};
pub use expiration::ExpirationPolicy;
pub use filter::{FilterChain, FilterLink};
pub use handler::{EventHandler, LifecycleSource, MessageHandler};
pub use lifecycle::{DEFAULT_BINDING, LifecycleOptions, MessageLifecycle};
pub use service::LifecycleService;

/// Prelude for common imports.
pub mod prelude {
    pub use super::context::{InvocationOutcome, MessageContext};
    pub use super::expiration::ExpirationPolicy;
    pub use super::filter::FilterChain;
    pub use super::handler::{EventHandler, LifecycleSource, MessageHandler};
    pub use super::lifecycle::{LifecycleOptions, MessageLifecycle};
    pub use super::service::LifecycleService;
    pub use async_trait::async_trait;
    pub use courier_core::prelude::*;
}
