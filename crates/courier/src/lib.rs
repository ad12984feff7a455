//! # Courier
//!
//! A typed message-envelope lifecycle for event-driven functions.
//!
//! ## Overview
//!
//! Courier decodes an inbound binding into an envelope (a CloudEvents v1.0
//! event or a proprietary header-plus-payload message), disqualifies it
//! through filters and expiration checks, and hands accepted envelopes to an
//! application handler. Disqualification is a *rejection*. The terminal end
//! of a failed invocation is an *abort*.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────────────────────────────────┐
//! │ Host binding │────▶│ INITIALIZE: negotiate marshaller, decode      │
//! └──────────────┘     ├──────────────────────────────────────────────┤
//!                      │ PROCESS: filter ▶ expiry ▶ reject check ▶     │──▶ on_event / on_message
//!                      │          handler ▶ reject check               │──▶ on_reject / on_abort
//!                      └──────────────────────────────────────────────┘
//! ```
//!
//! - **Core**: envelopes, marshallers, error taxonomy, host contracts
//! - **Framework**: filter chain, message context, handler traits, engine
//! - **Runtime**: configuration, logging, host context, function entry point
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! struct Orders;
//!
//! #[async_trait]
//! impl EventHandler for Orders {
//!     async fn on_event(&self, ctx: &mut MessageContext<CloudEvent>) -> Result<(), BoxError> {
//!         let event = ctx.cloud_event().ok_or("no event")?;
//!         info!(id = event.id(), "Order received");
//!         Ok(())
//!     }
//! }
//!
//! let runtime = CourierRuntime::builder().build()?;
//! let function = runtime.function::<CloudEvent, _>(Arc::new(Orders));
//! let outcome = function.execute(Arc::new(host)).await;
//! ```
//!
//! ## Features
//!
//! - `toml-config`: load `courier.toml` configuration files (default)
//! - `json-log`: enable the JSON log format

pub use courier_core as core;
pub use courier_framework as framework;
pub use courier_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use courier_runtime::{
        BindingContext, CourierConfig, CourierRuntime, LoggingBuilder, MessageFunction,
    };

    // Engine, handlers and envelopes
    pub use courier_framework::prelude::*;

    // Logging macros
    pub use courier_runtime::prelude::*;

    pub use std::sync::Arc;
}
