//! # Courier Core
//!
//! The foundation of the Courier message lifecycle.
//!
//! This crate provides the envelope data model, the content-negotiated
//! marshalling abstraction, the error taxonomy and the contracts the
//! lifecycle consumes from its hosting function framework.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! Envelope types and their validation rules:
//! - **CloudEvents**: [`CloudEvent`] (CloudEvents v1.0 shape)
//! - **Proprietary envelope**: [`Message`] carrying a [`Header`] and payload
//! - **Capability**: [`Envelope`], which the lifecycle engine is generic over
//!
//! ### Marshalling
//!
//! Content-type bound codecs ([`Marshaller`]) and negotiation
//! ([`MarshallerRegistry`]).
//!
//! ### Integration Layer
//!
//! Host-facing contracts: [`HostContext`], [`LifeCycle`] phases and the
//! [`LifecycleContext`] family.
//!
//! ## Example
//!
//! ```rust,ignore
//! use courier_core::{CloudEventMarshaller, Marshaller};
//!
//! let raw = br#"{"id":"1","specversion":"1.0","type":"t","source":"s",
//!     "datacontenttype":"application/json"}"#;
//! let event = CloudEventMarshaller::new().unmarshal(raw).await?;
//! assert_eq!(event.event_type(), "t");
//! ```

pub mod error;
pub mod foundation;
pub mod integration;
pub mod marshal;

pub use error::{BoxError, MessageError, MessageResult};

pub use foundation::{
    CLOUD_EVENTS_JSON, CloudEvent, CloudEventBuilder, DEFAULT_PAYLOAD_CONTENT_TYPE, Envelope,
    Header, MESSAGE_JSON, MESSAGE_TYPE, MESSAGE_VERSION, Message, SPEC_VERSION, TimeUnit,
};

pub use integration::{Binding, BindingValue, HostContext, LifeCycle, LifecycleContext, LogLevel};

pub use marshal::{
    BoxedMarshaller, CloudEventMarshaller, JsonMarshaller, Marshaller, MarshallerRegistry,
    MessageMarshaller, PassThroughMarshaller, normalize_content_type,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::error::{BoxError, MessageError, MessageResult};
    pub use super::foundation::*;
    pub use super::integration::*;
    pub use super::marshal::{Marshaller, MarshallerRegistry};
}
