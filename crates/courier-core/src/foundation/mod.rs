//! Foundation layer - the envelope data model.
//!
//! This module contains the envelope types the lifecycle carries:
//! - [`CloudEvent`] for CloudEvents v1.0 traffic
//! - [`Message`] and [`Header`] for the proprietary envelope
//! - [`Envelope`], the capability the engine is generic over

pub mod cloud_event;
pub mod envelope;
pub mod header;
pub mod message;

pub use cloud_event::{CLOUD_EVENTS_JSON, CloudEvent, CloudEventBuilder, SPEC_VERSION};
pub use envelope::{Envelope, TimeUnit};
pub use header::{Header, MESSAGE_TYPE, MESSAGE_VERSION};
pub use message::{DEFAULT_PAYLOAD_CONTENT_TYPE, MESSAGE_JSON, Message};
