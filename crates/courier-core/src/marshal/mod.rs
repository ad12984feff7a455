//! Content-type bound encode/decode strategies.
//!
//! A [`Marshaller`] is stateless apart from the content type it declares.
//! Both directions are asynchronous so that future variants may perform I/O
//! (schema fetches, remote key lookups) without changing the contract.
//!
//! Provided variants:
//! - [`PassThroughMarshaller`] - `text/plain` identity
//! - [`JsonMarshaller`] - `application/json`
//! - [`CloudEventMarshaller`] - `application/cloudevents+json`
//! - [`MessageMarshaller`] - `application/vnd.celastrinajs.message+json`
//!
//! [`MarshallerRegistry`] selects a marshaller by negotiated content type.

mod envelope;
mod registry;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{MessageError, MessageResult};

pub use envelope::{CloudEventMarshaller, MessageMarshaller};
pub use registry::{MarshallerRegistry, normalize_content_type};

/// Content type handled by [`PassThroughMarshaller`].
pub const TEXT_PLAIN: &str = "text/plain";

/// Content type handled by [`JsonMarshaller`].
pub const APPLICATION_JSON: &str = "application/json";

/// A content-type tagged serialize/deserialize strategy.
#[async_trait]
pub trait Marshaller: Send + Sync {
    /// The decoded representation.
    type Value: Send + Sync;

    /// The content type this marshaller declares.
    fn content_type(&self) -> &str;

    /// Decodes raw bytes.
    async fn unmarshal(&self, raw: &[u8]) -> MessageResult<Self::Value>;

    /// Encodes a value to raw bytes.
    async fn marshal(&self, value: &Self::Value) -> MessageResult<Vec<u8>>;
}

/// A shareable marshaller producing `V`.
pub type BoxedMarshaller<V> = Arc<dyn Marshaller<Value = V>>;

/// Identity marshaller for `text/plain` payloads.
///
/// Text is carried as a JSON string value; non-string values are written as
/// their JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughMarshaller;

#[async_trait]
impl Marshaller for PassThroughMarshaller {
    type Value = Value;

    fn content_type(&self) -> &str {
        TEXT_PLAIN
    }

    async fn unmarshal(&self, raw: &[u8]) -> MessageResult<Value> {
        let text = std::str::from_utf8(raw)
            .map_err(|e| MessageError::parse(TEXT_PLAIN, e.to_string()))?;
        Ok(Value::String(text.to_string()))
    }

    async fn marshal(&self, value: &Value) -> MessageResult<Vec<u8>> {
        Ok(match value {
            Value::String(text) => text.as_bytes().to_vec(),
            other => other.to_string().into_bytes(),
        })
    }
}

/// JSON marshaller. Fails with a parse error on malformed input.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaller;

#[async_trait]
impl Marshaller for JsonMarshaller {
    type Value = Value;

    fn content_type(&self) -> &str {
        APPLICATION_JSON
    }

    async fn unmarshal(&self, raw: &[u8]) -> MessageResult<Value> {
        serde_json::from_slice(raw)
            .map_err(|e| MessageError::parse(APPLICATION_JSON, e.to_string()))
    }

    async fn marshal(&self, value: &Value) -> MessageResult<Vec<u8>> {
        serde_json::to_vec(value)
            .map_err(|e| MessageError::marshal(APPLICATION_JSON, e.to_string()))
    }
}
