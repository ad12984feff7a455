//! Content negotiation over registered marshallers.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{
    APPLICATION_JSON, BoxedMarshaller, CloudEventMarshaller, JsonMarshaller, Marshaller,
    MessageMarshaller, PassThroughMarshaller,
};
use crate::error::{MessageError, MessageResult};
use crate::foundation::{CloudEvent, Message};

/// Reduces a content type to its lower-case media type, dropping parameters.
///
/// `"Application/JSON; charset=utf-8"` becomes `"application/json"`.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Marshallers producing `V`, keyed by normalised content type.
pub struct MarshallerRegistry<V> {
    marshallers: HashMap<String, BoxedMarshaller<V>>,
}

impl<V> Default for MarshallerRegistry<V> {
    fn default() -> Self {
        Self {
            marshallers: HashMap::new(),
        }
    }
}

impl<V: Send + Sync + 'static> MarshallerRegistry<V> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a marshaller under its declared content type.
    pub fn register<M>(&mut self, marshaller: M)
    where
        M: Marshaller<Value = V> + 'static,
    {
        let key = normalize_content_type(marshaller.content_type());
        self.marshallers.insert(key, Arc::new(marshaller));
    }

    /// Registers a marshaller under an additional content type alias.
    pub fn register_as(&mut self, content_type: &str, marshaller: BoxedMarshaller<V>) {
        self.marshallers
            .insert(normalize_content_type(content_type), marshaller);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<M>(mut self, marshaller: M) -> Self
    where
        M: Marshaller<Value = V> + 'static,
    {
        self.register(marshaller);
        self
    }

    /// Selects the marshaller for `content_type`.
    pub fn negotiate(&self, content_type: &str) -> MessageResult<BoxedMarshaller<V>> {
        let key = normalize_content_type(content_type);
        match self.marshallers.get(&key) {
            Some(m) => Ok(Arc::clone(m)),
            None => {
                debug!(content_type, "No marshaller registered for content type");
                Err(MessageError::UnsupportedContentType(content_type.to_string()))
            }
        }
    }

    /// Negotiates a marshaller for `content_type` and decodes `raw` with it.
    pub async fn unmarshal(&self, content_type: &str, raw: &[u8]) -> MessageResult<V> {
        self.negotiate(content_type)?.unmarshal(raw).await
    }

    /// Returns `true` if a marshaller is registered for `content_type`.
    pub fn supports(&self, content_type: &str) -> bool {
        self.marshallers
            .contains_key(&normalize_content_type(content_type))
    }

    /// Number of registered content types.
    pub fn len(&self) -> usize {
        self.marshallers.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.marshallers.is_empty()
    }
}

impl MarshallerRegistry<Value> {
    /// Payload marshallers: `text/plain` and `application/json`.
    pub fn payloads() -> Self {
        Self::new().with(PassThroughMarshaller).with(JsonMarshaller)
    }
}

impl MarshallerRegistry<CloudEvent> {
    /// CloudEvent marshallers, also accepting plain `application/json`.
    pub fn cloud_events() -> Self {
        let mut registry = Self::new();
        let marshaller: BoxedMarshaller<CloudEvent> = Arc::new(CloudEventMarshaller::new());
        registry.register_as(marshaller.content_type(), Arc::clone(&marshaller));
        registry.register_as(APPLICATION_JSON, marshaller);
        registry
    }
}

impl MarshallerRegistry<Message> {
    /// Proprietary message marshallers, also accepting plain `application/json`.
    pub fn messages() -> Self {
        let mut registry = Self::new();
        let marshaller: BoxedMarshaller<Message> = Arc::new(MessageMarshaller::new());
        registry.register_as(marshaller.content_type(), Arc::clone(&marshaller));
        registry.register_as(APPLICATION_JSON, marshaller);
        registry
    }
}

impl<V> std::fmt::Debug for MarshallerRegistry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.marshallers.keys().collect();
        types.sort();
        f.debug_struct("MarshallerRegistry")
            .field("content_types", &types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_content_type() {
        assert_eq!(
            normalize_content_type("Application/JSON; charset=utf-8"),
            "application/json"
        );
        assert_eq!(normalize_content_type(" text/plain "), "text/plain");
    }

    #[tokio::test]
    async fn test_payload_negotiation() {
        let registry = MarshallerRegistry::payloads();
        assert_eq!(registry.len(), 2);

        let json = registry.negotiate("application/json;charset=utf-8").unwrap();
        assert_eq!(json.unmarshal(b"[1]").await.unwrap(), json!([1]));

        let text = registry.negotiate("TEXT/PLAIN").unwrap();
        assert_eq!(text.unmarshal(b"[1]").await.unwrap(), json!("[1]"));
    }

    #[tokio::test]
    async fn test_unmarshal_by_content_type() {
        let registry = MarshallerRegistry::payloads();
        let value = registry.unmarshal("text/plain", b"abc").await.unwrap();
        assert_eq!(value, json!("abc"));
    }

    #[test]
    fn test_unsupported_content_type() {
        let registry = MarshallerRegistry::payloads();
        assert!(!registry.supports("application/xml"));
        assert!(matches!(
            registry.negotiate("application/xml"),
            Err(MessageError::UnsupportedContentType(ct)) if ct == "application/xml"
        ));
    }

    #[test]
    fn test_envelope_registries() {
        let events = MarshallerRegistry::cloud_events();
        assert!(events.supports("application/cloudevents+json"));
        assert!(events.supports("application/json"));

        let messages = MarshallerRegistry::messages();
        assert!(messages.supports("application/vnd.celastrinajs.message+json"));
        assert!(!messages.supports("text/plain"));
    }
}
