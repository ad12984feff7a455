//! Proprietary enveloped message.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::envelope::{Envelope, cutoff};
use super::header::Header;
use crate::error::{MessageError, MessageResult};
use crate::marshal::MarshallerRegistry;

/// Content type of a proprietary message on the wire.
pub const MESSAGE_JSON: &str = "application/vnd.celastrinajs.message+json";

/// Default content type of a message payload.
pub const DEFAULT_PAYLOAD_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// A proprietary message: a [`Header`] plus an arbitrary payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub(crate) header: Header,
    pub(crate) payload: Value,
    pub(crate) payload_content_type: String,
}

impl Message {
    /// Creates a message with the default JSON payload content type.
    pub fn new(header: Header, payload: Value) -> Self {
        Self {
            header,
            payload,
            payload_content_type: DEFAULT_PAYLOAD_CONTENT_TYPE.to_string(),
        }
    }

    /// Sets the payload content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.payload_content_type = content_type.into();
        self
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn payload_content_type(&self) -> &str {
        &self.payload_content_type
    }

    /// Replaces the header.
    pub fn set_header(&mut self, header: Header) {
        self.header = header;
    }

    /// Replaces the payload and its content type.
    pub fn set_payload(&mut self, payload: Value, content_type: impl Into<String>) {
        self.payload = payload;
        self.payload_content_type = content_type.into();
    }

    /// Deserializes the payload into a typed value.
    pub fn payload_as<T: DeserializeOwned>(&self) -> MessageResult<T> {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| MessageError::parse(self.payload_content_type.clone(), e.to_string()))
    }

    /// Returns `true` if the message expired by header or by age.
    pub fn is_expired(&self, max_age: Duration) -> bool {
        self.is_expired_at(max_age, Utc::now())
    }

    /// Encodes this message as JSON.
    pub fn to_json(&self) -> MessageResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| MessageError::marshal(MESSAGE_JSON, e.to_string()))
    }
}

impl Envelope for Message {
    const KIND: &'static str = "message";
    const CONTENT_TYPE: &'static str = MESSAGE_JSON;

    fn envelope_id(&self) -> &str {
        self.header.id()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "payloadContentType" => Some(self.payload_content_type.clone()),
            other => self.header.attribute(other),
        }
    }

    fn is_expired_at(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        if self.header.is_expired_at(now) {
            return true;
        }
        self.header
            .create_time()
            .or(self.header.enqueue_time())
            .is_some_and(|t| t <= cutoff(now, max_age))
    }

    fn marshallers() -> MarshallerRegistry<Self> {
        MarshallerRegistry::messages()
    }
}
