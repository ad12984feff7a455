//! Envelope marshallers with structural validation.
//!
//! Both marshallers decode through [`JsonMarshaller`] first and then check
//! required fields in a fixed order, so the first failing field is always
//! the one reported.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::trace;

use super::{JsonMarshaller, Marshaller};
use crate::error::{MessageError, MessageResult};
use crate::foundation::cloud_event::{CLOUD_EVENTS_JSON, CloudEvent, SPEC_VERSION};
use crate::foundation::header::{Header, MESSAGE_TYPE, MESSAGE_VERSION};
use crate::foundation::message::{DEFAULT_PAYLOAD_CONTENT_TYPE, MESSAGE_JSON, Message};

// =============================================================================
// Field helpers
// =============================================================================

fn as_object(value: Value, content_type: &str) -> MessageResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(MessageError::parse(
            content_type,
            format!("expected a JSON object, got {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads a required, non-empty string field.
fn required_str(map: &Map<String, Value>, field: &str, attribute: &str) -> MessageResult<String> {
    match map.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err(MessageError::validation(format!("{field} required"), attribute)),
    }
}

/// Reads a string field that must equal `expected`.
fn exact_str(
    map: &Map<String, Value>,
    field: &str,
    expected: &str,
    attribute: &str,
) -> MessageResult<String> {
    match map.get(field) {
        Some(Value::String(s)) if s == expected => Ok(s.clone()),
        _ => Err(MessageError::validation(
            format!("{field} must be '{expected}'"),
            attribute,
        )),
    }
}

/// Reads an optional string, treating blank strings as absent.
fn optional_str(map: &Map<String, Value>, field: &str) -> Option<String> {
    match map.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Reads an optional RFC 3339 timestamp. Malformed values are ignored.
fn optional_time(map: &Map<String, Value>, field: &str) -> Option<DateTime<Utc>> {
    let raw = optional_str(map, field)?;
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            trace!(field, error = %e, "Ignoring malformed timestamp");
            None
        }
    }
}

fn optional_value(map: &mut Map<String, Value>, field: &str) -> Option<Value> {
    map.remove(field).filter(|v| !v.is_null())
}

// =============================================================================
// CloudEvent
// =============================================================================

/// Marshaller for structured-mode JSON CloudEvents.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudEventMarshaller {
    json: JsonMarshaller,
}

impl CloudEventMarshaller {
    /// Creates a new CloudEvent marshaller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates an already-parsed JSON value into a [`CloudEvent`].
    ///
    /// Checks run in the order `id`, `specversion`, `type`, `source`,
    /// `datacontenttype`.
    pub fn decode_value(&self, value: Value) -> MessageResult<CloudEvent> {
        let mut map = as_object(value, CLOUD_EVENTS_JSON)?;

        let id = required_str(&map, "id", "id")?;
        let specversion = exact_str(&map, "specversion", SPEC_VERSION, "specversion")?;
        let event_type = required_str(&map, "type", "type")?;
        let source = required_str(&map, "source", "source")?;
        let datacontenttype = required_str(&map, "datacontenttype", "datacontenttype")?;

        let subject = optional_str(&map, "subject");
        let timestamp = optional_time(&map, "timestamp").unwrap_or_else(Utc::now);
        let data = optional_value(&mut map, "data");

        Ok(CloudEvent {
            id,
            specversion,
            event_type,
            source,
            datacontenttype,
            subject,
            data,
            timestamp,
        })
    }
}

#[async_trait]
impl Marshaller for CloudEventMarshaller {
    type Value = CloudEvent;

    fn content_type(&self) -> &str {
        CLOUD_EVENTS_JSON
    }

    async fn unmarshal(&self, raw: &[u8]) -> MessageResult<CloudEvent> {
        let value = self.json.unmarshal(raw).await?;
        self.decode_value(value)
    }

    async fn marshal(&self, value: &CloudEvent) -> MessageResult<Vec<u8>> {
        value.to_json()
    }
}

// =============================================================================
// Message
// =============================================================================

/// Marshaller for the proprietary message envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageMarshaller {
    json: JsonMarshaller,
}

impl MessageMarshaller {
    /// Creates a new message marshaller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates an already-parsed JSON value into a [`Message`].
    ///
    /// The header is checked first (`id`, `correlationId`, `type`,
    /// `version`, `deliveryCount`), then the payload content type.
    pub fn decode_value(&self, value: Value) -> MessageResult<Message> {
        let mut map = as_object(value, MESSAGE_JSON)?;

        let mut header_map = match map.remove("header") {
            Some(Value::Object(h)) => h,
            _ => return Err(MessageError::validation("header required", "header")),
        };
        let header = decode_header(&mut header_map)?;

        let payload = map.remove("payload").unwrap_or(Value::Null);
        let payload_content_type = match map.get("payloadContentType") {
            None | Some(Value::Null) => DEFAULT_PAYLOAD_CONTENT_TYPE.to_string(),
            Some(_) => required_str(&map, "payloadContentType", "payloadContentType")?,
        };

        Ok(Message {
            header,
            payload,
            payload_content_type,
        })
    }
}

fn decode_header(map: &mut Map<String, Value>) -> MessageResult<Header> {
    let id = required_str(map, "id", "header.id")?;
    let correlation_id = required_str(map, "correlationId", "header.correlationId")?;
    let message_type = exact_str(map, "type", MESSAGE_TYPE, "header.type")?;
    let version = exact_str(map, "version", MESSAGE_VERSION, "header.version")?;
    let delivery_count = match map.get("deliveryCount") {
        None | Some(Value::Null) => 0,
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                MessageError::validation(
                    "deliveryCount must be a non-negative integer",
                    "header.deliveryCount",
                )
            })?,
    };

    Ok(Header {
        id,
        correlation_id,
        message_type,
        version,
        source: optional_str(map, "source"),
        subject: optional_str(map, "subject"),
        action: optional_str(map, "action"),
        enqueue_time: optional_time(map, "enqueueTime"),
        create_time: optional_time(map, "createTime"),
        expire_time: optional_time(map, "expireTime"),
        delivery_count,
        authorization: optional_value(map, "authorization"),
    })
}

#[async_trait]
impl Marshaller for MessageMarshaller {
    type Value = Message;

    fn content_type(&self) -> &str {
        MESSAGE_JSON
    }

    async fn unmarshal(&self, raw: &[u8]) -> MessageResult<Message> {
        let value = self.json.unmarshal(raw).await?;
        self.decode_value(value)
    }

    async fn marshal(&self, value: &Message) -> MessageResult<Vec<u8>> {
        value.to_json()
    }
}
