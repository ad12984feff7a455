//! Identity and routing metadata for proprietary messages.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Structural marker carried by every proprietary message header.
pub const MESSAGE_TYPE: &str = "com.celastrinajs.message.Message";

/// Header version written and accepted by this implementation.
pub const MESSAGE_VERSION: &str = "1.0.0";

/// Header of a proprietary [`Message`](super::Message).
///
/// Fresh headers get new UUIDs for `id` and `correlation_id` each time a
/// constructor runs. Only the transport adapter mutates a header after
/// construction, through [`stamp_delivery`](Self::stamp_delivery).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub(crate) id: String,
    pub(crate) correlation_id: String,
    #[serde(rename = "type")]
    pub(crate) message_type: String,
    pub(crate) version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) enqueue_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) create_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) expire_time: Option<DateTime<Utc>>,
    pub(crate) delivery_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) authorization: Option<Value>,
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

impl Header {
    /// Creates a fresh header stamped with the current time.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            correlation_id: Uuid::new_v4().to_string(),
            message_type: MESSAGE_TYPE.to_string(),
            version: MESSAGE_VERSION.to_string(),
            source: None,
            subject: None,
            action: None,
            enqueue_time: None,
            create_time: Some(Utc::now()),
            expire_time: None,
            delivery_count: 0,
            authorization: None,
        }
    }

    /// Creates a fresh header that continues an existing correlation.
    pub fn correlated(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            ..Self::new()
        }
    }

    /// Sets the source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the action.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets an explicit expiration time.
    pub fn with_expire_time(mut self, expire_time: DateTime<Utc>) -> Self {
        self.expire_time = Some(expire_time);
        self
    }

    /// Attaches an opaque authorization object.
    pub fn with_authorization(mut self, authorization: Value) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Message identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Correlation identifier.
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Structural type marker.
    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// Header version.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn enqueue_time(&self) -> Option<DateTime<Utc>> {
        self.enqueue_time
    }

    pub fn create_time(&self) -> Option<DateTime<Utc>> {
        self.create_time
    }

    pub fn expire_time(&self) -> Option<DateTime<Utc>> {
        self.expire_time
    }

    /// Number of times the transport has delivered this message.
    pub fn delivery_count(&self) -> u32 {
        self.delivery_count
    }

    /// Opaque authorization attachment.
    pub fn authorization(&self) -> Option<&Value> {
        self.authorization.as_ref()
    }

    /// Records a delivery attempt. Called by the transport adapter only.
    ///
    /// The delivery count never moves backwards.
    pub fn stamp_delivery(&mut self, delivery_count: u32, enqueue_time: DateTime<Utc>) {
        self.delivery_count = self.delivery_count.max(delivery_count);
        self.enqueue_time = Some(enqueue_time);
    }

    /// Returns `true` when an explicit expire time is set and has passed.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns `true` when an explicit expire time is set and `<= now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire_time.is_some_and(|t| t <= now)
    }

    /// Looks up a header attribute by its wire name.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            "correlationId" => Some(self.correlation_id.clone()),
            "type" => Some(self.message_type.clone()),
            "version" => Some(self.version.clone()),
            "source" => self.source.clone(),
            "subject" => self.subject.clone(),
            "action" => self.action.clone(),
            "deliveryCount" => Some(self.delivery_count.to_string()),
            _ => None,
        }
    }
}
