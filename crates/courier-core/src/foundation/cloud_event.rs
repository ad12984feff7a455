//! CloudEvents v1.0 envelope.
//!
//! A [`CloudEvent`] is immutable once built: derived events are produced with
//! [`CloudEvent::clone_with_new_data`], which always mints a fresh id.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::envelope::{Envelope, TimeUnit, cutoff};
use crate::error::{MessageError, MessageResult};
use crate::marshal::MarshallerRegistry;

/// The only CloudEvents specification version accepted.
pub const SPEC_VERSION: &str = "1.0";

/// Content type of a structured-mode JSON CloudEvent.
pub const CLOUD_EVENTS_JSON: &str = "application/cloudevents+json";

/// Default content type of CloudEvent data.
pub const DEFAULT_DATA_CONTENT_TYPE: &str = "application/json";

/// Default maximum age used by [`CloudEvent::is_expired_default`].
pub const DEFAULT_MAX_AGE_HOURS: u64 = 24;

/// A CloudEvents v1.0 envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudEvent {
    pub(crate) id: String,
    pub(crate) specversion: String,
    #[serde(rename = "type")]
    pub(crate) event_type: String,
    pub(crate) source: String,
    pub(crate) datacontenttype: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data: Option<Value>,
    pub(crate) timestamp: DateTime<Utc>,
}

impl CloudEvent {
    /// Starts building an outbound event with the given type and source.
    pub fn builder(event_type: impl Into<String>, source: impl Into<String>) -> CloudEventBuilder {
        CloudEventBuilder {
            id: None,
            event_type: event_type.into(),
            source: source.into(),
            datacontenttype: DEFAULT_DATA_CONTENT_TYPE.to_string(),
            subject: None,
            data: None,
            timestamp: None,
        }
    }

    /// Event identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// CloudEvents specification version, always `"1.0"`.
    pub fn specversion(&self) -> &str {
        &self.specversion
    }

    /// Event type.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Event source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Content type of `data`.
    pub fn datacontenttype(&self) -> &str {
        &self.datacontenttype
    }

    /// Optional subject.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Optional event data.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Time the event occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns `true` when `timestamp <= now - max_age`.
    pub fn is_expired(&self, max_age: u64, unit: TimeUnit) -> bool {
        self.is_expired_at(unit.duration(max_age), Utc::now())
    }

    /// Expiration check with the default 24 hour window.
    pub fn is_expired_default(&self) -> bool {
        self.is_expired(DEFAULT_MAX_AGE_HOURS, TimeUnit::Hours)
    }

    /// Returns a new event carrying `data`, with a fresh id and the same
    /// type, source and subject. `self` is left untouched.
    pub fn clone_with_new_data(&self, data: Value, content_type: impl Into<String>) -> CloudEvent {
        CloudEvent {
            id: Uuid::new_v4().to_string(),
            specversion: SPEC_VERSION.to_string(),
            event_type: self.event_type.clone(),
            source: self.source.clone(),
            datacontenttype: content_type.into(),
            subject: self.subject.clone(),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }

    /// Encodes this event as structured-mode JSON.
    pub fn to_json(&self) -> MessageResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| MessageError::marshal(CLOUD_EVENTS_JSON, e.to_string()))
    }
}

impl Envelope for CloudEvent {
    const KIND: &'static str = "cloudevent";
    const CONTENT_TYPE: &'static str = CLOUD_EVENTS_JSON;

    fn envelope_id(&self) -> &str {
        &self.id
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            "specversion" => Some(self.specversion.clone()),
            "type" => Some(self.event_type.clone()),
            "source" => Some(self.source.clone()),
            "datacontenttype" => Some(self.datacontenttype.clone()),
            "subject" => self.subject.clone(),
            "timestamp" => Some(self.timestamp.to_rfc3339()),
            _ => None,
        }
    }

    fn is_expired_at(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        self.timestamp <= cutoff(now, max_age)
    }

    fn marshallers() -> MarshallerRegistry<Self> {
        MarshallerRegistry::cloud_events()
    }
}

/// Builder for outbound [`CloudEvent`]s.
///
/// Identifiers and timestamps are computed when [`build`](Self::build) runs,
/// never shared between events.
#[derive(Debug, Clone)]
pub struct CloudEventBuilder {
    id: Option<String>,
    event_type: String,
    source: String,
    datacontenttype: String,
    subject: Option<String>,
    data: Option<Value>,
    timestamp: Option<DateTime<Utc>>,
}

impl CloudEventBuilder {
    /// Sets an explicit id instead of a fresh UUID.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the data and its content type.
    pub fn data(mut self, data: Value, content_type: impl Into<String>) -> Self {
        self.data = Some(data);
        self.datacontenttype = content_type.into();
        self
    }

    /// Sets the timestamp instead of the build time.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Builds the event, validating required attributes.
    pub fn build(self) -> MessageResult<CloudEvent> {
        let id = match self.id {
            Some(id) if id.trim().is_empty() => {
                return Err(MessageError::validation("id must not be empty", "id"));
            }
            Some(id) => id,
            None => Uuid::new_v4().to_string(),
        };
        for (value, attribute) in [
            (&self.event_type, "type"),
            (&self.source, "source"),
            (&self.datacontenttype, "datacontenttype"),
        ] {
            if value.trim().is_empty() {
                return Err(MessageError::validation(
                    format!("{attribute} required"),
                    attribute,
                ));
            }
        }

        Ok(CloudEvent {
            id,
            specversion: SPEC_VERSION.to_string(),
            event_type: self.event_type,
            source: self.source,
            datacontenttype: self.datacontenttype,
            subject: self.subject.filter(|s| !s.trim().is_empty()),
            data: self.data,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use serde_json::json;

    fn sample() -> CloudEvent {
        CloudEvent::builder("com.example.order.created", "/orders")
            .subject("order-42")
            .data(json!({"total": 10}), "application/json")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let event = CloudEvent::builder("t", "s").build().unwrap();
        assert!(!event.id().is_empty());
        assert_eq!(event.specversion(), "1.0");
        assert_eq!(event.datacontenttype(), DEFAULT_DATA_CONTENT_TYPE);
        assert!(event.subject().is_none());
        assert!(event.data().is_none());
    }

    #[test]
    fn test_builder_ids_are_fresh() {
        let a = CloudEvent::builder("t", "s").build().unwrap();
        let b = CloudEvent::builder("t", "s").build().unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_builder_rejects_empty_type() {
        let err = CloudEvent::builder("  ", "s").build().unwrap_err();
        assert_eq!(err.attribute(), Some("type"));
    }

    #[test]
    fn test_is_expired_boundary_is_inclusive() {
        let now = Utc::now();
        let max_age = TimeUnit::Hours.duration(24);
        let event = CloudEvent::builder("t", "s")
            .timestamp(now - TimeDelta::hours(24))
            .build()
            .unwrap();
        assert!(event.is_expired_at(max_age, now));

        let fresher = CloudEvent::builder("t", "s")
            .timestamp(now - TimeDelta::hours(24) + TimeDelta::milliseconds(1))
            .build()
            .unwrap();
        assert!(!fresher.is_expired_at(max_age, now));
    }

    #[test]
    fn test_is_expired_with_units() {
        let old = CloudEvent::builder("t", "s")
            .timestamp(Utc::now() - TimeDelta::hours(25))
            .build()
            .unwrap();
        assert!(old.is_expired(24, TimeUnit::Hours));
        assert!(old.is_expired_default());
        assert!(!old.is_expired(2, TimeUnit::Days));
        assert!(!sample().is_expired_default());
    }

    #[test]
    fn test_clone_with_new_data() {
        let original = sample();
        let snapshot = original.clone();
        let derived = original.clone_with_new_data(json!("hello"), "text/plain");

        assert_ne!(derived.id(), original.id());
        assert_eq!(derived.event_type(), original.event_type());
        assert_eq!(derived.source(), original.source());
        assert_eq!(derived.subject(), original.subject());
        assert_eq!(derived.data(), Some(&json!("hello")));
        assert_eq!(derived.datacontenttype(), "text/plain");
        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_attributes() {
        let event = sample();
        assert_eq!(event.attribute("type").as_deref(), Some("com.example.order.created"));
        assert_eq!(event.attribute("subject").as_deref(), Some("order-42"));
        assert!(event.attribute("unknown").is_none());
    }

    #[test]
    fn test_to_json_shape() {
        let bytes = sample().to_json().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["type"], "com.example.order.created");
        assert_eq!(value["specversion"], "1.0");
        assert!(value["timestamp"].is_string());
    }
}
