//! Contract between the lifecycle and the hosting function framework.
//!
//! The host owns binding resolution and log sinks. The lifecycle only needs
//! to look up the inbound binding, write outbound bindings and emit log
//! lines tagged with their origin.

use std::borrow::Cow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Log levels understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" | "verbose" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value resolved from a host binding.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingValue {
    /// Raw bytes, e.g. a queue message body.
    Bytes(Vec<u8>),
    /// Text, e.g. an HTTP body decoded by the host.
    Text(String),
    /// A JSON value the host already parsed.
    Json(Value),
}

impl BindingValue {
    /// Returns the binding as wire bytes.
    pub fn to_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Self::Bytes(b) => Cow::Borrowed(b.as_slice()),
            Self::Text(t) => Cow::Borrowed(t.as_bytes()),
            Self::Json(v) => Cow::Owned(v.to_string().into_bytes()),
        }
    }
}

impl From<Vec<u8>> for BindingValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<String> for BindingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for BindingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Value> for BindingValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// A binding value together with the content type the host declared for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub value: BindingValue,
    pub content_type: Option<String>,
}

impl Binding {
    /// Creates a binding without a declared content type.
    pub fn new(value: impl Into<BindingValue>) -> Self {
        Self {
            value: value.into(),
            content_type: None,
        }
    }

    /// Declares the content type of this binding.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// The invocation context the host exposes to the lifecycle.
pub trait HostContext: Send + Sync {
    /// Identifier of the current invocation.
    fn invocation_id(&self) -> &str;

    /// Looks up a named binding.
    fn get_binding(&self, name: &str) -> Option<Binding>;

    /// Writes a named binding.
    fn set_binding(&self, name: &str, binding: Binding);

    /// Writes a log line through the host's sinks.
    fn log(&self, message: &str, level: LogLevel, origin: &str);
}
