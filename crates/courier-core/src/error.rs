//! Unified error types for the Courier envelope layer.
//!
//! Every failure the lifecycle can observe is a [`MessageError`]. Parse and
//! validation failures become rejections, handler failures become abort
//! reasons, and only [`MessageError::InvalidContext`] escapes the engine.

use thiserror::Error;

/// Boxed error type returned by user handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while decoding, validating or processing an envelope.
#[derive(Debug, Error)]
pub enum MessageError {
    /// Raw bytes could not be decoded under the declared content type.
    #[error("failed to parse '{content_type}' content: {reason}")]
    Parse {
        /// The content type the bytes were decoded as.
        content_type: String,
        /// Reason for failure.
        reason: String,
    },

    /// A required envelope field is missing or malformed.
    #[error("{message} (attribute '{attribute}')")]
    Validation {
        /// Human-readable description.
        message: String,
        /// Name of the offending attribute.
        attribute: String,
    },

    /// The host supplied a context of the wrong family.
    #[error("invalid context: expected '{expected}', found '{found}'")]
    InvalidContext {
        /// The context kind the engine drives.
        expected: &'static str,
        /// The context kind that was supplied.
        found: &'static str,
    },

    /// The envelope was disqualified by a filter or expiration check.
    #[error("message rejected: {reason}")]
    Rejected {
        /// Reason for rejection.
        reason: String,
    },

    /// A value could not be encoded under the declared content type.
    #[error("failed to marshal '{content_type}' content: {reason}")]
    Marshal {
        /// The target content type.
        content_type: String,
        /// Reason for failure.
        reason: String,
    },

    /// No marshaller is registered for the negotiated content type.
    #[error("no marshaller registered for content type '{0}'")]
    UnsupportedContentType(String),

    /// A user handler failed.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}

impl MessageError {
    /// Creates a validation error naming the offending attribute.
    pub fn validation(message: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(content_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            content_type: content_type.into(),
            reason: reason.into(),
        }
    }

    /// Creates a marshal error.
    pub fn marshal(content_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Marshal {
            content_type: content_type.into(),
            reason: reason.into(),
        }
    }

    /// Creates a rejection error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Wraps a handler failure.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }

    /// Returns the offending attribute name for validation errors.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Self::Validation { attribute, .. } => Some(attribute),
            _ => None,
        }
    }
}

/// Result type for envelope operations.
pub type MessageResult<T> = Result<T, MessageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_carries_attribute() {
        let err = MessageError::validation("id required", "id");
        assert_eq!(err.attribute(), Some("id"));
        assert_eq!(err.to_string(), "id required (attribute 'id')");
    }

    #[test]
    fn test_handler_error_has_no_attribute() {
        let err = MessageError::handler("boom");
        assert!(err.attribute().is_none());
        assert_eq!(err.to_string(), "handler failed: boom");
    }
}
