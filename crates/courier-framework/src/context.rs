//! Per-invocation message context.
//!
//! A [`MessageContext`] is created once per invocation and handed to the
//! lifecycle engine for every phase. It carries the decoded envelope and the
//! two independent outcome flags:
//!
//! - **rejected**: the envelope was disqualified (parse, validation, filter
//!   or expiration failure, or an explicit [`reject`](MessageContext::reject)
//!   from a handler).
//! - **aborted**: processing stopped before the handler completed, either
//!   because a rejection was escalated or because something failed.
//!
//! The flags only ever go from `false` to `true`.

use std::any::Any;
use std::sync::Arc;

use courier_core::{
    CloudEvent, Envelope, HostContext, LifecycleContext, LogLevel, Message, MessageError,
};
use tracing::debug;

/// Final state of one processed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// The handler ran and nothing was rejected.
    Completed,
    /// The envelope was rejected but processing was not aborted.
    Rejected,
    /// Processing was aborted.
    Aborted,
}

impl InvocationOutcome {
    /// Returns the outcome name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invocation context for envelopes of type `E`.
pub struct MessageContext<E> {
    host: Arc<dyn HostContext>,
    envelope: Option<E>,
    rejected: bool,
    aborted: bool,
    rejection_reported: bool,
    reason: Option<MessageError>,
    error: Option<MessageError>,
}

impl<E: Envelope> MessageContext<E> {
    /// Creates an empty context bound to a host invocation.
    pub fn new(host: Arc<dyn HostContext>) -> Self {
        Self {
            host,
            envelope: None,
            rejected: false,
            aborted: false,
            rejection_reported: false,
            reason: None,
            error: None,
        }
    }

    /// The hosting invocation.
    pub fn host(&self) -> &Arc<dyn HostContext> {
        &self.host
    }

    /// Identifier of the hosting invocation.
    pub fn invocation_id(&self) -> &str {
        self.host.invocation_id()
    }

    /// The decoded envelope, once INITIALIZE succeeded.
    pub fn envelope(&self) -> Option<&E> {
        self.envelope.as_ref()
    }

    /// Installs the decoded envelope.
    pub fn set_envelope(&mut self, envelope: E) {
        self.envelope = Some(envelope);
    }

    /// Returns `true` once the envelope has been rejected.
    pub fn is_rejected(&self) -> bool {
        self.rejected
    }

    /// Returns `true` once processing has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Why the envelope was disqualified.
    ///
    /// The first rejection reason wins. Without a rejection this is the
    /// failure that aborted processing, if any.
    pub fn reason(&self) -> Option<&MessageError> {
        self.reason.as_ref().or(self.error.as_ref())
    }

    /// The failure that aborted processing, if processing failed.
    pub fn error(&self) -> Option<&MessageError> {
        self.error.as_ref()
    }

    /// Why processing was aborted: the failure if there was one, otherwise
    /// the escalated rejection reason.
    pub fn abort_reason(&self) -> Option<&MessageError> {
        if !self.aborted {
            return None;
        }
        self.error.as_ref().or(self.reason.as_ref())
    }

    /// Rejects the envelope.
    ///
    /// Only the first reason is kept. Later rejections still leave the
    /// context rejected.
    pub fn reject(&mut self, reason: MessageError) {
        debug!(
            invocation_id = self.host.invocation_id(),
            kind = E::KIND,
            reason = %reason,
            "Envelope rejected"
        );
        self.rejected = true;
        if self.reason.is_none() {
            self.reason = Some(reason);
        }
    }

    /// Rejects the envelope with a plain reason.
    pub fn reject_with(&mut self, reason: impl Into<String>) {
        self.reject(MessageError::rejected(reason));
    }

    /// The outcome implied by the current flags.
    pub fn outcome(&self) -> InvocationOutcome {
        if self.aborted {
            InvocationOutcome::Aborted
        } else if self.rejected {
            InvocationOutcome::Rejected
        } else {
            InvocationOutcome::Completed
        }
    }

    /// Writes a log line through the host, tagged with the envelope kind.
    pub fn log(&self, message: &str, level: LogLevel) {
        self.host.log(message, level, E::KIND);
    }

    /// Marks the pending rejection as reported. Returns `false` if there is
    /// nothing new to report.
    pub(crate) fn take_unreported_rejection(&mut self) -> bool {
        if !self.rejected || self.rejection_reported {
            return false;
        }
        self.rejection_reported = true;
        true
    }

    /// Marks the context aborted. Returns `false` if it already was.
    pub(crate) fn mark_aborted(&mut self, error: Option<MessageError>) -> bool {
        if self.aborted {
            return false;
        }
        self.aborted = true;
        self.error = error;
        true
    }
}

impl MessageContext<CloudEvent> {
    /// The decoded CloudEvent.
    pub fn cloud_event(&self) -> Option<&CloudEvent> {
        self.envelope()
    }
}

impl MessageContext<Message> {
    /// The decoded proprietary message.
    pub fn message(&self) -> Option<&Message> {
        self.envelope()
    }
}

impl<E: Envelope> LifecycleContext for MessageContext<E> {
    fn context_kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<E: Envelope + std::fmt::Debug> std::fmt::Debug for MessageContext<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageContext")
            .field("invocation_id", &self.host.invocation_id())
            .field("envelope", &self.envelope)
            .field("rejected", &self.rejected)
            .field("aborted", &self.aborted)
            .field("reason", &self.reason)
            .field("error", &self.error)
            .finish()
    }
}
