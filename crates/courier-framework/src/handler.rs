//! Handler traits driven by the lifecycle engine.
//!
//! Applications implement [`EventHandler`] for CloudEvents or
//! [`MessageHandler`] for proprietary messages. The engine itself only knows
//! [`LifecycleSource`], which both handler traits provide through blanket
//! implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Orders;
//!
//! #[async_trait]
//! impl EventHandler for Orders {
//!     async fn on_event(&self, ctx: &mut MessageContext<CloudEvent>) -> Result<(), BoxError> {
//!         let event = ctx.cloud_event().ok_or("no event")?;
//!         tracing::info!(id = event.id(), "Order received");
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;
use courier_core::{BoxError, CloudEvent, Envelope, LogLevel, Message};
use tracing::{error, warn};

use crate::context::MessageContext;

// ============================================================================
// LifecycleSource
// ============================================================================

/// The capability the lifecycle engine drives during PROCESS.
#[async_trait]
pub trait LifecycleSource<E: Envelope>: Send + Sync {
    /// Runs the application handler for the decoded envelope.
    async fn handle_process_lifecycle(&self, ctx: &mut MessageContext<E>) -> Result<(), BoxError>;

    /// Called once when the envelope has been rejected.
    async fn on_reject(&self, ctx: &mut MessageContext<E>) -> Result<(), BoxError>;

    /// Called once when processing is aborted.
    async fn on_abort(&self, ctx: &mut MessageContext<E>);
}

fn log_rejection<E: Envelope>(ctx: &MessageContext<E>) {
    let reason = ctx.reason().map(ToString::to_string).unwrap_or_default();
    warn!(
        invocation_id = ctx.invocation_id(),
        kind = E::KIND,
        reason = %reason,
        "Envelope rejected"
    );
    ctx.log(&format!("Envelope rejected: {reason}"), LogLevel::Warn);
}

fn log_abort<E: Envelope>(ctx: &MessageContext<E>) {
    let reason = ctx.abort_reason().map(ToString::to_string).unwrap_or_default();
    error!(
        invocation_id = ctx.invocation_id(),
        kind = E::KIND,
        reason = %reason,
        "Processing aborted"
    );
    ctx.log(&format!("Processing aborted: {reason}"), LogLevel::Error);
}

// ============================================================================
// EventHandler
// ============================================================================

/// Application handler for CloudEvents.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handles a decoded, accepted CloudEvent.
    async fn on_event(&self, ctx: &mut MessageContext<CloudEvent>) -> Result<(), BoxError>;

    /// Called once when the event is rejected. Logs a warning by default.
    async fn on_reject(&self, ctx: &mut MessageContext<CloudEvent>) -> Result<(), BoxError> {
        log_rejection(ctx);
        Ok(())
    }

    /// Called once when processing is aborted. Logs an error by default.
    async fn on_abort(&self, ctx: &mut MessageContext<CloudEvent>) {
        log_abort(ctx);
    }
}

#[async_trait]
impl<H: EventHandler> LifecycleSource<CloudEvent> for H {
    async fn handle_process_lifecycle(
        &self,
        ctx: &mut MessageContext<CloudEvent>,
    ) -> Result<(), BoxError> {
        self.on_event(ctx).await
    }

    async fn on_reject(&self, ctx: &mut MessageContext<CloudEvent>) -> Result<(), BoxError> {
        EventHandler::on_reject(self, ctx).await
    }

    async fn on_abort(&self, ctx: &mut MessageContext<CloudEvent>) {
        EventHandler::on_abort(self, ctx).await
    }
}

// ============================================================================
// MessageHandler
// ============================================================================

/// Application handler for proprietary messages.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handles a decoded, accepted message.
    async fn on_message(&self, ctx: &mut MessageContext<Message>) -> Result<(), BoxError>;

    /// Called once when the message is rejected. Logs a warning by default.
    async fn on_reject(&self, ctx: &mut MessageContext<Message>) -> Result<(), BoxError> {
        log_rejection(ctx);
        Ok(())
    }

    /// Called once when processing is aborted. Logs an error by default.
    async fn on_abort(&self, ctx: &mut MessageContext<Message>) {
        log_abort(ctx);
    }
}

#[async_trait]
impl<H: MessageHandler> LifecycleSource<Message> for H {
    async fn handle_process_lifecycle(
        &self,
        ctx: &mut MessageContext<Message>,
    ) -> Result<(), BoxError> {
        self.on_message(ctx).await
    }

    async fn on_reject(&self, ctx: &mut MessageContext<Message>) -> Result<(), BoxError> {
        MessageHandler::on_reject(self, ctx).await
    }

    async fn on_abort(&self, ctx: &mut MessageContext<Message>) {
        MessageHandler::on_abort(self, ctx).await
    }
}
