//! Function-level entry point.
//!
//! A [`MessageFunction`] is what a host invokes once per trigger. It owns a
//! shared [`MessageLifecycle`], creates a fresh [`MessageContext`] for every
//! invocation and drives INITIALIZE then PROCESS.
//!
//! ```rust,ignore
//! let function = MessageFunction::<CloudEvent, _>::new(Arc::new(Orders));
//!
//! let host = BindingContext::new()
//!     .with_binding("message", Binding::new(raw).with_content_type(CLOUD_EVENTS_JSON));
//! let outcome = function.execute(Arc::new(host)).await;
//! ```

use std::sync::Arc;

use courier_core::{Envelope, HostContext, MarshallerRegistry};
use courier_framework::{
    InvocationOutcome, LifecycleOptions, LifecycleService, LifecycleSource, MessageContext,
    MessageLifecycle,
};
use tracing::{info, warn};

use crate::config::{ConfigResult, LifecycleConfig};

/// Entry point driving one lifecycle per invocation.
pub struct MessageFunction<E: Envelope, S: ?Sized> {
    lifecycle: Arc<MessageLifecycle<E, S>>,
}

impl<E: Envelope, S: ?Sized> Clone for MessageFunction<E, S> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: Arc::clone(&self.lifecycle),
        }
    }
}

impl<E, S> MessageFunction<E, S>
where
    E: Envelope,
    S: LifecycleSource<E> + ?Sized + 'static,
{
    /// Creates a function with default lifecycle options.
    pub fn new(source: Arc<S>) -> Self {
        Self::with_options(source, LifecycleOptions::default())
    }

    pub fn with_options(source: Arc<S>, options: LifecycleOptions) -> Self {
        Self::from_lifecycle(MessageLifecycle::new(source).with_options(options))
    }

    /// Creates a function from the `[lifecycle]` configuration section.
    pub fn from_config(source: Arc<S>, config: &LifecycleConfig) -> ConfigResult<Self> {
        Ok(Self::with_options(source, config.to_options()?))
    }

    pub fn from_lifecycle(lifecycle: MessageLifecycle<E, S>) -> Self {
        Self {
            lifecycle: Arc::new(lifecycle),
        }
    }

    /// Replaces the marshallers used to decode the inbound binding.
    ///
    /// Only valid before the function is cloned.
    pub fn with_marshallers(self, marshallers: MarshallerRegistry<E>) -> Self
    where
        S: Sized,
    {
        match Arc::try_unwrap(self.lifecycle) {
            Ok(lifecycle) => Self::from_lifecycle(lifecycle.with_marshallers(marshallers)),
            Err(shared) => {
                warn!("Function already shared, marshallers left unchanged");
                Self { lifecycle: shared }
            }
        }
    }

    pub fn lifecycle(&self) -> &Arc<MessageLifecycle<E, S>> {
        &self.lifecycle
    }

    /// Creates a fresh context for one invocation.
    pub fn create_context(&self, host: Arc<dyn HostContext>) -> MessageContext<E> {
        self.lifecycle.create_context(host)
    }

    /// Runs one invocation and returns its finished context.
    pub async fn invoke(&self, host: Arc<dyn HostContext>) -> MessageContext<E> {
        let mut ctx = self.create_context(host);
        let outcome = self.lifecycle.run(&mut ctx).await;
        info!(
            invocation_id = ctx.invocation_id(),
            kind = E::KIND,
            %outcome,
            "Invocation finished"
        );
        ctx
    }

    /// Runs one invocation and returns its outcome.
    pub async fn execute(&self, host: Arc<dyn HostContext>) -> InvocationOutcome {
        self.invoke(host).await.outcome()
    }

    /// The lifecycle as a tower service.
    pub fn service(&self) -> LifecycleService<E, S> {
        LifecycleService::new(Arc::clone(&self.lifecycle))
    }
}
