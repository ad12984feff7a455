//! Tower integration.
//!
//! [`LifecycleService`] exposes a [`MessageLifecycle`] as a
//! `tower::Service<MessageContext<E>>`: each call runs INITIALIZE and PROCESS
//! and hands the finished context back. The service never fails, since
//! rejections and aborts are recorded on the context.

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use courier_core::Envelope;
use futures::future::BoxFuture;
use tower::Service;

use crate::context::MessageContext;
use crate::handler::LifecycleSource;
use crate::lifecycle::MessageLifecycle;

/// A shared lifecycle exposed as a tower [`Service`].
pub struct LifecycleService<E: Envelope, S: ?Sized> {
    lifecycle: Arc<MessageLifecycle<E, S>>,
}

impl<E: Envelope, S: ?Sized> LifecycleService<E, S> {
    pub fn new(lifecycle: Arc<MessageLifecycle<E, S>>) -> Self {
        Self { lifecycle }
    }

    pub fn lifecycle(&self) -> &Arc<MessageLifecycle<E, S>> {
        &self.lifecycle
    }
}

impl<E: Envelope, S: ?Sized> Clone for LifecycleService<E, S> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: Arc::clone(&self.lifecycle),
        }
    }
}

impl<E, S> Service<MessageContext<E>> for LifecycleService<E, S>
where
    E: Envelope,
    S: LifecycleSource<E> + ?Sized + 'static,
{
    type Response = MessageContext<E>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut ctx: MessageContext<E>) -> Self::Future {
        let lifecycle = Arc::clone(&self.lifecycle);
        Box::pin(async move {
            lifecycle.run(&mut ctx).await;
            Ok(ctx)
        })
    }
}

impl<E, S> MessageLifecycle<E, S>
where
    E: Envelope,
    S: LifecycleSource<E> + ?Sized,
{
    /// Wraps this lifecycle in a [`LifecycleService`].
    pub fn into_service(self) -> LifecycleService<E, S>
    where
        S: Sized,
    {
        LifecycleService::new(Arc::new(self))
    }
}
