//! The lifecycle engine.
//!
//! [`MessageLifecycle`] drives one invocation through the phases the host
//! supplies. It is generic over the envelope type and over the
//! [`LifecycleSource`] that receives the handler hooks, so CloudEvents and
//! proprietary messages share a single engine.
//!
//! # Phases
//!
//! - **INITIALIZE** resolves the configured binding from the host, negotiates
//!   a marshaller by content type and decodes the envelope into the context.
//!   Decode failures reject the context. No handler runs.
//! - **PROCESS** runs these steps in order:
//!   1. filter chain
//!   2. expiration check
//!   3. rejection check (`on_reject`, then `on_abort` when `abort_on_reject`)
//!   4. the application handler
//!   5. rejection check again
//!
//!   Any failure in these steps aborts the context and is reported through
//!   `on_abort` exactly once. A panicking handler counts as a failure.
//!   Nothing escapes PROCESS.
//!
//! Every other phase is logged and ignored. Rejections during INITIALIZE,
//! PROCESS failures and ignored phases are also written to the host log. The only error
//! [`do_lifecycle`](MessageLifecycle::do_lifecycle) returns is
//! [`MessageError::InvalidContext`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use courier_core::{
    BoxError, Envelope, HostContext, LifeCycle, LifecycleContext, LogLevel, MarshallerRegistry,
    MessageError, MessageResult,
};
use futures::FutureExt;
use tracing::{Instrument, Level, debug, error, span, warn};

use crate::context::{InvocationOutcome, MessageContext};
use crate::expiration::ExpirationPolicy;
use crate::filter::FilterChain;
use crate::handler::LifecycleSource;

/// Name of the binding the envelope is read from unless configured otherwise.
pub const DEFAULT_BINDING: &str = "message";

// ============================================================================
// LifecycleOptions
// ============================================================================

/// Behaviour switches of a [`MessageLifecycle`].
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Host binding holding the raw envelope.
    pub binding: String,
    /// Escalate every rejection to an abort.
    pub abort_on_reject: bool,
    /// Filter applied in PROCESS step 1.
    pub filter: FilterChain,
    /// Expiration applied in PROCESS step 2.
    pub expiration: ExpirationPolicy,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            binding: DEFAULT_BINDING.to_string(),
            abort_on_reject: true,
            filter: FilterChain::new(),
            expiration: ExpirationPolicy::Never,
        }
    }
}

impl LifecycleOptions {
    pub fn with_binding(mut self, binding: impl Into<String>) -> Self {
        self.binding = binding.into();
        self
    }

    pub fn abort_on_reject(mut self, abort_on_reject: bool) -> Self {
        self.abort_on_reject = abort_on_reject;
        self
    }

    pub fn with_filter(mut self, filter: FilterChain) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_expiration(mut self, expiration: ExpirationPolicy) -> Self {
        self.expiration = expiration;
        self
    }
}

// ============================================================================
// MessageLifecycle
// ============================================================================

/// The lifecycle engine for envelopes of type `E`.
pub struct MessageLifecycle<E: Envelope, S: ?Sized> {
    source: Arc<S>,
    options: LifecycleOptions,
    marshallers: MarshallerRegistry<E>,
}

impl<E, S> MessageLifecycle<E, S>
where
    E: Envelope,
    S: LifecycleSource<E> + ?Sized,
{
    /// Creates an engine with default options and `E`'s default marshallers.
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            options: LifecycleOptions::default(),
            marshallers: E::marshallers(),
        }
    }

    pub fn with_options(mut self, options: LifecycleOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the marshallers used during INITIALIZE.
    pub fn with_marshallers(mut self, marshallers: MarshallerRegistry<E>) -> Self {
        self.marshallers = marshallers;
        self
    }

    pub fn options(&self) -> &LifecycleOptions {
        &self.options
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Creates a fresh context for one host invocation.
    pub fn create_context(&self, host: Arc<dyn HostContext>) -> MessageContext<E> {
        MessageContext::new(host)
    }

    /// Runs `phase` against a host-supplied context.
    ///
    /// Fails only if `context` is not a [`MessageContext<E>`].
    pub async fn do_lifecycle(
        &self,
        phase: LifeCycle,
        context: &mut dyn LifecycleContext,
    ) -> MessageResult<()> {
        let found = context.context_kind();
        let Some(ctx) = context.as_any_mut().downcast_mut::<MessageContext<E>>() else {
            let expected = std::any::type_name::<MessageContext<E>>();
            error!(%phase, expected, found, "Lifecycle received a context of the wrong family");
            return Err(MessageError::InvalidContext { expected, found });
        };
        self.dispatch(phase, ctx).await;
        Ok(())
    }

    /// Runs `phase` against a typed context.
    pub async fn dispatch(&self, phase: LifeCycle, ctx: &mut MessageContext<E>) {
        let span = span!(
            Level::DEBUG,
            "lifecycle",
            %phase,
            kind = E::KIND,
            invocation_id = ctx.invocation_id()
        );
        async {
            match phase {
                LifeCycle::Initialize => self.initialize(ctx).await,
                LifeCycle::Process => self.process(ctx).await,
                other => {
                    debug!(phase = %other, "Unsupported lifecycle phase ignored");
                    ctx.log(
                        &format!("Unsupported lifecycle phase {other} ignored"),
                        LogLevel::Debug,
                    );
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Runs INITIALIZE then PROCESS and returns the outcome.
    pub async fn run(&self, ctx: &mut MessageContext<E>) -> InvocationOutcome {
        self.dispatch(LifeCycle::Initialize, ctx).await;
        self.dispatch(LifeCycle::Process, ctx).await;
        ctx.outcome()
    }

    async fn initialize(&self, ctx: &mut MessageContext<E>) {
        if ctx.envelope().is_some() {
            debug!("Envelope already resolved");
            return;
        }

        match self.decode(ctx).await {
            Ok(envelope) => {
                debug!(id = envelope.envelope_id(), "Envelope decoded");
                ctx.set_envelope(envelope);
            }
            Err(err) => {
                ctx.log(&format!("Envelope rejected during INITIALIZE: {err}"), LogLevel::Warn);
                ctx.reject(err);
            }
        }
    }

    async fn decode(&self, ctx: &MessageContext<E>) -> MessageResult<E> {
        let name = self.options.binding.as_str();
        let binding = ctx.host().get_binding(name).ok_or_else(|| {
            MessageError::validation(format!("binding '{name}' not found"), name)
        })?;

        let content_type = binding.content_type.as_deref().unwrap_or(E::CONTENT_TYPE);
        let raw = binding.value.to_bytes();
        self.marshallers.unmarshal(content_type, &raw).await
    }

    async fn process(&self, ctx: &mut MessageContext<E>) {
        if ctx.is_aborted() {
            warn!("Context already aborted, skipping PROCESS");
            return;
        }
        if let Err(err) = self.process_steps(ctx).await {
            error!(error = %err, "PROCESS failed");
            ctx.log(&format!("PROCESS failed: {err}"), LogLevel::Error);
            self.abort(ctx, Some(err)).await;
        }
        debug!(outcome = %ctx.outcome(), "PROCESS finished");
    }

    async fn process_steps(&self, ctx: &mut MessageContext<E>) -> MessageResult<()> {
        self.apply_filter(ctx);
        self.check_expiration(ctx);
        if self.check_rejected(ctx).await? {
            return Ok(());
        }
        AssertUnwindSafe(self.source.handle_process_lifecycle(ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(panic_error(panic)))
            .map_err(MessageError::Handler)?;
        self.check_rejected(ctx).await?;
        Ok(())
    }

    fn apply_filter(&self, ctx: &mut MessageContext<E>) {
        let Some(envelope) = ctx.envelope() else {
            return;
        };
        if let Some(link) = self.options.filter.first_rejecting(envelope) {
            let reason = format!(
                "attribute '{}' does not match '{}'",
                link.attribute_name(),
                link.pattern()
            );
            ctx.reject(MessageError::rejected(reason));
        }
    }

    fn check_expiration(&self, ctx: &mut MessageContext<E>) {
        let expired = ctx
            .envelope()
            .is_some_and(|envelope| self.options.expiration.is_expired(envelope));
        if expired {
            ctx.reject(MessageError::rejected("envelope expired"));
        }
    }

    /// Reports a pending rejection. Returns `true` if it was escalated to an
    /// abort.
    async fn check_rejected(&self, ctx: &mut MessageContext<E>) -> MessageResult<bool> {
        if !ctx.take_unreported_rejection() {
            return Ok(false);
        }
        self.source
            .on_reject(ctx)
            .await
            .map_err(MessageError::Handler)?;
        if !self.options.abort_on_reject {
            return Ok(false);
        }
        self.abort(ctx, None).await;
        Ok(true)
    }

    async fn abort(&self, ctx: &mut MessageContext<E>, error: Option<MessageError>) {
        if !ctx.mark_aborted(error) {
            warn!("Context already aborted");
            return;
        }
        self.source.on_abort(ctx).await;
    }
}

fn panic_error(panic: Box<dyn Any + Send>) -> BoxError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("handler panicked: {message}").into()
}

impl<E: Envelope, S: ?Sized> std::fmt::Debug for MessageLifecycle<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageLifecycle")
            .field("kind", &E::KIND)
            .field("options", &self.options)
            .field("marshallers", &self.marshallers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::handler::{EventHandler, MessageHandler};
    use crate::test_support::TestHost;
    use async_trait::async_trait;
    use courier_core::{
        Binding, CloudEvent, Header, MESSAGE_TYPE, MESSAGE_VERSION, Message, TimeUnit,
    };
    use parking_lot::Mutex;
    use serde_json::{Value, json};

    const EVENT: &str = r#"{
        "id": "evt-1",
        "specversion": "1.0",
        "type": "com.example.order.created",
        "source": "/orders",
        "datacontenttype": "application/json",
        "data": {"total": 3}
    }"#;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<&'static str>>,
        abort_reasons: Mutex<Vec<String>>,
        reject_in_handler: bool,
        fail_in_handler: bool,
        panic_in_handler: bool,
        fail_on_reject: bool,
    }

    impl Recorder {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().clone()
        }

        fn abort_reasons(&self) -> Vec<String> {
            self.abort_reasons.lock().clone()
        }
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn on_event(&self, ctx: &mut MessageContext<CloudEvent>) -> Result<(), BoxError> {
            self.calls.lock().push("event");
            if self.reject_in_handler {
                ctx.reject_with("handler rejected");
            }
            if self.fail_in_handler {
                return Err("handler exploded".into());
            }
            if self.panic_in_handler {
                panic!("handler blew up");
            }
            Ok(())
        }

        async fn on_reject(&self, _ctx: &mut MessageContext<CloudEvent>) -> Result<(), BoxError> {
            self.calls.lock().push("reject");
            if self.fail_on_reject {
                return Err("reject hook failed".into());
            }
            Ok(())
        }

        async fn on_abort(&self, ctx: &mut MessageContext<CloudEvent>) {
            self.calls.lock().push("abort");
            let reason = ctx.reason().map(ToString::to_string).unwrap_or_default();
            self.abort_reasons.lock().push(reason);
        }
    }

    fn engine(
        recorder: &Arc<Recorder>,
        options: LifecycleOptions,
    ) -> MessageLifecycle<CloudEvent, Recorder> {
        MessageLifecycle::new(Arc::clone(recorder)).with_options(options)
    }

    fn host_with(raw: &str) -> Arc<dyn HostContext> {
        Arc::new(TestHost::with_binding(DEFAULT_BINDING, Binding::new(raw)))
    }

    #[tokio::test]
    async fn test_initialize_decodes_binding() {
        let recorder = Arc::new(Recorder::default());
        let lifecycle = engine(&recorder, LifecycleOptions::default());
        let mut ctx = lifecycle.create_context(host_with(EVENT));

        lifecycle.do_lifecycle(LifeCycle::Initialize, &mut ctx).await.unwrap();

        let event = ctx.cloud_event().unwrap();
        assert_eq!(event.id(), "evt-1");
        assert_eq!(event.event_type(), "com.example.order.created");
        assert!(!ctx.is_rejected());
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_accepted_event_runs_handler() {
        let recorder = Arc::new(Recorder::default());
        let lifecycle = engine(&recorder, LifecycleOptions::default());
        let mut ctx = lifecycle.create_context(host_with(EVENT));

        assert_eq!(lifecycle.run(&mut ctx).await, InvocationOutcome::Completed);
        assert_eq!(recorder.calls(), ["event"]);
    }

    #[tokio::test]
    async fn test_parse_failure_rejects_then_aborts() {
        let recorder = Arc::new(Recorder::default());
        let lifecycle = engine(&recorder, LifecycleOptions::default());
        let host = Arc::new(TestHost::with_binding(DEFAULT_BINDING, Binding::new("{not json")));
        let mut ctx = lifecycle.create_context(host.clone());

        lifecycle.do_lifecycle(LifeCycle::Initialize, &mut ctx).await.unwrap();
        assert!(ctx.is_rejected());
        assert!(matches!(ctx.reason(), Some(MessageError::Parse { .. })));
        assert!(recorder.calls().is_empty());

        lifecycle.do_lifecycle(LifeCycle::Process, &mut ctx).await.unwrap();
        assert_eq!(recorder.calls(), ["reject", "abort"]);
        assert!(ctx.is_aborted());
        assert!(ctx.error().is_none());

        let logs = host.logs.lock().clone();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].0, LogLevel::Warn);
        assert!(logs[0].1.starts_with("Envelope rejected during INITIALIZE"));
    }

    #[tokio::test]
    async fn test_validation_failure_names_attribute() {
        let recorder = Arc::new(Recorder::default());
        let lifecycle = engine(&recorder, LifecycleOptions::default());
        let mut ctx = lifecycle.create_context(host_with(r#"{"id":"1","specversion":"0.3"}"#));

        lifecycle.do_lifecycle(LifeCycle::Initialize, &mut ctx).await.unwrap();
        assert_eq!(ctx.reason().and_then(MessageError::attribute), Some("specversion"));
    }

    #[tokio::test]
    async fn test_rejection_without_abort_still_runs_handler() {
        let recorder = Arc::new(Recorder::default());
        let lifecycle = engine(&recorder, LifecycleOptions::default().abort_on_reject(false));
        let mut ctx = lifecycle.create_context(host_with("{not json"));

        let outcome = lifecycle.run(&mut ctx).await;
        assert_eq!(recorder.calls(), ["reject", "event"]);
        assert_eq!(outcome, InvocationOutcome::Rejected);
        assert!(ctx.is_rejected());
        assert!(!ctx.is_aborted());
    }

    #[tokio::test]
    async fn test_missing_binding_rejects() {
        let recorder = Arc::new(Recorder::default());
        let lifecycle = engine(&recorder, LifecycleOptions::default().with_binding("queue"));
        let mut ctx = lifecycle.create_context(host_with(EVENT));

        assert_eq!(lifecycle.run(&mut ctx).await, InvocationOutcome::Aborted);
        assert_eq!(ctx.reason().and_then(MessageError::attribute), Some("queue"));
        assert_eq!(recorder.calls(), ["reject", "abort"]);
    }

    #[tokio::test]
    async fn test_handler_failure_aborts_once() {
        let recorder = Arc::new(Recorder {
            fail_in_handler: true,
            ..Default::default()
        });
        let lifecycle = engine(&recorder, LifecycleOptions::default());
        let mut ctx = lifecycle.create_context(host_with(EVENT));

        assert_eq!(lifecycle.run(&mut ctx).await, InvocationOutcome::Aborted);
        assert_eq!(recorder.calls(), ["event", "abort"]);
        assert_eq!(recorder.abort_reasons(), ["handler failed: handler exploded"]);
        assert!(!ctx.is_rejected());
        assert!(matches!(ctx.error(), Some(MessageError::Handler(_))));
        assert_eq!(
            ctx.abort_reason().map(ToString::to_string).as_deref(),
            Some("handler failed: handler exploded")
        );
    }

    #[tokio::test]
    async fn test_handler_failure_is_written_to_host_log() {
        let recorder = Arc::new(Recorder {
            fail_in_handler: true,
            ..Default::default()
        });
        let lifecycle = engine(&recorder, LifecycleOptions::default());
        let host = Arc::new(TestHost::with_binding(DEFAULT_BINDING, Binding::new(EVENT)));
        let mut ctx = lifecycle.create_context(host.clone());

        lifecycle.run(&mut ctx).await;
        let logs = host.logs.lock().clone();
        assert_eq!(
            logs,
            [(LogLevel::Error, "PROCESS failed: handler failed: handler exploded".to_string())]
        );
    }

    #[tokio::test]
    async fn test_handler_panic_aborts() {
        let recorder = Arc::new(Recorder {
            panic_in_handler: true,
            ..Default::default()
        });
        let lifecycle = engine(&recorder, LifecycleOptions::default());
        let mut ctx = lifecycle.create_context(host_with(EVENT));

        assert_eq!(lifecycle.run(&mut ctx).await, InvocationOutcome::Aborted);
        assert_eq!(recorder.calls(), ["event", "abort"]);
        assert_eq!(
            recorder.abort_reasons(),
            ["handler failed: handler panicked: handler blew up"]
        );
    }

    #[tokio::test]
    async fn test_handler_failure_keeps_prior_rejection() {
        let recorder = Arc::new(Recorder {
            fail_in_handler: true,
            ..Default::default()
        });
        let filter = FilterChain::link("source", "^/payments").unwrap();
        let options = LifecycleOptions::default()
            .abort_on_reject(false)
            .with_filter(filter);
        let lifecycle = engine(&recorder, options);
        let mut ctx = lifecycle.create_context(host_with(EVENT));

        lifecycle.run(&mut ctx).await;
        assert_eq!(recorder.calls(), ["reject", "event", "abort"]);
        assert_eq!(
            recorder.abort_reasons(),
            ["message rejected: attribute 'source' does not match '^/payments'"]
        );
        assert!(ctx.is_rejected());
        assert!(ctx.is_aborted());
        assert!(matches!(ctx.reason(), Some(MessageError::Rejected { .. })));
        assert!(matches!(ctx.error(), Some(MessageError::Handler(_))));
    }

    #[tokio::test]
    async fn test_handler_rejection_is_checked_after_handler() {
        let recorder = Arc::new(Recorder {
            reject_in_handler: true,
            ..Default::default()
        });
        let lifecycle = engine(&recorder, LifecycleOptions::default());
        let mut ctx = lifecycle.create_context(host_with(EVENT));

        assert_eq!(lifecycle.run(&mut ctx).await, InvocationOutcome::Aborted);
        assert_eq!(recorder.calls(), ["event", "reject", "abort"]);
    }

    #[tokio::test]
    async fn test_failing_reject_hook_aborts() {
        let recorder = Arc::new(Recorder {
            fail_on_reject: true,
            ..Default::default()
        });
        let lifecycle = engine(&recorder, LifecycleOptions::default());
        let mut ctx = lifecycle.create_context(host_with("[]"));

        lifecycle.run(&mut ctx).await;
        assert_eq!(recorder.calls(), ["reject", "abort"]);
        assert!(matches!(ctx.error(), Some(MessageError::Handler(_))));
    }

    #[tokio::test]
    async fn test_filter_mismatch_rejects() {
        let recorder = Arc::new(Recorder::default());
        let filter = FilterChain::link("type", r"^com\.example\.")
            .unwrap()
            .with_link("source", "^/invoices")
            .unwrap();
        let lifecycle = engine(&recorder, LifecycleOptions::default().with_filter(filter));
        let mut ctx = lifecycle.create_context(host_with(EVENT));

        assert_eq!(lifecycle.run(&mut ctx).await, InvocationOutcome::Aborted);
        assert_eq!(recorder.calls(), ["reject", "abort"]);
        assert_eq!(
            ctx.reason().map(ToString::to_string).as_deref(),
            Some("message rejected: attribute 'source' does not match '^/invoices'")
        );
    }

    #[tokio::test]
    async fn test_expired_event_rejects() {
        let recorder = Arc::new(Recorder::default());
        let expiration = ExpirationPolicy::max_age(24, TimeUnit::Hours);
        let lifecycle = engine(&recorder, LifecycleOptions::default().with_expiration(expiration));
        let old = EVENT.replace(
            r#""id": "evt-1","#,
            r#""id": "evt-1", "timestamp": "2000-01-01T00:00:00Z","#,
        );
        let mut ctx = lifecycle.create_context(host_with(&old));

        assert_eq!(lifecycle.run(&mut ctx).await, InvocationOutcome::Aborted);
        assert_eq!(recorder.calls(), ["reject", "abort"]);
    }

    #[tokio::test]
    async fn test_unsupported_phase_is_ignored() {
        let recorder = Arc::new(Recorder::default());
        let lifecycle = engine(&recorder, LifecycleOptions::default());
        let host = Arc::new(TestHost::with_binding(DEFAULT_BINDING, Binding::new(EVENT)));
        let mut ctx = lifecycle.create_context(host.clone());

        lifecycle.do_lifecycle(LifeCycle::Save, &mut ctx).await.unwrap();
        assert!(ctx.cloud_event().is_none());
        assert!(recorder.calls().is_empty());
        assert_eq!(host.logs.lock()[0].0, LogLevel::Debug);
    }

    #[tokio::test]
    async fn test_wrong_envelope_family_is_invalid_context() {
        let recorder = Arc::new(Recorder::default());
        let lifecycle = engine(&recorder, LifecycleOptions::default());
        let mut ctx = MessageContext::<Message>::new(host_with(EVENT));
        ctx.set_envelope(Message::new(Header::new(), Value::Null));

        let err = lifecycle
            .do_lifecycle(LifeCycle::Process, &mut ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, MessageError::InvalidContext { .. }));
        assert!(recorder.calls().is_empty());
    }

    #[derive(Default)]
    struct MessageRecorder {
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl MessageHandler for MessageRecorder {
        async fn on_message(&self, _ctx: &mut MessageContext<Message>) -> Result<(), BoxError> {
            self.calls.lock().push("message");
            Ok(())
        }

        async fn on_reject(&self, _ctx: &mut MessageContext<Message>) -> Result<(), BoxError> {
            self.calls.lock().push("reject");
            Ok(())
        }

        async fn on_abort(&self, _ctx: &mut MessageContext<Message>) {
            self.calls.lock().push("abort");
        }
    }

    fn message_json(message_type: &str) -> String {
        json!({
            "header": {
                "id": "msg-1",
                "correlationId": "corr-1",
                "type": message_type,
                "version": MESSAGE_VERSION
            },
            "payload": {"total": 3}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_message_marker_mismatch_rejects_then_aborts() {
        let recorder = Arc::new(MessageRecorder::default());
        let lifecycle = MessageLifecycle::<Message, _>::new(Arc::clone(&recorder));
        let mut ctx = lifecycle.create_context(host_with(&message_json("com.example.Other")));

        assert_eq!(lifecycle.run(&mut ctx).await, InvocationOutcome::Aborted);
        assert_eq!(ctx.reason().and_then(MessageError::attribute), Some("header.type"));
        assert!(ctx.message().is_none());
        assert_eq!(*recorder.calls.lock(), ["reject", "abort"]);
    }

    #[tokio::test]
    async fn test_valid_message_runs_handler() {
        let recorder = Arc::new(MessageRecorder::default());
        let lifecycle = MessageLifecycle::<Message, _>::new(Arc::clone(&recorder));
        let mut ctx = lifecycle.create_context(host_with(&message_json(MESSAGE_TYPE)));

        assert_eq!(lifecycle.run(&mut ctx).await, InvocationOutcome::Completed);
        assert_eq!(ctx.message().map(|m| m.header().id()), Some("msg-1"));
        assert_eq!(*recorder.calls.lock(), ["message"]);
    }

    struct ForeignContext;

    impl LifecycleContext for ForeignContext {
        fn context_kind(&self) -> &'static str {
            "foreign"
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[tokio::test]
    async fn test_foreign_context_is_invalid_context() {
        let recorder = Arc::new(Recorder::default());
        let lifecycle = engine(&recorder, LifecycleOptions::default());

        let err = lifecycle
            .do_lifecycle(LifeCycle::Initialize, &mut ForeignContext)
            .await
            .unwrap_err();
        assert!(matches!(err, MessageError::InvalidContext { found: "foreign", .. }));
    }
}
