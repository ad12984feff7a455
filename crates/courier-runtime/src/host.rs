//! In-memory host context.
//!
//! [`BindingContext`] is the host a [`MessageFunction`](crate::MessageFunction)
//! runs against when no function framework supplies one: bindings live in a
//! map, the invocation id is a fresh UUID, and host log lines are forwarded
//! to `tracing`.

use std::collections::HashMap;

use courier_core::{Binding, HostContext, LogLevel};
use parking_lot::RwLock;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

/// A host context backed by an in-memory binding map.
#[derive(Debug)]
pub struct BindingContext {
    invocation_id: String,
    bindings: RwLock<HashMap<String, Binding>>,
}

impl Default for BindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingContext {
    /// Creates an empty context with a fresh invocation id.
    pub fn new() -> Self {
        Self::with_invocation_id(Uuid::new_v4().to_string())
    }

    /// Creates an empty context with a given invocation id.
    pub fn with_invocation_id(invocation_id: impl Into<String>) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Builder-style binding insertion.
    pub fn with_binding(self, name: impl Into<String>, binding: Binding) -> Self {
        self.bindings.write().insert(name.into(), binding);
        self
    }

    /// Removes and returns a binding, typically an output written by a handler.
    pub fn take_binding(&self, name: &str) -> Option<Binding> {
        self.bindings.write().remove(name)
    }

    /// Names of all bindings, sorted.
    pub fn binding_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.bindings.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl HostContext for BindingContext {
    fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    fn get_binding(&self, name: &str) -> Option<Binding> {
        self.bindings.read().get(name).cloned()
    }

    fn set_binding(&self, name: &str, binding: Binding) {
        self.bindings.write().insert(name.to_string(), binding);
    }

    fn log(&self, message: &str, level: LogLevel, origin: &str) {
        let invocation_id = self.invocation_id.as_str();
        match level {
            LogLevel::Trace => trace!(invocation_id, origin, "{message}"),
            LogLevel::Debug => debug!(invocation_id, origin, "{message}"),
            LogLevel::Info => info!(invocation_id, origin, "{message}"),
            LogLevel::Warn => warn!(invocation_id, origin, "{message}"),
            LogLevel::Error => error!(invocation_id, origin, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_ids_are_fresh() {
        let a = BindingContext::new();
        let b = BindingContext::new();
        assert_ne!(a.invocation_id(), b.invocation_id());
        assert_eq!(BindingContext::with_invocation_id("inv-1").invocation_id(), "inv-1");
    }

    #[test]
    fn test_bindings() {
        let host = BindingContext::new().with_binding("message", Binding::new("in"));
        assert_eq!(host.get_binding("message"), Some(Binding::new("in")));
        assert!(host.get_binding("missing").is_none());

        host.set_binding("reply", Binding::new("out").with_content_type("text/plain"));
        assert_eq!(host.binding_names(), ["message", "reply"]);

        let reply = host.take_binding("reply").unwrap();
        assert_eq!(reply.content_type.as_deref(), Some("text/plain"));
        assert!(host.get_binding("reply").is_none());
    }

    #[test]
    fn test_log_does_not_panic_without_subscriber() {
        let host = BindingContext::new();
        for level in [LogLevel::Trace, LogLevel::Info, LogLevel::Error] {
            host.log("hello", level, "test");
        }
    }
}
