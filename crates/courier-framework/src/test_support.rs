//! Shared fixtures for framework tests.

use std::collections::HashMap;

use courier_core::{Binding, HostContext, LogLevel};
use parking_lot::Mutex;

/// In-memory host with a fixed invocation id.
#[derive(Default)]
pub(crate) struct TestHost {
    bindings: Mutex<HashMap<String, Binding>>,
    pub(crate) logs: Mutex<Vec<(LogLevel, String)>>,
}

impl TestHost {
    pub(crate) fn with_binding(name: &str, binding: Binding) -> Self {
        let host = Self::default();
        host.bindings.lock().insert(name.to_string(), binding);
        host
    }
}

impl HostContext for TestHost {
    fn invocation_id(&self) -> &str {
        "test-invocation"
    }

    fn get_binding(&self, name: &str) -> Option<Binding> {
        self.bindings.lock().get(name).cloned()
    }

    fn set_binding(&self, name: &str, binding: Binding) {
        self.bindings.lock().insert(name.to_string(), binding);
    }

    fn log(&self, message: &str, level: LogLevel, _origin: &str) {
        self.logs.lock().push((level, message.to_string()));
    }
}
