//! Lifecycle phases and the context family the engine accepts.

use std::any::Any;
use std::str::FromStr;

/// Lifecycle phases the host dispatches.
///
/// The message lifecycle acts on [`Initialize`](Self::Initialize) and
/// [`Process`](Self::Process) only; every other phase is accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifeCycle {
    Authenticate,
    Authorize,
    Validate,
    Monitor,
    Load,
    Initialize,
    Process,
    Save,
    Exception,
    Terminate,
}

impl LifeCycle {
    /// Returns the phase name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticate => "authenticate",
            Self::Authorize => "authorize",
            Self::Validate => "validate",
            Self::Monitor => "monitor",
            Self::Load => "load",
            Self::Initialize => "initialize",
            Self::Process => "process",
            Self::Save => "save",
            Self::Exception => "exception",
            Self::Terminate => "terminate",
        }
    }
}

impl FromStr for LifeCycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "authenticate" => Self::Authenticate,
            "authorize" => Self::Authorize,
            "validate" => Self::Validate,
            "monitor" => Self::Monitor,
            "load" => Self::Load,
            "initialize" => Self::Initialize,
            "process" => Self::Process,
            "save" => Self::Save,
            "exception" => Self::Exception,
            "terminate" => Self::Terminate,
            other => return Err(format!("unknown lifecycle phase: {other}")),
        })
    }
}

impl std::fmt::Display for LifeCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A context handed to the engine through a lifecycle dispatch.
///
/// The engine downcasts to its own context type and fails with
/// [`MessageError::InvalidContext`](crate::MessageError::InvalidContext)
/// when the host passes anything else.
pub trait LifecycleContext: Any + Send {
    /// Short name of the context family, reported on mismatch.
    fn context_kind(&self) -> &'static str;

    /// Returns `self` as `Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_round_trip_names() {
        for phase in [LifeCycle::Initialize, LifeCycle::Process, LifeCycle::Terminate] {
            assert_eq!(phase.as_str().parse::<LifeCycle>(), Ok(phase));
        }
        assert!("teardown".parse::<LifeCycle>().is_err());
    }
}
