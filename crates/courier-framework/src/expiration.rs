//! Expiration policy applied during PROCESS.

use std::time::Duration;

use chrono::{DateTime, Utc};
use courier_core::{Envelope, TimeUnit};

/// Decides whether an envelope is too old to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpirationPolicy {
    /// Envelopes never expire.
    #[default]
    Never,
    /// Envelopes older than the given age expire.
    MaxAge(Duration),
}

impl ExpirationPolicy {
    /// Creates a [`MaxAge`](Self::MaxAge) policy from an amount and unit.
    pub fn max_age(amount: u64, unit: TimeUnit) -> Self {
        Self::MaxAge(unit.duration(amount))
    }

    /// Returns `true` if `envelope` has expired at `now` under this policy.
    pub fn is_expired_at<E: Envelope>(&self, envelope: &E, now: DateTime<Utc>) -> bool {
        match self {
            Self::Never => false,
            Self::MaxAge(max_age) => envelope.is_expired_at(*max_age, now),
        }
    }

    /// Returns `true` if `envelope` has expired now.
    pub fn is_expired<E: Envelope>(&self, envelope: &E) -> bool {
        self.is_expired_at(envelope, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use courier_core::CloudEvent;

    #[test]
    fn test_policies() {
        let now = Utc::now();
        let event = CloudEvent::builder("t", "s")
            .timestamp(now - TimeDelta::hours(30))
            .build()
            .unwrap();

        assert!(!ExpirationPolicy::Never.is_expired_at(&event, now));
        assert!(ExpirationPolicy::max_age(24, TimeUnit::Hours).is_expired_at(&event, now));
        assert!(!ExpirationPolicy::max_age(2, TimeUnit::Days).is_expired_at(&event, now));
    }
}
