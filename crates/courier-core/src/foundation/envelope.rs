//! The envelope capability shared by every concrete envelope type.
//!
//! The lifecycle engine never needs to know whether it is driving a
//! [`CloudEvent`](super::CloudEvent) or a proprietary
//! [`Message`](super::Message). It only relies on the [`Envelope`] trait:
//! how to decode one, how to read its named attributes for filtering, and
//! how to decide whether it has expired.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::marshal::MarshallerRegistry;

/// Units accepted by expiration checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Milliseconds.
    Milliseconds,
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    #[default]
    Hours,
    /// Days.
    Days,
}

impl TimeUnit {
    /// Returns the unit name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
        }
    }

    /// Converts an amount of this unit into a [`Duration`].
    pub fn duration(&self, amount: u64) -> Duration {
        match self {
            Self::Milliseconds => Duration::from_millis(amount),
            Self::Seconds => Duration::from_secs(amount),
            Self::Minutes => Duration::from_secs(amount.saturating_mul(60)),
            Self::Hours => Duration::from_secs(amount.saturating_mul(3_600)),
            Self::Days => Duration::from_secs(amount.saturating_mul(86_400)),
        }
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ms" | "millisecond" | "milliseconds" => Ok(Self::Milliseconds),
            "s" | "second" | "seconds" => Ok(Self::Seconds),
            "m" | "minute" | "minutes" => Ok(Self::Minutes),
            "h" | "hour" | "hours" => Ok(Self::Hours),
            "d" | "day" | "days" => Ok(Self::Days),
            other => Err(format!("unknown time unit: {other}")),
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the instant `max_age` before `now`, saturating at the minimum
/// representable time.
pub(crate) fn cutoff(now: DateTime<Utc>, max_age: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(max_age)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Capability implemented by every envelope the lifecycle can drive.
pub trait Envelope: Send + Sync + 'static {
    /// Short name of this envelope family, used in logs and context checks.
    const KIND: &'static str;

    /// Content type assumed when the host does not declare one.
    const CONTENT_TYPE: &'static str;

    /// Returns the envelope identifier.
    fn envelope_id(&self) -> &str;

    /// Looks up a named attribute for filtering.
    ///
    /// Returns `None` when the envelope has no such attribute or it is unset.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Returns `true` if the envelope is older than `max_age` at `now`.
    fn is_expired_at(&self, max_age: Duration, now: DateTime<Utc>) -> bool;

    /// Returns the marshallers able to decode this envelope from the wire.
    fn marshallers() -> MarshallerRegistry<Self>
    where
        Self: Sized;
}
