//! Credential age policy and display time zones
//!
//! Every staleness decision is made on UTC instants. Time zones only enter
//! the picture when a timestamp is rendered for a human, through
//! [`DisplayZone`], so changing the display zone can never change which
//! credentials are considered stale.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::defaults::{DEFAULT_STALE_DAYS, DEFAULT_WARN_DAYS};

/// Format used for every rendered timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Time zone identifier that chrono-tz does not know
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time zone '{0}' (expected an IANA name such as 'America/New_York')")]
pub struct InvalidTimeZone(pub String);

/// Returns true iff `created_at` is more than `threshold_days` full days before `now`.
pub fn is_stale(created_at: DateTime<Utc>, now: DateTime<Utc>, threshold_days: u32) -> bool {
    now.signed_duration_since(created_at) > Duration::days(i64::from(threshold_days))
}

/// Returns true if the credential is not yet stale but will be within `warn_days`.
pub fn is_near_expiry(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    threshold_days: u32,
    warn_days: u32,
) -> bool {
    !is_stale(created_at, now, threshold_days)
        && is_stale(created_at, now, threshold_days.saturating_sub(warn_days))
}

/// Staleness threshold plus the "expired only" filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalePolicy {
    /// Age in days after which a credential is stale
    pub threshold_days: u32,
    /// Only credentials that are stale match the policy
    pub expired_only: bool,
}

impl Default for StalePolicy {
    fn default() -> Self {
        Self {
            threshold_days: DEFAULT_STALE_DAYS,
            expired_only: false,
        }
    }
}

impl StalePolicy {
    pub fn new(threshold_days: u32, expired_only: bool) -> Self {
        Self {
            threshold_days,
            expired_only,
        }
    }

    pub fn is_stale(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        is_stale(created_at, now, self.threshold_days)
    }

    /// Whether a credential with the given staleness should be reported.
    pub fn matches(&self, stale: bool) -> bool {
        !self.expired_only || stale
    }

    /// Highlight hint for renderers; never used for filtering.
    pub fn is_near_expiry(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        is_near_expiry(created_at, now, self.threshold_days, DEFAULT_WARN_DAYS)
    }
}

/// Time zone used to render timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayZone(Tz);

impl DisplayZone {
    /// Parse an IANA zone name.
    pub fn parse(name: &str) -> Result<Self, InvalidTimeZone> {
        name.trim()
            .parse::<Tz>()
            .map(Self)
            .map_err(|_| InvalidTimeZone(name.to_string()))
    }

    pub fn tz(&self) -> Tz {
        self.0
    }

    pub fn format(&self, ts: DateTime<Utc>) -> String {
        ts.with_timezone(&self.0).format(TIMESTAMP_FORMAT).to_string()
    }

    /// Render an optional timestamp, using `fallback` when absent.
    pub fn format_or(&self, ts: Option<DateTime<Utc>>, fallback: &str) -> String {
        ts.map(|t| self.format(t))
            .unwrap_or_else(|| fallback.to_string())
    }
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self(chrono_tz::America::Santo_Domingo)
    }
}
