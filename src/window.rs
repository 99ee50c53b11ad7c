//! Query time windows and the timestamp formats accepted for their bounds.
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::error::{Error, Result};

// ---

/// Accepted timestamp layouts, tried in order. Values are taken as UTC.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%d-%m-%YT%H:%M:%S"];

/// Inclusive `[start, end]` range over `recorded_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    // ---
    /// Build a window, rejecting `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        // ---
        if start > end {
            return Err(Error::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `days` leading up to and including `now`.
    ///
    /// A span reaching past the earliest representable instant is clamped to it.
    pub fn trailing_days(now: DateTime<Utc>, days: u32) -> Self {
        // ---
        let start = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end: now }
    }

    /// Resolve optional request bounds into a window.
    ///
    /// Both bounds must be present to be used. If either one is missing the
    /// trailing `default_days` window ending at `now` applies.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        now: DateTime<Utc>,
        default_days: u32,
    ) -> Result<Self> {
        // ---
        match (start, end) {
            (Some(start), Some(end)) => Self::new(parse_timestamp(start)?, parse_timestamp(end)?),
            (None, None) => Ok(Self::trailing_days(now, default_days)),
            (start, end) => {
                tracing::debug!(
                    "Only one query bound supplied (start={:?}, end={:?}), using default window",
                    start,
                    end
                );
                Ok(Self::trailing_days(now, default_days))
            }
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Parse a timestamp in one of the accepted formats; first match wins.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    // ---
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::InvalidDateFormat(value.to_string()))
}
