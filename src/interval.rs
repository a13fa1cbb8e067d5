//! Billing-period and analytics intervals.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Lookback window for verification analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "24h")]
    Last24h,
    #[serde(rename = "7d")]
    Last7d,
    #[serde(rename = "30d")]
    Last30d,
}

impl Interval {
    pub const ALL: [Interval; 3] = [Interval::Last24h, Interval::Last7d, Interval::Last30d];

    pub const fn as_str(self) -> &'static str {
        match self {
            Interval::Last24h => "24h",
            Interval::Last7d => "7d",
            Interval::Last30d => "30d",
        }
    }

    /// Human-readable label for dashboards.
    pub const fn label(self) -> &'static str {
        match self {
            Interval::Last24h => "Last 24 hours",
            Interval::Last7d => "Last 7 days",
            Interval::Last30d => "Last 30 days",
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            Interval::Last24h => Duration::hours(24),
            Interval::Last7d => Duration::days(7),
            Interval::Last30d => Duration::days(30),
        }
    }

    /// Start of the window ending at `now`.
    pub fn start_time(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }

    /// Start of the window as a millisecond epoch timestamp, the unit the
    /// key service expects for `start` filters.
    pub fn start_timestamp_ms(self, now: DateTime<Utc>) -> i64 {
        self.start_time(now).timestamp_millis()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(Interval::Last24h),
            "7d" => Ok(Interval::Last7d),
            "30d" => Ok(Interval::Last30d),
            other => Err(Error::config(format!("unknown interval: {other:?}"))),
        }
    }
}

/// Last instant of the current month as a millisecond epoch timestamp.
///
/// New keys expire at the end of the month they were created in, closing
/// the billing period; the rotation job then issues a fresh key at the
/// trial tier.
pub fn end_of_month_ms(now: DateTime<Utc>) -> i64 {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    // the first of a month at midnight UTC always exists
    let next_month = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .expect("first of month is a valid UTC instant");
    next_month.timestamp_millis() - 1
}
