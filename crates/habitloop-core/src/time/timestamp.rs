use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const MINUTE_LENGTH_MS: i64 = 60 * 1000;
pub const HOUR_LENGTH_MS: i64 = 60 * MINUTE_LENGTH_MS;
pub const DAY_LENGTH_MS: i64 = 24 * HOUR_LENGTH_MS;

/// Days between 0001-01-01 (day 1 of the common era) and 1970-01-01.
const EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// A calendar day, stored as the number of days since 1970-01-01 on the
/// nominal timeline.
///
/// Arithmetic is plain integer arithmetic on the day index, so it is never
/// affected by daylight-saving transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// 1970-01-01.
    pub const EPOCH: Timestamp = Timestamp(0);

    pub fn from_days(days: i64) -> Self {
        Self(days)
    }

    /// Day containing a nominal instant, without any day-start offset.
    pub fn from_nominal_ms(nominal_ms: i64) -> Self {
        Self(nominal_ms.div_euclid(DAY_LENGTH_MS))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.num_days_from_ce() as i64 - EPOCH_DAYS_FROM_CE)
    }

    pub fn days(&self) -> i64 {
        self.0
    }

    /// Nominal instant (ms) of midnight at the start of this day.
    pub fn start_ms(&self) -> i64 {
        self.0.saturating_mul(DAY_LENGTH_MS)
    }

    pub fn plus(&self, days: i64) -> Self {
        Self(self.0 + days)
    }

    pub fn minus(&self, days: i64) -> Self {
        Self(self.0 - days)
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(&self, other: Timestamp) -> i64 {
        other.0 - self.0
    }

    pub fn is_newer_than(&self, other: Timestamp) -> bool {
        self.0 > other.0
    }

    pub fn is_older_than(&self, other: Timestamp) -> bool {
        self.0 < other.0
    }

    /// Calendar date of this day. Indexes beyond chrono's supported range
    /// saturate to `NaiveDate::MIN`/`NaiveDate::MAX`.
    pub fn to_date(&self) -> NaiveDate {
        i32::try_from(self.0 + EPOCH_DAYS_FROM_CE)
            .ok()
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .unwrap_or(if self.0 < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
    }

    pub fn weekday(&self) -> Weekday {
        self.to_date().weekday()
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_date().format("%Y-%m-%d"))
    }
}
