//! Day-boundary policy.
//!
//! A day runs from the configured day-start offset to the same offset on the
//! next calendar day. Settings and the clock source are injected, and both are
//! re-read on every call so that runtime changes take effect immediately.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::timestamp::{Timestamp, HOUR_LENGTH_MS, MINUTE_LENGTH_MS};
use super::zone::{self, Zone};
use crate::error::{CoreError, Result};

/// Time of day at which a new day begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDayStart")]
pub struct DayStartOffset {
    hour: u32,
    minute: u32,
}

#[derive(Deserialize)]
struct RawDayStart {
    #[serde(default)]
    hour: u32,
    #[serde(default)]
    minute: u32,
}

impl TryFrom<RawDayStart> for DayStartOffset {
    type Error = CoreError;

    fn try_from(raw: RawDayStart) -> Result<Self> {
        Self::new(raw.hour, raw.minute)
    }
}

impl DayStartOffset {
    pub const MIDNIGHT: DayStartOffset = DayStartOffset { hour: 0, minute: 0 };

    /// # Errors
    ///
    /// Returns `InvalidOffset` if `hour >= 24` or `minute >= 60`.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour >= 24 || minute >= 60 {
            return Err(CoreError::InvalidOffset { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn as_millis(&self) -> i64 {
        self.hour as i64 * HOUR_LENGTH_MS + self.minute as i64 * MINUTE_LENGTH_MS
    }
}

impl Default for DayStartOffset {
    fn default() -> Self {
        Self::MIDNIGHT
    }
}

/// How to treat nominal instants that have no unique actual instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMode {
    /// Resolve deterministically (compress gaps, take the post-fold offset).
    #[default]
    Lenient,
    /// Report `AmbiguousTimeConversion`.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncateField {
    Week,
    Month,
    Quarter,
    Year,
}

impl std::str::FromStr for TruncateField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" => Ok(TruncateField::Week),
            "month" => Ok(TruncateField::Month),
            "quarter" => Ok(TruncateField::Quarter),
            "year" => Ok(TruncateField::Year),
            other => Err(format!("unknown truncate field: {other}")),
        }
    }
}

/// Day-start and week settings supplied by the host application.
pub trait ClockSettings: Send + Sync {
    fn day_start(&self) -> DayStartOffset;
    fn first_weekday(&self) -> Weekday;
    fn conversion_mode(&self) -> ConversionMode {
        ConversionMode::Lenient
    }
}

/// Supplies the current instant and the active device zone.
pub trait ClockSource: Send + Sync {
    /// Actual instant, milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
    fn zone(&self) -> Zone;
    fn zone_id(&self) -> String {
        self.zone().id()
    }
}

/// Reads the system clock and the operating system zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn zone(&self) -> Zone {
        Zone::Local
    }
}

/// A clock frozen at one instant in one zone.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now_ms: i64,
    zone: Zone,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, zone: Zone) -> Self {
        Self {
            now_ms: now.timestamp_millis(),
            zone,
        }
    }

    pub fn from_millis(now_ms: i64, zone: Zone) -> Self {
        Self { now_ms, zone }
    }
}

impl ClockSource for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now_ms
    }

    fn zone(&self) -> Zone {
        self.zone.clone()
    }
}

/// Day that contains a nominal instant, given a day-start offset.
pub fn timestamp_with_offset(nominal_ms: i64, offset: DayStartOffset) -> Timestamp {
    Timestamp::from_nominal_ms(nominal_ms - offset.as_millis())
}

/// First day of the week/month/quarter/year containing `timestamp`.
/// `first_weekday` only matters for [`TruncateField::Week`].
pub fn truncate(field: TruncateField, timestamp: Timestamp, first_weekday: Weekday) -> Timestamp {
    let date = timestamp.to_date();
    let truncated = match field {
        TruncateField::Week => {
            let back = (7 + date.weekday().num_days_from_sunday()
                - first_weekday.num_days_from_sunday())
                % 7;
            return timestamp.minus(back as i64);
        }
        TruncateField::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
        TruncateField::Quarter => {
            let first_month = (date.month0() / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(date.year(), first_month, 1)
        }
        TruncateField::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
    };
    truncated.map(Timestamp::from_date).unwrap_or(timestamp)
}

/// Conversions between device instants and [`Timestamp`]s.
#[derive(Clone)]
pub struct ClockPolicy {
    settings: Arc<dyn ClockSettings>,
    clock: Arc<dyn ClockSource>,
}

impl ClockPolicy {
    pub fn new(settings: Arc<dyn ClockSettings>, clock: Arc<dyn ClockSource>) -> Self {
        Self { settings, clock }
    }

    pub fn settings(&self) -> &dyn ClockSettings {
        self.settings.as_ref()
    }

    pub fn clock(&self) -> &dyn ClockSource {
        self.clock.as_ref()
    }

    /// Actual instant → nominal instant in the current device zone.
    pub fn remove_timezone(&self, actual_ms: i64) -> i64 {
        zone::remove_timezone(&self.clock.zone(), actual_ms)
    }

    /// Nominal instant → actual instant in the current device zone.
    ///
    /// # Errors
    ///
    /// Returns `AmbiguousTimeConversion` in strict mode when the nominal
    /// instant falls inside a skipped or repeated wall-clock interval.
    pub fn apply_timezone(&self, nominal_ms: i64) -> Result<i64> {
        let mode = self.settings.conversion_mode();
        let result = zone::apply_timezone(&self.clock.zone(), nominal_ms, mode);
        if result.is_err() {
            tracing::debug!(nominal_ms, zone = %self.clock.zone_id(), "rejected ambiguous nominal instant");
        }
        result
    }

    /// Day containing an actual instant, honouring the day-start offset.
    pub fn to_timestamp(&self, actual_ms: i64) -> Timestamp {
        timestamp_with_offset(self.remove_timezone(actual_ms), self.settings.day_start())
    }

    pub fn today(&self) -> Timestamp {
        self.to_timestamp(self.clock.now_ms())
    }

    /// Milliseconds from now until the next day boundary.
    pub fn millis_until_tomorrow(&self) -> i64 {
        let nominal = self.remove_timezone(self.clock.now_ms());
        let offset = self.settings.day_start();
        let tomorrow = timestamp_with_offset(nominal, offset).plus(1);
        tomorrow.start_ms() + offset.as_millis() - nominal
    }

    /// Floors a nominal instant to the start of its week/month/quarter/year.
    pub fn truncate(&self, field: TruncateField, nominal_ms: i64) -> i64 {
        self.truncate_timestamp(field, Timestamp::from_nominal_ms(nominal_ms))
            .start_ms()
    }

    pub fn truncate_timestamp(&self, field: TruncateField, timestamp: Timestamp) -> Timestamp {
        truncate(field, timestamp, self.settings.first_weekday())
    }
}
