//! Device time zones and the translation between the nominal and actual
//! timelines.
//!
//! An *actual* instant is an absolute number of milliseconds since the Unix
//! epoch. A *nominal* instant is the device's wall-clock reading at that
//! moment, encoded as if it were UTC. All day-boundary arithmetic happens on
//! the nominal timeline, which never observes DST; only reading the clock and
//! rendering for display cross between the two.

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};

use super::clock::ConversionMode;
use super::timestamp::DAY_LENGTH_MS;
use crate::error::{CoreError, Result};

/// How far around an instant to look for an offset transition. Real zones
/// never change offset twice within a day.
const TRANSITION_WINDOW_MS: i64 = DAY_LENGTH_MS;

/// Source of UTC offsets for a time zone.
pub trait ZoneRules {
    /// Offset from UTC, in milliseconds, in effect at an actual instant.
    fn offset_ms_at(&self, actual_ms: i64) -> i64;
}

impl ZoneRules for FixedOffset {
    fn offset_ms_at(&self, _actual_ms: i64) -> i64 {
        self.local_minus_utc() as i64 * 1000
    }
}

impl ZoneRules for Utc {
    fn offset_ms_at(&self, _actual_ms: i64) -> i64 {
        0
    }
}

impl ZoneRules for Local {
    fn offset_ms_at(&self, actual_ms: i64) -> i64 {
        match DateTime::from_timestamp_millis(actual_ms) {
            Some(utc) => Local.offset_from_utc_datetime(&utc.naive_utc()).local_minus_utc() as i64 * 1000,
            None => 0,
        }
    }
}

/// A single change of UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// First actual instant (ms) at which `offset` applies.
    pub at_ms: i64,
    pub offset: FixedOffset,
}

/// A zone described by an explicit table of offset transitions, in the
/// manner of a tzdata entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionZone {
    name: String,
    initial: FixedOffset,
    transitions: Vec<Transition>,
}

impl TransitionZone {
    pub fn new(name: impl Into<String>, initial: FixedOffset) -> Self {
        Self {
            name: name.into(),
            initial,
            transitions: Vec::new(),
        }
    }

    /// Add a transition; the table stays sorted by instant.
    pub fn with_transition(mut self, at: DateTime<Utc>, offset: FixedOffset) -> Self {
        let transition = Transition {
            at_ms: at.timestamp_millis(),
            offset,
        };
        let idx = self.transitions.partition_point(|t| t.at_ms <= transition.at_ms);
        self.transitions.insert(idx, transition);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

impl ZoneRules for TransitionZone {
    fn offset_ms_at(&self, actual_ms: i64) -> i64 {
        let idx = self.transitions.partition_point(|t| t.at_ms <= actual_ms);
        let offset = match idx {
            0 => self.initial,
            n => self.transitions[n - 1].offset,
        };
        offset.offset_ms_at(actual_ms)
    }
}

/// The device zone active at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Zone {
    /// Whatever the operating system reports, re-read on every lookup.
    Local,
    Utc,
    Fixed(FixedOffset),
    Table(TransitionZone),
}

impl Zone {
    /// Identifier suitable for logs and display.
    pub fn id(&self) -> String {
        match self {
            Zone::Local => "local".to_string(),
            Zone::Utc => "UTC".to_string(),
            Zone::Fixed(offset) => offset.to_string(),
            Zone::Table(table) => table.name().to_string(),
        }
    }
}

impl ZoneRules for Zone {
    fn offset_ms_at(&self, actual_ms: i64) -> i64 {
        match self {
            Zone::Local => Local.offset_ms_at(actual_ms),
            Zone::Utc => Utc.offset_ms_at(actual_ms),
            Zone::Fixed(offset) => offset.offset_ms_at(actual_ms),
            Zone::Table(table) => table.offset_ms_at(actual_ms),
        }
    }
}

/// First instant in `(from, to]` whose offset differs from the offset at
/// `from`. Assumes at most one transition in the interval.
fn find_transition(zone: &dyn ZoneRules, from: i64, to: i64) -> Option<i64> {
    let initial = zone.offset_ms_at(from);
    if zone.offset_ms_at(to) == initial {
        return None;
    }
    let (mut lo, mut hi) = (from, to);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if zone.offset_ms_at(mid) == initial {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(hi)
}

/// Actual instant → nominal instant.
///
/// Monotone non-decreasing: a forward jump simply skips nominal values, and
/// during the first pass through a backward jump the result is clamped to the
/// start of the repeated wall-clock interval instead of running backwards.
pub fn remove_timezone(zone: &dyn ZoneRules, actual_ms: i64) -> i64 {
    let offset = zone.offset_ms_at(actual_ms);
    let nominal = actual_ms + offset;

    if let Some(at) = find_transition(zone, actual_ms, actual_ms + TRANSITION_WINDOW_MS) {
        let next_offset = zone.offset_ms_at(at);
        if next_offset < offset {
            return nominal.min(at + next_offset);
        }
    }
    nominal
}

/// Nominal instant → actual instant.
///
/// Nominal values inside a skipped wall-clock interval all map to the
/// transition instant; values inside a repeated interval use the offset in
/// effect after the fold. In strict mode both cases are rejected with
/// `AmbiguousTimeConversion`.
pub fn apply_timezone(zone: &dyn ZoneRules, nominal_ms: i64, mode: ConversionMode) -> Result<i64> {
    let early = zone.offset_ms_at(nominal_ms - TRANSITION_WINDOW_MS);
    let late = zone.offset_ms_at(nominal_ms + TRANSITION_WINDOW_MS);

    let before = nominal_ms - early;
    let after = nominal_ms - late;
    let is_valid = |actual: i64| actual + zone.offset_ms_at(actual) == nominal_ms;

    match (is_valid(before), is_valid(after)) {
        (true, true) if before != after => match mode {
            ConversionMode::Strict => Err(CoreError::AmbiguousTimeConversion { nominal_ms }),
            ConversionMode::Lenient => Ok(after),
        },
        (true, _) => Ok(before),
        (false, true) => Ok(after),
        (false, false) => match mode {
            ConversionMode::Strict => Err(CoreError::AmbiguousTimeConversion { nominal_ms }),
            ConversionMode::Lenient => Ok(find_transition(
                zone,
                nominal_ms - TRANSITION_WINDOW_MS,
                nominal_ms + TRANSITION_WINDOW_MS,
            )
            .unwrap_or(after)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::timestamp::HOUR_LENGTH_MS;

    fn hours(h: i32) -> FixedOffset {
        FixedOffset::east_opt(h * 3600).unwrap()
    }

    fn spring_forward_zone() -> TransitionZone {
        // wall clock skips one hour, 1000 h after the epoch
        TransitionZone::new("test/spring", hours(0))
            .with_transition(DateTime::from_timestamp(1000 * 3600, 0).unwrap(), hours(1))
    }

    #[test]
    fn fixed_zone_is_a_pure_shift() {
        let zone = Zone::Fixed(hours(-5));
        let actual = 123_456_789;
        let nominal = remove_timezone(&zone, actual);
        assert_eq!(nominal, actual - 5 * HOUR_LENGTH_MS);
        assert_eq!(apply_timezone(&zone, nominal, ConversionMode::Strict).unwrap(), actual);
    }

    #[test]
    fn transition_table_lookup_uses_last_applicable_entry() {
        let zone = spring_forward_zone();
        let at = 1000 * HOUR_LENGTH_MS;
        assert_eq!(zone.offset_ms_at(at - 1), 0);
        assert_eq!(zone.offset_ms_at(at), HOUR_LENGTH_MS);
    }

    #[test]
    fn transitions_are_kept_sorted() {
        let zone = TransitionZone::new("t", hours(0))
            .with_transition(DateTime::from_timestamp(7200, 0).unwrap(), hours(2))
            .with_transition(DateTime::from_timestamp(3600, 0).unwrap(), hours(1));
        let instants: Vec<i64> = zone.transitions().iter().map(|t| t.at_ms).collect();
        assert_eq!(instants, vec![3_600_000, 7_200_000]);
    }

    #[test]
    fn gap_maps_to_transition_instant_in_lenient_mode() {
        let zone = spring_forward_zone();
        let at = 1000 * HOUR_LENGTH_MS;
        // wall clock at the transition reads `at` in the old offset (+0)
        let in_gap = at + 30 * 60 * 1000;
        assert_eq!(apply_timezone(&zone, in_gap, ConversionMode::Lenient).unwrap(), at);
        assert!(matches!(
            apply_timezone(&zone, in_gap, ConversionMode::Strict),
            Err(CoreError::AmbiguousTimeConversion { .. })
        ));
    }

    #[test]
    fn zone_ids() {
        assert_eq!(Zone::Utc.id(), "UTC");
        assert_eq!(Zone::Fixed(hours(10)).id(), "+10:00");
        assert_eq!(Zone::Table(spring_forward_zone()).id(), "test/spring");
    }
}
