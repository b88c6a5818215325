use std::collections::BTreeMap;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// One recorded event for a habit on one day.
///
/// `value` is fixed-point: `value / 1000` is the real magnitude for numerical
/// habits. Boolean habits conventionally use [`Repetition::NO`] and
/// [`Repetition::YES_MANUAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repetition {
    pub timestamp: Timestamp,
    pub value: i64,
}

impl Repetition {
    pub const NO: i64 = 0;
    pub const YES_AUTO: i64 = 1;
    pub const YES_MANUAL: i64 = 2;
    /// Fixed-point scale of numerical values.
    pub const SCALE: i64 = 1000;

    pub fn new(timestamp: Timestamp, value: i64) -> Self {
        Self { timestamp, value }
    }
}

/// Recorded values of one habit, keyed by day. At most one value per day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Repetition>", into = "Vec<Repetition>")]
pub struct RepetitionLog {
    entries: BTreeMap<Timestamp, i64>,
}

impl RepetitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, timestamp: Timestamp) -> Option<i64> {
        self.entries.get(&timestamp).copied()
    }

    /// Value on `timestamp`, or zero when nothing was recorded.
    pub fn value_at(&self, timestamp: Timestamp) -> i64 {
        self.get(timestamp).unwrap_or(Repetition::NO)
    }

    /// Record `value`, replacing any existing value on that day. Returns the
    /// replaced value.
    pub(crate) fn insert(&mut self, timestamp: Timestamp, value: i64) -> Option<i64> {
        self.entries.insert(timestamp, value)
    }

    /// Entries in `[start, end]`, oldest first.
    pub fn range(&self, start: Timestamp, end: Timestamp) -> impl Iterator<Item = Repetition> + '_ {
        let upper = if start <= end { Bound::Included(end) } else { Bound::Excluded(start) };
        self.entries
            .range((Bound::Included(start), upper))
            .map(|(&timestamp, &value)| Repetition { timestamp, value })
    }

    pub fn iter(&self) -> impl Iterator<Item = Repetition> + '_ {
        self.entries
            .iter()
            .map(|(&timestamp, &value)| Repetition { timestamp, value })
    }

    pub fn oldest(&self) -> Option<Repetition> {
        self.iter().next()
    }

    pub fn newest(&self) -> Option<Repetition> {
        self.entries
            .iter()
            .next_back()
            .map(|(&timestamp, &value)| Repetition { timestamp, value })
    }
}

impl From<Vec<Repetition>> for RepetitionLog {
    fn from(reps: Vec<Repetition>) -> Self {
        reps.into_iter().collect()
    }
}

impl From<RepetitionLog> for Vec<Repetition> {
    fn from(log: RepetitionLog) -> Self {
        log.iter().collect()
    }
}

impl FromIterator<Repetition> for RepetitionLog {
    fn from_iter<I: IntoIterator<Item = Repetition>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|r| (r.timestamp, r.value)).collect(),
        }
    }
}
