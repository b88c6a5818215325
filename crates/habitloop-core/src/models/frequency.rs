use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// `numerator` occurrences required within every trailing window of
/// `denominator` days.
///
/// Equality is structural: `3/7` and `6/14` describe different windows. Use
/// [`Frequency::compare_rate`] to compare rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFrequency")]
pub struct Frequency {
    numerator: u32,
    denominator: u32,
}

#[derive(Deserialize)]
struct RawFrequency {
    numerator: u32,
    denominator: u32,
}

impl TryFrom<RawFrequency> for Frequency {
    type Error = CoreError;

    fn try_from(raw: RawFrequency) -> Result<Self> {
        Self::new(raw.numerator, raw.denominator)
    }
}

impl Frequency {
    pub const DAILY: Frequency = Frequency { numerator: 1, denominator: 1 };
    pub const WEEKLY: Frequency = Frequency { numerator: 1, denominator: 7 };
    pub const TWO_TIMES_PER_WEEK: Frequency = Frequency { numerator: 2, denominator: 7 };
    pub const THREE_TIMES_PER_WEEK: Frequency = Frequency { numerator: 3, denominator: 7 };

    /// # Errors
    ///
    /// Returns `InvalidFrequency` when `denominator` is zero.
    pub fn new(numerator: u32, denominator: u32) -> Result<Self> {
        if denominator == 0 {
            return Err(CoreError::InvalidFrequency { numerator, denominator });
        }
        Ok(Self { numerator, denominator })
    }

    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Window length in days.
    pub fn window(&self) -> i64 {
        self.denominator as i64
    }

    pub fn is_daily(&self) -> bool {
        self.denominator == 1
    }

    /// Compares occurrence rates exactly, by cross-multiplication.
    pub fn compare_rate(&self, other: &Frequency) -> Ordering {
        let lhs = self.numerator as u64 * other.denominator as u64;
        let rhs = other.numerator as u64 * self.denominator as u64;
        lhs.cmp(&rhs)
    }

    pub fn same_rate(&self, other: &Frequency) -> bool {
        self.compare_rate(other) == Ordering::Equal
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::DAILY
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for Frequency {
    type Err = String;

    /// Parses `"K/N"`; a bare `"K"` means `K/1`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid frequency '{s}': expected K/N"))
        };
        let (num, den) = match s.split_once('/') {
            Some((num, den)) => (parse(num)?, parse(den)?),
            None => (parse(s)?, 1),
        };
        Self::new(num, den).map_err(|e| e.to_string())
    }
}
