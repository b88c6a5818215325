//! Day model: timestamps, clock policy and device zones.

pub mod clock;
pub mod timestamp;
pub mod zone;

pub use clock::{
    timestamp_with_offset, truncate, ClockPolicy, ClockSettings, ClockSource, ConversionMode,
    DayStartOffset, FixedClock, SystemClock, TruncateField,
};
pub use timestamp::{Timestamp, DAY_LENGTH_MS, HOUR_LENGTH_MS, MINUTE_LENGTH_MS};
pub use zone::{apply_timezone, remove_timezone, Transition, TransitionZone, Zone, ZoneRules};
