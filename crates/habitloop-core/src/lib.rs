//! # Habitloop Core Library
//!
//! This library provides the scheduling engine behind the Habitloop habit
//! tracker. It follows a CLI-first philosophy: every operation is available
//! through the standalone `habitloop` binary, with any GUI being a thin
//! layer over the same core library.
//!
//! ## Architecture
//!
//! - **Time**: Day model that stays stable across daylight-saving changes and
//!   honours a configurable day-start offset
//! - **Checkmarks**: Per-day derivation of completed/skipped/missed status from
//!   a frequency and a sparse repetition log
//! - **Commands**: Serialized mutations of the habit list with synchronous
//!   listener notification
//! - **Storage**: TOML-based configuration and a read-only repository seam
//!
//! ## Key Components
//!
//! - [`ClockPolicy`]: Converts device instants to [`Timestamp`]s
//! - [`CheckmarkEngine`]: Computes checkmarks over a day range
//! - [`CommandEngine`]: Executes [`Command`]s and notifies listeners
//! - [`Config`]: Application configuration management

pub mod checkmarks;
pub mod commands;
pub mod error;
pub mod import;
pub mod models;
pub mod storage;
pub mod time;

pub use checkmarks::{Checkmark, CheckmarkEngine, CheckmarkState, Streak};
pub use commands::{Command, CommandEngine, CommandListener, ListenerId};
pub use error::{ConfigError, CoreError};
pub use import::{merge_habits, HabitSnapshot, ImportSummary};
pub use models::{Frequency, Habit, HabitData, HabitKind, HabitList, Repetition, RepetitionLog};
pub use storage::{ClockConfig, Config, HabitRepository};
pub use time::{ClockPolicy, ClockSettings, ClockSource, ConversionMode, DayStartOffset, Timestamp, Zone};
