//! Core error types for habitloop-core.
//!
//! Configuration problems (`InvalidFrequency`, `InvalidOffset`) are raised when
//! values are constructed, never in the middle of a computation. Command
//! failures are raised before any state is touched.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Core error type for habitloop-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Frequency with a zero denominator
    #[error("Invalid frequency {numerator}/{denominator}: denominator must be positive")]
    InvalidFrequency { numerator: u32, denominator: u32 },

    /// Malformed day-start offset
    #[error("Invalid day start offset {hour:02}:{minute:02}: hour must be 0-23 and minute 0-59")]
    InvalidOffset { hour: u32, minute: u32 },

    /// A command referenced a habit that does not exist
    #[error("Unknown habit: {0}")]
    UnknownHabit(Uuid),

    /// A habit with the same UUID is already present
    #[error("Habit already exists: {0}")]
    DuplicateHabit(Uuid),

    /// Nominal instant falls in a skipped or repeated wall-clock interval
    #[error("Ambiguous time conversion: nominal instant {nominal_ms} has no unique actual instant")]
    AmbiguousTimeConversion { nominal_ms: i64 },

    /// Range whose start is after its end
    #[error("Invalid range: start day {start} is after end day {end}")]
    InvalidRange { start: i64, end: i64 },

    /// A thread panicked while holding shared engine state
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
