pub mod checkmarks;
pub mod clock;
pub mod config;

use std::sync::Arc;

use habitloop_core::time::{ClockPolicy, ClockSource, FixedClock, SystemClock, Zone};
use habitloop_core::Config;

/// Clock policy from the saved configuration, optionally pinned to a zone
/// other than the system one.
pub fn policy(config: &Config, zone: Option<Zone>) -> ClockPolicy {
    let clock: Arc<dyn ClockSource> = match zone {
        Some(zone) => Arc::new(FixedClock::new(chrono::Utc::now(), zone)),
        None => Arc::new(SystemClock),
    };
    ClockPolicy::new(Arc::new(config.clock.clone()), clock)
}

/// Parses `local`, `utc` or a fixed offset such as `+10:00`.
pub fn parse_zone(s: &str) -> Result<Zone, String> {
    match s.to_ascii_lowercase().as_str() {
        "local" => Ok(Zone::Local),
        "utc" | "z" => Ok(Zone::Utc),
        _ => s
            .parse::<chrono::FixedOffset>()
            .map(Zone::Fixed)
            .map_err(|_| format!("invalid zone '{s}': expected local, utc or +HH:MM")),
    }
}
