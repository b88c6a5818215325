use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::Subcommand;
use habitloop_core::time::{TruncateField, Zone};
use habitloop_core::{Config, Timestamp};

use super::{parse_zone, policy};

#[derive(Subcommand)]
pub enum ClockAction {
    /// Current day, honouring the configured day start
    Today {
        /// Zone to evaluate in: local, utc or +HH:MM
        #[arg(long, value_parser = parse_zone)]
        zone: Option<Zone>,
    },
    /// Day that contains an RFC 3339 instant
    Day {
        /// e.g. 2024-03-10T01:30:00+01:00
        instant: DateTime<FixedOffset>,
        /// Zone to evaluate in: local, utc or +HH:MM
        #[arg(long, value_parser = parse_zone)]
        zone: Option<Zone>,
    },
    /// First day of the week/month/quarter/year containing a date
    Truncate {
        /// week, month, quarter or year
        field: TruncateField,
        /// YYYY-MM-DD
        date: NaiveDate,
    },
    /// Milliseconds until the next day starts
    UntilTomorrow {
        #[arg(long, value_parser = parse_zone)]
        zone: Option<Zone>,
    },
}

pub fn run(action: ClockAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        ClockAction::Today { zone } => {
            println!("{}", policy(&config, zone).today());
        }
        ClockAction::Day { instant, zone } => {
            let day = policy(&config, zone).to_timestamp(instant.timestamp_millis());
            println!("{day}");
        }
        ClockAction::Truncate { field, date } => {
            let truncated = policy(&config, None).truncate_timestamp(field, Timestamp::from_date(date));
            println!("{truncated}");
        }
        ClockAction::UntilTomorrow { zone } => {
            println!("{}", policy(&config, zone).millis_until_tomorrow());
        }
    }
    Ok(())
}
