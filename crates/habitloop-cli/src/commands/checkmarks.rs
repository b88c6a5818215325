use chrono::NaiveDate;
use clap::Args;
use habitloop_core::checkmarks::{best_streaks, compute_streaks};
use habitloop_core::{
    CheckmarkState, Command, CommandEngine, Config, Frequency, HabitData, HabitKind, Repetition,
    Timestamp,
};
use uuid::Uuid;

use super::policy;

#[derive(Args)]
pub struct CheckmarksArgs {
    /// K/N: K completions required in every N days
    #[arg(long, default_value = "1/1")]
    frequency: Frequency,
    /// boolean, threshold:VALUE (per day) or total:VALUE (per window)
    #[arg(long, default_value = "boolean", value_parser = parse_kind)]
    kind: HabitKind,
    /// Recorded day, optionally with a value: 2024-03-01 or 2024-03-01=2.5
    #[arg(long = "entry", value_parser = parse_entry)]
    entries: Vec<Entry>,
    /// First day to show (defaults to the configured history length before --to)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day to show (defaults to today)
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Also print the longest streaks
    #[arg(long)]
    streaks: bool,
    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone)]
struct Entry {
    date: NaiveDate,
    value: Option<f64>,
}

fn to_fixed_point(value: f64) -> i64 {
    (value * Repetition::SCALE as f64).round() as i64
}

fn from_fixed_point(value: i64) -> f64 {
    value as f64 / Repetition::SCALE as f64
}

fn parse_kind(s: &str) -> Result<HabitKind, String> {
    let amount = |v: &str| {
        v.parse::<f64>()
            .map(to_fixed_point)
            .map_err(|_| format!("invalid amount '{v}'"))
    };
    match s.split_once(':') {
        None if s == "boolean" => Ok(HabitKind::Boolean),
        Some(("threshold", v)) => Ok(HabitKind::DailyThreshold { threshold: amount(v)? }),
        Some(("total", v)) => Ok(HabitKind::WindowTotal { target: amount(v)? }),
        _ => Err(format!("invalid kind '{s}': expected boolean, threshold:V or total:V")),
    }
}

fn parse_entry(s: &str) -> Result<Entry, String> {
    let (date, value) = match s.split_once('=') {
        Some((date, value)) => (date, Some(value)),
        None => (s, None),
    };
    let date = date
        .parse::<NaiveDate>()
        .map_err(|e| format!("invalid date '{date}': {e}"))?;
    let value = value
        .map(|v| v.parse::<f64>().map_err(|_| format!("invalid value '{v}'")))
        .transpose()?;
    Ok(Entry { date, value })
}

fn label(state: CheckmarkState) -> &'static str {
    match state {
        CheckmarkState::Completed => "completed",
        CheckmarkState::PartiallyCompleted => "partial",
        CheckmarkState::Skipped => "skipped",
        CheckmarkState::Uncompleted => "missed",
    }
}

pub fn run(args: CheckmarksArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let to = match args.to {
        Some(date) => Timestamp::from_date(date),
        None => policy(&config, None).today(),
    };
    let from = match args.from {
        Some(date) => Timestamp::from_date(date),
        None => to.minus(config.history.default_days as i64 - 1),
    };

    let engine = CommandEngine::default();
    let habit = Uuid::new_v4();
    let data = HabitData::new("cli", args.frequency).with_kind(args.kind);
    engine.execute(Command::CreateHabit { habit, data }, Some(habit))?;

    for entry in &args.entries {
        let value = match (entry.value, args.kind.is_numerical()) {
            (Some(v), true) => to_fixed_point(v),
            (None, true) => Repetition::SCALE,
            (Some(v), false) if v == 0.0 => Repetition::NO,
            (_, false) => Repetition::YES_MANUAL,
        };
        engine.execute(
            Command::CreateRepetition {
                habit,
                timestamp: Timestamp::from_date(entry.date),
                value,
            },
            Some(habit),
        )?;
    }

    let marks = engine.checkmarks(habit, from, to)?;
    let numerical = args.kind.is_numerical();
    let shown = |value: i64| if numerical { from_fixed_point(value) } else { value as f64 };
    let streaks = if args.streaks {
        best_streaks(&compute_streaks(&marks), 5)
    } else {
        Vec::new()
    };

    if args.json {
        let days: Vec<_> = marks
            .iter()
            .map(|m| {
                serde_json::json!({
                    "date": m.timestamp.to_string(),
                    "state": m.state,
                    "value": shown(m.value),
                })
            })
            .collect();
        let mut out = serde_json::json!({ "frequency": args.frequency.to_string(), "days": days });
        if args.streaks {
            out["streaks"] = serde_json::json!(streaks
                .iter()
                .map(|s| serde_json::json!({
                    "start": s.start.to_string(),
                    "end": s.end.to_string(),
                    "length": s.length(),
                }))
                .collect::<Vec<_>>());
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for mark in &marks {
        if numerical {
            println!("{}  {:<9}  {}", mark.timestamp, label(mark.state), shown(mark.value));
        } else {
            println!("{}  {}", mark.timestamp, label(mark.state));
        }
    }
    for streak in &streaks {
        println!("streak {} .. {} ({} days)", streak.start, streak.end, streak.length());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing() {
        assert_eq!(parse_kind("boolean").unwrap(), HabitKind::Boolean);
        assert_eq!(
            parse_kind("threshold:2.5").unwrap(),
            HabitKind::DailyThreshold { threshold: 2500 }
        );
        assert_eq!(parse_kind("total:20").unwrap(), HabitKind::WindowTotal { target: 20_000 });
        assert!(parse_kind("total:lots").is_err());
        assert!(parse_kind("weekly").is_err());
    }

    #[test]
    fn entry_parsing() {
        let entry = parse_entry("2024-03-01=1.25").unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(entry.value, Some(1.25));
        assert_eq!(parse_entry("2024-03-02").unwrap().value, None);
        assert!(parse_entry("yesterday").is_err());
    }
}
