//! Merge import: reconciles externally supplied habits into a live engine.
//!
//! Incoming records are matched by UUID. A command is issued only where the
//! incoming data differs from what the engine holds, so importing the same
//! snapshot twice is a no-op the second time.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::commands::{Command, CommandEngine};
use crate::error::Result;
use crate::models::{Habit, HabitData, Repetition};

/// A habit as read from an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitSnapshot {
    pub id: Uuid,
    pub data: HabitData,
    #[serde(default)]
    pub repetitions: Vec<Repetition>,
}

impl From<&Habit> for HabitSnapshot {
    fn from(habit: &Habit) -> Self {
        Self {
            id: habit.id(),
            data: habit.data().clone(),
            repetitions: habit.repetitions().iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: usize,
    pub edited: usize,
    pub repetitions_written: usize,
    pub unchanged: usize,
}

/// Issue the commands needed to bring `engine` in line with `incoming`.
///
/// Habits that exist only in the engine are left alone. Stops at the first
/// failing command; commands already executed stay applied.
pub fn merge_habits(engine: &CommandEngine, incoming: &[HabitSnapshot]) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for snapshot in incoming {
        let current = engine.habit(snapshot.id)?;
        let mut changed = false;

        match &current {
            None => {
                engine.execute(
                    Command::CreateHabit {
                        habit: snapshot.id,
                        data: snapshot.data.clone(),
                    },
                    Some(snapshot.id),
                )?;
                summary.created += 1;
                changed = true;
            }
            Some(habit) if habit.data() != &snapshot.data => {
                engine.execute(
                    Command::EditHabit {
                        habit: snapshot.id,
                        data: snapshot.data.clone(),
                    },
                    Some(snapshot.id),
                )?;
                summary.edited += 1;
                changed = true;
            }
            Some(_) => {}
        }

        for rep in &snapshot.repetitions {
            let existing = current
                .as_ref()
                .and_then(|habit| habit.repetitions().get(rep.timestamp));
            if existing == Some(rep.value) {
                continue;
            }
            engine.execute(
                Command::CreateRepetition {
                    habit: snapshot.id,
                    timestamp: rep.timestamp,
                    value: rep.value,
                },
                Some(snapshot.id),
            )?;
            summary.repetitions_written += 1;
            changed = true;
        }

        if !changed {
            summary.unchanged += 1;
        }
    }

    info!(
        created = summary.created,
        edited = summary.edited,
        repetitions = summary.repetitions_written,
        unchanged = summary.unchanged,
        "merge import finished"
    );
    Ok(summary)
}
