//! Mutations of the habit list, as value objects.
//!
//! A command is validated in full before it touches the list, so a failed
//! command leaves no trace. Commands are executed through
//! [`CommandEngine`](engine::CommandEngine), which serializes them and
//! notifies listeners.

pub mod engine;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::models::{Habit, HabitData, HabitList};
use crate::time::Timestamp;

pub use engine::{CommandEngine, CommandListener, ListenerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    CreateHabit {
        habit: Uuid,
        data: HabitData,
    },
    EditHabit {
        habit: Uuid,
        data: HabitData,
    },
    DeleteHabits {
        habits: Vec<Uuid>,
    },
    /// Record `value` on `timestamp`, replacing whatever was there.
    CreateRepetition {
        habit: Uuid,
        timestamp: Timestamp,
        value: i64,
    },
    SetFavourite {
        habits: Vec<Uuid>,
        favourite: bool,
    },
    SetArchived {
        habits: Vec<Uuid>,
        archived: bool,
    },
}

impl Command {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::CreateHabit { .. } => "create_habit",
            Command::EditHabit { .. } => "edit_habit",
            Command::DeleteHabits { .. } => "delete_habits",
            Command::CreateRepetition { .. } => "create_repetition",
            Command::SetFavourite { .. } => "set_favourite",
            Command::SetArchived { .. } => "set_archived",
        }
    }

    /// The habit a single-habit command affects; `None` for bulk commands.
    pub fn default_ref_id(&self) -> Option<Uuid> {
        match self {
            Command::CreateHabit { habit, .. }
            | Command::EditHabit { habit, .. }
            | Command::CreateRepetition { habit, .. } => Some(*habit),
            Command::DeleteHabits { .. }
            | Command::SetFavourite { .. }
            | Command::SetArchived { .. } => None,
        }
    }

    /// Apply to `list`. Every referenced habit is checked first; on error the
    /// list is unchanged.
    pub(crate) fn execute(&self, list: &mut HabitList) -> Result<()> {
        match self {
            Command::CreateHabit { habit, data } => {
                if list.contains(*habit) {
                    return Err(CoreError::DuplicateHabit(*habit));
                }
                list.insert(Habit::with_id(*habit, data.clone()))
            }
            Command::EditHabit { habit, data } => {
                *list.get_mut(*habit)?.data_mut() = data.clone();
                Ok(())
            }
            Command::DeleteHabits { habits } => {
                list.require_all(habits)?;
                for id in habits {
                    list.remove(*id);
                }
                Ok(())
            }
            Command::CreateRepetition {
                habit,
                timestamp,
                value,
            } => {
                list.get_mut(*habit)?
                    .repetitions_mut()
                    .insert(*timestamp, *value);
                Ok(())
            }
            Command::SetFavourite { habits, favourite } => {
                list.require_all(habits)?;
                for id in habits {
                    list.get_mut(*id)?.data_mut().favourite = *favourite;
                }
                Ok(())
            }
            Command::SetArchived { habits, archived } => {
                list.require_all(habits)?;
                for id in habits {
                    list.get_mut(*id)?.data_mut().archived = *archived;
                }
                Ok(())
            }
        }
    }
}
