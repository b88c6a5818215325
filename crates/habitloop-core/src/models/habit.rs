use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::frequency::Frequency;
use super::repetition::RepetitionLog;
use crate::error::{CoreError, Result};

/// How recorded values are measured against the frequency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HabitKind {
    /// Any positive value marks the day as done.
    #[default]
    Boolean,
    /// A day counts once its own value reaches `threshold` (fixed-point).
    DailyThreshold { threshold: i64 },
    /// Values inside each window are summed toward `target` per required
    /// occurrence (fixed-point).
    WindowTotal { target: i64 },
}

impl HabitKind {
    pub fn is_numerical(&self) -> bool {
        !matches!(self, HabitKind::Boolean)
    }

    /// Whether a single day's value satisfies the habit on its own.
    pub fn is_satisfied(&self, value: i64) -> bool {
        match self {
            HabitKind::Boolean | HabitKind::WindowTotal { .. } => value > 0,
            HabitKind::DailyThreshold { threshold } => value > 0 && value >= *threshold,
        }
    }
}

/// Editable attributes of a habit. Two habits with equal data render
/// identically, which is what the merge import compares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub question: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub kind: HabitKind,
    #[serde(default)]
    pub unit: String,
    /// Palette index.
    #[serde(default)]
    pub color: u8,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub favourite: bool,
    #[serde(default)]
    pub archived: bool,
}

impl HabitData {
    pub fn new(name: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            question: String::new(),
            frequency,
            kind: HabitKind::Boolean,
            unit: String::new(),
            color: 8,
            position: 0,
            favourite: false,
            archived: false,
        }
    }

    pub fn with_kind(mut self, kind: HabitKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    id: Uuid,
    data: HabitData,
    #[serde(default)]
    repetitions: RepetitionLog,
}

impl Habit {
    pub fn new(data: HabitData) -> Self {
        Self::with_id(Uuid::new_v4(), data)
    }

    pub fn with_id(id: Uuid, data: HabitData) -> Self {
        Self {
            id,
            data,
            repetitions: RepetitionLog::new(),
        }
    }

    pub fn with_repetitions(mut self, repetitions: RepetitionLog) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn data(&self) -> &HabitData {
        &self.data
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn frequency(&self) -> Frequency {
        self.data.frequency
    }

    pub fn kind(&self) -> HabitKind {
        self.data.kind
    }

    pub fn is_favourite(&self) -> bool {
        self.data.favourite
    }

    pub fn is_archived(&self) -> bool {
        self.data.archived
    }

    pub fn repetitions(&self) -> &RepetitionLog {
        &self.repetitions
    }

    pub(crate) fn data_mut(&mut self) -> &mut HabitData {
        &mut self.data
    }

    pub(crate) fn repetitions_mut(&mut self) -> &mut RepetitionLog {
        &mut self.repetitions
    }
}

/// The set of habits, keyed by UUID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitList {
    habits: BTreeMap<Uuid, Habit>,
}

impl HabitList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.habits.contains_key(&id)
    }

    pub fn get(&self, id: Uuid) -> Option<&Habit> {
        self.habits.get(&id)
    }

    /// Habits ordered by position, then name.
    pub fn ordered(&self) -> Vec<&Habit> {
        let mut habits: Vec<&Habit> = self.habits.values().collect();
        habits.sort_by(|a, b| {
            a.data.position
                .cmp(&b.data.position)
                .then_with(|| a.data.name.cmp(&b.data.name))
        });
        habits
    }

    pub fn iter(&self) -> impl Iterator<Item = &Habit> {
        self.habits.values()
    }

    /// Fails with `UnknownHabit` on the first id that is not present.
    pub fn require_all(&self, ids: &[Uuid]) -> Result<()> {
        match ids.iter().find(|id| !self.habits.contains_key(id)) {
            Some(missing) => Err(CoreError::UnknownHabit(*missing)),
            None => Ok(()),
        }
    }

    pub(crate) fn get_mut(&mut self, id: Uuid) -> Result<&mut Habit> {
        self.habits.get_mut(&id).ok_or(CoreError::UnknownHabit(id))
    }

    pub(crate) fn insert(&mut self, habit: Habit) -> Result<()> {
        if self.habits.contains_key(&habit.id) {
            return Err(CoreError::DuplicateHabit(habit.id));
        }
        self.habits.insert(habit.id, habit);
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: Uuid) -> Option<Habit> {
        self.habits.remove(&id)
    }
}

impl FromIterator<Habit> for HabitList {
    fn from_iter<I: IntoIterator<Item = Habit>>(iter: I) -> Self {
        Self {
            habits: iter.into_iter().map(|h| (h.id, h)).collect(),
        }
    }
}
