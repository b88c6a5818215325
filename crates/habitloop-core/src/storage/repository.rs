//! Read access to persisted habits.
//!
//! The engine only needs to enumerate habits, look one up by UUID and read
//! a range of its repetitions. Persistence itself is left to whoever
//! implements the trait (typically a command listener that writes through).

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Habit, HabitList, Repetition};
use crate::time::Timestamp;

pub trait HabitRepository {
    fn habits(&self) -> Result<Vec<Habit>>;

    fn habit_by_uuid(&self, id: Uuid) -> Result<Option<Habit>>;

    /// Repetitions of one habit in `[start, end]`, oldest first. Unknown
    /// habits have no repetitions.
    fn repetitions_in_range(&self, id: Uuid, start: Timestamp, end: Timestamp) -> Result<Vec<Repetition>>;
}

impl HabitRepository for HabitList {
    fn habits(&self) -> Result<Vec<Habit>> {
        Ok(self.iter().cloned().collect())
    }

    fn habit_by_uuid(&self, id: Uuid) -> Result<Option<Habit>> {
        Ok(self.get(id).cloned())
    }

    fn repetitions_in_range(&self, id: Uuid, start: Timestamp, end: Timestamp) -> Result<Vec<Repetition>> {
        Ok(self
            .get(id)
            .map(|habit| habit.repetitions().range(start, end).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, HabitData, RepetitionLog};

    #[test]
    fn habit_list_serves_as_repository() {
        let reps: RepetitionLog = (0..10)
            .map(|d| Repetition::new(Timestamp::from_days(d), Repetition::YES_MANUAL))
            .collect();
        let habit = Habit::new(HabitData::new("Floss", Frequency::DAILY)).with_repetitions(reps);
        let id = habit.id();
        let list: HabitList = vec![habit].into_iter().collect();

        assert_eq!(list.habits().unwrap().len(), 1);
        assert_eq!(list.habit_by_uuid(id).unwrap().unwrap().name(), "Floss");
        assert!(list.habit_by_uuid(Uuid::new_v4()).unwrap().is_none());

        let range = list
            .repetitions_in_range(id, Timestamp::from_days(3), Timestamp::from_days(5))
            .unwrap();
        assert_eq!(range.len(), 3);
        assert_eq!(range[0].timestamp, Timestamp::from_days(3));
        assert!(list
            .repetitions_in_range(Uuid::new_v4(), Timestamp::EPOCH, Timestamp::from_days(9))
            .unwrap()
            .is_empty());
    }
}
