//! Habit data model.

pub mod frequency;
pub mod habit;
pub mod repetition;

pub use frequency::Frequency;
pub use habit::{Habit, HabitData, HabitKind, HabitList};
pub use repetition::{Repetition, RepetitionLog};
