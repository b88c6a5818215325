//! Checkmark derivation.
//!
//! For every day in a range, decides whether the habit was done, partially
//! done, not due, or missed. The range is scanned once, oldest first, with a
//! sliding window over the `N - 1` days preceding the day being classified
//! (`N` = frequency denominator). Days before the requested range are read
//! from the log to prime the window; anything not recorded counts as zero.
//!
//! The engine keeps no cache. Callers that need incremental updates re-run
//! it over the invalidated suffix only.

pub mod streaks;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::{Frequency, Habit, HabitKind, Repetition, RepetitionLog};
use crate::time::Timestamp;

pub use streaks::{best_streaks, compute_streaks, Streak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckmarkState {
    Completed,
    /// Numerical habit with progress toward a window total that is not yet met.
    PartiallyCompleted,
    /// Not due: the quota for the current window is already met.
    Skipped,
    /// Due and not satisfied.
    Uncompleted,
}

/// Derived status of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkmark {
    pub timestamp: Timestamp,
    pub state: CheckmarkState,
    /// The day's recorded value, or the running window total for
    /// [`HabitKind::WindowTotal`] habits.
    pub value: i64,
}

/// Tally of the days preceding the day being classified. The total is kept
/// wide so adding and evicting stay exact for any window length.
#[derive(Debug, Default)]
struct Window {
    satisfied: u32,
    total: i128,
}

impl Window {
    fn add(&mut self, kind: HabitKind, value: i64) {
        self.satisfied += kind.is_satisfied(value) as u32;
        self.total += i128::from(value.max(0));
    }

    fn evict(&mut self, kind: HabitKind, value: i64) {
        self.satisfied -= kind.is_satisfied(value) as u32;
        self.total -= i128::from(value.max(0));
    }

    fn quota_met(&self, frequency: Frequency, kind: HabitKind) -> bool {
        match kind {
            HabitKind::WindowTotal { target } => self.total >= window_goal(target, frequency),
            HabitKind::Boolean | HabitKind::DailyThreshold { .. } => {
                self.satisfied >= frequency.numerator()
            }
        }
    }
}

fn window_goal(target: i64, frequency: Frequency) -> i128 {
    i128::from(target) * i128::from(frequency.numerator())
}

fn classify(frequency: Frequency, kind: HabitKind, prior: &Window, value: i64) -> (CheckmarkState, i64) {
    match kind {
        HabitKind::WindowTotal { target } => {
            let total = prior.total + i128::from(value.max(0));
            let state = if value > 0 && total >= window_goal(target, frequency) {
                CheckmarkState::Completed
            } else if value > 0 {
                CheckmarkState::PartiallyCompleted
            } else if prior.quota_met(frequency, kind) {
                CheckmarkState::Skipped
            } else {
                CheckmarkState::Uncompleted
            };
            (state, i64::try_from(total).unwrap_or(i64::MAX))
        }
        HabitKind::Boolean | HabitKind::DailyThreshold { .. } => {
            let state = if kind.is_satisfied(value) {
                CheckmarkState::Completed
            } else if value == Repetition::NO && prior.quota_met(frequency, kind) {
                CheckmarkState::Skipped
            } else {
                CheckmarkState::Uncompleted
            };
            (state, value)
        }
    }
}

/// Whether `timestamp` still needs a completion: the days before it inside
/// its window have not met the quota yet. With a one-day window every day is
/// due.
pub fn is_due(frequency: Frequency, kind: HabitKind, timestamp: Timestamp, log: &RepetitionLog) -> bool {
    let mut prior = Window::default();
    let from = timestamp.minus(frequency.window() - 1);
    for rep in log.range(from, timestamp.minus(1)) {
        prior.add(kind, rep.value);
    }
    !prior.quota_met(frequency, kind)
}

/// Stateless checkmark calculator.
pub struct CheckmarkEngine;

impl CheckmarkEngine {
    /// One checkmark per day in `[start, end]`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` if `start` is after `end`.
    pub fn compute(habit: &Habit, start: Timestamp, end: Timestamp) -> Result<Vec<Checkmark>> {
        Self::compute_for(habit.frequency(), habit.kind(), habit.repetitions(), start, end)
    }

    pub fn compute_for(
        frequency: Frequency,
        kind: HabitKind,
        log: &RepetitionLog,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Checkmark>> {
        if start > end {
            return Err(CoreError::InvalidRange {
                start: start.days(),
                end: end.days(),
            });
        }

        let lookback = frequency.window() - 1;
        let mut prior = Window::default();
        for rep in log.range(start.minus(lookback), start.minus(1)) {
            prior.add(kind, rep.value);
        }

        let mut checkmarks = Vec::with_capacity(start.days_until(end) as usize + 1);
        let mut timestamp = start;
        while timestamp <= end {
            let value = log.value_at(timestamp);
            let (state, shown) = classify(frequency, kind, &prior, value);
            checkmarks.push(Checkmark {
                timestamp,
                state,
                value: shown,
            });
            if lookback > 0 {
                prior.add(kind, value);
                prior.evict(kind, log.value_at(timestamp.minus(lookback)));
            }
            timestamp = timestamp.plus(1);
        }
        Ok(checkmarks)
    }

    pub fn is_due(habit: &Habit, timestamp: Timestamp) -> bool {
        is_due(habit.frequency(), habit.kind(), timestamp, habit.repetitions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HabitData;
    use crate::checkmarks::CheckmarkState::*;

    fn day(n: i64) -> Timestamp {
        Timestamp::from_days(n)
    }

    fn log(entries: &[(i64, i64)]) -> RepetitionLog {
        entries
            .iter()
            .map(|&(d, v)| Repetition::new(day(d), v))
            .collect()
    }

    fn states(checkmarks: &[Checkmark]) -> Vec<CheckmarkState> {
        checkmarks.iter().map(|c| c.state).collect()
    }

    fn compute(freq: Frequency, kind: HabitKind, log: &RepetitionLog, start: i64, end: i64) -> Vec<Checkmark> {
        CheckmarkEngine::compute_for(freq, kind, log, day(start), day(end)).unwrap()
    }

    #[test]
    fn daily_habit_marks_each_day_on_its_own() {
        let yes = Repetition::YES_MANUAL;
        let log = log(&[(0, yes), (1, yes), (3, yes)]);
        let result = compute(Frequency::DAILY, HabitKind::Boolean, &log, 0, 4);
        assert_eq!(
            states(&result),
            vec![Completed, Completed, Uncompleted, Completed, Uncompleted]
        );
        assert_eq!(result[0].timestamp, day(0));
        assert_eq!(result[4].timestamp, day(4));
    }

    #[test]
    fn quota_met_skips_rest_of_window() {
        let yes = Repetition::YES_MANUAL;
        let log = log(&[(0, yes), (1, yes), (2, yes)]);
        let result = compute(Frequency::THREE_TIMES_PER_WEEK, HabitKind::Boolean, &log, 0, 6);
        assert_eq!(
            states(&result),
            vec![Completed, Completed, Completed, Skipped, Skipped, Skipped, Skipped]
        );
    }

    #[test]
    fn window_reopens_when_old_completions_leave_it() {
        let yes = Repetition::YES_MANUAL;
        let log = log(&[(0, yes), (1, yes), (2, yes)]);
        let result = compute(Frequency::THREE_TIMES_PER_WEEK, HabitKind::Boolean, &log, 6, 8);
        assert_eq!(states(&result), vec![Skipped, Uncompleted, Uncompleted]);
    }

    #[test]
    fn look_back_reads_before_range_start() {
        let yes = Repetition::YES_MANUAL;
        let log = log(&[(-3, yes)]);
        let result = compute(Frequency::WEEKLY, HabitKind::Boolean, &log, 0, 4);
        assert_eq!(
            states(&result),
            vec![Skipped, Skipped, Skipped, Skipped, Uncompleted]
        );
    }

    #[test]
    fn missing_history_counts_as_not_satisfied() {
        let result = compute(Frequency::TWO_TIMES_PER_WEEK, HabitKind::Boolean, &RepetitionLog::new(), 0, 2);
        assert_eq!(states(&result), vec![Uncompleted; 3]);
    }

    #[test]
    fn zero_quota_is_never_due() {
        let freq = Frequency::new(0, 7).unwrap();
        let result = compute(freq, HabitKind::Boolean, &RepetitionLog::new(), 0, 2);
        assert_eq!(states(&result), vec![Skipped; 3]);
    }

    #[test]
    fn daily_threshold_keeps_partial_value() {
        let kind = HabitKind::DailyThreshold { threshold: 2000 };
        let log = log(&[(0, 2500), (1, 1200)]);
        let result = compute(Frequency::DAILY, kind, &log, 0, 2);
        assert_eq!(states(&result), vec![Completed, Uncompleted, Uncompleted]);
        assert_eq!(result[1].value, 1200);
    }

    #[test]
    fn short_value_on_not_due_day_is_uncompleted() {
        let kind = HabitKind::DailyThreshold { threshold: 2000 };
        let log = log(&[(0, 2000), (1, 1200)]);
        let result = compute(Frequency::WEEKLY, kind, &log, 0, 2);
        assert_eq!(states(&result), vec![Completed, Uncompleted, Skipped]);
        assert_eq!(result[1].value, 1200);
    }

    #[test]
    fn huge_window_only_reads_recorded_days() {
        let freq = Frequency::new(1, u32::MAX).unwrap();
        let log = log(&[(-1_000_000, Repetition::YES_MANUAL), (3, Repetition::YES_MANUAL)]);
        let result = compute(freq, HabitKind::Boolean, &log, 0, 4);
        assert_eq!(states(&result), vec![Skipped, Skipped, Skipped, Completed, Skipped]);
        assert!(is_due(freq, HabitKind::Boolean, day(-1_000_000), &log));
    }

    #[test]
    fn window_total_stays_exact_past_i64_range() {
        let kind = HabitKind::WindowTotal { target: i64::MAX };
        let freq = Frequency::new(2, 3).unwrap();
        let log = log(&[(0, i64::MAX), (1, i64::MAX), (3, 5)]);
        let result = compute(freq, kind, &log, 0, 4);
        assert_eq!(
            states(&result),
            vec![PartiallyCompleted, Completed, Skipped, PartiallyCompleted, Uncompleted]
        );
        assert_eq!(result[1].value, i64::MAX);
        assert_eq!(result[3].value, i64::MAX);
        assert_eq!(result[4].value, 5);
    }

    #[test]
    fn window_total_accumulates_across_days() {
        let kind = HabitKind::WindowTotal { target: 10_000 };
        let log = log(&[(0, 3000), (2, 4000), (4, 3000)]);
        let result = compute(Frequency::WEEKLY, kind, &log, 0, 8);
        assert_eq!(
            states(&result),
            vec![
                PartiallyCompleted,
                Uncompleted,
                PartiallyCompleted,
                Uncompleted,
                Completed,
                Skipped,
                Skipped,
                Uncompleted,
                Uncompleted,
            ]
        );
        let totals: Vec<i64> = result.iter().map(|c| c.value).collect();
        assert_eq!(totals, vec![3000, 3000, 7000, 7000, 10_000, 10_000, 10_000, 7000, 7000]);
    }

    #[test]
    fn window_total_scales_with_numerator() {
        let kind = HabitKind::WindowTotal { target: 1000 };
        let freq = Frequency::new(2, 3).unwrap();
        let log = log(&[(0, 1000), (1, 1000)]);
        let result = compute(freq, kind, &log, 0, 2);
        assert_eq!(states(&result), vec![PartiallyCompleted, Completed, Skipped]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let result = CheckmarkEngine::compute_for(
            Frequency::DAILY,
            HabitKind::Boolean,
            &RepetitionLog::new(),
            day(5),
            day(4),
        );
        assert!(matches!(result, Err(CoreError::InvalidRange { start: 5, end: 4 })));
    }

    #[test]
    fn single_day_range() {
        let log = log(&[(10, 1)]);
        let result = compute(Frequency::DAILY, HabitKind::Boolean, &log, 10, 10);
        assert_eq!(states(&result), vec![Completed]);
    }

    #[test]
    fn is_due_follows_window_quota() {
        let yes = Repetition::YES_MANUAL;
        let log = log(&[(0, yes), (1, yes)]);
        assert!(is_due(Frequency::DAILY, HabitKind::Boolean, day(1), &log));
        assert!(is_due(Frequency::THREE_TIMES_PER_WEEK, HabitKind::Boolean, day(2), &log));
        assert!(!is_due(Frequency::TWO_TIMES_PER_WEEK, HabitKind::Boolean, day(2), &log));
        assert!(is_due(Frequency::TWO_TIMES_PER_WEEK, HabitKind::Boolean, day(8), &log));
    }

    #[test]
    fn engine_reads_habit_settings() {
        let habit = Habit::new(HabitData::new("Stretch", Frequency::DAILY))
            .with_repetitions(log(&[(1, Repetition::YES_MANUAL)]));
        let result = CheckmarkEngine::compute(&habit, day(0), day(1)).unwrap();
        assert_eq!(states(&result), vec![Uncompleted, Completed]);
        assert!(CheckmarkEngine::is_due(&habit, day(2)));
    }
}
