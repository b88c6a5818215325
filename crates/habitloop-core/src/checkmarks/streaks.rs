use serde::{Deserialize, Serialize};

use super::{Checkmark, CheckmarkState};
use crate::time::Timestamp;

/// A run of days in which the habit was kept up. Both ends are completed
/// days; skipped and partial days inside the run do not break it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Streak {
    /// Days covered, both ends included.
    pub fn length(&self) -> i64 {
        self.start.days_until(self.end) + 1
    }
}

/// Streaks found in `checkmarks`, oldest first. Expects the checkmarks
/// ordered oldest first, as the engine returns them.
pub fn compute_streaks(checkmarks: &[Checkmark]) -> Vec<Streak> {
    let mut streaks = Vec::new();
    let mut current: Option<Streak> = None;

    for checkmark in checkmarks {
        match checkmark.state {
            CheckmarkState::Completed => match current.as_mut() {
                Some(streak) => streak.end = checkmark.timestamp,
                None => {
                    current = Some(Streak {
                        start: checkmark.timestamp,
                        end: checkmark.timestamp,
                    })
                }
            },
            CheckmarkState::Skipped | CheckmarkState::PartiallyCompleted => {}
            CheckmarkState::Uncompleted => streaks.extend(current.take()),
        }
    }
    streaks.extend(current);
    streaks
}

/// The `count` longest streaks, longest first; ties go to the newer streak.
pub fn best_streaks(streaks: &[Streak], count: usize) -> Vec<Streak> {
    let mut best = streaks.to_vec();
    best.sort_by(|a, b| b.length().cmp(&a.length()).then_with(|| b.end.cmp(&a.end)));
    best.truncate(count);
    best
}
