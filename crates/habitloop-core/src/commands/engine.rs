//! Serialized command execution with synchronous listener fan-out.
//!
//! One `RwLock` guards the whole habit list. A command holds the write lock
//! for the duration of its mutation only; listeners run after the lock is
//! released, on the caller's thread, in registration order. Readers always
//! see the list either before or after a command, never in between.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};
use uuid::Uuid;

use super::Command;
use crate::checkmarks::{Checkmark, CheckmarkEngine};
use crate::error::{CoreError, Result};
use crate::models::{Habit, HabitList};
use crate::storage::HabitRepository;
use crate::time::Timestamp;

/// Receives a notification after every successful command.
///
/// `ref_id` names the habit whose derived data is stale, or is `None` when
/// the command may affect any habit.
pub trait CommandListener: Send + Sync {
    fn on_command_finished(&self, command: &Command, ref_id: Option<Uuid>);
}

impl<F> CommandListener for F
where
    F: Fn(&Command, Option<Uuid>) + Send + Sync,
{
    fn on_command_finished(&self, command: &Command, ref_id: Option<Uuid>) {
        self(command, ref_id)
    }
}

/// Handle returned by [`CommandEngine::register_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct CommandEngine {
    habits: RwLock<HabitList>,
    listeners: RwLock<Vec<(ListenerId, Arc<dyn CommandListener>)>>,
    next_listener: AtomicU64,
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::new(HabitList::new())
    }
}

impl CommandEngine {
    pub fn new(habits: HabitList) -> Self {
        Self {
            habits: RwLock::new(habits),
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Engine seeded with every habit the repository knows.
    pub fn from_repository(repository: &dyn HabitRepository) -> Result<Self> {
        let habits: HabitList = repository.habits()?.into_iter().collect();
        debug!(count = habits.len(), "loaded habits from repository");
        Ok(Self::new(habits))
    }

    /// Apply `command`, then notify listeners with `ref_id`.
    ///
    /// Listeners are not called when the command fails.
    pub fn execute(&self, command: Command, ref_id: Option<Uuid>) -> Result<()> {
        {
            let mut habits = self
                .habits
                .write()
                .map_err(|e| CoreError::LockPoisoned(e.to_string()))?;
            if let Err(err) = command.execute(&mut habits) {
                warn!(command = command.kind(), error = %err, "command rejected");
                return Err(err);
            }
        }
        debug!(command = command.kind(), ref_id = ?ref_id, "command executed");

        for listener in self.listener_snapshot()? {
            listener.on_command_finished(&command, ref_id);
        }
        Ok(())
    }

    pub fn register_listener(&self, listener: Arc<dyn CommandListener>) -> Result<ListenerId> {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .map_err(|e| CoreError::LockPoisoned(e.to_string()))?
            .push((id, listener));
        debug!(listener = id.0, "listener registered");
        Ok(id)
    }

    /// Returns whether a listener with that id was registered.
    pub fn remove_listener(&self, id: ListenerId) -> Result<bool> {
        let mut listeners = self
            .listeners
            .write()
            .map_err(|e| CoreError::LockPoisoned(e.to_string()))?;
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        let removed = listeners.len() != before;
        if removed {
            debug!(listener = id.0, "listener removed");
        }
        Ok(removed)
    }

    fn listener_snapshot(&self) -> Result<Vec<Arc<dyn CommandListener>>> {
        let listeners = self
            .listeners
            .read()
            .map_err(|e| CoreError::LockPoisoned(e.to_string()))?;
        Ok(listeners.iter().map(|(_, l)| Arc::clone(l)).collect())
    }

    /// Run `f` against a consistent view of the habit list.
    pub fn read<T>(&self, f: impl FnOnce(&HabitList) -> T) -> Result<T> {
        let habits = self
            .habits
            .read()
            .map_err(|e| CoreError::LockPoisoned(e.to_string()))?;
        Ok(f(&habits))
    }

    pub fn habit(&self, id: Uuid) -> Result<Option<Habit>> {
        self.read(|habits| habits.get(id).cloned())
    }

    pub fn snapshot(&self) -> Result<HabitList> {
        self.read(HabitList::clone)
    }

    /// Checkmarks of one habit, computed under the read lock.
    pub fn checkmarks(&self, id: Uuid, start: Timestamp, end: Timestamp) -> Result<Vec<Checkmark>> {
        self.read(|habits| {
            let habit = habits.get(id).ok_or(CoreError::UnknownHabit(id))?;
            CheckmarkEngine::compute(habit, start, end)
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, HabitData, Repetition};
    use std::sync::Mutex;

    fn create(engine: &CommandEngine, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        engine
            .execute(
                Command::CreateHabit {
                    habit: id,
                    data: HabitData::new(name, Frequency::DAILY),
                },
                Some(id),
            )
            .unwrap();
        id
    }

    fn record(habit: Uuid, day: i64) -> Command {
        Command::CreateRepetition {
            habit,
            timestamp: Timestamp::from_days(day),
            value: Repetition::YES_MANUAL,
        }
    }

    #[test]
    fn listeners_are_notified_in_command_order() {
        let engine = CommandEngine::default();
        let id = create(&engine, "Read");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine
            .register_listener(Arc::new(move |cmd: &Command, ref_id: Option<Uuid>| {
                sink.lock().unwrap().push((cmd.clone(), ref_id));
            }))
            .unwrap();

        engine.execute(record(id, 1), Some(id)).unwrap();
        engine.execute(record(id, 2), None).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (record(id, 1), Some(id)));
        assert_eq!(seen[1], (record(id, 2), None));
    }

    #[test]
    fn failed_command_is_not_broadcast() {
        let engine = CommandEngine::default();
        let a = create(&engine, "A");
        let c = create(&engine, "C");
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        engine
            .register_listener(Arc::new(move |_: &Command, _: Option<Uuid>| {
                *counter.lock().unwrap() += 1;
            }))
            .unwrap();
        let before = engine.snapshot().unwrap();

        let result = engine.execute(
            Command::SetFavourite {
                habits: vec![a, Uuid::new_v4(), c],
                favourite: true,
            },
            None,
        );

        assert!(matches!(result, Err(CoreError::UnknownHabit(_))));
        assert_eq!(engine.snapshot().unwrap(), before);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let engine = CommandEngine::default();
        let id = create(&engine, "Walk");
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let listener = engine
            .register_listener(Arc::new(move |_: &Command, _: Option<Uuid>| {
                *counter.lock().unwrap() += 1;
            }))
            .unwrap();

        engine.execute(record(id, 0), Some(id)).unwrap();
        assert!(engine.remove_listener(listener).unwrap());
        assert!(!engine.remove_listener(listener).unwrap());
        engine.execute(record(id, 1), Some(id)).unwrap();

        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn recording_twice_converges_to_same_state() {
        let engine = CommandEngine::default();
        let id = create(&engine, "Stretch");
        engine.execute(record(id, 5), Some(id)).unwrap();
        let once = engine.snapshot().unwrap();
        engine.execute(record(id, 5), Some(id)).unwrap();
        assert_eq!(engine.snapshot().unwrap(), once);
    }

    #[test]
    fn listener_reads_post_mutation_state() {
        let engine = Arc::new(CommandEngine::default());
        let id = create(&engine, "Journal");
        let observed = Arc::new(Mutex::new(None));
        let (weak, sink) = (Arc::downgrade(&engine), Arc::clone(&observed));
        engine
            .register_listener(Arc::new(move |_: &Command, ref_id: Option<Uuid>| {
                let (Some(engine), Some(id)) = (weak.upgrade(), ref_id) else { return };
                let len = engine.habit(id).unwrap().map(|h| h.repetitions().len());
                *sink.lock().unwrap() = len;
            }))
            .unwrap();

        engine.execute(record(id, 3), Some(id)).unwrap();
        assert_eq!(*observed.lock().unwrap(), Some(1));
    }

    #[test]
    fn checkmarks_for_unknown_habit() {
        let engine = CommandEngine::default();
        let day = Timestamp::EPOCH;
        assert!(matches!(
            engine.checkmarks(Uuid::new_v4(), day, day),
            Err(CoreError::UnknownHabit(_))
        ));
    }
}
