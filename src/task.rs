//! # Tasks
//!
//! A [`Task`] is a named callback. The scheduler never hands out handles:
//! every registry is a set keyed by task identity, so starting a task that is
//! already registered finds the existing slot instead of adding a second one.
//!
//! Identity is the task's `name`, not the address of its function. Function
//! addresses are not guaranteed stable or distinct (identical bodies may be
//! merged), names are. Two tasks with the same name are the same task.
//!
//! Callbacks are plain `fn` pointers, so they are `'static` and can never
//! dangle or be null. A task that needs state keeps it in a `static` or
//! reaches it through the scheduler it is handed.

use core::fmt;

use crate::error::{Error, Family};
use crate::scheduler::Scheduler;

/// Signature of every scheduled callback.
pub type TaskFn = fn(&mut Scheduler<'_>);

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct Task {
    name: &'static str,
    run: TaskFn,
}

impl Task {
    pub const fn new(name: &'static str, run: TaskFn) -> Self {
        Self { name, run }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Invoke the callback.
    #[inline]
    pub fn run(self, sched: &mut Scheduler<'_>) {
        (self.run)(sched)
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Task {}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Task").field(&self.name).finish()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ---------------------------------------------------------------------------
// Task table (parallel tasks, deferred calls)
// ---------------------------------------------------------------------------

/// Fixed-capacity set of bare tasks.
///
/// Slot order is stable: a task keeps its index until removed, and a new task
/// takes the lowest free index. Dispatchers walk the slots by index.
pub struct TaskTable<const N: usize> {
    family: Family,
    slots: [Option<Task>; N],
}

impl<const N: usize> TaskTable<N> {
    pub const fn new(family: Family) -> Self {
        Self {
            family,
            slots: [None; N],
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn contains(&self, task: &Task) -> bool {
        self.position(task).is_some()
    }

    fn position(&self, task: &Task) -> Option<usize> {
        self.slots.iter().position(|slot| slot.as_ref() == Some(task))
    }

    /// Add `task` unless present.
    ///
    /// # Returns
    /// - `Ok(true)`: task was added
    /// - `Ok(false)`: task was already registered, nothing changed
    /// - `Err(CapacityExceeded)`: no free slot (logged)
    pub fn insert(&mut self, task: Task) -> Result<bool, Error> {
        if self.contains(&task) {
            return Ok(false);
        }
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(task);
                Ok(true)
            }
            None => {
                let err = Error::CapacityExceeded {
                    family: self.family,
                    limit: N,
                };
                log::error!("{} (rejected {})", err, task);
                Err(err)
            }
        }
    }

    /// Remove `task`. Returns whether it was registered.
    pub fn remove(&mut self, task: &Task) -> bool {
        match self.position(task) {
            Some(index) => {
                self.slots[index] = None;
                true
            }
            None => false,
        }
    }

    /// The task currently stored at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Task> {
        self.slots.get(index).copied().flatten()
    }

    /// Clear `index` if it still holds `task`.
    pub fn take(&mut self, index: usize, task: &Task) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.as_ref() == Some(task) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Copy of every slot, used to dispatch while the live table mutates.
    pub fn snapshot(&self) -> [Option<Task>; N] {
        self.slots
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Scheduler<'_>) {}
    fn other(_: &mut Scheduler<'_>) {}

    const A: Task = Task::new("a", noop);
    const B: Task = Task::new("b", noop);
    const C: Task = Task::new("c", noop);

    #[test]
    fn test_identity_is_name() {
        assert_eq!(Task::new("x", noop), Task::new("x", other));
        assert_ne!(Task::new("x", noop), Task::new("y", noop));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut table: TaskTable<4> = TaskTable::new(Family::Parallel);
        assert_eq!(table.insert(A), Ok(true));
        assert_eq!(table.insert(A), Ok(false));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_overflow_leaves_table_unchanged() {
        let mut table: TaskTable<2> = TaskTable::new(Family::Parallel);
        table.insert(A).unwrap();
        table.insert(B).unwrap();

        let before = table.snapshot();
        assert_eq!(
            table.insert(C),
            Err(Error::CapacityExceeded {
                family: Family::Parallel,
                limit: 2
            })
        );
        assert_eq!(table.snapshot(), before);
        assert!(!table.contains(&C));
    }

    #[test]
    fn test_remove_frees_lowest_slot_for_reuse() {
        let mut table: TaskTable<3> = TaskTable::new(Family::Parallel);
        table.insert(A).unwrap();
        table.insert(B).unwrap();
        assert!(table.remove(&A));
        assert!(!table.remove(&A));

        table.insert(C).unwrap();
        assert_eq!(table.get(0), Some(C));
        assert_eq!(table.get(1), Some(B));
    }

    #[test]
    fn test_take_requires_matching_task() {
        let mut table: TaskTable<2> = TaskTable::new(Family::Once);
        table.insert(A).unwrap();
        assert!(!table.take(0, &B));
        assert!(table.take(0, &A));
        assert!(table.is_empty());
        assert!(!table.take(5, &A));
    }
}
