//! # Deferred-Call Queue
//!
//! "Once" tasks: any context, including an interrupt handler, may ask for a
//! callback to run a single time from the main loop. The queue is a set, so a
//! request for an already-pending task is absorbed.
//!
//! The tick interrupt requests the soft-timer pass on every tick. When the
//! main loop falls behind, those requests pile up against the one pending
//! entry; they are counted rather than queued, and the count tells the main
//! loop how far it lagged once the pass finally runs.

use crate::error::{Error, Family};
use crate::scheduler::SOFT_TIMER;
use crate::task::{Task, TaskTable};

pub struct OnceQueue<const N: usize> {
    table: TaskTable<N>,
    /// Soft-timer requests absorbed since the pending pass was queued.
    coalesced: u32,
}

impl<const N: usize> OnceQueue<N> {
    pub const fn new() -> Self {
        Self {
            table: TaskTable::new(Family::Once),
            coalesced: 0,
        }
    }

    /// Queue `task` unless it is already pending.
    pub fn push(&mut self, task: Task) -> Result<(), Error> {
        if self.table.contains(&task) {
            if task == SOFT_TIMER {
                self.coalesced = self.coalesced.saturating_add(1);
            }
            return Ok(());
        }
        self.table.insert(task).map(|_| ())
    }

    /// Consume slot `index` ahead of running `task`.
    ///
    /// Returns how many soft-timer requests were coalesced into this run
    /// (always 0 for other tasks).
    pub fn take(&mut self, index: usize, task: &Task) -> u32 {
        if !self.table.take(index, task) {
            return 0;
        }
        if *task == SOFT_TIMER {
            core::mem::take(&mut self.coalesced)
        } else {
            0
        }
    }

    pub fn snapshot(&self) -> [Option<Task>; N] {
        self.table.snapshot()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn contains(&self, task: &Task) -> bool {
        self.table.contains(task)
    }
}

impl<const N: usize> Default for OnceQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;

    fn noop(_: &mut Scheduler<'_>) {}

    const A: Task = Task::new("a", noop);
    const B: Task = Task::new("b", noop);

    #[test]
    fn test_push_is_idempotent() {
        let mut queue: OnceQueue<4> = OnceQueue::new();
        queue.push(A).unwrap();
        queue.push(A).unwrap();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_soft_timer_requests_coalesce() {
        let mut queue: OnceQueue<4> = OnceQueue::new();
        for _ in 0..5 {
            queue.push(SOFT_TIMER).unwrap();
        }
        assert_eq!(queue.len(), 1);

        let index = queue.snapshot().iter().position(|t| *t == Some(SOFT_TIMER)).unwrap();
        assert_eq!(queue.take(index, &SOFT_TIMER), 4);
        assert!(queue.is_empty());

        // The counter starts over for the next pending pass.
        queue.push(SOFT_TIMER).unwrap();
        queue.push(SOFT_TIMER).unwrap();
        assert_eq!(queue.take(0, &SOFT_TIMER), 1);
    }

    #[test]
    fn test_take_consumes_once() {
        let mut queue: OnceQueue<4> = OnceQueue::new();
        queue.push(A).unwrap();
        queue.push(B).unwrap();
        assert_eq!(queue.take(0, &A), 0);
        assert!(!queue.contains(&A));
        assert!(queue.contains(&B));

        // Re-queue after consumption is a new request.
        queue.push(A).unwrap();
        assert!(queue.contains(&A));
    }

    #[test]
    fn test_overflow() {
        let mut queue: OnceQueue<1> = OnceQueue::new();
        queue.push(A).unwrap();
        assert_eq!(
            queue.push(B),
            Err(Error::CapacityExceeded {
                family: Family::Once,
                limit: 1
            })
        );
    }
}
