//! # Interrupt-Shared State
//!
//! The only state touched from both the tick interrupt and the main loop:
//! the tick counter and the deferred-call queue. Everything else belongs to
//! the [`Scheduler`](crate::Scheduler), which lives on the main loop's stack.
//!
//! Cortex-M0+ has no atomic read-modify-write, so the tick increment is a
//! load/store pair inside a critical section. Reads are single aligned word
//! loads and need no lock.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::Mutex;

use crate::config::ONCE_TASK_LIMIT;
use crate::deferred::OnceQueue;
use crate::error::Error;
use crate::scheduler::SOFT_TIMER;
use crate::sync;
use crate::task::Task;
use crate::time::{self, Tick, Ticks};

pub struct Shared {
    tick: AtomicU32,
    once: Mutex<RefCell<OnceQueue<ONCE_TASK_LIMIT>>>,
}

impl Shared {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Counter preset to `tick`; lets a board resume a saved uptime, and
    /// lets wraparound be exercised without waiting 49 days.
    pub const fn starting_at(tick: Tick) -> Self {
        Self {
            tick: AtomicU32::new(tick),
            once: Mutex::new(RefCell::new(OnceQueue::new())),
        }
    }

    /// Tick interrupt hook. Call once per tick from the timer ISR.
    ///
    /// Advances the counter and requests a soft-timer pass from the main
    /// loop. Never blocks.
    pub fn on_tick(&self) {
        sync::critical_section(|cs| {
            let tick = self.tick.load(Ordering::Relaxed);
            self.tick.store(tick.wrapping_add(1), Ordering::Relaxed);
            let _ = self.once.borrow_ref_mut(cs).push(SOFT_TIMER);
        });
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.tick.load(Ordering::Acquire)
    }

    /// Ask for `task` to run once from the main loop. Safe from any context.
    pub fn enqueue_once(&self, task: Task) -> Result<(), Error> {
        sync::critical_section(|cs| self.once.borrow_ref_mut(cs).push(task))
    }

    /// Busy-wait for `ticks` without servicing anything.
    ///
    /// For bring-up code that runs before the main loop. Inside a behavior
    /// use [`Scheduler::wait_for`](crate::Scheduler::wait_for) instead.
    pub fn delay(&self, ticks: Ticks) {
        let start = self.now();
        let ticks = time::promote(ticks);
        while !time::is_due(start, ticks, self.now()) {
            core::hint::spin_loop();
        }
    }

    /// Number of deferred calls waiting for the next pass.
    pub fn once_pending(&self) -> usize {
        sync::critical_section(|cs| self.once.borrow_ref(cs).len())
    }

    pub(crate) fn once_snapshot(&self) -> [Option<Task>; ONCE_TASK_LIMIT] {
        sync::critical_section(|cs| self.once.borrow_ref(cs).snapshot())
    }

    pub(crate) fn take_once(&self, index: usize, task: &Task) -> u32 {
        sync::critical_section(|cs| self.once.borrow_ref_mut(cs).take(index, task))
    }
}

impl Default for Shared {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::Duration;

    fn noop(_: &mut Scheduler<'_>) {}

    #[test]
    fn test_on_tick_advances_and_requests_soft_timer() {
        let shared = Shared::new();
        shared.on_tick();
        shared.on_tick();
        assert_eq!(shared.now(), 2);
        assert_eq!(shared.once_pending(), 1);
        assert!(shared.once_snapshot().contains(&Some(SOFT_TIMER)));
    }

    #[test]
    fn test_tick_wraps() {
        let shared = Shared::starting_at(u32::MAX);
        shared.on_tick();
        assert_eq!(shared.now(), 0);
    }

    #[test]
    fn test_enqueue_once_dedups() {
        let shared = Shared::new();
        let task = Task::new("deferred", noop);
        shared.enqueue_once(task).unwrap();
        shared.enqueue_once(task).unwrap();
        assert_eq!(shared.once_pending(), 1);
    }

    #[test]
    fn test_delay_waits_for_ticks() {
        static SHARED: Shared = Shared::new();
        static DONE: AtomicBool = AtomicBool::new(false);

        let ticker = thread::spawn(|| {
            while !DONE.load(Ordering::Relaxed) {
                SHARED.on_tick();
                thread::sleep(Duration::from_millis(1));
            }
        });

        let start = SHARED.now();
        SHARED.delay(1);
        let waited = time::elapsed(start, SHARED.now());
        DONE.store(true, Ordering::Relaxed);
        ticker.join().unwrap();

        assert!(waited >= 2);
    }
}
