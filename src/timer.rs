//! # Timer Registries
//!
//! Three independently bounded tables drive timed callbacks:
//!
//! | Family  | Fires                     | Slot cleared             |
//! |---------|---------------------------|--------------------------|
//! | Timeout | once, `interval` after start | on fire or `stop`     |
//! | Cycle   | every `interval`          | on `stop`                |
//! | Repeat  | `count` times in total    | after the last fire or `stop` |
//!
//! Registration policy lives here; invoking callbacks needs the scheduler and
//! lives in `scheduler.rs`. Dispatch runs over a [`TimerRegistry::snapshot`]
//! so callbacks may start or stop entries of the same family mid-pass; the
//! live table is only touched through [`TimerRegistry::settle`], which checks
//! that the slot still belongs to the task that fired.

use crate::error::{Error, Family};
use crate::task::Task;
use crate::time::{self, Tick, Ticks};

/// Outcome of a successful `start_*` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A fresh slot was allocated.
    Added,
    /// Timeout already pending; its start time was reset.
    Refreshed,
    /// Already registered with identical parameters.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEntry {
    /// Tick of registration or of the last fire.
    pub start: Tick,
    pub interval: Ticks,
    /// Total fires requested (repeat family only, 0 otherwise).
    pub count: u32,
    /// Timed fires still to come (repeat family only).
    pub remaining: u32,
    pub task: Task,
}

impl TimerEntry {
    #[inline]
    pub fn is_due(&self, now: Tick) -> bool {
        time::is_due(self.start, self.interval, now)
    }
}

pub struct TimerRegistry<const N: usize> {
    family: Family,
    slots: [Option<TimerEntry>; N],
}

impl<const N: usize> TimerRegistry<N> {
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

    pub fn entry(&self, task: &Task) -> Option<&TimerEntry> {
        self.slots.iter().flatten().find(|entry| entry.task == *task)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimerEntry> {
        self.slots.iter().flatten()
    }

    fn position(&self, task: &Task) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|entry| entry.task == *task))
    }

    fn insert(&mut self, entry: TimerEntry) -> Result<usize, Error> {
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(entry);
                Ok(index)
            }
            None => {
                let err = Error::CapacityExceeded {
                    family: self.family,
                    limit: N,
                };
                log::error!("{} (rejected {})", err, entry.task);
                Err(err)
            }
        }
    }

    /// Register a one-shot timer, or push back an already pending one.
    ///
    /// Re-starting a pending timeout keeps its original interval and only
    /// resets the start tick, which makes it a debounce.
    pub fn start_timeout(
        &mut self,
        now: Tick,
        interval: Ticks,
        task: Task,
    ) -> Result<Registration, Error> {
        if let Some(index) = self.position(&task) {
            if let Some(entry) = self.slots[index].as_mut() {
                entry.start = now;
            }
            return Ok(Registration::Refreshed);
        }

        self.insert(TimerEntry {
            start: now,
            interval,
            count: 0,
            remaining: 0,
            task,
        })?;
        Ok(Registration::Added)
    }

    /// Register a cycle (`count == 0`) or repeat (`count >= 2`) timer.
    ///
    /// Identical parameters leave a running timer alone. Different ones drop
    /// the old slot and register from scratch, restarting the phase.
    /// The caller owes the task one immediate call when this returns `Added`.
    pub fn start_periodic(
        &mut self,
        now: Tick,
        interval: Ticks,
        count: u32,
        task: Task,
    ) -> Result<Registration, Error> {
        if let Some(index) = self.position(&task) {
            if let Some(entry) = &self.slots[index] {
                if entry.interval == interval && entry.count == count {
                    return Ok(Registration::Unchanged);
                }
            }
            self.slots[index] = None;
        }

        self.insert(TimerEntry {
            start: now,
            interval,
            count,
            remaining: count.saturating_sub(1),
            task,
        })?;
        Ok(Registration::Added)
    }

    /// Remove `task`. Returns whether it was registered.
    pub fn stop(&mut self, task: &Task) -> bool {
        match self.position(task) {
            Some(index) => {
                self.slots[index] = None;
                true
            }
            None => false,
        }
    }

    /// Copy of every slot, taken at the start of a dispatch pass.
    pub fn snapshot(&self) -> [Option<TimerEntry>; N] {
        self.slots
    }

    /// Apply a fire of `fired` (taken from slot `index` of the snapshot) to
    /// the live table, before its callback runs.
    ///
    /// A slot that was stopped or handed to another task since the snapshot
    /// is left alone.
    pub fn settle(&mut self, index: usize, fired: &TimerEntry, now: Tick) {
        let Some(Some(live)) = self.slots.get_mut(index) else {
            return;
        };
        if live.task != fired.task {
            return;
        }

        let finished = match self.family {
            Family::Timeout => true,
            Family::Repeat => {
                live.start = now;
                live.remaining = live.remaining.saturating_sub(1);
                live.remaining == 0
            }
            _ => {
                live.start = now;
                false
            }
        };

        if finished {
            self.slots[index] = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
