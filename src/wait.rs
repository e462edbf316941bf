//! # Non-blocking Wait
//!
//! State for the single wait slot. The loop itself lives in
//! [`Scheduler::wait_for`](crate::Scheduler::wait_for) because it has to
//! poll background work.
//!
//! There is one slot system-wide, tied to the current behavior, so a wait
//! cannot nest. The two signals are one-shot: whichever the loop sees first
//! ends the wait and is cleared. Both are reset when a new wait begins.

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The duration elapsed, or `bypass_wait` ended a timed wait.
    Completed,
    /// `bypass_wait` ended an untimed wait.
    Bypassed,
    /// `interrupt_wait` ended the wait, usually because a behavior switch
    /// was requested. The caller should stop and return.
    Interrupted,
}

impl WaitOutcome {
    #[inline]
    pub fn is_interrupted(self) -> bool {
        self == WaitOutcome::Interrupted
    }
}

#[derive(Debug, Default)]
pub struct WaitState {
    waiting: bool,
    interrupted: bool,
    bypassed: bool,
}

impl WaitState {
    pub const fn new() -> Self {
        Self {
            waiting: false,
            interrupted: false,
            bypassed: false,
        }
    }

    #[inline]
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Claim the wait slot.
    pub fn begin(&mut self) -> Result<(), Error> {
        if self.waiting {
            log::error!("{}", Error::ReentrantWait);
            return Err(Error::ReentrantWait);
        }
        self.interrupted = false;
        self.bypassed = false;
        self.waiting = true;
        Ok(())
    }

    /// Consume a pending signal. Interruption wins over bypass.
    pub fn take_signal(&mut self) -> Option<WaitOutcome> {
        if core::mem::take(&mut self.interrupted) {
            Some(WaitOutcome::Interrupted)
        } else if core::mem::take(&mut self.bypassed) {
            Some(WaitOutcome::Bypassed)
        } else {
            None
        }
    }

    pub fn end(&mut self) {
        self.waiting = false;
    }

    pub fn interrupt(&mut self) {
        self.interrupted = true;
    }

    pub fn bypass(&mut self) {
        self.bypassed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_rejects_nesting() {
        let mut state = WaitState::new();
        state.begin().unwrap();
        assert_eq!(state.begin(), Err(Error::ReentrantWait));
        assert!(state.is_waiting());

        state.end();
        assert!(state.begin().is_ok());
    }

    #[test]
    fn test_signals_are_one_shot() {
        let mut state = WaitState::new();
        state.begin().unwrap();
        state.bypass();
        assert_eq!(state.take_signal(), Some(WaitOutcome::Bypassed));
        assert_eq!(state.take_signal(), None);
    }

    #[test]
    fn test_interrupt_wins_over_bypass() {
        let mut state = WaitState::new();
        state.begin().unwrap();
        state.bypass();
        state.interrupt();
        assert_eq!(state.take_signal(), Some(WaitOutcome::Interrupted));
        assert_eq!(state.take_signal(), Some(WaitOutcome::Bypassed));
    }

    #[test]
    fn test_stale_signal_cleared_by_begin() {
        let mut state = WaitState::new();
        state.interrupt();
        state.begin().unwrap();
        assert_eq!(state.take_signal(), None);
    }
}
