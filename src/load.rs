//! # Load Monitor
//!
//! The main loop never sleeps, so the number of passes completed in a window
//! is a direct measure of how much work each pass does. The monitor turns
//! that count into an average pass time and compares it against the pass time
//! that is defined as 100% load.
//!
//! All arithmetic is integer. Pass time is kept in tenths of a microsecond,
//! load in per mille.

use crate::config::{
    LOAD_BASELINE_TENTHS_US, LOAD_CLEAR_PERMILLE, LOAD_WARN_PERMILLE, TICK_US,
};
use crate::time::{self, Tick};

/// Threshold crossing reported by [`LoadMonitor::sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEvent {
    /// Load rose above `LOAD_WARN_PERMILLE`.
    Raised,
    /// Load fell below `LOAD_CLEAR_PERMILLE`.
    Cleared,
}

#[derive(Debug)]
pub struct LoadMonitor {
    passes: u32,
    window_start: Tick,
    pass_tenths_us: u32,
    load_permille: u32,
    overloaded: bool,
}

impl LoadMonitor {
    pub const fn new() -> Self {
        Self {
            passes: 0,
            window_start: 0,
            pass_tenths_us: 0,
            load_permille: 0,
            overloaded: false,
        }
    }

    /// Start a fresh window at `now`.
    pub fn restart(&mut self, now: Tick) {
        self.passes = 0;
        self.window_start = now;
    }

    #[inline]
    pub fn record_pass(&mut self) {
        self.passes = self.passes.wrapping_add(1);
    }

    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Average pass time of the last window, in 0.1 µs.
    pub fn pass_tenths_us(&self) -> u32 {
        self.pass_tenths_us
    }

    /// Load estimate of the last window, in per mille.
    pub fn load_permille(&self) -> u32 {
        self.load_permille
    }

    pub fn is_overloaded(&self) -> bool {
        self.overloaded
    }

    /// Close the window ending at `now` and report a threshold crossing.
    ///
    /// A window with no passes is left open.
    pub fn sample(&mut self, now: Tick) -> Option<LoadEvent> {
        if self.passes == 0 {
            return None;
        }

        let window_us = time::elapsed(self.window_start, now) as u64 * TICK_US as u64;
        let pass_tenths_us = window_us * 10 / self.passes as u64;
        let load = pass_tenths_us * 1000 / LOAD_BASELINE_TENTHS_US as u64;

        self.pass_tenths_us = pass_tenths_us.min(u32::MAX as u64) as u32;
        self.load_permille = load.min(u32::MAX as u64) as u32;
        self.restart(now);

        if !self.overloaded && self.load_permille > LOAD_WARN_PERMILLE {
            self.overloaded = true;
            Some(LoadEvent::Raised)
        } else if self.overloaded && self.load_permille < LOAD_CLEAR_PERMILLE {
            self.overloaded = false;
            Some(LoadEvent::Cleared)
        } else {
            None
        }
    }
}

impl Default for LoadMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(monitor: &mut LoadMonitor, start: Tick, ticks: u32, passes: u32) -> Option<LoadEvent> {
        monitor.restart(start);
        for _ in 0..passes {
            monitor.record_pass();
        }
        monitor.sample(start.wrapping_add(ticks))
    }

    #[test]
    fn test_empty_window_is_skipped() {
        let mut monitor = LoadMonitor::new();
        assert_eq!(monitor.sample(100), None);
        assert_eq!(monitor.load_permille(), 0);
    }

    #[test]
    fn test_pass_time_and_load() {
        let mut monitor = LoadMonitor::new();
        // 100 ms over 4000 passes = 25 µs per pass = 25% load.
        window(&mut monitor, 0, 100, 4000);
        assert_eq!(monitor.pass_tenths_us(), 250);
        assert_eq!(monitor.load_permille(), 250);
        assert_eq!(monitor.passes(), 0);
    }

    #[test]
    fn test_hysteresis() {
        let mut monitor = LoadMonitor::new();
        // 100 µs per pass: 100%.
        assert_eq!(window(&mut monitor, 0, 100, 1000), Some(LoadEvent::Raised));
        assert!(monitor.is_overloaded());

        // ~77%: inside the band, stays armed.
        assert_eq!(window(&mut monitor, 100, 100, 1300), None);
        assert!(monitor.is_overloaded());

        // 10%: clears.
        assert_eq!(window(&mut monitor, 200, 100, 10_000), Some(LoadEvent::Cleared));
        assert!(!monitor.is_overloaded());

        // ~77% from below does not arm.
        assert_eq!(window(&mut monitor, 300, 100, 1300), None);
        assert!(!monitor.is_overloaded());
    }

    #[test]
    fn test_window_across_wrap() {
        let mut monitor = LoadMonitor::new();
        window(&mut monitor, u32::MAX - 49, 100, 4000);
        assert_eq!(monitor.load_permille(), 250);
    }
}
