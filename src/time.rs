//! # Tick Arithmetic
//!
//! The tick counter is a free-running `u32` that wraps roughly every 49 days
//! at 1 kHz. Every elapsed-time computation goes through [`elapsed`], which
//! relies on modular subtraction so a wrap between `start` and `now` still
//! yields the correct small delta.

use crate::config::MIN_INTERVAL_TICKS;

/// Absolute tick timestamp.
pub type Tick = u32;

/// Duration measured in ticks.
pub type Ticks = u32;

/// Ticks elapsed from `start` to `now`, correct across counter wraparound.
#[inline]
pub const fn elapsed(start: Tick, now: Tick) -> Ticks {
    now.wrapping_sub(start)
}

/// True once at least `interval` ticks have passed since `start`.
#[inline]
pub const fn is_due(start: Tick, interval: Ticks, now: Tick) -> bool {
    elapsed(start, now) >= interval
}

/// Stretch a one-tick request to [`MIN_INTERVAL_TICKS`].
///
/// The tick edge may arrive immediately after the request, so one tick of
/// counter progress can be arbitrarily short in wall time.
#[inline]
pub const fn promote(interval: Ticks) -> Ticks {
    if interval == 1 {
        MIN_INTERVAL_TICKS
    } else {
        interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_across_wrap() {
        // MAX-1 -> MAX -> 0 -> 1
        assert_eq!(elapsed(u32::MAX - 1, 1), 3);
        assert_eq!(elapsed(u32::MAX, 1), 2);
        assert_eq!(elapsed(u32::MAX, 0), 1);
    }

    #[test]
    fn test_elapsed_plain() {
        assert_eq!(elapsed(100, 150), 50);
        assert_eq!(elapsed(7, 7), 0);
    }

    #[test]
    fn test_is_due_boundary() {
        assert!(!is_due(10, 5, 14));
        assert!(is_due(10, 5, 15));
        assert!(is_due(u32::MAX - 2, 3, 0));
        assert!(!is_due(u32::MAX - 2, 4, 0));
    }

    #[test]
    fn test_promote_only_one() {
        assert_eq!(promote(0), 0);
        assert_eq!(promote(1), 2);
        assert_eq!(promote(2), 2);
        assert_eq!(promote(500), 500);
    }
}
