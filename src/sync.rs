//! # Synchronization Primitives
//!
//! Interrupt-safe critical section used for the state shared with the tick
//! interrupt. On Cortex-M the implementation comes from `cortex-m`'s
//! `critical-section-single-core` feature (interrupts masked); host tests
//! link the `std` implementation instead.

pub use critical_section::CriticalSection;

/// Execute a closure within a critical section.
///
/// Interrupts are disabled on entry and restored on exit, so the enclosed
/// operation is atomic with respect to the tick handler. Keep it short: the
/// tick ISR is held off for the duration.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(CriticalSection<'_>) -> R,
{
    critical_section::with(f)
}
