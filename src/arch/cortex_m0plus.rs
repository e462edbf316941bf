//! # Cortex-M0+ Port Layer
//!
//! SysTick drives the scheduler tick. There is no context switching: the
//! handler bumps the tick counter and queues a soft-timer pass, everything
//! else runs on the main stack in thread mode.
//!
//! ## Interrupt Priorities
//!
//! - SysTick: priority 0xFF (lowest, stored as 0xC0 with 2 priority bits)
//!
//! The tick handler is tiny but runs inside a critical section, so it is
//! kept below every peripheral interrupt.

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::{SCB, SYST};

use crate::config::{SYSTEM_CLOCK_HZ, TICK_HZ, TICK_PRIORITY};

/// SysTick reload value for one tick at `TICK_HZ` from the core clock.
pub const fn systick_reload() -> u32 {
    SYSTEM_CLOCK_HZ / TICK_HZ - 1
}

// ---------------------------------------------------------------------------
// SysTick configuration
// ---------------------------------------------------------------------------

/// Start SysTick at `TICK_HZ` from the processor clock, interrupt enabled.
///
/// Call last during startup: the first tick may fire before this returns.
pub fn configure_systick(syst: &mut SYST) {
    syst.set_reload(systick_reload());
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_counter();
    syst.enable_interrupt();
}

/// Put SysTick at `TICK_PRIORITY`.
pub fn set_tick_priority(scb: &mut SCB) {
    // SAFETY: no priority-based critical sections are in use; the
    // critical-section implementation masks all interrupts (PRIMASK).
    unsafe {
        scb.set_priority(SystemHandler::SysTick, TICK_PRIORITY);
    }
}

// ---------------------------------------------------------------------------
// SysTick handler
// ---------------------------------------------------------------------------

#[cfg(all(feature = "rt", target_os = "none"))]
#[cortex_m_rt::exception]
fn SysTick() {
    crate::kernel::on_tick();
}
