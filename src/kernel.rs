//! # Kernel
//!
//! Global entry points for firmware. The interrupt-shared state lives in a
//! single `static`; the [`Scheduler`] is handed out once and then owned by
//! the main loop, so no other code can reach it without being passed a
//! `&mut Scheduler`.
//!
//! ## Startup Sequence
//!
//! ```text
//! reset_handler (cortex-m-rt)
//!   └─► main()
//!         ├─► kernel::init()          ← scheduler + system services
//!         ├─► sched.switch_to(..)     ← first behavior
//!         ├─► arch::configure_systick ← tick starts: SysTick → on_tick()
//!         └─► kernel::run(sched)      ← main loop (no return)
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::Error;
use crate::scheduler::Scheduler;
use crate::shared::Shared;
use crate::sync;
use crate::task::Task;
use crate::time::{Tick, Ticks};

// ---------------------------------------------------------------------------
// Global state
// ---------------------------------------------------------------------------

static SHARED: Shared = Shared::new();

/// Set once the scheduler has been handed out.
static TAKEN: AtomicBool = AtomicBool::new(false);

// ---------------------------------------------------------------------------
// Kernel API
// ---------------------------------------------------------------------------

/// Create the scheduler and start the system services.
///
/// Returns `None` on every call after the first. A service that fails to
/// register does not prevent startup; the loop runs without it.
pub fn init() -> Option<Scheduler<'static>> {
    let first = sync::critical_section(|_cs| {
        let taken = TAKEN.load(Ordering::Relaxed);
        TAKEN.store(true, Ordering::Relaxed);
        !taken
    });
    if !first {
        return None;
    }

    let mut sched = Scheduler::new(&SHARED);
    if let Err(err) = sched.init() {
        log::warn!("starting without system services: {}", err);
    }
    Some(sched)
}

/// Tick interrupt hook. The SysTick handler calls this once per tick.
#[inline]
pub fn on_tick() {
    SHARED.on_tick();
}

/// Ticks since boot.
#[inline]
pub fn now() -> Tick {
    SHARED.now()
}

/// Ask for `task` to run once on the next pass. Callable from interrupts.
pub fn enqueue_once(task: Task) -> Result<(), Error> {
    SHARED.enqueue_once(task)
}

/// Busy-wait without servicing the scheduler. Needs the tick running.
pub fn delay(ticks: Ticks) {
    SHARED.delay(ticks);
}

pub fn shared() -> &'static Shared {
    &SHARED
}

/// Run the main loop forever.
pub fn run(mut sched: Scheduler<'static>) -> ! {
    loop {
        sched.run_pass();
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
