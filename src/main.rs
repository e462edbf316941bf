//! # LoopOS Example Firmware
//!
//! Two behaviors taking turns, with every timer family in play:
//!
//! | Behavior | On enter | Body | Leaves when |
//! |----------|----------|------|-------------|
//! | `IDLE`  | 3 chirps, 200 ms apart (repeat) | waits 5 s | the wait completes |
//! | `BLINK` | 500 ms toggle (cycle), 3 s finish (timeout) | waits forever | `finish` bypasses the wait |
//!
//! A parallel task counts main-loop passes throughout. It keeps running
//! while either behavior waits.

#![no_std]
#![no_main]

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use cortex_m_rt::entry;
use panic_halt as _;

use loopos::arch::cortex_m0plus;
use loopos::{kernel, Behavior, Scheduler, Task, WaitOutcome};

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

static LED_ON: AtomicBool = AtomicBool::new(false);
static CHIRPS: AtomicU32 = AtomicU32::new(0);
static PASSES: AtomicU32 = AtomicU32::new(0);

const TOGGLE: Task = Task::new("demo.toggle", toggle);
const FINISH: Task = Task::new("demo.finish", finish);
const CHIRP: Task = Task::new("demo.chirp", chirp);
const COUNT_PASSES: Task = Task::new("demo.count_passes", count_passes);

/// Stand-in for an LED: flips a flag.
fn toggle(_sched: &mut Scheduler<'_>) {
    let on = !LED_ON.load(Ordering::Relaxed);
    LED_ON.store(on, Ordering::Relaxed);
    log::trace!("led {}", if on { "on" } else { "off" });
}

fn finish(sched: &mut Scheduler<'_>) {
    sched.bypass_wait();
}

// thumbv6m has no atomic read-modify-write; only the main loop writes these.
fn chirp(_sched: &mut Scheduler<'_>) {
    let n = CHIRPS.load(Ordering::Relaxed).wrapping_add(1);
    CHIRPS.store(n, Ordering::Relaxed);
    log::debug!("chirp {}", n);
}

fn count_passes(_sched: &mut Scheduler<'_>) {
    let n = PASSES.load(Ordering::Relaxed);
    PASSES.store(n.wrapping_add(1), Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Behaviors
// ---------------------------------------------------------------------------

struct Idle;

impl Behavior for Idle {
    fn name(&self) -> &'static str {
        "idle"
    }

    fn on_enter(&self, sched: &mut Scheduler<'_>) {
        let _ = sched.start_repeat(3, 200, CHIRP);
    }

    fn on_run(&self, sched: &mut Scheduler<'_>) -> Option<&'static dyn Behavior> {
        match sched.wait_for(5000) {
            Ok(WaitOutcome::Completed) => Some(&BLINK),
            _ => None,
        }
    }
}

struct Blink;

impl Behavior for Blink {
    fn name(&self) -> &'static str {
        "blink"
    }

    fn on_enter(&self, sched: &mut Scheduler<'_>) {
        let _ = sched.start_cycle(500, TOGGLE);
        let _ = sched.start_timeout(3000, FINISH);
    }

    fn on_run(&self, sched: &mut Scheduler<'_>) -> Option<&'static dyn Behavior> {
        match sched.wait_forever() {
            Ok(WaitOutcome::Bypassed) => Some(&IDLE),
            _ => None,
        }
    }

    fn on_exit(&self, sched: &mut Scheduler<'_>) {
        sched.stop_cycle(&TOGGLE);
        sched.stop_timeout(&FINISH);
        LED_ON.store(false, Ordering::Relaxed);
    }
}

static IDLE: Idle = Idle;
static BLINK: Blink = Blink;

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Firmware entry point. Brings up the scheduler, selects the first
/// behavior, starts the tick and enters the main loop. Does not return.
#[entry]
fn main() -> ! {
    let mut cp = cortex_m::Peripherals::take().unwrap();

    let mut sched = kernel::init().unwrap();
    let _ = sched.start_parallel(COUNT_PASSES);
    sched.switch_to(&IDLE);

    // Tick last: SysTick may fire as soon as it is enabled.
    cortex_m0plus::set_tick_priority(&mut cp.SCB);
    cortex_m0plus::configure_systick(&mut cp.SYST);

    kernel::run(sched)
}
