//! # LoopOS: Cooperative Super-Loop Scheduler
//!
//! A tick-driven, run-to-completion scheduler for small ARM Cortex-M0+
//! microcontrollers. There are no threads and no stacks to switch: one main
//! loop calls registered callbacks in a fixed order, and a 1 kHz tick
//! interrupt supplies the time base.
//!
//! ## Overview
//!
//! Application code plugs in at five places:
//!
//! - **Timers**: run a task once after a delay (timeout), forever at a fixed
//!   interval (cycle), or N times at a fixed interval (repeat)
//! - **Parallel tasks**: run on every pass of the main loop
//! - **Deferred calls**: run once on the next pass; safe to request from an
//!   interrupt handler
//! - **Behaviors**: exactly one is current; it gets `on_enter`, `on_run`
//!   and `on_exit` phases and may wait without stalling the rest of the
//!   system
//! - **System services**: a load monitor and a heartbeat, started by `init`
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │            Application Behaviors and Tasks             │
//! ├────────────────────────────────────────────────────────┤
//! │               Kernel API (kernel.rs)                   │
//! │        init() · run() · on_tick() · enqueue_once()     │
//! ├──────────────┬─────────────────┬───────────────────────┤
//! │  Scheduler   │   Behaviors     │  Load Monitor         │
//! │  scheduler.rs│   behavior.rs   │  load.rs              │
//! │  ─ run_pass()│   ─ Engine      │  ─ sample()           │
//! │  ─ wait_for()│   wait.rs       │                       │
//! ├──────────────┴─────────────────┴───────────────────────┤
//! │   Registries: timer.rs · task.rs · deferred.rs         │
//! ├────────────────────────────────────────────────────────┤
//! │   ISR-shared state (shared.rs) · sync.rs · time.rs     │
//! ├────────────────────────────────────────────────────────┤
//! │          Arch Port (arch/cortex_m0plus.rs)             │
//! │                SysTick → on_tick()                     │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Timing
//!
//! Every interval is a tick count. Elapsed time is computed with wrapping
//! subtraction, so the 32-bit counter may roll over freely. A one-tick
//! interval is stretched to two ticks, because the next tick edge can
//! arrive right after the request.
//!
//! ## Memory Model
//!
//! - **No heap**: every registry is a fixed array sized in `config.rs`
//! - **No `alloc`**: pure `core`
//! - **One lock**: the deferred-call queue, shared with the tick ISR, sits
//!   behind a `critical_section::Mutex`; everything else is owned by the
//!   [`Scheduler`] and borrowed mutably by callbacks

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod behavior;
pub mod config;
pub mod deferred;
pub mod error;
pub mod kernel;
pub mod load;
pub mod scheduler;
pub mod shared;
pub mod sync;
pub mod task;
pub mod time;
pub mod timer;
pub mod wait;

pub use behavior::{Behavior, Phase};
pub use error::{Error, Family};
pub use load::{LoadEvent, LoadMonitor};
pub use scheduler::Scheduler;
pub use shared::Shared;
pub use task::{Task, TaskFn};
pub use time::{Tick, Ticks};
pub use timer::{Registration, TimerEntry, TimerRegistry};
pub use wait::WaitOutcome;
