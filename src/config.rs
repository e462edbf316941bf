//! # LoopOS Configuration
//!
//! Compile-time constants governing registry capacities, tick timing and the
//! load monitor. All limits are fixed at compile time; nothing is allocated.

/// Maximum number of pending timeout (one-shot) timers.
pub const TIMEOUT_LIMIT: usize = 16;

/// Maximum number of cycle (periodic) timers.
/// `init()` claims two of these for the load sampler and the heartbeat.
pub const CYCLE_LIMIT: usize = 16;

/// Maximum number of repeat-N timers.
pub const REPEAT_LIMIT: usize = 16;

/// Maximum number of parallel (every-pass) tasks.
pub const PARALLEL_TASK_LIMIT: usize = 32;

/// Maximum number of deferred calls pending at once.
/// The soft-timer pass occupies one slot whenever a tick is outstanding.
pub const ONCE_TASK_LIMIT: usize = 16;

/// Tick interrupt frequency in Hz. One tick is the unit of every interval.
pub const TICK_HZ: u32 = 1000;

/// Length of one tick in microseconds.
pub const TICK_US: u32 = 1_000_000 / TICK_HZ;

/// System clock frequency in Hz (STM32G0 default at 16 MHz HSI).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// SysTick exception priority. Lowest, so peripheral ISRs are never delayed
/// by the tick bookkeeping.
pub const TICK_PRIORITY: u8 = 0xFF;

/// Shortest interval a timer or wait will honor. A request for one tick may
/// land right before the next tick edge, so it is stretched to two to
/// guarantee at least one full tick elapses.
pub const MIN_INTERVAL_TICKS: u32 = 2;

/// Redundant soft-timer requests tolerated while one is already pending.
/// Beyond this the main loop is lagging the tick and a warning is logged
/// once the pass finally runs.
pub const SOFT_TIMER_COALESCE_LIMIT: u32 = 3;

/// Load monitor sampling window in ticks.
pub const LOAD_SAMPLE_TICKS: u32 = 100;

/// Average pass time, in 0.1 µs, that counts as 100% load (100 µs).
pub const LOAD_BASELINE_TENTHS_US: u32 = 1000;

/// Load (per mille) above which the warning is armed.
pub const LOAD_WARN_PERMILLE: u32 = 800;

/// Load (per mille) below which the warning is disarmed. The gap to
/// `LOAD_WARN_PERMILLE` is the hysteresis band.
pub const LOAD_CLEAR_PERMILLE: u32 = 600;

/// Period of the load warning while armed.
pub const LOAD_WARNING_PERIOD_TICKS: u32 = 1000;

/// Period of the system heartbeat.
pub const HEARTBEAT_PERIOD_TICKS: u32 = 1000;
