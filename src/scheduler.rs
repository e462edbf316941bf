//! # Scheduler
//!
//! The cooperative engine. A [`Scheduler`] owns every registry and the
//! behavior state; the main loop owns the scheduler and calls
//! [`Scheduler::run_pass`] as fast as it can.
//!
//! ## Pass
//!
//! 1. **Deferred calls**: run every pending once-task. The tick interrupt
//!    keeps the soft-timer pass queued here, which walks the timeout, cycle
//!    and repeat registries.
//! 2. **Behavior**: invoke one phase of the current behavior.
//! 3. **Parallel tasks**: invoke every parallel task in table order.
//! 4. **Load**: count the pass.
//!
//! A behavior that waits stays inside step 2, repeating steps 1, 3 and 4
//! through [`Scheduler::poll_background`] until the wait ends. The behavior
//! engine itself is never re-entered.
//!
//! ## Reentrancy
//!
//! Every callback receives `&mut Scheduler` and may start or stop anything,
//! including entries of the table being dispatched. Timer and deferred
//! dispatch iterate a copy of the table taken at the start of the pass and
//! only write back to a live slot that still holds the task that fired.

use crate::behavior::{Behavior, Engine, Phase};
use crate::config::{
    CYCLE_LIMIT, HEARTBEAT_PERIOD_TICKS, LOAD_SAMPLE_TICKS, LOAD_WARNING_PERIOD_TICKS,
    LOAD_WARN_PERMILLE, PARALLEL_TASK_LIMIT, REPEAT_LIMIT, SOFT_TIMER_COALESCE_LIMIT,
    TIMEOUT_LIMIT,
};
use crate::error::{Error, Family};
use crate::load::{LoadEvent, LoadMonitor};
use crate::shared::Shared;
use crate::task::{Task, TaskTable};
use crate::time::{self, Tick, Ticks};
use crate::timer::{Registration, TimerRegistry};
use crate::wait::{WaitOutcome, WaitState};

// ---------------------------------------------------------------------------
// Internal tasks
// ---------------------------------------------------------------------------

/// Timer pass requested by every tick.
pub(crate) const SOFT_TIMER: Task = Task::new("loopos.soft_timer", soft_timer);

const LOAD_SAMPLER: Task = Task::new("loopos.load_sample", sample_load);
const LOAD_WARNING: Task = Task::new("loopos.load_warning", load_warning);
const HEARTBEAT: Task = Task::new("loopos.heartbeat", heartbeat);

fn soft_timer(sched: &mut Scheduler<'_>) {
    sched.dispatch_timers(Scheduler::timeouts_mut);
    sched.dispatch_timers(Scheduler::cycles_mut);
    sched.dispatch_timers(Scheduler::repeats_mut);
}

fn sample_load(sched: &mut Scheduler<'_>) {
    let now = sched.now();
    match sched.load.sample(now) {
        Some(LoadEvent::Raised) => {
            let _ = sched.start_cycle(LOAD_WARNING_PERIOD_TICKS, LOAD_WARNING);
        }
        Some(LoadEvent::Cleared) => {
            sched.stop_cycle(&LOAD_WARNING);
            let load = sched.load.load_permille();
            log::info!("cpu load back to {}.{}%", load / 10, load % 10);
        }
        None => {}
    }
}

fn load_warning(sched: &mut Scheduler<'_>) {
    let load = sched.load.load_permille();
    let pass = sched.load.pass_tenths_us();
    log::warn!(
        "cpu load over {}%, reach {}.{}%, average loop time: {}.{} us",
        LOAD_WARN_PERMILLE / 10,
        load / 10,
        load % 10,
        pass / 10,
        pass % 10
    );
}

fn heartbeat(sched: &mut Scheduler<'_>) {
    log::debug!("heartbeat {}", sched.heartbeats);
    sched.heartbeats = sched.heartbeats.wrapping_add(1);
}

// ---------------------------------------------------------------------------
// Scheduler struct
// ---------------------------------------------------------------------------

/// Fixed-capacity registries plus the behavior and wait state.
///
/// Borrows the [`Shared`] block that the tick interrupt writes to. Firmware
/// uses the global one through [`kernel::init`](crate::kernel::init); tests
/// build an isolated `Shared` per case.
pub struct Scheduler<'a> {
    shared: &'a Shared,
    timeouts: TimerRegistry<TIMEOUT_LIMIT>,
    cycles: TimerRegistry<CYCLE_LIMIT>,
    repeats: TimerRegistry<REPEAT_LIMIT>,
    parallel: TaskTable<PARALLEL_TASK_LIMIT>,
    engine: Engine,
    wait: WaitState,
    load: LoadMonitor,
    heartbeats: u32,
}

impl<'a> Scheduler<'a> {
    /// Create a scheduler with empty registries and no behavior.
    pub const fn new(shared: &'a Shared) -> Self {
        Self {
            shared,
            timeouts: TimerRegistry::new(Family::Timeout),
            cycles: TimerRegistry::new(Family::Cycle),
            repeats: TimerRegistry::new(Family::Repeat),
            parallel: TaskTable::new(Family::Parallel),
            engine: Engine::new(),
            wait: WaitState::new(),
            load: LoadMonitor::new(),
            heartbeats: 0,
        }
    }

    /// Start the system services: load sampling and the heartbeat.
    ///
    /// Both are cycle tasks and take two `CYCLE_LIMIT` slots.
    pub fn init(&mut self) -> Result<(), Error> {
        log::info!("loopos: cooperative scheduler up");
        self.load.restart(self.now());
        self.start_cycle(LOAD_SAMPLE_TICKS, LOAD_SAMPLER)?;
        self.start_cycle(HEARTBEAT_PERIOD_TICKS, HEARTBEAT)?;
        log::info!("system heartbeat start");
        Ok(())
    }

    /// One iteration of the main loop.
    pub fn run_pass(&mut self) {
        self.dispatch_deferred();
        self.run_behavior();
        self.dispatch_parallel();
        self.load.record_pass();
    }

    /// Everything in a pass except the behavior engine. This is what keeps
    /// the system alive while a behavior waits.
    pub fn poll_background(&mut self) {
        self.dispatch_deferred();
        self.dispatch_parallel();
        self.load.record_pass();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn now(&self) -> Tick {
        self.shared.now()
    }

    pub fn shared(&self) -> &'a Shared {
        self.shared
    }

    pub fn timeouts(&self) -> &TimerRegistry<TIMEOUT_LIMIT> {
        &self.timeouts
    }

    pub fn cycles(&self) -> &TimerRegistry<CYCLE_LIMIT> {
        &self.cycles
    }

    pub fn repeats(&self) -> &TimerRegistry<REPEAT_LIMIT> {
        &self.repeats
    }

    pub fn parallel(&self) -> &TaskTable<PARALLEL_TASK_LIMIT> {
        &self.parallel
    }

    pub fn load(&self) -> &LoadMonitor {
        &self.load
    }

    /// Heartbeat invocations so far (one at `init`, then one per period).
    pub fn heartbeats(&self) -> u32 {
        self.heartbeats
    }

    pub fn current_behavior(&self) -> Option<&'static dyn Behavior> {
        self.engine.current()
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Run `task` once, `interval` ticks from now.
    ///
    /// If `task` is already pending its countdown restarts from now with the
    /// interval it was registered with.
    pub fn start_timeout(&mut self, interval: Ticks, task: Task) -> Result<(), Error> {
        let now = self.now();
        self.timeouts
            .start_timeout(now, time::promote(interval), task)
            .map(|_| ())
    }

    pub fn stop_timeout(&mut self, task: &Task) {
        self.timeouts.stop(task);
    }

    /// Run `task` now and then every `interval` ticks until stopped.
    ///
    /// Re-starting with the same interval does nothing (no extra call); a
    /// different interval restarts the cycle, including the immediate call.
    pub fn start_cycle(&mut self, interval: Ticks, task: Task) -> Result<(), Error> {
        let now = self.now();
        let registration = self
            .cycles
            .start_periodic(now, time::promote(interval), 0, task)?;
        if registration == Registration::Added {
            task.run(self);
        }
        Ok(())
    }

    pub fn stop_cycle(&mut self, task: &Task) {
        self.cycles.stop(task);
    }

    /// Run `task` `count` times in total: now, then every `interval` ticks.
    ///
    /// `count == 0` does nothing. `count == 1` calls `task` inline and never
    /// touches the table, so it cannot overflow and does not disturb an
    /// existing registration of the same task.
    pub fn start_repeat(&mut self, count: u32, interval: Ticks, task: Task) -> Result<(), Error> {
        match count {
            0 => return Ok(()),
            1 => {
                task.run(self);
                return Ok(());
            }
            _ => {}
        }

        let now = self.now();
        let registration = self
            .repeats
            .start_periodic(now, time::promote(interval), count, task)?;
        if registration == Registration::Added {
            task.run(self);
        }
        Ok(())
    }

    pub fn stop_repeat(&mut self, task: &Task) {
        self.repeats.stop(task);
    }

    fn timeouts_mut(&mut self) -> &mut TimerRegistry<TIMEOUT_LIMIT> {
        &mut self.timeouts
    }

    fn cycles_mut(&mut self) -> &mut TimerRegistry<CYCLE_LIMIT> {
        &mut self.cycles
    }

    fn repeats_mut(&mut self) -> &mut TimerRegistry<REPEAT_LIMIT> {
        &mut self.repeats
    }

    fn dispatch_timers<const N: usize>(&mut self, table: fn(&mut Self) -> &mut TimerRegistry<N>) {
        let now = self.now();
        let snapshot = table(self).snapshot();

        for (index, slot) in snapshot.iter().enumerate() {
            let Some(entry) = slot else {
                continue;
            };
            if !entry.is_due(now) {
                continue;
            }
            table(self).settle(index, entry, now);
            entry.task.run(self);
        }
    }

    // -----------------------------------------------------------------------
    // Parallel tasks
    // -----------------------------------------------------------------------

    /// Run `task` on every pass, and while a behavior waits.
    pub fn start_parallel(&mut self, task: Task) -> Result<(), Error> {
        self.parallel.insert(task).map(|_| ())
    }

    pub fn stop_parallel(&mut self, task: &Task) {
        self.parallel.remove(task);
    }

    fn dispatch_parallel(&mut self) {
        for index in 0..PARALLEL_TASK_LIMIT {
            if let Some(task) = self.parallel.get(index) {
                task.run(self);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Deferred calls
    // -----------------------------------------------------------------------

    /// Run `task` once on the next pass.
    pub fn enqueue_once(&mut self, task: Task) -> Result<(), Error> {
        self.shared.enqueue_once(task)
    }

    fn dispatch_deferred(&mut self) {
        let shared = self.shared;
        let snapshot = shared.once_snapshot();

        for (index, slot) in snapshot.iter().enumerate() {
            let Some(task) = slot else {
                continue;
            };
            let coalesced = shared.take_once(index, task);
            if coalesced > SOFT_TIMER_COALESCE_LIMIT {
                log::warn!("soft timer lagging, {} ticks coalesced", coalesced);
            }
            task.run(self);
        }
    }

    // -----------------------------------------------------------------------
    // Behaviors
    // -----------------------------------------------------------------------

    /// Make `next` the current behavior.
    ///
    /// An outstanding wait is interrupted. The first switch takes effect
    /// immediately (`next` enters on the next pass); later switches run the
    /// current behavior's `on_exit` on the next pass and `next`'s `on_enter`
    /// on the pass after.
    pub fn switch_to(&mut self, next: &'static dyn Behavior) {
        if self.wait.is_waiting() {
            self.interrupt_wait();
        }
        self.engine.request(next);
    }

    fn run_behavior(&mut self) {
        let Some((behavior, phase)) = self.engine.begin_pass() else {
            return;
        };

        match phase {
            Phase::Entering => {
                log::info!("=== enter {} ===", behavior.name());
                behavior.on_enter(self);
            }
            Phase::Running => {
                if let Some(next) = behavior.on_run(self) {
                    self.switch_to(next);
                }
            }
            Phase::Exiting => {
                behavior.on_exit(self);
                log::info!("=== exit {} ===", behavior.name());
                self.engine.finish_exit();
            }
            Phase::Idle => {}
        }
    }

    // -----------------------------------------------------------------------
    // Wait
    // -----------------------------------------------------------------------

    /// Spin for `ticks` while keeping background work running.
    ///
    /// Only meaningful from inside the current behavior. Parallel tasks,
    /// deferred calls and timers keep running; other behaviors do not.
    ///
    /// # Returns
    /// - `Ok(Completed)`: time elapsed, or `bypass_wait` was called
    /// - `Ok(Interrupted)`: `interrupt_wait` or `switch_to` was called
    /// - `Err(ReentrantWait)`: a wait is already outstanding (logged)
    pub fn wait_for(&mut self, ticks: Ticks) -> Result<WaitOutcome, Error> {
        self.wait.begin()?;
        let start = self.now();
        let ticks = time::promote(ticks);

        let outcome = loop {
            self.poll_background();

            match self.wait.take_signal() {
                Some(WaitOutcome::Interrupted) => break WaitOutcome::Interrupted,
                Some(_) => break WaitOutcome::Completed,
                None => {}
            }

            if time::is_due(start, ticks, self.now()) {
                break WaitOutcome::Completed;
            }
        };

        self.wait.end();
        Ok(outcome)
    }

    /// Spin until `interrupt_wait` (`Interrupted`) or `bypass_wait`
    /// (`Bypassed`), keeping background work running.
    pub fn wait_forever(&mut self) -> Result<WaitOutcome, Error> {
        self.wait.begin()?;

        let outcome = loop {
            self.poll_background();

            if let Some(signal) = self.wait.take_signal() {
                break signal;
            }
        };

        self.wait.end();
        Ok(outcome)
    }

    /// End the outstanding wait with `Interrupted`.
    pub fn interrupt_wait(&mut self) {
        self.wait.interrupt();
        log::debug!("break wait");
    }

    /// End the outstanding wait as if it had run its course.
    pub fn bypass_wait(&mut self) {
        self.wait.bypass();
        log::debug!("ignore wait and continue");
    }

    pub fn is_waiting(&self) -> bool {
        self.wait.is_waiting()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
