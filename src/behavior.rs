//! # Exclusive-Behavior Engine
//!
//! Exactly one [`Behavior`] is current at a time. The main loop invokes it
//! once per pass, and the engine picks which of its phases runs:
//!
//! ```text
//!            switch_to(b)                 pass                      pass
//!   ┌──────┐ ───────────► ┌──────────┐ ─────────► ┌─────────┐
//!   │ Idle │              │ Entering │  on_enter  │ Running │◄─┐ on_run
//!   └──────┘              └──────────┘            └─────────┘──┘
//!                              ▲                       │ switch_to(n)
//!                              │ pass: on_exit,        ▼
//!                              │ current := n     ┌─────────┐
//!                              └───────────────── │ Exiting │
//!                                                 └─────────┘
//! ```
//!
//! A switch is staged, never applied mid-pass. The outgoing behavior's
//! `on_exit` gets a pass of its own, and the incoming behavior's `on_enter`
//! runs on the following pass, so teardown always completes before setup and
//! the two never share a pass.

use crate::scheduler::Scheduler;

/// A unit of sequential, switchable logic.
///
/// Behaviors are `'static` singletons; one that keeps state does so through
/// interior mutability (`Cell`, atomics) or in `static`s.
pub trait Behavior {
    fn name(&self) -> &'static str;

    /// One-time setup, on the first pass after becoming current.
    fn on_enter(&self, _sched: &mut Scheduler<'_>) {}

    /// Steady-state body, once per pass. Returning `Some(next)` is the same
    /// as calling `sched.switch_to(next)`.
    fn on_run(&self, sched: &mut Scheduler<'_>) -> Option<&'static dyn Behavior>;

    /// Teardown, on the pass after a switch was requested.
    fn on_exit(&self, _sched: &mut Scheduler<'_>) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No behavior has ever been selected.
    Idle,
    /// Current behavior has not run `on_enter` yet.
    Entering,
    Running,
    /// A switch is staged; current behavior runs `on_exit` next pass.
    Exiting,
}

pub struct Engine {
    current: Option<&'static dyn Behavior>,
    pending: Option<&'static dyn Behavior>,
    phase: Phase,
}

impl Engine {
    pub const fn new() -> Self {
        Self {
            current: None,
            pending: None,
            phase: Phase::Idle,
        }
    }

    pub fn current(&self) -> Option<&'static dyn Behavior> {
        self.current
    }

    pub fn pending(&self) -> Option<&'static dyn Behavior> {
        self.pending
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Stage a switch to `next`.
    pub fn request(&mut self, next: &'static dyn Behavior) {
        match self.phase {
            Phase::Idle | Phase::Entering => {
                // Nothing was set up yet, so there is nothing to tear down.
                self.current = Some(next);
                self.phase = Phase::Entering;
            }
            Phase::Running | Phase::Exiting => {
                self.pending = Some(next);
                self.phase = Phase::Exiting;
            }
        }
    }

    /// Decide what this pass runs.
    ///
    /// An `Entering` behavior is marked `Running` before its `on_enter` is
    /// called, so a switch requested from `on_enter` is staged normally.
    pub fn begin_pass(&mut self) -> Option<(&'static dyn Behavior, Phase)> {
        let current = self.current?;
        let phase = self.phase;
        if phase == Phase::Entering {
            self.phase = Phase::Running;
        }
        Some((current, phase))
    }

    /// Complete a switch after the outgoing behavior's `on_exit`.
    pub fn finish_exit(&mut self) {
        if let Some(next) = self.pending.take() {
            self.current = Some(next);
        }
        self.phase = Phase::Entering;
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Behavior for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn on_run(&self, _sched: &mut Scheduler<'_>) -> Option<&'static dyn Behavior> {
            None
        }
    }

    static A: Named = Named("a");
    static B: Named = Named("b");
    static C: Named = Named("c");

    fn name_of(b: Option<&'static dyn Behavior>) -> Option<&'static str> {
        b.map(|b| b.name())
    }

    #[test]
    fn test_idle_engine_runs_nothing() {
        let mut engine = Engine::new();
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.begin_pass().is_none());
    }

    #[test]
    fn test_first_switch_is_immediate() {
        let mut engine = Engine::new();
        engine.request(&A);
        assert_eq!(name_of(engine.current()), Some("a"));
        assert_eq!(engine.phase(), Phase::Entering);

        let (b, phase) = engine.begin_pass().unwrap();
        assert_eq!(b.name(), "a");
        assert_eq!(phase, Phase::Entering);
        assert_eq!(engine.phase(), Phase::Running);
    }

    #[test]
    fn test_switch_from_running_is_staged() {
        let mut engine = Engine::new();
        engine.request(&A);
        engine.begin_pass();

        engine.request(&B);
        assert_eq!(name_of(engine.current()), Some("a"));
        assert_eq!(name_of(engine.pending()), Some("b"));

        let (b, phase) = engine.begin_pass().unwrap();
        assert_eq!((b.name(), phase), ("a", Phase::Exiting));
        engine.finish_exit();

        let (b, phase) = engine.begin_pass().unwrap();
        assert_eq!((b.name(), phase), ("b", Phase::Entering));
    }

    #[test]
    fn test_switch_before_enter_replaces_current() {
        let mut engine = Engine::new();
        engine.request(&A);
        engine.request(&B);
        assert_eq!(name_of(engine.current()), Some("b"));
        assert_eq!(engine.phase(), Phase::Entering);
        assert!(engine.pending().is_none());
    }

    #[test]
    fn test_latest_request_wins_while_exiting() {
        let mut engine = Engine::new();
        engine.request(&A);
        engine.begin_pass();
        engine.request(&B);
        engine.request(&C);

        engine.begin_pass();
        engine.finish_exit();
        assert_eq!(name_of(engine.current()), Some("c"));
    }
}
