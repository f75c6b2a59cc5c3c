//! Frame-loop harness for controller tests.
//!
//! Owns the manual clock and the scheduler so a test can drive transitions
//! frame by frame without wiring those up itself.

use revelar_core::{Clock, ManualClock, Scheduler, SchedulerHandle};
use revelar_panel::{ShowHideController, TransitionMode};
use std::sync::Arc;

/// Default frame duration: 60 frames per second.
pub const DEFAULT_FRAME_DT: f64 = 1.0 / 60.0;

/// Test harness simulating a host frame loop.
pub struct Harness {
    clock: Arc<ManualClock>,
    scheduler: Scheduler,
    frame_dt: f64,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    /// Create a harness with a fresh clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new());
        let scheduler = Scheduler::new(Arc::clone(&clock) as Arc<dyn Clock>);
        Self {
            clock,
            scheduler,
            frame_dt: DEFAULT_FRAME_DT,
        }
    }

    /// Change the per-frame time step.
    #[must_use]
    pub fn with_frame_dt(mut self, dt: f64) -> Self {
        self.frame_dt = dt;
        self
    }

    /// The clock driving the harness.
    #[must_use]
    pub fn clock(&self) -> Arc<ManualClock> {
        Arc::clone(&self.clock)
    }

    /// A handle for spawning tasks outside a controller.
    #[must_use]
    pub fn handle(&self) -> SchedulerHandle {
        self.scheduler.handle()
    }

    /// A bare controller on this harness's scheduler; chain the
    /// controller's builders to attach a panel and animator.
    #[must_use]
    pub fn controller(&self, mode: TransitionMode) -> ShowHideController {
        ShowHideController::new(self.scheduler.handle(), mode)
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        self.step_by(self.frame_dt);
    }

    /// Advance one frame of a specific duration.
    pub fn step_by(&mut self, dt: f64) {
        self.clock.advance(dt);
        self.scheduler.tick();
    }

    /// Run frames until at least `seconds` of wall time pass.
    pub fn run_for(&mut self, seconds: f64) {
        let start = self.clock.wall_time();
        while self.clock.wall_time() - start < seconds {
            self.step();
        }
    }

    /// Run frames until the predicate holds, up to `max_frames`. Returns
    /// `true` if the predicate was met within the budget.
    pub fn run_until(&mut self, max_frames: usize, predicate: impl Fn() -> bool) -> bool {
        for _ in 0..max_frames {
            if predicate() {
                return true;
            }
            self.step();
        }
        predicate()
    }

    /// Whether any task is still live.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// Assert that no task is live.
    ///
    /// # Panics
    ///
    /// Panics if a task is still scheduled.
    pub fn assert_idle(&self) {
        assert!(
            self.is_idle(),
            "expected an idle scheduler, {} task(s) still live",
            self.scheduler.task_count()
        );
    }
}
