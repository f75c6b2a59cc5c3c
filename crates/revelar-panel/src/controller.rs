//! Show/hide façade owning at most one in-flight transition wait.
//!
//! The controller is the public entry point: `show` and `hide` cancel any
//! wait already in flight (silently — its callback never fires) and spawn
//! a fresh waiter in the mode fixed at construction. Completion is
//! signaled only through the per-call callback.

use crate::panel::Panel;
use crate::waiter::{StateWaiter, TransitionMode, TransitionRequest, TriggerWaiter};
use revelar_core::{
    Animator, AnimatorBinding, AnimatorResolver, Diagnostics, NullDiagnostics, SchedulerHandle,
    TaskId, TickTask,
};
use std::sync::{Arc, Mutex};

/// Completion callback for a transition. Fires exactly once on natural
/// completion; never fires if the wait is superseded.
pub type TransitionCallback = Box<dyn FnOnce() + Send>;

/// The single in-flight wait slot, shared between a controller and its
/// current waiter. The waiter clears it on natural completion; the
/// controller takes it on supersession.
pub(crate) type ActiveWait = Arc<Mutex<Option<TaskId>>>;

/// Drives show/hide transitions for one panel.
///
/// Holds non-owning references to the panel and animator; either may be
/// absent, in which case the affected steps degrade to no-ops and
/// transitions still complete.
pub struct ShowHideController {
    handle: SchedulerHandle,
    mode: TransitionMode,
    panel: Option<Arc<dyn Panel>>,
    binding: Arc<AnimatorBinding>,
    diagnostics: Arc<dyn Diagnostics>,
    active: ActiveWait,
    max_wait: Option<f32>,
}

impl ShowHideController {
    /// Create a controller with no panel and no animator.
    #[must_use]
    pub fn new(handle: SchedulerHandle, mode: TransitionMode) -> Self {
        Self {
            handle,
            mode,
            panel: None,
            binding: Arc::new(AnimatorBinding::missing()),
            diagnostics: Arc::new(NullDiagnostics),
            active: Arc::new(Mutex::new(None)),
            max_wait: None,
        }
    }

    /// Attach the panel to activate and deactivate.
    #[must_use]
    pub fn with_panel(mut self, panel: Arc<dyn Panel>) -> Self {
        self.panel = Some(panel);
        self
    }

    /// Use an already-resolved animator. Replaces any previously
    /// configured animator source.
    #[must_use]
    pub fn with_animator(mut self, animator: Arc<dyn Animator>) -> Self {
        self.binding = Arc::new(AnimatorBinding::resolved(animator));
        self
    }

    /// Look the animator up lazily, at most once, on first use. Replaces
    /// any previously configured animator source.
    #[must_use]
    pub fn with_animator_resolver(mut self, resolver: AnimatorResolver) -> Self {
        self.binding = Arc::new(AnimatorBinding::lazy(resolver));
        self
    }

    /// Install a warning sink. The default discards warnings.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Override the process-wide trigger-polling deadline for this
    /// controller.
    #[must_use]
    pub fn with_max_wait(mut self, seconds: f32) -> Self {
        self.max_wait = Some(seconds);
        self
    }

    /// The transition mode fixed at construction.
    #[must_use]
    pub const fn mode(&self) -> TransitionMode {
        self.mode
    }

    /// Whether a wait is currently in flight.
    #[must_use]
    pub fn has_active_wait(&self) -> bool {
        self.active
            .lock()
            .expect("ShowHideController mutex poisoned")
            .is_some()
    }

    /// Show the panel via a transition toward `goal`, waiting for the
    /// animation. `pause_after` pauses the clock once the transition
    /// completes.
    pub fn show(&mut self, goal: &str, pause_after: bool, on_complete: Option<TransitionCallback>) {
        self.start(goal, true, pause_after, true, on_complete);
    }

    /// Show without waiting for the animation: the goal is still played
    /// or fired, but completion happens immediately.
    pub fn show_no_wait(
        &mut self,
        goal: &str,
        pause_after: bool,
        on_complete: Option<TransitionCallback>,
    ) {
        self.start(goal, true, pause_after, false, on_complete);
    }

    /// Hide the panel via a transition toward `goal`, waiting for the
    /// animation, then deactivate it.
    pub fn hide(&mut self, goal: &str, on_complete: Option<TransitionCallback>) {
        self.start(goal, false, false, true, on_complete);
    }

    /// Reset a pending trigger immediately. Synchronous and idempotent;
    /// triggers lazy animator resolution.
    pub fn clear_trigger(&self, trigger: &str) {
        let Some(animator) = self.binding.resolve() else {
            return;
        };
        if !trigger.is_empty() && animator.is_ready() {
            animator.reset_trigger(trigger);
        }
    }

    fn start(
        &mut self,
        goal: &str,
        panel_active: bool,
        pause_after: bool,
        wait: bool,
        on_complete: Option<TransitionCallback>,
    ) {
        self.cancel_active();
        let request = TransitionRequest {
            goal: goal.to_string(),
            panel_active,
            pause_after,
            wait,
            panel: self.panel.clone(),
            binding: Arc::clone(&self.binding),
            clock: self.handle.clock(),
            diagnostics: Arc::clone(&self.diagnostics),
            active: Arc::clone(&self.active),
            callback: on_complete,
            max_wait: self.max_wait,
        };
        let task: Box<dyn TickTask> = match self.mode {
            TransitionMode::State => Box::new(StateWaiter::new(request)),
            TransitionMode::Trigger => Box::new(TriggerWaiter::new(request)),
        };
        // A task that completes during spawn already cleared the slot; only
        // a suspended one claims it.
        if let Some(id) = self.handle.spawn(task) {
            *self
                .active
                .lock()
                .expect("ShowHideController mutex poisoned") = Some(id);
        }
    }

    fn cancel_active(&self) {
        let prior = self
            .active
            .lock()
            .expect("ShowHideController mutex poisoned")
            .take();
        if let Some(id) = prior {
            self.handle.cancel(id);
        }
    }
}
