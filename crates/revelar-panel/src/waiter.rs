//! Transition waiters: the per-transition state machines.
//!
//! A waiter is a [`TickTask`] that drives one show or hide transition from
//! activation through the animation wait to the completion side effects.
//! Two variants exist, selected by [`TransitionMode`] at controller
//! construction: the state variant force-plays a named state, the trigger
//! variant fires a trigger and polls state identity until the goal is
//! reached, the state changes at all, or a wall-clock deadline passes.
//!
//! Failure modes degrade, never error: a missing panel skips activation, a
//! missing animator or empty goal skips the animation entirely, and the
//! completion callback fires on every path except cancellation.

use crate::controller::{ActiveWait, TransitionCallback};
use crate::panel::Panel;
use crate::tuning;
use revelar_core::{Animator, AnimatorBinding, Clock, Diagnostics, StateHash, Step, TickTask};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a transition reaches its goal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransitionMode {
    /// Force-play the goal state directly.
    State,
    /// Fire a trigger and poll until the goal state is entered.
    #[default]
    Trigger,
}

/// How a trigger-mode poll ended. Only `Completed` earns the follow-up
/// duration wait; callers never see the distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitOutcome {
    Completed,
    TimedOut,
    Skipped,
}

/// Poll-loop decision for one tick: `None` keeps polling, `Some` ends the
/// loop with the exit classification.
///
/// The loop runs while the state is unchanged, not at the goal, and not
/// past the deadline. Reaching the goal after the deadline counts as a
/// timeout; any third state ends the loop without a duration wait.
pub(crate) fn poll_verdict(
    current: StateHash,
    start: StateHash,
    goal: StateHash,
    timed_out: bool,
) -> Option<WaitOutcome> {
    if current != goal && current == start && !timed_out {
        return None;
    }
    Some(if current == goal && !timed_out {
        WaitOutcome::Completed
    } else if timed_out {
        WaitOutcome::TimedOut
    } else {
        WaitOutcome::Skipped
    })
}

/// Everything one transition needs, captured when Show/Hide is called.
pub(crate) struct TransitionRequest {
    /// Goal state name (state mode) or trigger name (trigger mode).
    pub(crate) goal: String,
    /// `true` for show, `false` for hide.
    pub(crate) panel_active: bool,
    /// Pause the clock once the transition completes.
    pub(crate) pause_after: bool,
    /// Whether to wait for the animation at all.
    pub(crate) wait: bool,
    pub(crate) panel: Option<Arc<dyn Panel>>,
    pub(crate) binding: Arc<AnimatorBinding>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) diagnostics: Arc<dyn Diagnostics>,
    pub(crate) active: ActiveWait,
    pub(crate) callback: Option<TransitionCallback>,
    /// Per-controller deadline override; `None` reads the process-wide
    /// tunable at fire time.
    pub(crate) max_wait: Option<f32>,
}

impl TransitionRequest {
    fn effective_max_wait(&self) -> f32 {
        self.max_wait.unwrap_or_else(tuning::max_wait_duration)
    }

    fn warn_on_paused_clock(&self, animator: &dyn Animator) {
        if self.clock.is_paused() && !animator.unscaled_time() {
            self.diagnostics.warn(&format!(
                "transition '{}': clock is paused and the animator advances on scaled time; the animation will not progress",
                self.goal
            ));
        }
    }

    /// Completion side effects in their required order: panel visibility,
    /// then pause, then releasing the active slot, then the callback.
    fn finish(&mut self) -> Step {
        if !self.panel_active {
            if let Some(panel) = &self.panel {
                panel.set_active(false);
            }
        }
        if self.pause_after {
            self.clock.set_time_scale(0.0);
        }
        *self
            .active
            .lock()
            .expect("ShowHideController mutex poisoned") = None;
        if let Some(callback) = self.callback.take() {
            callback();
        }
        Step::Done
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatePhase {
    Activate,
    Play,
    Measure,
    BusyWait,
    Finish,
}

/// State-mode transition: force-play the goal, then wait out its clip.
///
/// This variant carries no timeout. If the clock stays paused through a
/// scaled duration wait the task stays suspended until the clock resumes;
/// the only skip paths are a missing animator or an empty goal.
pub(crate) struct StateWaiter {
    request: TransitionRequest,
    phase: StatePhase,
    animator: Option<Arc<dyn Animator>>,
    wall_deadline: f64,
}

impl StateWaiter {
    pub(crate) fn new(request: TransitionRequest) -> Self {
        Self {
            request,
            phase: StatePhase::Activate,
            animator: None,
            wall_deadline: 0.0,
        }
    }
}

impl TickTask for StateWaiter {
    fn step(&mut self) -> Step {
        loop {
            match self.phase {
                StatePhase::Activate => {
                    self.phase = StatePhase::Play;
                    if let Some(panel) = &self.request.panel {
                        if !panel.is_active() {
                            panel.set_active(true);
                            // Give activation listeners a tick before the
                            // animation starts.
                            return Step::Yield;
                        }
                    }
                }
                StatePhase::Play => {
                    let Some(animator) = self.request.binding.resolve() else {
                        self.phase = StatePhase::Finish;
                        continue;
                    };
                    if self.request.goal.is_empty() {
                        self.phase = StatePhase::Finish;
                        continue;
                    }
                    self.request.warn_on_paused_clock(animator.as_ref());
                    animator.play_state(&self.request.goal);
                    if !self.request.wait {
                        self.phase = StatePhase::Finish;
                        continue;
                    }
                    self.animator = Some(animator);
                    self.phase = StatePhase::Measure;
                    // Let the forced state register before measuring.
                    return Step::Yield;
                }
                StatePhase::Measure => {
                    let length = self
                        .animator
                        .as_ref()
                        .map_or(0.0, |animator| animator.current_clip_length());
                    if self.request.clock.is_paused() {
                        self.wall_deadline = self.request.clock.wall_time() + f64::from(length);
                        self.phase = StatePhase::BusyWait;
                    } else {
                        self.phase = StatePhase::Finish;
                        // A zero-length wait still suspends for one tick.
                        return Step::Wait(length);
                    }
                }
                StatePhase::BusyWait => {
                    // Deadline checked before the first yield, so a
                    // zero-length wait finishes in the same step.
                    if self.request.clock.wall_time() < self.wall_deadline {
                        return Step::Yield;
                    }
                    self.phase = StatePhase::Finish;
                }
                StatePhase::Finish => return self.request.finish(),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerPhase {
    Activate,
    Fire,
    Poll,
    Refresh,
    Measure,
    BusyWait,
    Finish,
}

/// Trigger-mode transition: fire a trigger, poll state identity until the
/// goal is reached or the deadline passes, then wait out the goal clip.
pub(crate) struct TriggerWaiter {
    request: TransitionRequest,
    phase: TriggerPhase,
    animator: Option<Arc<dyn Animator>>,
    goal_hash: StateHash,
    start_hash: StateHash,
    current: StateHash,
    wall_deadline: f64,
}

impl TriggerWaiter {
    pub(crate) fn new(request: TransitionRequest) -> Self {
        Self {
            request,
            phase: TriggerPhase::Activate,
            animator: None,
            goal_hash: StateHash(0),
            start_hash: StateHash(0),
            current: StateHash(0),
            wall_deadline: 0.0,
        }
    }
}

impl TickTask for TriggerWaiter {
    fn step(&mut self) -> Step {
        loop {
            match self.phase {
                // Hide never pre-activates; only show needs the panel on.
                TriggerPhase::Activate => {
                    self.phase = TriggerPhase::Fire;
                    if self.request.panel_active {
                        if let Some(panel) = &self.request.panel {
                            if !panel.is_active() {
                                panel.set_active(true);
                                return Step::Yield;
                            }
                        }
                    }
                }
                TriggerPhase::Fire => {
                    let Some(animator) = self.request.binding.resolve() else {
                        self.phase = TriggerPhase::Finish;
                        continue;
                    };
                    if self.request.goal.is_empty() || !animator.owner_active() {
                        self.phase = TriggerPhase::Finish;
                        continue;
                    }
                    self.request.warn_on_paused_clock(animator.as_ref());
                    self.goal_hash = StateHash::of(&self.request.goal);
                    self.start_hash = animator.current_state();
                    self.current = self.start_hash;
                    let budget = self.request.effective_max_wait();
                    self.wall_deadline = self.request.clock.wall_time() + f64::from(budget);
                    animator.fire_trigger(&self.request.goal);
                    self.animator = Some(animator);
                    if !self.request.wait {
                        self.phase = TriggerPhase::Finish;
                        continue;
                    }
                    self.phase = TriggerPhase::Poll;
                }
                TriggerPhase::Poll => {
                    let timed_out = self.request.clock.wall_time() >= self.wall_deadline;
                    match poll_verdict(self.current, self.start_hash, self.goal_hash, timed_out) {
                        None => {
                            self.phase = TriggerPhase::Refresh;
                            return Step::Yield;
                        }
                        Some(WaitOutcome::Completed) => self.phase = TriggerPhase::Measure,
                        Some(WaitOutcome::TimedOut | WaitOutcome::Skipped) => {
                            self.phase = TriggerPhase::Finish;
                        }
                    }
                }
                TriggerPhase::Refresh => {
                    // An animator that went invalid keeps its last observed
                    // hash instead of being queried.
                    if let Some(animator) = &self.animator {
                        if animator.is_ready() {
                            self.current = animator.current_state();
                        }
                    }
                    self.phase = TriggerPhase::Poll;
                }
                TriggerPhase::Measure => {
                    let length = self
                        .animator
                        .as_ref()
                        .map_or(0.0, |animator| animator.current_clip_length());
                    if self.request.clock.is_paused() {
                        self.wall_deadline = self.request.clock.wall_time() + f64::from(length);
                        self.phase = TriggerPhase::BusyWait;
                    } else {
                        self.phase = TriggerPhase::Finish;
                        return Step::Wait(length);
                    }
                }
                TriggerPhase::BusyWait => {
                    if self.request.clock.wall_time() < self.wall_deadline {
                        return Step::Yield;
                    }
                    self.phase = TriggerPhase::Finish;
                }
                TriggerPhase::Finish => return self.request.finish(),
            }
        }
    }
}
