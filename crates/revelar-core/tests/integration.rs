//! Integration tests for revelar-core.
//!
//! These tests drive the scheduler, clock, and animator seams together the
//! way a host frame loop would.

use revelar_core::{
    Animator, AnimatorBinding, Clock, ManualClock, MemoryAnimator, Scheduler, StateHash, Step,
    TickTask,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Task that polls wall time by yielding until a deadline passes.
struct WallPoll {
    clock: Arc<dyn Clock>,
    deadline: f64,
    finished: Arc<AtomicUsize>,
}

impl TickTask for WallPoll {
    fn step(&mut self) -> Step {
        if self.clock.wall_time() >= self.deadline {
            self.finished.fetch_add(1, Ordering::SeqCst);
            return Step::Done;
        }
        Step::Yield
    }
}

// =============================================================================
// Scheduler + Clock Integration
// =============================================================================

#[test]
fn test_wall_poll_finishes_while_clock_paused() {
    let clock = Arc::new(ManualClock::new());
    let mut scheduler = Scheduler::new(clock.clone() as Arc<dyn Clock>);
    let finished = Arc::new(AtomicUsize::new(0));

    clock.set_time_scale(0.0);
    let task = WallPoll {
        clock: scheduler.clock(),
        deadline: 0.5,
        finished: Arc::clone(&finished),
    };
    scheduler.handle().spawn(Box::new(task));

    // Scaled time never moves, wall time does.
    for _ in 0..6 {
        clock.advance(0.1);
        scheduler.tick();
    }
    assert_eq!(finished.load(Ordering::SeqCst), 1);
    assert!(scheduler.is_idle());
    assert_eq!(clock.scaled_time(), 0.0);
}

#[test]
fn test_wall_poll_with_zero_deadline_finishes_at_spawn() {
    let clock = Arc::new(ManualClock::new());
    let scheduler = Scheduler::new(clock as Arc<dyn Clock>);
    let finished = Arc::new(AtomicUsize::new(0));

    let task = WallPoll {
        clock: scheduler.clock(),
        deadline: 0.0,
        finished: Arc::clone(&finished),
    };
    let id = scheduler.handle().spawn(Box::new(task));

    assert!(id.is_none());
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cancel_mid_wait_drops_remaining_work() {
    let clock = Arc::new(ManualClock::new());
    let mut scheduler = Scheduler::new(clock.clone() as Arc<dyn Clock>);
    let handle = scheduler.handle();
    let finished = Arc::new(AtomicUsize::new(0));

    let task = WallPoll {
        clock: scheduler.clock(),
        deadline: 1.0,
        finished: Arc::clone(&finished),
    };
    let id = handle.spawn(Box::new(task)).expect("suspended");

    clock.advance(0.5);
    scheduler.tick();
    handle.cancel(id);

    for _ in 0..10 {
        clock.advance(0.5);
        scheduler.tick();
    }
    assert_eq!(finished.load(Ordering::SeqCst), 0);
    assert!(scheduler.is_idle());
}

#[test]
fn test_pause_mid_scaled_wait_then_resume() {
    struct ScaledOnce {
        fired: Arc<AtomicUsize>,
        waited: bool,
    }
    impl TickTask for ScaledOnce {
        fn step(&mut self) -> Step {
            if self.waited {
                self.fired.fetch_add(1, Ordering::SeqCst);
                return Step::Done;
            }
            self.waited = true;
            Step::Wait(1.0)
        }
    }

    let clock = Arc::new(ManualClock::new());
    let mut scheduler = Scheduler::new(clock.clone() as Arc<dyn Clock>);
    let fired = Arc::new(AtomicUsize::new(0));
    scheduler.handle().spawn(Box::new(ScaledOnce {
        fired: Arc::clone(&fired),
        waited: false,
    }));

    clock.advance(0.5);
    scheduler.tick();
    clock.set_time_scale(0.0);
    for _ in 0..5 {
        clock.advance(1.0);
        scheduler.tick();
    }
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    clock.set_time_scale(1.0);
    clock.advance(0.5);
    scheduler.tick();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Animator Seam Integration
// =============================================================================

#[test]
fn test_task_drives_animator_through_binding() {
    struct PlayOnResume {
        binding: Arc<AnimatorBinding>,
        played: bool,
    }
    impl TickTask for PlayOnResume {
        fn step(&mut self) -> Step {
            if self.played {
                return Step::Done;
            }
            self.played = true;
            if let Some(animator) = self.binding.resolve() {
                animator.play_state("Open");
            }
            Step::Yield
        }
    }

    let clock = Arc::new(ManualClock::new());
    let mut scheduler = Scheduler::new(clock as Arc<dyn Clock>);
    let animator = Arc::new(MemoryAnimator::in_state("Closed"));
    let shared = Arc::clone(&animator) as Arc<dyn Animator>;
    let binding = Arc::new(AnimatorBinding::lazy(Box::new(move || {
        Some(Arc::clone(&shared))
    })));

    scheduler.handle().spawn(Box::new(PlayOnResume {
        binding: Arc::clone(&binding),
        played: false,
    }));

    assert_eq!(animator.current_state(), StateHash::of("Open"));
    assert!(binding.attempted());
    scheduler.tick();
}
