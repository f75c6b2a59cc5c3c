//! Core runtime seams for the Revelar transition framework.
//!
//! This crate provides the pieces a host embeds to drive panel
//! transitions:
//! - Dual-rate time: [`Clock`], [`SystemClock`], [`ManualClock`]
//! - Cooperative frame scheduling: [`Scheduler`], [`SchedulerHandle`],
//!   [`TickTask`]
//! - The animator seam: [`Animator`], [`StateHash`], [`AnimatorBinding`]
//! - Warning diagnostics: [`Diagnostics`]
//!
//! The model is single-threaded and frame-driven: the host advances its
//! clock and calls [`Scheduler::tick`] once per frame; tasks suspend by
//! yielding a tick or waiting on scaled time, and poll wall-clock time by
//! yielding repeatedly.

mod animator;
mod clock;
mod diagnostics;
mod scheduler;

pub use animator::{
    Animator, AnimatorBinding, AnimatorCall, AnimatorResolver, MemoryAnimator, StateHash,
};
pub use clock::{Clock, ManualClock, SystemClock, PAUSE_EPSILON};
pub use diagnostics::{Diagnostics, MemoryDiagnostics, NullDiagnostics};
pub use scheduler::{Scheduler, SchedulerHandle, Step, TaskId, TickTask};
