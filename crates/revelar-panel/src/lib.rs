//! Panel show/hide transitions driven by an external animator.
//!
//! This crate layers the transition protocol on top of `revelar-core`:
//! - [`ShowHideController`]: the public façade (`show` / `hide` /
//!   `clear_trigger`), owning at most one in-flight wait
//! - [`TransitionMode`]: state-mode (force-play) vs trigger-mode
//!   (fire-and-poll) wait protocols
//! - [`Panel`]: the activation seam to the host's UI element
//! - [`tuning`]: the process-wide trigger-polling deadline
//!
//! Transitions are spawned onto a host-owned scheduler and complete
//! through per-call callbacks; every failure mode (missing panel, missing
//! animator, invalidated animator, timeout) degrades to early completion
//! rather than an error.

pub mod controller;
pub mod panel;
pub mod tuning;
mod waiter;

pub use controller::{ShowHideController, TransitionCallback};
pub use panel::{MemoryPanel, Panel};
pub use tuning::{max_wait_duration, set_max_wait_duration, DEFAULT_MAX_WAIT_DURATION};
pub use waiter::TransitionMode;
