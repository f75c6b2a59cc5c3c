//! Process-wide transition tuning.
//!
//! One tunable lives here: the wall-clock deadline for trigger-mode
//! polling. It is read at fire time, so changes apply to waits started
//! afterward.

use std::sync::atomic::{AtomicU32, Ordering};

/// Default trigger-polling deadline in seconds.
pub const DEFAULT_MAX_WAIT_DURATION: f32 = 5.0;

// Bit pattern of 5.0f32; f32::to_bits is not const on our MSRV.
static MAX_WAIT_BITS: AtomicU32 = AtomicU32::new(0x40A0_0000);

/// Current process-wide trigger-polling deadline in seconds.
#[must_use]
pub fn max_wait_duration() -> f32 {
    f32::from_bits(MAX_WAIT_BITS.load(Ordering::Relaxed))
}

/// Set the process-wide trigger-polling deadline.
///
/// Tests that need a custom deadline should prefer the per-controller
/// override so they do not interfere with each other.
pub fn set_max_wait_duration(seconds: f32) {
    MAX_WAIT_BITS.store(seconds.to_bits(), Ordering::Relaxed);
}
