//! Dual-rate time sources for frame-driven transitions.
//!
//! Transitions measure time two ways: *scaled* time advances at the
//! simulation's `time_scale` and freezes while the simulation is paused,
//! while *wall* time always advances. Duration waits normally run on
//! scaled time; when the clock is paused they fall back to polling wall
//! time so a frozen simulation can still finish its panel transitions.

use std::sync::Mutex;
use std::time::Instant;

/// Scale magnitudes below this are treated as paused.
pub const PAUSE_EPSILON: f32 = 1e-6;

/// Shared time source consulted by the scheduler and transition waiters.
///
/// Mutation goes through `&self`: the clock is shared behind an `Arc` and
/// the pause-after-transition side effect sets the scale from inside a
/// running task.
pub trait Clock: Send + Sync {
    /// Current simulation speed multiplier. `0.0` means paused.
    fn time_scale(&self) -> f32;

    /// Set the simulation speed multiplier.
    fn set_time_scale(&self, scale: f32);

    /// Seconds of real time since the clock started. Unaffected by scale.
    fn wall_time(&self) -> f64;

    /// Seconds of simulation time since the clock started. Advances at
    /// `time_scale` relative to wall time; frozen while paused.
    fn scaled_time(&self) -> f64;

    /// Whether the simulation clock is effectively stopped.
    fn is_paused(&self) -> bool {
        self.time_scale().abs() < PAUSE_EPSILON
    }
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    scale: f32,
    /// Wall time when the current scale took effect.
    wall_base: f64,
    /// Scaled time accumulated before the current scale took effect.
    scaled_base: f64,
}

/// Production clock anchored to [`Instant`].
///
/// Scaled time is integrated lazily: each `set_time_scale` closes the
/// current segment and re-anchors, so `scaled_time` is exact without any
/// per-frame bookkeeping.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
    segment: Mutex<Segment>,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Create a clock running at scale 1.0.
    #[must_use]
    pub fn new() -> Self {
        Self::with_scale(1.0)
    }

    /// Create a clock running at the given scale.
    #[must_use]
    pub fn with_scale(scale: f32) -> Self {
        Self {
            origin: Instant::now(),
            segment: Mutex::new(Segment {
                scale,
                wall_base: 0.0,
                scaled_base: 0.0,
            }),
        }
    }

    fn raw_wall(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

impl Clock for SystemClock {
    fn time_scale(&self) -> f32 {
        self.segment
            .lock()
            .expect("SystemClock mutex poisoned")
            .scale
    }

    fn set_time_scale(&self, scale: f32) {
        let now = self.raw_wall();
        let mut segment = self.segment.lock().expect("SystemClock mutex poisoned");
        segment.scaled_base += (now - segment.wall_base) * f64::from(segment.scale);
        segment.wall_base = now;
        segment.scale = scale;
    }

    fn wall_time(&self) -> f64 {
        self.raw_wall()
    }

    fn scaled_time(&self) -> f64 {
        let now = self.raw_wall();
        let segment = self.segment.lock().expect("SystemClock mutex poisoned");
        segment.scaled_base + (now - segment.wall_base) * f64::from(segment.scale)
    }
}

#[derive(Debug, Clone, Copy)]
struct ManualState {
    scale: f32,
    wall: f64,
    scaled: f64,
}

/// Deterministic clock for testing. Time moves only via [`advance`].
///
/// [`advance`]: ManualClock::advance
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Create a clock at time zero, scale 1.0.
    #[must_use]
    pub fn new() -> Self {
        Self::with_scale(1.0)
    }

    /// Create a clock at time zero with the given scale.
    #[must_use]
    pub fn with_scale(scale: f32) -> Self {
        Self {
            state: Mutex::new(ManualState {
                scale,
                wall: 0.0,
                scaled: 0.0,
            }),
        }
    }

    /// Advance wall time by `dt` seconds; scaled time advances by
    /// `dt * time_scale`.
    pub fn advance(&self, dt: f64) {
        let mut state = self.state.lock().expect("ManualClock mutex poisoned");
        state.wall += dt;
        state.scaled += dt * f64::from(state.scale);
    }
}

impl Clock for ManualClock {
    fn time_scale(&self) -> f32 {
        self.state.lock().expect("ManualClock mutex poisoned").scale
    }

    fn set_time_scale(&self, scale: f32) {
        self.state.lock().expect("ManualClock mutex poisoned").scale = scale;
    }

    fn wall_time(&self) -> f64 {
        self.state.lock().expect("ManualClock mutex poisoned").wall
    }

    fn scaled_time(&self) -> f64 {
        self.state.lock().expect("ManualClock mutex poisoned").scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // =========================================================================
    // SystemClock Tests
    // =========================================================================

    #[test]
    fn test_system_clock_default_scale() {
        let clock = SystemClock::new();
        assert_eq!(clock.time_scale(), 1.0);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_system_clock_set_time_scale() {
        let clock = SystemClock::new();
        clock.set_time_scale(2.0);
        assert_eq!(clock.time_scale(), 2.0);
    }

    #[test]
    fn test_system_clock_wall_time_monotonic() {
        let clock = SystemClock::new();
        let first = clock.wall_time();
        let second = clock.wall_time();
        assert!(second >= first);
        assert!(first >= 0.0);
    }

    #[test]
    fn test_system_clock_pause_reports_paused() {
        let clock = SystemClock::new();
        clock.set_time_scale(0.0);
        assert!(clock.is_paused());

        clock.set_time_scale(1e-9);
        assert!(clock.is_paused());

        clock.set_time_scale(0.5);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_system_clock_scaled_time_frozen_while_paused() {
        let clock = SystemClock::new();
        clock.set_time_scale(0.0);
        let before = clock.scaled_time();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let after = clock.scaled_time();
        assert_eq!(before, after);
        assert!(clock.wall_time() > 0.0);
    }

    #[test]
    fn test_system_clock_rescale_keeps_accumulated() {
        let clock = SystemClock::new();
        let before = clock.scaled_time();
        clock.set_time_scale(10.0);
        clock.set_time_scale(0.0);
        // Whatever accumulated is locked in once paused.
        let frozen = clock.scaled_time();
        assert!(frozen >= before);
        assert_eq!(clock.scaled_time(), frozen);
    }

    // =========================================================================
    // ManualClock Tests
    // =========================================================================

    #[test]
    fn test_manual_clock_starts_at_zero() {
        let clock = ManualClock::new();
        assert_eq!(clock.wall_time(), 0.0);
        assert_eq!(clock.scaled_time(), 0.0);
        assert_eq!(clock.time_scale(), 1.0);
    }

    #[test]
    fn test_manual_clock_advance_scales() {
        let clock = ManualClock::with_scale(2.0);
        clock.advance(1.0);
        assert_eq!(clock.wall_time(), 1.0);
        assert_eq!(clock.scaled_time(), 2.0);
    }

    #[test]
    fn test_manual_clock_pause_freezes_scaled() {
        let clock = ManualClock::new();
        clock.advance(1.0);
        clock.set_time_scale(0.0);
        clock.advance(5.0);
        assert_eq!(clock.wall_time(), 6.0);
        assert_eq!(clock.scaled_time(), 1.0);
        assert!(clock.is_paused());
    }

    #[test]
    fn test_manual_clock_rescale_keeps_accumulated() {
        let clock = ManualClock::new();
        clock.advance(1.0);
        clock.set_time_scale(0.5);
        clock.advance(1.0);
        assert_eq!(clock.scaled_time(), 1.5);
        assert_eq!(clock.wall_time(), 2.0);
    }

    proptest! {
        #[test]
        fn prop_manual_clock_scaled_never_outruns_wall_at_unit_scale(
            steps in proptest::collection::vec(0.0f64..10.0, 1..20)
        ) {
            let clock = ManualClock::new();
            let mut total = 0.0;
            for dt in &steps {
                clock.advance(*dt);
                total += dt;
            }
            prop_assert!((clock.wall_time() - total).abs() < 1e-9);
            prop_assert!((clock.scaled_time() - total).abs() < 1e-9);
        }

        #[test]
        fn prop_manual_clock_paused_scaled_is_constant(
            steps in proptest::collection::vec(0.0f64..10.0, 1..20)
        ) {
            let clock = ManualClock::with_scale(0.0);
            for dt in &steps {
                clock.advance(*dt);
            }
            prop_assert_eq!(clock.scaled_time(), 0.0);
        }
    }
}
