//! Closed-loop transition tests: controller, scripted animator, and
//! harness working together without the test touching the animator
//! mid-run.

use revelar_core::{Animator, AnimatorCall, Clock};
use revelar_panel::{MemoryPanel, Panel, ShowHideController, TransitionCallback, TransitionMode};
use revelar_test::{Harness, ScriptedAnimator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Trigger names match their destination states; trigger-mode polling
// compares the state hash against the hash of the trigger name.
const DOOR_SCRIPT: &str = r#"
    initial = "Closed"

    [clips]
    Open = 0.5
    Closed = 0.25

    [[reactions]]
    trigger = "Open"
    target = "Open"
    after_polls = 2

    [[reactions]]
    trigger = "Closed"
    target = "Closed"
"#;

fn door() -> (Arc<ScriptedAnimator>, Arc<MemoryPanel>) {
    let animator = ScriptedAnimator::from_toml(DOOR_SCRIPT).expect("valid script");
    (Arc::new(animator), Arc::new(MemoryPanel::new()))
}

fn counter() -> (Arc<AtomicUsize>, TransitionCallback) {
    let count = Arc::new(AtomicUsize::new(0));
    let inner = Arc::clone(&count);
    (
        count,
        Box::new(move || {
            inner.fetch_add(1, Ordering::SeqCst);
        }),
    )
}

fn controller(
    harness: &Harness,
    mode: TransitionMode,
    animator: &Arc<ScriptedAnimator>,
    panel: &Arc<MemoryPanel>,
) -> ShowHideController {
    harness
        .controller(mode)
        .with_panel(Arc::clone(panel) as Arc<dyn Panel>)
        .with_animator(Arc::clone(animator) as Arc<dyn Animator>)
}

#[test]
fn test_trigger_round_trip_through_script() {
    let mut harness = Harness::new().with_frame_dt(0.05);
    let (animator, panel) = door();
    let mut door = controller(&harness, TransitionMode::Trigger, &animator, &panel);

    let (shown, show_cb) = counter();
    door.show("Open", false, Some(show_cb));
    assert!(harness.run_until(60, || shown.load(Ordering::SeqCst) == 1));
    assert!(panel.is_active());
    assert_eq!(animator.state_name(), "Open");

    let (hidden, hide_cb) = counter();
    door.hide("Closed", Some(hide_cb));
    assert!(harness.run_until(60, || hidden.load(Ordering::SeqCst) == 1));
    assert!(!panel.is_active());
    assert_eq!(animator.state_name(), "Closed");
    harness.assert_idle();
}

#[test]
fn test_state_mode_round_trip_through_script() {
    let mut harness = Harness::new().with_frame_dt(0.05);
    let (animator, panel) = door();
    let mut door = controller(&harness, TransitionMode::State, &animator, &panel);

    let (shown, show_cb) = counter();
    door.show("Open", false, Some(show_cb));
    assert!(harness.run_until(60, || shown.load(Ordering::SeqCst) == 1));
    assert_eq!(animator.state_name(), "Open");
    assert_eq!(
        animator.history(),
        vec![AnimatorCall::Play("Open".to_string())]
    );
}

#[test]
fn test_unscripted_trigger_times_out() {
    let mut harness = Harness::new().with_frame_dt(0.05);
    let (animator, panel) = door();
    let mut door =
        controller(&harness, TransitionMode::Trigger, &animator, &panel).with_max_wait(0.5);

    let (shown, show_cb) = counter();
    // No reaction for "Stuck": the state never changes, the deadline ends
    // the wait, and the show still completes with the panel active.
    door.show("Stuck", false, Some(show_cb));
    assert!(harness.run_until(60, || shown.load(Ordering::SeqCst) == 1));
    assert!(panel.is_active());
    assert_eq!(animator.state_name(), "Closed");
    assert!(harness.clock().wall_time() < 1.0);
}

#[test]
fn test_rapid_show_hide_settles_on_hide() {
    let mut harness = Harness::new().with_frame_dt(0.05);
    let (animator, panel) = door();
    let mut door = controller(&harness, TransitionMode::Trigger, &animator, &panel);

    let (shown, show_cb) = counter();
    let (hidden, hide_cb) = counter();
    door.show("Open", false, Some(show_cb));
    door.hide("Closed", Some(hide_cb));
    assert!(harness.run_until(60, || hidden.load(Ordering::SeqCst) == 1));

    // The show was superseded during its activation tick: its trigger
    // never fired and its callback never ran.
    assert_eq!(shown.load(Ordering::SeqCst), 0);
    assert!(!panel.is_active());
    assert_eq!(
        animator.history(),
        vec![AnimatorCall::Fire("Closed".to_string())]
    );
    harness.assert_idle();
}
