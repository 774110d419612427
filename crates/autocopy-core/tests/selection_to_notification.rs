//! Integration tests for the domain pipeline.
//!
//! Drives the three state machines the way the agent does: mouse events into
//! the selection tracker, clipboard observations into the snapshot, and the
//! resulting notification into the fade sequence.

use autocopy_core::{
    ClipboardSnapshot, EnabledFlag, FadePhase, FadeSequence, FadeTick, InputEvent,
    SelectionIntent, SelectionTracker,
};

#[test]
fn test_drag_selection_leads_to_one_notification_lifecycle() {
    // Arrange
    let enabled = EnabledFlag::new(true);
    let mut tracker = SelectionTracker::new();
    let mut snapshot = ClipboardSnapshot::new();
    let mut fade = FadeSequence::new(0.1).expect("valid step");

    // Act: down at t=0, up at t=50
    let intents: Vec<SelectionIntent> = [InputEvent::primary_down(0), InputEvent::primary_up(50)]
        .iter()
        .map(|e| tracker.on_event(e.kind, enabled.get()))
        .collect();

    // The copy lands on the clipboard; the OS reports it twice.
    let first = snapshot.observe(Some("Hello World"));
    let second = snapshot.observe(Some("Hello World"));
    if first.is_some() {
        fade.restart();
    }

    let mut ticks = 0;
    while fade.tick().keeps_timer() {
        ticks += 1;
    }

    // Assert
    assert_eq!(
        intents,
        vec![SelectionIntent::Nothing, SelectionIntent::CopyAfterDelay]
    );
    assert_eq!(first.expect("first observation is new").text, "Hello World");
    assert!(second.is_none());
    assert_eq!(ticks + 1, 10);
    assert_eq!(fade.phase(), FadePhase::Hidden);
}

#[test]
fn test_toggling_flag_mid_drag_suppresses_copy() {
    let enabled = EnabledFlag::new(true);
    let mut tracker = SelectionTracker::new();

    tracker.on_event(InputEvent::primary_down(0).kind, enabled.get());
    enabled.toggle();
    let intent = tracker.on_event(InputEvent::primary_up(40).kind, enabled.get());

    assert_eq!(intent, SelectionIntent::Nothing);
}

#[test]
fn test_second_show_preempts_fade_in_progress() {
    let mut fade = FadeSequence::new(0.1).expect("valid step");
    fade.restart();
    for _ in 0..6 {
        assert!(matches!(fade.tick(), FadeTick::Dimmed(_)));
    }

    fade.restart();

    assert!((fade.state().opacity - 1.0).abs() < f32::EPSILON);
    assert!(fade.state().active);
}
