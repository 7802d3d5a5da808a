//! Integration tests for the phonemouse-core frame pipeline.
//!
//! These tests drive the public API the way the bridge does for every frame:
//! decode the bytes, emit button events, scale the deltas, split them into
//! steps.  The byte streams are the ones the phone app actually sends.

use phonemouse_core::{
    compute_multiplier, scale, split, ButtonEdgeEmitter, ButtonMode, Frame, MouseButton,
    PointerEvent,
};

/// Runs one frame through the pipeline and returns the resulting events.
fn translate(
    emitter: &mut ButtonEdgeEmitter,
    bytes: [u8; 5],
    speed_percent: i32,
    steps: u32,
) -> Vec<PointerEvent> {
    let mult = compute_multiplier(speed_percent);
    let frame = Frame::decode(&bytes);
    let mut out = Vec::new();
    emitter.emit(frame.buttons, &mut out);
    let (dx, dy) = (scale(frame.dx, mult), scale(frame.dy, mult));
    for (sx, sy) in split(dx, dy, steps) {
        if (sx, sy) != (0, 0) {
            out.push(PointerEvent::Motion { dx: sx, dy: sy });
            out.push(PointerEvent::Sync);
        }
    }
    out
}

fn motions(events: &[PointerEvent]) -> Vec<(i32, i32)> {
    events
        .iter()
        .filter_map(|e| match e {
            PointerEvent::Motion { dx, dy } => Some((*dx, *dy)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_left_click_frame_without_motion() {
    let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Pulse);

    let events = translate(&mut emitter, [0x01, 0x00, 0x00, 0x00, 0x00], 100, 0);

    assert_eq!(
        events,
        vec![
            PointerEvent::press(MouseButton::Left),
            PointerEvent::Sync,
            PointerEvent::release(MouseButton::Left),
            PointerEvent::Sync,
        ]
    );
}

#[test]
fn test_click_frame_with_dx_emits_click_then_motion() {
    // Bytes 1..3 are `00 05`, which is dx = 5.
    let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Pulse);

    let events = translate(&mut emitter, [0x01, 0x00, 0x05, 0x00, 0x00], 100, 0);

    assert_eq!(events[..4], [
        PointerEvent::press(MouseButton::Left),
        PointerEvent::Sync,
        PointerEvent::release(MouseButton::Left),
        PointerEvent::Sync,
    ]);
    assert_eq!(motions(&events), vec![(5, 0)]);
}

#[test]
fn test_motion_frame_at_unity_speed() {
    let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Pulse);

    let events = translate(&mut emitter, [0x00, 0xFF, 0xFB, 0xFF, 0xFB], 100, 0);

    assert_eq!(events, vec![PointerEvent::Motion { dx: -5, dy: -5 }, PointerEvent::Sync]);
}

#[test]
fn test_motion_frame_with_five_interpolation_steps() {
    let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Pulse);

    let events = translate(&mut emitter, [0x00, 0xFF, 0xFB, 0xFF, 0xFB], 100, 5);

    assert_eq!(motions(&events), vec![(-1, -1); 5]);
    // Every step is followed by its own barrier.
    assert_eq!(events.iter().filter(|e| **e == PointerEvent::Sync).count(), 5);
}

#[test]
fn test_inverted_half_speed() {
    let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Pulse);
    let bytes = Frame { dx: 40, dy: -40, ..Frame::default() }.encode();

    let events = translate(&mut emitter, bytes, -50, 0);

    assert_eq!(motions(&events), vec![(-20, 20)]);
}

#[test]
fn test_zero_speed_suppresses_motion_but_not_clicks() {
    let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Pulse);

    let events = translate(&mut emitter, [0x02, 0x12, 0x34, 0x56, 0x78], 0, 0);

    assert!(motions(&events).is_empty());
    assert_eq!(events[0], PointerEvent::press(MouseButton::Right));
}
