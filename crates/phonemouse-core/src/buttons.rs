//! Button edge logic: frame bitmask in, press/release events out.
//!
//! The phone sends the *instantaneous* button state with every frame, never
//! an explicit press or release.  Two interpretations are supported:
//!
//! | Mode    | A frame with the bit set…                       | Held button        |
//! |---------|-------------------------------------------------|--------------------|
//! | `Pulse` | emits press, sync, release, sync                | one click per frame |
//! | `Hold`  | emits press, sync only if the button was up     | one press, one release |
//!
//! `Pulse` is the default and what the phone app is built around: its click
//! buttons send a single frame with the bit set, and movement frames carry a
//! zero bitmask.

use crate::event::{MouseButton, PointerEvent};
use crate::protocol::frame::ButtonMask;

/// How the button bitmask of a frame is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonMode {
    /// Every frame with a bit set produces a full click.
    #[default]
    Pulse,
    /// The bit is a held-state signal; only transitions produce events.
    Hold,
}

/// Last-known pressed state of each device button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub left: bool,
    pub right: bool,
}

impl ButtonState {
    /// Returns the stored state of `button`.
    pub fn get(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
        }
    }

    fn set(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.left = pressed,
            MouseButton::Right => self.right = pressed,
        }
    }
}

fn bit_set(mask: ButtonMask, button: MouseButton) -> bool {
    match button {
        MouseButton::Left => mask.left(),
        MouseButton::Right => mask.right(),
    }
}

/// Converts frame bitmasks into button events against the device state.
///
/// Owned by the control loop; never shared.
#[derive(Debug, Default)]
pub struct ButtonEdgeEmitter {
    mode: ButtonMode,
    state: ButtonState,
}

impl ButtonEdgeEmitter {
    /// Creates an emitter with every button released.
    pub fn new(mode: ButtonMode) -> Self {
        Self { mode, state: ButtonState::default() }
    }

    /// Current device-side button state.
    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Appends the events for one frame's bitmask to `out`.
    ///
    /// Left is processed before right.  Each press and each release is
    /// followed by its own [`PointerEvent::Sync`] so the host observes the
    /// press before the release.
    pub fn emit(&mut self, mask: ButtonMask, out: &mut Vec<PointerEvent>) {
        for button in MouseButton::ALL {
            let held = bit_set(mask, button);
            match self.mode {
                ButtonMode::Pulse => {
                    if held {
                        out.extend_from_slice(&[
                            PointerEvent::press(button),
                            PointerEvent::Sync,
                            PointerEvent::release(button),
                            PointerEvent::Sync,
                        ]);
                        // The pulse leaves the device released.
                        self.state.set(button, false);
                    }
                }
                ButtonMode::Hold => {
                    if held != self.state.get(button) {
                        out.push(PointerEvent::Button { button, pressed: held });
                        out.push(PointerEvent::Sync);
                        self.state.set(button, held);
                    }
                }
            }
        }
    }

    /// Releases every button still held and resets the state.
    ///
    /// Called when the client goes away so no button stays stuck down.
    pub fn reset(&mut self, out: &mut Vec<PointerEvent>) {
        for button in MouseButton::ALL {
            if self.state.get(button) {
                out.push(PointerEvent::release(button));
                out.push(PointerEvent::Sync);
            }
        }
        self.state = ButtonState::default();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn click(button: MouseButton) -> Vec<PointerEvent> {
        vec![
            PointerEvent::press(button),
            PointerEvent::Sync,
            PointerEvent::release(button),
            PointerEvent::Sync,
        ]
    }

    fn run(emitter: &mut ButtonEdgeEmitter, mask: u8) -> Vec<PointerEvent> {
        let mut out = Vec::new();
        emitter.emit(ButtonMask(mask), &mut out);
        out
    }

    // ── Pulse mode ────────────────────────────────────────────────────────────

    #[test]
    fn test_pulse_left_bit_emits_one_click() {
        // Arrange
        let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Pulse);

        // Act
        let events = run(&mut emitter, 0b01);

        // Assert
        assert_eq!(events, click(MouseButton::Left));
    }

    #[test]
    fn test_pulse_repeats_click_on_every_frame_with_bit_set() {
        // A held bit is not a held button: each frame is its own click.
        let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Pulse);

        let first = run(&mut emitter, 0b01);
        let second = run(&mut emitter, 0b01);

        assert_eq!(first, click(MouseButton::Left));
        assert_eq!(second, click(MouseButton::Left));
    }

    #[test]
    fn test_pulse_both_bits_emit_left_then_right() {
        let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Pulse);

        let events = run(&mut emitter, 0b11);

        let mut expected = click(MouseButton::Left);
        expected.extend(click(MouseButton::Right));
        assert_eq!(events, expected);
    }

    #[test]
    fn test_pulse_clear_mask_emits_nothing() {
        let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Pulse);
        assert!(run(&mut emitter, 0).is_empty());
        assert!(run(&mut emitter, 0b1111_1100).is_empty());
    }

    #[test]
    fn test_pulse_leaves_state_released() {
        let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Pulse);
        run(&mut emitter, 0b11);
        assert_eq!(emitter.state(), ButtonState::default());
    }

    // ── Hold mode ─────────────────────────────────────────────────────────────

    #[test]
    fn test_hold_emits_press_once_then_release_on_clear() {
        // Arrange
        let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Hold);

        // Act
        let down = run(&mut emitter, 0b01);
        let still_down = run(&mut emitter, 0b01);
        let up = run(&mut emitter, 0b00);

        // Assert
        assert_eq!(down, vec![PointerEvent::press(MouseButton::Left), PointerEvent::Sync]);
        assert!(still_down.is_empty());
        assert_eq!(up, vec![PointerEvent::release(MouseButton::Left), PointerEvent::Sync]);
    }

    #[test]
    fn test_hold_tracks_buttons_independently() {
        let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Hold);
        run(&mut emitter, 0b01);

        let events = run(&mut emitter, 0b10);

        assert_eq!(
            events,
            vec![
                PointerEvent::release(MouseButton::Left),
                PointerEvent::Sync,
                PointerEvent::press(MouseButton::Right),
                PointerEvent::Sync,
            ]
        );
        assert_eq!(emitter.state(), ButtonState { left: false, right: true });
    }

    #[test]
    fn test_reset_releases_held_buttons() {
        let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Hold);
        run(&mut emitter, 0b11);

        let mut out = Vec::new();
        emitter.reset(&mut out);

        assert_eq!(
            out,
            vec![
                PointerEvent::release(MouseButton::Left),
                PointerEvent::Sync,
                PointerEvent::release(MouseButton::Right),
                PointerEvent::Sync,
            ]
        );
        assert_eq!(emitter.state(), ButtonState::default());
    }

    #[test]
    fn test_reset_with_nothing_held_emits_nothing() {
        let mut emitter = ButtonEdgeEmitter::new(ButtonMode::Pulse);
        let mut out = Vec::new();
        emitter.reset(&mut out);
        assert!(out.is_empty());
    }
}
