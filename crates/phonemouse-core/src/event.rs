//! Output vocabulary shared by the frame translator and the device sinks.

/// A button exposed by the virtual pointing device.
///
/// The wire protocol only carries two buttons; anything else in the bitmask is
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    /// All buttons in the order they are processed for a frame.
    pub const ALL: [MouseButton; 2] = [MouseButton::Left, MouseButton::Right];
}

/// One instruction for the virtual device.
///
/// A frame is translated into an ordered batch of these.  The sink replays
/// the batch in order; every [`PointerEvent::Sync`] closes the events emitted
/// since the previous one into a single atomic update on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// A button changed state (`pressed = true` is a press, `false` a release).
    Button { button: MouseButton, pressed: bool },
    /// Relative pointer movement in device units.
    Motion { dx: i32, dy: i32 },
    /// Synchronization barrier.
    Sync,
}

impl PointerEvent {
    /// Shorthand for a press event.
    pub fn press(button: MouseButton) -> Self {
        Self::Button { button, pressed: true }
    }

    /// Shorthand for a release event.
    pub fn release(button: MouseButton) -> Self {
        Self::Button { button, pressed: false }
    }
}
