//! # phonemouse-core
//!
//! Shared library for the phone mouse bridge containing the wire frame codec,
//! the fixed-point motion pipeline, and the button edge logic.
//!
//! It has zero dependencies on OS APIs, sockets, or async runtimes.  Every
//! function here is pure or operates on plain owned state, which is what lets
//! the bridge crate test its control loop against recording mocks.
//!
//! # Architecture overview (for beginners)
//!
//! A phone app turns touchpad gestures into 5-byte frames and streams them
//! over a Bluetooth RFCOMM link.  The bridge daemon on the host turns every
//! frame into events for a virtual mouse.
//!
//! This crate is the part of that translation that does not touch the OS:
//!
//! - **`protocol`** – The 5-byte frame layout and its decoder (plus the
//!   phone-side encoder used by tests and the loopback client).
//!
//! - **`motion`** – Speed scaling in Q16.16 fixed point and optional splitting
//!   of one delta into several smaller steps (interpolation).
//!
//! - **`buttons`** – Turns the instantaneous button bitmask of a frame into
//!   press/release events for the virtual device.
//!
//! - **`event`** – The [`PointerEvent`] vocabulary every other module produces
//!   and the device sink consumes.

pub mod buttons;
pub mod event;
pub mod motion;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `phonemouse_core::Frame` instead of `phonemouse_core::protocol::frame::Frame`.
pub use buttons::{ButtonEdgeEmitter, ButtonMode, ButtonState};
pub use event::{MouseButton, PointerEvent};
pub use motion::interpolate::{split, MotionSteps};
pub use motion::scaler::{compute_multiplier, scale, Q16_ONE};
pub use protocol::frame::{ButtonMask, Frame, FrameError, FRAME_LEN};
