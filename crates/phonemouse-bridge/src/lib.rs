//! phonemouse-bridge library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the bridge do? (for beginners)
//!
//! A phone app turns touchpad gestures into tiny 5-byte frames (button mask,
//! horizontal delta, vertical delta) and streams them over a Bluetooth
//! RFCOMM connection.  This daemon is the other end of that stream:
//!
//! 1. Registers a virtual mouse with the kernel through uinput.
//! 2. Listens on an RFCOMM channel (or a TCP port, for development) and
//!    serves one phone at a time.
//! 3. Decodes each frame, scales the delta by the configured speed, and
//!    optionally splits it into smaller steps for smoother movement.
//! 4. Writes button and motion events into the virtual mouse, so every
//!    application on the machine sees an ordinary pointing device.
//! 5. Goes back to listening when the phone disconnects.

/// Domain layer: validated runtime configuration.
pub mod domain;

/// Application layer: the input use case and the control loop.
pub mod application;

/// Infrastructure layer: uinput device, sockets, settings file.
pub mod infrastructure;
