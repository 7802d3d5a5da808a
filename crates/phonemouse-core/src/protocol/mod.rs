//! Protocol module containing the fixed-size wire frame.

pub mod frame;

pub use frame::{ButtonMask, Frame, FrameError, FRAME_LEN};
