//! Virtual pointer implementations.
//!
//! The uinput sink is compiled on Linux only; the recording mock is always
//! available for tests.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod uinput;
