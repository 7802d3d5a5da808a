//! Infrastructure layer for the bridge.
//!
//! Contains OS-facing adapters: the virtual input device, the listening
//! sockets, and the settings file.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `phonemouse_core`, but MUST NOT be imported by the domain layer.
//!
//! # Sub-modules
//!
//! - **`input_emulation`** – `PointerSink` implementations.  On Linux the
//!   real one is backed by uinput; a `MockPointerSink` is provided for tests.
//!
//! - **`transport`** – Non-blocking listeners (Bluetooth RFCOMM, TCP) and the
//!   `ConnectionManager` that serves one phone at a time.
//!
//! - **`storage`** – Optional TOML settings file and its merge with
//!   command-line overrides.

pub mod input_emulation;
pub mod storage;
pub mod transport;
