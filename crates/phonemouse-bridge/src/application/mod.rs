//! Application layer use cases for the bridge.
//!
//! # What use cases does the bridge have?
//!
//! - **`emulate_input`** – Translates decoded frames (button mask plus a
//!   relative delta) into virtual pointer events: button edges, scaled and
//!   interpolated motion, synchronization barriers.  The actual device write
//!   is made by a `PointerSink` implementation injected at construction time.
//!
//! - **`control_loop`** – The single worker: polls the stop flag, accepts a
//!   phone, reads frames, and hands them to `emulate_input`, backing off when
//!   there is nothing to do.

pub mod control_loop;
pub mod emulate_input;
