//! Byte-stream transports the phone connects over.
//!
//! Architecture:
//! - A [`LinkListener`] owns the listening endpoint and hands out at most one
//!   [`ClientLink`] per accept.
//! - The [`ConnectionManager`] holds the listener plus the single active
//!   link, and turns raw non-blocking I/O results into [`ReadResult`]s.
//!
//! Both traits are non-blocking by contract: `accept` returns `Ok(None)` and
//! `recv` returns `ErrorKind::WouldBlock` instead of waiting.  The control loop
//! owns all sleeping.
//!
//! Implementations:
//! - `rfcomm` – Bluetooth RFCOMM via raw `AF_BLUETOOTH` sockets (Linux).
//! - `tcp` – plain TCP, for running without a radio.
//! - `mock` – scripted in-memory listener for tests.

use std::io;

use thiserror::Error;

pub mod connection_manager;
pub mod mock;
#[cfg(target_os = "linux")]
pub mod rfcomm;
pub mod tcp;

pub use connection_manager::{ConnectionManager, ConnectionState, ReadResult};

/// Errors raised while setting up a listening endpoint.
///
/// All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The socket could not be created.
    #[error("failed to create {kind} socket: {source}")]
    Create {
        kind: &'static str,
        #[source]
        source: io::Error,
    },
    /// Binding the local address failed (channel or port already in use, no adapter).
    #[error("failed to bind {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// The socket could not be put into listening mode.
    #[error("failed to listen on {endpoint}: {source}")]
    Listen {
        endpoint: String,
        #[source]
        source: io::Error,
    },
}

/// One accepted client connection.
pub trait ClientLink: Send {
    /// Reads up to `buf.len()` bytes without blocking.
    ///
    /// `Ok(0)` means the peer closed the stream.  No data yet is reported as
    /// an error of kind [`io::ErrorKind::WouldBlock`].
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Human-readable peer address for logging.
    fn peer(&self) -> &str;
}

/// A listening endpoint.
pub trait LinkListener: Send {
    /// Accepts a pending connection without blocking.
    ///
    /// Returns `Ok(None)` when no client is waiting.
    fn accept(&mut self) -> io::Result<Option<Box<dyn ClientLink>>>;

    /// Human-readable local endpoint for logging.
    fn local_endpoint(&self) -> String;
}
