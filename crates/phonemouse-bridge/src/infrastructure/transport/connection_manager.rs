//! Connection manager: one listening endpoint, at most one client.
//!
//! # State machine
//!
//! ```text
//!              try_accept() ok
//!   Listening ─────────────────▶ Connected
//!       ▲                            │
//!       └──── EOF / read error ──────┘
//!             disconnect()
//!
//!   any ── shutdown() ──▶ Disconnected   (terminal)
//! ```
//!
//! The client link is stored in an `Option` and retired with `take()`, so a
//! link is released exactly once no matter how many error paths hit it.
//! Only one client is served at a time: while connected, further peers wait in
//! the listener's backlog.

use std::io;

use phonemouse_core::FRAME_LEN;
use tracing::{debug, info, trace, warn};

use super::{ClientLink, LinkListener};

/// Lifecycle state of the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Waiting for a client.
    Listening,
    /// A client link is active.
    Connected,
    /// Shut down; both endpoints have been released.
    Disconnected,
}

/// Outcome of one non-blocking read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadResult {
    /// No data yet; state unchanged.
    WouldBlock,
    /// The link ended (EOF or error) and has been released, or there was no
    /// link to read from.
    Closed,
    /// Fewer than [`FRAME_LEN`] bytes arrived.  They are discarded.
    Partial(usize),
    /// A complete frame.
    Full([u8; FRAME_LEN]),
}

/// Owns the listening endpoint and the active client link.
pub struct ConnectionManager {
    listener: Option<Box<dyn LinkListener>>,
    client: Option<Box<dyn ClientLink>>,
}

impl ConnectionManager {
    /// Wraps an already-listening endpoint.  The initial state is `Listening`.
    pub fn new(listener: Box<dyn LinkListener>) -> Self {
        info!("listening on {}", listener.local_endpoint());
        Self {
            listener: Some(listener),
            client: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        match (&self.listener, &self.client) {
            (None, _) => ConnectionState::Disconnected,
            (Some(_), Some(_)) => ConnectionState::Connected,
            (Some(_), None) => ConnectionState::Listening,
        }
    }

    /// Peer address of the active client, if any.
    pub fn peer(&self) -> Option<&str> {
        self.client.as_deref().map(|c| c.peer())
    }

    /// Accepts a pending client without blocking.
    ///
    /// Returns `true` when a client is connected after the call (including the
    /// case where one already was).  Accept errors are transient: they are
    /// logged and reported as "no client".
    pub fn try_accept(&mut self) -> bool {
        if self.client.is_some() {
            return true;
        }
        let Some(listener) = self.listener.as_mut() else {
            return false;
        };
        match listener.accept() {
            Ok(Some(link)) => {
                info!("client connected: {}", link.peer());
                self.client = Some(link);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("accept failed: {e}");
                false
            }
        }
    }

    /// Reads up to one frame from the active client without blocking.
    pub fn try_read(&mut self) -> ReadResult {
        let Some(client) = self.client.as_mut() else {
            return ReadResult::Closed;
        };

        let mut buf = [0u8; FRAME_LEN];
        match client.recv(&mut buf) {
            Ok(0) => {
                self.retire("peer closed the connection");
                ReadResult::Closed
            }
            Ok(n) if n < FRAME_LEN => {
                trace!("discarding partial frame ({n} of {FRAME_LEN} bytes)");
                ReadResult::Partial(n)
            }
            Ok(_) => ReadResult::Full(buf),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                ReadResult::WouldBlock
            }
            Err(e) => {
                self.retire(&format!("read error: {e}"));
                ReadResult::Closed
            }
        }
    }

    /// Drops the active client, if any, and returns to `Listening`.
    pub fn disconnect(&mut self) {
        self.retire("disconnect requested");
    }

    /// Releases the client link, then the listener.
    ///
    /// Idempotent; the manager is `Disconnected` afterwards.
    pub fn shutdown(&mut self) {
        self.retire("shutting down");
        if let Some(listener) = self.listener.take() {
            debug!("closing listener on {}", listener.local_endpoint());
            drop(listener);
        }
    }

    fn retire(&mut self, reason: &str) {
        if let Some(client) = self.client.take() {
            info!("client disconnected: {} ({reason})", client.peer());
            drop(client);
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        // Field drop order would release the listener first.
        self.shutdown();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
