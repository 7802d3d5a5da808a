//! TCP transport.
//!
//! Speaks the same 5-byte frame protocol as RFCOMM over a plain TCP stream.
//! Useful for driving the bridge from a script or an emulator without a
//! Bluetooth adapter, and for end-to-end tests on loopback.

use std::io::{self, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};

use tracing::debug;

use super::{ClientLink, LinkListener, TransportError};

/// Non-blocking TCP listening socket.
#[derive(Debug)]
pub struct TcpLinkListener {
    listener: TcpListener,
    local: SocketAddr,
}

impl TcpLinkListener {
    /// Binds `addr` and switches the socket to non-blocking mode.
    ///
    /// Port 0 picks a free port; see [`Self::local_addr`].
    pub fn bind(addr: SocketAddr) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).map_err(|source| TransportError::Bind {
            endpoint: format!("TCP {addr}"),
            source,
        })?;
        let local = listener
            .local_addr()
            .and_then(|local| listener.set_nonblocking(true).map(|()| local))
            .map_err(|source| TransportError::Listen {
                endpoint: format!("TCP {addr}"),
                source,
            })?;

        debug!("TCP socket bound on {local}");
        Ok(Self { listener, local })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }
}

impl LinkListener for TcpLinkListener {
    fn accept(&mut self) -> io::Result<Option<Box<dyn ClientLink>>> {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                stream.set_nonblocking(true)?;
                // Frames are tiny; don't let Nagle hold them back.
                stream.set_nodelay(true)?;
                Ok(Some(Box::new(TcpLink {
                    stream,
                    peer: peer.to_string(),
                })))
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn local_endpoint(&self) -> String {
        format!("TCP {}", self.local)
    }
}

/// An accepted TCP connection.
#[derive(Debug)]
pub struct TcpLink {
    stream: TcpStream,
    peer: String,
}

impl ClientLink for TcpLink {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }

    fn peer(&self) -> &str {
        &self.peer
    }
}
