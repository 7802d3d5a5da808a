//! Bluetooth RFCOMM transport (Linux / BlueZ).
//!
//! The standard library has no Bluetooth sockets, so this talks to the kernel
//! directly through `libc`: an `AF_BLUETOOTH` / `SOCK_STREAM` /
//! `BTPROTO_RFCOMM` socket bound to the wildcard adapter address on a fixed
//! channel.  Both the listening socket and every accepted socket are opened
//! with `SOCK_NONBLOCK`, and reads additionally pass `MSG_DONTWAIT`.
//!
//! File descriptors are held in [`OwnedFd`], so closing happens exactly once
//! on drop.
//!
//! Service discovery (SDP records) is not handled here; the phone is expected
//! to connect to the configured channel directly.

use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use tracing::debug;

use super::{ClientLink, LinkListener, TransportError};

/// `BTPROTO_RFCOMM` from `<bluetooth/bluetooth.h>`.
const BTPROTO_RFCOMM: libc::c_int = 3;

/// Only one client is served; a backlog of one lets the next phone queue.
const LISTEN_BACKLOG: libc::c_int = 1;

/// `struct sockaddr_rc` from `<bluetooth/rfcomm.h>`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct SockaddrRc {
    rc_family: libc::sa_family_t,
    rc_bdaddr: [u8; 6],
    rc_channel: u8,
}

impl SockaddrRc {
    const LEN: libc::socklen_t = mem::size_of::<SockaddrRc>() as libc::socklen_t;
}

/// Formats a `bdaddr_t` (stored least significant byte first) the way BlueZ
/// prints it.
fn format_bdaddr(addr: &[u8; 6]) -> String {
    format!(
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        addr[5], addr[4], addr[3], addr[2], addr[1], addr[0]
    )
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// Listening RFCOMM socket on one channel of any local adapter.
#[derive(Debug)]
pub struct RfcommListener {
    fd: OwnedFd,
    channel: u8,
}

impl RfcommListener {
    /// Creates, binds and listens on `channel` (1..=30).
    ///
    /// # Errors
    ///
    /// Fails when Bluetooth is unavailable in the kernel, no adapter is
    /// present, or the channel is taken.
    pub fn bind(channel: u8) -> Result<Self, TransportError> {
        // SAFETY: plain syscall, no pointers involved.
        let raw = unsafe {
            libc::socket(
                libc::AF_BLUETOOTH,
                libc::SOCK_STREAM | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
                BTPROTO_RFCOMM,
            )
        };
        if raw < 0 {
            return Err(TransportError::Create {
                kind: "RFCOMM",
                source: io::Error::last_os_error(),
            });
        }
        // SAFETY: `raw` is a freshly created descriptor nobody else owns.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        let addr = SockaddrRc {
            rc_family: libc::AF_BLUETOOTH as libc::sa_family_t,
            rc_bdaddr: [0; 6], // BDADDR_ANY
            rc_channel: channel,
        };
        let endpoint = format!("RFCOMM channel {channel}");

        // SAFETY: `addr` is a valid `sockaddr_rc` and LEN is its exact size.
        let rc = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                (&addr as *const SockaddrRc).cast::<libc::sockaddr>(),
                SockaddrRc::LEN,
            )
        };
        if rc < 0 {
            return Err(TransportError::Bind {
                endpoint,
                source: io::Error::last_os_error(),
            });
        }

        // SAFETY: plain syscall on a descriptor we own.
        if unsafe { libc::listen(fd.as_raw_fd(), LISTEN_BACKLOG) } < 0 {
            return Err(TransportError::Listen {
                endpoint,
                source: io::Error::last_os_error(),
            });
        }

        debug!("RFCOMM socket bound on channel {channel}");
        Ok(Self { fd, channel })
    }
}

impl LinkListener for RfcommListener {
    fn accept(&mut self) -> io::Result<Option<Box<dyn ClientLink>>> {
        let mut addr = SockaddrRc::default();
        let mut len = SockaddrRc::LEN;

        // SAFETY: `addr` and `len` outlive the call and `len` holds the
        // buffer size.
        let raw = unsafe {
            libc::accept4(
                self.fd.as_raw_fd(),
                (&mut addr as *mut SockaddrRc).cast::<libc::sockaddr>(),
                &mut len,
                libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
            )
        };
        if raw < 0 {
            let err = io::Error::last_os_error();
            return if is_transient(&err) { Ok(None) } else { Err(err) };
        }
        // SAFETY: accept4 returned a new descriptor we now own.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        Ok(Some(Box::new(RfcommLink {
            fd,
            peer: format_bdaddr(&addr.rc_bdaddr),
        })))
    }

    fn local_endpoint(&self) -> String {
        format!("RFCOMM channel {}", self.channel)
    }
}

/// An accepted RFCOMM connection.
#[derive(Debug)]
pub struct RfcommLink {
    fd: OwnedFd,
    peer: String,
}

impl ClientLink for RfcommLink {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: `buf` is valid for writes of `buf.len()` bytes.
        let n = unsafe {
            libc::recv(
                self.fd.as_raw_fd(),
                buf.as_mut_ptr().cast::<libc::c_void>(),
                buf.len(),
                libc::MSG_DONTWAIT,
            )
        };
        if n < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(n as usize)
        }
    }

    fn peer(&self) -> &str {
        &self.peer
    }
}
