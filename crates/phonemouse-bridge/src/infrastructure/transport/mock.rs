//! Scripted in-memory transport for testing the connection manager and the
//! control loop without a Bluetooth adapter.
//!
//! The test keeps a [`ScriptedListener`] handle and hands `boxed()` to the
//! code under test.  Both share state, so the test can queue clients and
//! script their reads after the listener has been moved away.
//!
//! Each queued client gets a [`LinkScript`]: a FIFO of read outcomes.  An
//! empty script reads as `WouldBlock`.  Drops are recorded so tests can check
//! that a link was released exactly once and in which order endpoints closed.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{ClientLink, LinkListener};

enum ScriptedRead {
    Data(Vec<u8>),
    Eof,
    Error(io::ErrorKind),
}

#[derive(Default)]
struct ListenerShared {
    pending: VecDeque<ScriptedLink>,
    accept_error: Option<io::ErrorKind>,
    release_log: Vec<String>,
}

#[derive(Default)]
struct LinkShared {
    reads: VecDeque<ScriptedRead>,
    releases: usize,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Test-side handle to a scripted listener.
#[derive(Clone, Default)]
pub struct ScriptedListener {
    shared: Arc<Mutex<ListenerShared>>,
}

impl ScriptedListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// The listening endpoint to hand to a `ConnectionManager`.
    ///
    /// Dropping it records `"listener"` in the release log.
    pub fn boxed(&self) -> Box<dyn LinkListener> {
        Box::new(ListenerEndpoint { shared: Arc::clone(&self.shared) })
    }

    /// Queues a client that the next `accept` will return.
    pub fn queue_client(&self, peer: &str) -> LinkScript {
        let script = LinkScript::default();
        lock(&self.shared).pending.push_back(ScriptedLink {
            peer: peer.to_owned(),
            script: script.clone(),
            listener: Arc::clone(&self.shared),
        });
        script
    }

    /// Makes the next `accept` fail with `kind`.
    pub fn fail_next_accept(&self, kind: io::ErrorKind) {
        lock(&self.shared).accept_error = Some(kind);
    }

    /// Clients queued but not yet accepted.
    pub fn pending(&self) -> usize {
        lock(&self.shared).pending.len()
    }

    /// Endpoints released so far, in drop order.
    pub fn release_log(&self) -> Vec<String> {
        lock(&self.shared).release_log.clone()
    }
}

/// Test-side handle to one client's reads.
#[derive(Clone, Default)]
pub struct LinkScript {
    shared: Arc<Mutex<LinkShared>>,
}

impl LinkScript {
    /// Queues one `recv` returning `bytes`.
    pub fn push_bytes(&self, bytes: &[u8]) -> &Self {
        lock(&self.shared).reads.push_back(ScriptedRead::Data(bytes.to_vec()));
        self
    }

    /// Queues an orderly close (`Ok(0)`).
    pub fn push_eof(&self) -> &Self {
        lock(&self.shared).reads.push_back(ScriptedRead::Eof);
        self
    }

    /// Queues a failing `recv`.
    pub fn push_error(&self, kind: io::ErrorKind) -> &Self {
        lock(&self.shared).reads.push_back(ScriptedRead::Error(kind));
        self
    }

    /// How many times the link has been dropped.
    pub fn releases(&self) -> usize {
        lock(&self.shared).releases
    }
}

struct ListenerEndpoint {
    shared: Arc<Mutex<ListenerShared>>,
}

impl LinkListener for ListenerEndpoint {
    fn accept(&mut self) -> io::Result<Option<Box<dyn ClientLink>>> {
        let mut shared = lock(&self.shared);
        if let Some(kind) = shared.accept_error.take() {
            return Err(io::Error::from(kind));
        }
        Ok(shared
            .pending
            .pop_front()
            .map(|link| Box::new(link) as Box<dyn ClientLink>))
    }

    fn local_endpoint(&self) -> String {
        "mock".to_owned()
    }
}

impl Drop for ListenerEndpoint {
    fn drop(&mut self) {
        lock(&self.shared).release_log.push("listener".to_owned());
    }
}

struct ScriptedLink {
    peer: String,
    script: LinkScript,
    listener: Arc<Mutex<ListenerShared>>,
}

impl ClientLink for ScriptedLink {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let next = lock(&self.script.shared).reads.pop_front();
        match next {
            None => Err(io::Error::from(io::ErrorKind::WouldBlock)),
            Some(ScriptedRead::Eof) => Ok(0),
            Some(ScriptedRead::Error(kind)) => Err(io::Error::from(kind)),
            Some(ScriptedRead::Data(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
        }
    }

    fn peer(&self) -> &str {
        &self.peer
    }
}

impl Drop for ScriptedLink {
    fn drop(&mut self) {
        lock(&self.script.shared).releases += 1;
        lock(&self.listener)
            .release_log
            .push(format!("client {}", self.peer));
    }
}
