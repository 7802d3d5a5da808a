//! Mock pointer sink for unit and integration testing.
//!
//! # Why a mock sink?
//!
//! The real [`UinputPointer`](super::uinput::UinputPointer) needs write access
//! to `/dev/uinput` and actually moves the cursor of the machine running the
//! tests.  The `MockPointerSink` replaces the device with in-memory recording:
//! every call is pushed into a `Mutex<Vec<PointerEvent>>` so assertions can
//! inspect exactly what was emitted and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let sink = Arc::new(MockPointerSink::new());
//! let mut use_case = EmulateInputUseCase::new(Arc::clone(&sink), &config);
//!
//! use_case.handle_frame(&frame).unwrap();
//!
//! assert_eq!(sink.motions(), vec![(-5, -5)]);
//! ```
//!
//! # `should_fail` flag
//!
//! Build with [`MockPointerSink::failing`] to make every method return an
//! `EmulationError::Platform`, which exercises the error paths of callers.
//! [`MockPointerSink::failing_syncs`] rejects only the next `n` barriers,
//! which leaves a batch half delivered.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use phonemouse_core::{MouseButton, PointerEvent};

use crate::application::emulate_input::{EmulationError, PointerSink};

/// A mock sink that records all calls without touching the OS.
#[derive(Debug, Default)]
pub struct MockPointerSink {
    /// Every event in call order, barriers included.
    pub events: Mutex<Vec<PointerEvent>>,
    /// When `true`, every method immediately returns an error.
    pub should_fail: bool,
    /// Number of upcoming `sync` calls that fail without being recorded.
    pub syncs_to_fail: AtomicUsize,
}

impl MockPointerSink {
    /// Creates a recording sink with `should_fail = false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that rejects every event.
    pub fn failing() -> Self {
        Self { should_fail: true, ..Self::default() }
    }

    /// Creates a sink whose next `n` barriers fail.
    pub fn failing_syncs(n: usize) -> Self {
        Self { syncs_to_fail: AtomicUsize::new(n), ..Self::default() }
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<PointerEvent> {
        self.lock().clone()
    }

    /// Recorded relative motions as `(dx, dy)` pairs.
    pub fn motions(&self) -> Vec<(i32, i32)> {
        self.lock()
            .iter()
            .filter_map(|e| match *e {
                PointerEvent::Motion { dx, dy } => Some((dx, dy)),
                _ => None,
            })
            .collect()
    }

    /// Number of synchronization barriers received.
    pub fn sync_count(&self) -> usize {
        self.lock().iter().filter(|e| **e == PointerEvent::Sync).count()
    }

    /// Number of presses recorded for `button`.
    pub fn press_count(&self, button: MouseButton) -> usize {
        self.lock()
            .iter()
            .filter(|e| **e == PointerEvent::press(button))
            .count()
    }

    /// Number of releases recorded for `button`.
    pub fn release_count(&self, button: MouseButton) -> usize {
        self.lock()
            .iter()
            .filter(|e| **e == PointerEvent::release(button))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PointerEvent>> {
        // A panicking test thread must not hide the recorded events from others.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, event: PointerEvent) -> Result<(), EmulationError> {
        if self.should_fail {
            return Err(EmulationError::Platform("mock failure".into()));
        }
        self.lock().push(event);
        Ok(())
    }
}

impl PointerSink for MockPointerSink {
    fn emit_button(&self, button: MouseButton, pressed: bool) -> Result<(), EmulationError> {
        self.record(PointerEvent::Button { button, pressed })
    }

    fn emit_motion(&self, dx: i32, dy: i32) -> Result<(), EmulationError> {
        self.record(PointerEvent::Motion { dx, dy })
    }

    fn sync(&self) -> Result<(), EmulationError> {
        let armed = self
            .syncs_to_fail
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            return Err(EmulationError::Platform("mock sync failure".into()));
        }
        self.record(PointerEvent::Sync)
    }
}
