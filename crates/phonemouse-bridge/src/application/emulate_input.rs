//! EmulateInputUseCase: translates received frames into virtual pointer events.
//!
//! This use case sits at the application layer and delegates to a
//! [`PointerSink`] trait object for OS-level event injection.  The uinput
//! implementation lives in the infrastructure layer.
//!
//! # Per-frame event order
//!
//! ```text
//! buttons:  [press L, sync, release L, sync] [press R, sync, release R, sync]
//! motion:   [motion step 1, sync] … [motion step N, sync]
//! ```
//!
//! Buttons always go first so a click frame that also carries motion clicks
//! where the pointer was, not where it ends up.
//!
//! A motion step of `(0, 0)` is never sent: neither a whole frame whose
//! scaled delta is zero nor a sub-step that truncated to zero.  The host
//! would discard such a packet anyway.
//!
//! # Partial failures
//!
//! A sink error does not cut the batch short.  The rest of the batch is
//! still dispatched and the first error is returned afterwards, so a press
//! that reached the device is always followed by its release.

use std::sync::Arc;

use phonemouse_core::{scale, split, ButtonEdgeEmitter, Frame, MouseButton, PointerEvent};
use thiserror::Error;

use crate::domain::{BridgeConfig, InterpolationConfig, SpeedConfig};

/// Error type for input emulation operations.
#[derive(Debug, Error)]
pub enum EmulationError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("virtual device I/O error: {0}")]
    Device(#[from] std::io::Error),
}

/// Virtual pointing device the bridge writes into.
///
/// Events are buffered by the sink until [`PointerSink::sync`], which
/// presents everything since the previous barrier to the host as one update.
pub trait PointerSink: Send + Sync {
    /// Queues a button press (`pressed = true`) or release.
    fn emit_button(&self, button: MouseButton, pressed: bool) -> Result<(), EmulationError>;

    /// Queues relative motion on the X and Y axes.
    fn emit_motion(&self, dx: i32, dy: i32) -> Result<(), EmulationError>;

    /// Synchronization barrier: flushes the queued events.
    fn sync(&self) -> Result<(), EmulationError>;
}

/// Forwards one [`PointerEvent`] to the matching sink method.
pub fn dispatch(sink: &dyn PointerSink, event: &PointerEvent) -> Result<(), EmulationError> {
    match *event {
        PointerEvent::Button { button, pressed } => sink.emit_button(button, pressed),
        PointerEvent::Motion { dx, dy } => sink.emit_motion(dx, dy),
        PointerEvent::Sync => sink.sync(),
    }
}

/// The Emulate Input use case.
///
/// Owns the button state and motion settings; one instance lives inside the
/// control loop for the lifetime of the bridge.
pub struct EmulateInputUseCase {
    sink: Arc<dyn PointerSink>,
    buttons: ButtonEdgeEmitter,
    speed: SpeedConfig,
    interpolation: InterpolationConfig,
    batch: Vec<PointerEvent>,
}

impl EmulateInputUseCase {
    /// Creates a new use case writing into `sink`.
    pub fn new(sink: Arc<dyn PointerSink>, config: &BridgeConfig) -> Self {
        Self {
            sink,
            buttons: ButtonEdgeEmitter::new(config.button_mode),
            speed: config.speed,
            interpolation: config.interpolation,
            batch: Vec::with_capacity(16),
        }
    }

    /// Builds the ordered event batch for `frame` without touching the sink.
    ///
    /// Updates the button state exactly as [`Self::handle_frame`] would.
    pub fn translate(&mut self, frame: &Frame) -> &[PointerEvent] {
        self.batch.clear();
        self.buttons.emit(frame.buttons, &mut self.batch);

        let mult = self.speed.multiplier();
        let (dx, dy) = (scale(frame.dx, mult), scale(frame.dy, mult));
        for (step_dx, step_dy) in split(dx, dy, self.interpolation.steps()) {
            if (step_dx, step_dy) != (0, 0) {
                self.batch.push(PointerEvent::Motion { dx: step_dx, dy: step_dy });
                self.batch.push(PointerEvent::Sync);
            }
        }
        &self.batch
    }

    /// Handles one decoded frame from the phone.
    ///
    /// Returns the number of events written to the sink.
    ///
    /// # Errors
    ///
    /// Returns the first [`EmulationError`] the sink raised.  Events after
    /// the failing one are still dispatched.
    pub fn handle_frame(&mut self, frame: &Frame) -> Result<usize, EmulationError> {
        self.translate(frame);
        self.dispatch_batch()
    }

    /// Releases any button still held on the device.
    ///
    /// Called when the client disconnects.  Only `Hold` mode can leave a
    /// button down; in `Pulse` mode this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError`] if the sink rejects a release.
    pub fn reset(&mut self) -> Result<(), EmulationError> {
        self.batch.clear();
        self.buttons.reset(&mut self.batch);
        self.dispatch_batch().map(|_| ())
    }

    fn dispatch_batch(&self) -> Result<usize, EmulationError> {
        let mut first_error = None;
        for event in &self.batch {
            if let Err(e) = dispatch(self.sink.as_ref(), event) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(self.batch.len()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
