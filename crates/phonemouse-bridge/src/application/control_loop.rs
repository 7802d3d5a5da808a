//! ControlLoop: the single worker that drives the bridge.
//!
//! # One iteration
//!
//! ```text
//! running? ──no──▶ Stopped
//!    │
//! client? ──no──▶ try_accept ──none──▶ Backoff(idle)
//!    │
//! try_read ─┬─ WouldBlock ─▶ Backoff(read)
//!           ├─ Closed ─────▶ release held buttons, Continue
//!           ├─ Partial(n) ─▶ discard, Continue
//!           └─ Full(bytes) ▶ decode → EmulateInputUseCase, Continue
//! ```
//!
//! [`ControlLoop::step`] performs exactly one iteration and returns what the
//! caller should do next, so tests can drive the loop without timers.
//! [`ControlLoop::run`] is the async driver used by `main`.
//!
//! The cancellation flag is polled once per iteration.  An in-flight read is
//! never waited for: reads are non-blocking, so the worst-case shutdown
//! latency is one idle backoff.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use phonemouse_core::Frame;
use tracing::{debug, info, trace, warn};

use crate::application::emulate_input::EmulateInputUseCase;
use crate::domain::LoopTiming;
use crate::infrastructure::transport::{ConnectionManager, ReadResult};

/// What the driver should do after one [`ControlLoop::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The stop flag was observed; exit the loop.
    Stopped,
    /// Nothing to do right now; sleep for the given duration.
    Backoff(Duration),
    /// Work was done; run the next iteration immediately.
    Continue,
}

/// Per-connection counters, logged when the client goes away.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Complete frames handled.
    pub frames: u64,
    /// Short reads discarded.
    pub partial_reads: u64,
    /// Frames whose events the sink rejected.
    pub sink_errors: u64,
}

/// Owns the connection manager and the input use case.
pub struct ControlLoop {
    connections: ConnectionManager,
    input: EmulateInputUseCase,
    timing: LoopTiming,
    session: SessionStats,
}

impl ControlLoop {
    pub fn new(connections: ConnectionManager, input: EmulateInputUseCase, timing: LoopTiming) -> Self {
        Self {
            connections,
            input,
            timing,
            session: SessionStats::default(),
        }
    }

    /// The connection manager, for state inspection.
    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    /// Counters for the current (or most recent, until the next accept)
    /// connection.
    pub fn session(&self) -> SessionStats {
        self.session
    }

    /// Runs one iteration of the loop.
    pub fn step(&mut self, running: &AtomicBool) -> StepOutcome {
        if !running.load(Ordering::Relaxed) {
            return StepOutcome::Stopped;
        }

        if self.connections.peer().is_none() {
            if !self.connections.try_accept() {
                return StepOutcome::Backoff(self.timing.idle_backoff);
            }
            self.session = SessionStats::default();
        }

        match self.connections.try_read() {
            ReadResult::WouldBlock => StepOutcome::Backoff(self.timing.read_backoff),
            ReadResult::Closed => {
                self.end_session();
                StepOutcome::Continue
            }
            ReadResult::Partial(n) => {
                self.session.partial_reads += 1;
                trace!("dropped {n}-byte partial frame");
                StepOutcome::Continue
            }
            ReadResult::Full(bytes) => {
                let frame = Frame::decode(&bytes);
                self.session.frames += 1;
                match self.input.handle_frame(&frame) {
                    Ok(written) => trace!(?frame, written, "frame handled"),
                    Err(e) => {
                        self.session.sink_errors += 1;
                        warn!("failed to emit pointer events: {e}");
                    }
                }
                StepOutcome::Continue
            }
        }
    }

    /// Drives [`Self::step`] until `running` is cleared, then releases the
    /// client link and the listener (in that order).
    pub async fn run(mut self, running: Arc<AtomicBool>) {
        debug!("control loop started");
        loop {
            match self.step(&running) {
                StepOutcome::Stopped => break,
                StepOutcome::Backoff(delay) => tokio::time::sleep(delay).await,
                StepOutcome::Continue => tokio::task::yield_now().await,
            }
        }
        self.shutdown();
        info!("control loop stopped");
    }

    /// Releases held buttons and both transport endpoints.
    pub fn shutdown(&mut self) {
        if self.connections.peer().is_some() {
            self.end_session();
        }
        self.connections.shutdown();
    }

    fn end_session(&mut self) {
        self.connections.disconnect();
        if let Err(e) = self.input.reset() {
            warn!("failed to release held buttons: {e}");
        }
        let s = self.session;
        info!(
            frames = s.frames,
            partial_reads = s.partial_reads,
            sink_errors = s.sink_errors,
            "session ended"
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::emulate_input::PointerSink;
    use crate::domain::{BridgeConfig, InterpolationConfig};
    use crate::infrastructure::input_emulation::mock::MockPointerSink;
    use crate::infrastructure::transport::mock::ScriptedListener;
    use crate::infrastructure::transport::ConnectionState;
    use phonemouse_core::{ButtonMode, MouseButton, PointerEvent};
    use std::io;

    const TIMING: LoopTiming = LoopTiming {
        idle_backoff: Duration::from_secs(1),
        read_backoff: Duration::from_millis(5),
    };

    fn make_loop(
        config: BridgeConfig,
        sink: MockPointerSink,
    ) -> (ControlLoop, ScriptedListener, Arc<MockPointerSink>) {
        let listener = ScriptedListener::new();
        let sink = Arc::new(sink);
        let input = EmulateInputUseCase::new(Arc::clone(&sink) as Arc<dyn PointerSink>, &config);
        let ctl = ControlLoop::new(ConnectionManager::new(listener.boxed()), input, TIMING);
        (ctl, listener, sink)
    }

    fn run_steps(ctl: &mut ControlLoop, n: usize) -> Vec<StepOutcome> {
        let running = AtomicBool::new(true);
        (0..n).map(|_| ctl.step(&running)).collect()
    }

    #[test]
    fn test_step_stops_when_flag_cleared() {
        let (mut ctl, listener, _sink) = make_loop(BridgeConfig::default(), MockPointerSink::new());
        listener.queue_client("peer");

        let outcome = ctl.step(&AtomicBool::new(false));

        assert_eq!(outcome, StepOutcome::Stopped);
        assert_eq!(listener.pending(), 1, "stopped loop must not accept");
    }

    #[test]
    fn test_idle_backoff_without_client() {
        let (mut ctl, _listener, _sink) = make_loop(BridgeConfig::default(), MockPointerSink::new());

        assert_eq!(run_steps(&mut ctl, 1), vec![StepOutcome::Backoff(TIMING.idle_backoff)]);
        assert_eq!(ctl.connections().state(), ConnectionState::Listening);
    }

    #[test]
    fn test_read_backoff_when_connected_without_data() {
        let (mut ctl, listener, _sink) = make_loop(BridgeConfig::default(), MockPointerSink::new());
        listener.queue_client("peer");

        assert_eq!(run_steps(&mut ctl, 1), vec![StepOutcome::Backoff(TIMING.read_backoff)]);
        assert_eq!(ctl.connections().state(), ConnectionState::Connected);
    }

    #[test]
    fn test_click_frame_reaches_sink() {
        // Arrange
        let (mut ctl, listener, sink) = make_loop(BridgeConfig::default(), MockPointerSink::new());
        listener.queue_client("peer").push_bytes(&[0x01, 0x00, 0x00, 0x00, 0x00]);

        // Act
        let outcomes = run_steps(&mut ctl, 2);

        // Assert
        assert_eq!(outcomes[0], StepOutcome::Continue);
        assert_eq!(sink.press_count(MouseButton::Left), 1);
        assert!(sink.motions().is_empty());
        assert_eq!(ctl.session().frames, 1);
    }

    #[test]
    fn test_interpolated_motion_frame() {
        let config = BridgeConfig {
            interpolation: InterpolationConfig::new(5).unwrap(),
            ..BridgeConfig::default()
        };
        let (mut ctl, listener, sink) = make_loop(config, MockPointerSink::new());
        listener.queue_client("peer").push_bytes(&[0x00, 0xFF, 0xFB, 0xFF, 0xFB]);

        run_steps(&mut ctl, 1);

        assert_eq!(sink.motions(), vec![(-1, -1); 5]);
        assert_eq!(sink.sync_count(), 5);
    }

    #[test]
    fn test_partial_read_is_discarded() {
        let (mut ctl, listener, sink) = make_loop(BridgeConfig::default(), MockPointerSink::new());
        listener
            .queue_client("peer")
            .push_bytes(&[0x01, 0x00])
            .push_bytes(&[0x00, 0x00, 0x03, 0x00, 0x00]);

        let outcomes = run_steps(&mut ctl, 2);

        assert_eq!(outcomes, vec![StepOutcome::Continue, StepOutcome::Continue]);
        assert_eq!(sink.press_count(MouseButton::Left), 0);
        assert_eq!(sink.motions(), vec![(3, 0)]);
        assert_eq!(ctl.session().partial_reads, 1);
    }

    #[test]
    fn test_disconnect_returns_to_listening_and_accepts_next_client() {
        // Arrange
        let (mut ctl, listener, sink) = make_loop(BridgeConfig::default(), MockPointerSink::new());
        let first = listener.queue_client("first");
        first.push_bytes(&[0x00, 0x00, 0x01, 0x00, 0x00]).push_eof();

        // Act
        run_steps(&mut ctl, 2);
        let after_eof = ctl.connections().state();
        listener.queue_client("second").push_bytes(&[0x00, 0x00, 0x02, 0x00, 0x00]);
        run_steps(&mut ctl, 1);

        // Assert
        assert_eq!(after_eof, ConnectionState::Listening);
        assert_eq!(first.releases(), 1);
        assert_eq!(ctl.connections().peer(), Some("second"));
        assert_eq!(sink.motions(), vec![(1, 0), (2, 0)]);
        assert_eq!(ctl.session().frames, 1, "counters restart per session");
    }

    #[test]
    fn test_hold_mode_buttons_released_on_disconnect() {
        let config = BridgeConfig { button_mode: ButtonMode::Hold, ..BridgeConfig::default() };
        let (mut ctl, listener, sink) = make_loop(config, MockPointerSink::new());
        listener
            .queue_client("peer")
            .push_bytes(&[0x01, 0x00, 0x00, 0x00, 0x00])
            .push_error(io::ErrorKind::ConnectionReset);

        run_steps(&mut ctl, 2);

        assert_eq!(
            sink.events(),
            vec![
                PointerEvent::press(MouseButton::Left),
                PointerEvent::Sync,
                PointerEvent::release(MouseButton::Left),
                PointerEvent::Sync,
            ]
        );
    }

    #[test]
    fn test_sink_errors_do_not_stop_the_loop() {
        let (mut ctl, listener, _sink) = make_loop(BridgeConfig::default(), MockPointerSink::failing());
        listener
            .queue_client("peer")
            .push_bytes(&[0x01, 0x00, 0x00, 0x00, 0x00])
            .push_bytes(&[0x00, 0x00, 0x01, 0x00, 0x01]);

        let outcomes = run_steps(&mut ctl, 3);

        assert_eq!(outcomes[..2], [StepOutcome::Continue, StepOutcome::Continue]);
        assert_eq!(outcomes[2], StepOutcome::Backoff(TIMING.read_backoff));
        assert_eq!(ctl.session().sink_errors, 2);
        assert_eq!(ctl.connections().state(), ConnectionState::Connected);
    }

    #[test]
    fn test_single_sink_failure_keeps_buttons_balanced() {
        // Arrange
        let (mut ctl, listener, sink) =
            make_loop(BridgeConfig::default(), MockPointerSink::failing_syncs(1));
        listener
            .queue_client("peer")
            .push_bytes(&[0x01, 0x00, 0x00, 0x00, 0x00])
            .push_bytes(&[0x00, 0x00, 0x03, 0x00, 0x00])
            .push_eof();

        // Act
        run_steps(&mut ctl, 3);

        // Assert
        assert_eq!(sink.press_count(MouseButton::Left), 1);
        assert_eq!(sink.release_count(MouseButton::Left), 1);
        assert_eq!(sink.motions(), vec![(3, 0)]);
        assert_eq!(ctl.session().sink_errors, 1);
        assert_eq!(ctl.connections().state(), ConnectionState::Listening);
    }

    #[test]
    fn test_shutdown_releases_client_then_listener() {
        let (mut ctl, listener, _sink) = make_loop(BridgeConfig::default(), MockPointerSink::new());
        listener.queue_client("peer");
        run_steps(&mut ctl, 1);

        ctl.shutdown();

        assert_eq!(ctl.connections().state(), ConnectionState::Disconnected);
        assert_eq!(listener.release_log(), vec!["client peer", "listener"]);
    }

    #[tokio::test]
    async fn test_run_exits_after_flag_cleared() {
        // Arrange
        let listener = ScriptedListener::new();
        let sink = Arc::new(MockPointerSink::new());
        let input = EmulateInputUseCase::new(sink, &BridgeConfig::default());
        let timing = LoopTiming {
            idle_backoff: Duration::from_millis(5),
            read_backoff: Duration::from_millis(1),
        };
        let ctl = ControlLoop::new(ConnectionManager::new(listener.boxed()), input, timing);
        let running = Arc::new(AtomicBool::new(true));

        // Act
        let worker = tokio::spawn(ctl.run(Arc::clone(&running)));
        tokio::time::sleep(Duration::from_millis(20)).await;
        running.store(false, Ordering::Relaxed);
        let joined = tokio::time::timeout(Duration::from_secs(2), worker).await;

        // Assert
        assert!(matches!(joined, Ok(Ok(()))));
        assert_eq!(listener.release_log(), vec!["listener"]);
    }
}
