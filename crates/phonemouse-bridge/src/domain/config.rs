//! Bridge configuration types.
//!
//! [`BridgeConfig`] is the single source of truth for all runtime settings.
//! It is built once at startup from CLI arguments and the optional settings
//! file, validated, and then moved into the control loop.  Nothing in it
//! changes while the bridge runs.
//!
//! # Validation happens here, not at runtime
//!
//! A negative interpolation step count or an out-of-range RFCOMM channel is a
//! startup failure with a descriptive error.  Once a `BridgeConfig` exists,
//! every field is known to be usable, so the control loop never has to
//! re-check anything.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use phonemouse_core::{compute_multiplier, ButtonMode};
use thiserror::Error;

/// Default speed: 100 % (unchanged deltas).
pub const DEFAULT_SPEED_PERCENT: i32 = 100;

/// Default RFCOMM channel the phone app connects to.
pub const DEFAULT_RFCOMM_CHANNEL: u8 = 1;

/// Default loopback address for the development TCP transport.
pub const DEFAULT_TCP_BIND: &str = "127.0.0.1:24810";

/// Sleep between accept attempts while no client is connected.
pub const IDLE_BACKOFF: Duration = Duration::from_secs(1);

/// Sleep between read attempts while a client is connected but silent.
pub const READ_BACKOFF: Duration = Duration::from_millis(5);

/// Errors raised while validating startup configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `interp_steps` was negative.
    #[error("interp_steps must be >= 0 (got {0})")]
    NegativeInterpSteps(i64),

    /// `interp_steps` does not fit the step counter.
    #[error("interp_steps is too large (got {0}, max {max})", max = u32::MAX)]
    InterpStepsTooLarge(i64),

    /// RFCOMM channels are numbered 1 to 30.
    #[error("RFCOMM channel must be in 1..=30 (got {0})")]
    InvalidChannel(i64),

    /// Unknown `--button-mode` / `button_mode` value.
    #[error("unknown button mode '{0}' (expected 'pulse' or 'hold')")]
    UnknownButtonMode(String),

    /// Unknown `--transport` / `transport` value.
    #[error("unknown transport '{0}' (expected 'rfcomm' or 'tcp')")]
    UnknownTransport(String),

    /// `tcp_bind` is not a socket address.
    #[error("invalid TCP bind address '{0}'")]
    InvalidTcpBind(String),
}

// ── Speed ─────────────────────────────────────────────────────────────────────

/// Speed percentage and its derived Q16.16 multiplier.
///
/// The multiplier is computed once in [`SpeedConfig::new`]; there is no
/// setter, so it cannot drift from the percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedConfig {
    speed_percent: i32,
    multiplier: i64,
}

impl SpeedConfig {
    /// Every percentage is valid: `0` freezes the pointer, negative inverts it.
    pub fn new(speed_percent: i32) -> Self {
        Self {
            speed_percent,
            multiplier: compute_multiplier(speed_percent),
        }
    }

    pub fn speed_percent(&self) -> i32 {
        self.speed_percent
    }

    /// Q16.16 multiplier (`65536` = 1.0).
    pub fn multiplier(&self) -> i64 {
        self.multiplier
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_PERCENT)
    }
}

// ── Interpolation ─────────────────────────────────────────────────────────────

/// Number of sub-steps each motion delta is split into (`0` = disabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterpolationConfig {
    steps: u32,
}

impl InterpolationConfig {
    /// Validates a raw step count.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NegativeInterpSteps`] for negative input and
    /// [`ConfigError::InterpStepsTooLarge`] above `u32::MAX`.
    pub fn new(steps: i64) -> Result<Self, ConfigError> {
        if steps < 0 {
            return Err(ConfigError::NegativeInterpSteps(steps));
        }
        let steps = u32::try_from(steps).map_err(|_| ConfigError::InterpStepsTooLarge(steps))?;
        Ok(Self { steps })
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }
}

// ── Transport ─────────────────────────────────────────────────────────────────

/// Which byte-stream listener the bridge accepts the phone on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Bluetooth RFCOMM on the given channel.
    Rfcomm { channel: u8 },
    /// Plain TCP, for development without a radio.
    Tcp { bind: SocketAddr },
}

impl TransportKind {
    /// Validates an RFCOMM channel number.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidChannel`] outside `1..=30`.
    pub fn rfcomm(channel: i64) -> Result<Self, ConfigError> {
        match u8::try_from(channel) {
            Ok(c @ 1..=30) => Ok(Self::Rfcomm { channel: c }),
            _ => Err(ConfigError::InvalidChannel(channel)),
        }
    }

    /// Parses the TCP bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTcpBind`] if `bind` is not `ip:port`.
    pub fn tcp(bind: &str) -> Result<Self, ConfigError> {
        bind.parse()
            .map(|bind| Self::Tcp { bind })
            .map_err(|_| ConfigError::InvalidTcpBind(bind.to_string()))
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rfcomm { channel } => write!(f, "RFCOMM channel {channel}"),
            Self::Tcp { bind } => write!(f, "TCP {bind}"),
        }
    }
}

/// Parses `"pulse"` / `"hold"` (case-insensitive).
pub fn parse_button_mode(s: &str) -> Result<ButtonMode, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "pulse" => Ok(ButtonMode::Pulse),
        "hold" => Ok(ButtonMode::Hold),
        _ => Err(ConfigError::UnknownButtonMode(s.to_string())),
    }
}

/// Transport selector before its parameters are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportName {
    Rfcomm,
    Tcp,
}

impl FromStr for TransportName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rfcomm" | "bluetooth" => Ok(Self::Rfcomm),
            "tcp" => Ok(Self::Tcp),
            _ => Err(ConfigError::UnknownTransport(s.to_string())),
        }
    }
}

// ── Loop timing ───────────────────────────────────────────────────────────────

/// Backoff durations of the control loop.
///
/// They bound both CPU usage and how long a stop request can go unnoticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    /// Sleep after an accept attempt found no pending client.
    pub idle_backoff: Duration,
    /// Sleep after a read attempt found no data.
    pub read_backoff: Duration,
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self {
            idle_backoff: IDLE_BACKOFF,
            read_backoff: READ_BACKOFF,
        }
    }
}

// ── Aggregate ─────────────────────────────────────────────────────────────────

/// All validated runtime configuration for the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub speed: SpeedConfig,
    pub interpolation: InterpolationConfig,
    pub button_mode: ButtonMode,
    pub transport: TransportKind,
    pub timing: LoopTiming,
}

impl Default for BridgeConfig {
    /// | Field         | Default            |
    /// |---------------|--------------------|
    /// | speed         | 100 %              |
    /// | interpolation | disabled           |
    /// | button_mode   | pulse              |
    /// | transport     | RFCOMM channel 1   |
    /// | timing        | 1 s idle / 5 ms read |
    fn default() -> Self {
        Self {
            speed: SpeedConfig::default(),
            interpolation: InterpolationConfig::default(),
            button_mode: ButtonMode::default(),
            transport: TransportKind::Rfcomm { channel: DEFAULT_RFCOMM_CHANNEL },
            timing: LoopTiming::default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
