//! Layered settings: command line over file over built-in defaults.
//!
//! Example file:
//!
//! ```toml
//! speed_percent = 150
//! interp_steps = 4
//! button_mode = "hold"
//! transport = "rfcomm"
//! channel = 3
//! log_level = "debug"
//! ```
//!
//! Every key is optional.  Unknown keys are rejected so that a typo does not
//! silently fall back to a default.  Values are kept raw (signed integers,
//! strings) until [`Settings::into_config`] so that a negative
//! `interp_steps` in the file reports the same error as on the command line.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{
    config::{DEFAULT_RFCOMM_CHANNEL, DEFAULT_SPEED_PERCENT, DEFAULT_TCP_BIND},
    parse_button_mode, BridgeConfig, ConfigError, InterpolationConfig, LoopTiming, SpeedConfig,
    TransportKind, TransportName,
};

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file could not be read.
    #[error("I/O error reading settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One layer of raw, unvalidated settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Pointer speed in percent; may be zero or negative.
    pub speed_percent: Option<i32>,
    /// Sub-steps per frame; must be `>= 0`.
    pub interp_steps: Option<i64>,
    /// RFCOMM channel, `1..=30`.
    pub channel: Option<i64>,
    /// `"pulse"` or `"hold"`.
    pub button_mode: Option<String>,
    /// `"rfcomm"` or `"tcp"`.
    pub transport: Option<String>,
    /// `ip:port` for the TCP transport.
    pub tcp_bind: Option<String>,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_level: Option<String>,
}

impl Settings {
    /// Returns `self` with every field present in `overrides` replaced.
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            speed_percent: overrides.speed_percent.or(self.speed_percent),
            interp_steps: overrides.interp_steps.or(self.interp_steps),
            channel: overrides.channel.or(self.channel),
            button_mode: overrides.button_mode.or(self.button_mode),
            transport: overrides.transport.or(self.transport),
            tcp_bind: overrides.tcp_bind.or(self.tcp_bind),
            log_level: overrides.log_level.or(self.log_level),
        }
    }

    /// Validates the layer, filling gaps with defaults.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.  The channel is only checked
    /// for the RFCOMM transport and the bind address only for TCP.
    pub fn into_config(self) -> Result<BridgeConfig, ConfigError> {
        let speed = SpeedConfig::new(self.speed_percent.unwrap_or(DEFAULT_SPEED_PERCENT));
        let interpolation = InterpolationConfig::new(self.interp_steps.unwrap_or(0))?;
        let button_mode = match self.button_mode.as_deref() {
            Some(s) => parse_button_mode(s)?,
            None => Default::default(),
        };
        let transport_name = match self.transport.as_deref() {
            Some(s) => s.parse()?,
            None => TransportName::Rfcomm,
        };
        let transport = match transport_name {
            TransportName::Rfcomm => {
                TransportKind::rfcomm(self.channel.unwrap_or(i64::from(DEFAULT_RFCOMM_CHANNEL)))?
            }
            TransportName::Tcp => {
                TransportKind::tcp(self.tcp_bind.as_deref().unwrap_or(DEFAULT_TCP_BIND))?
            }
        };

        Ok(BridgeConfig {
            speed,
            interpolation,
            button_mode,
            transport,
            timing: LoopTiming::default(),
        })
    }
}

/// Parses settings from TOML text.
///
/// # Errors
///
/// Returns [`SettingsError::Parse`] for malformed TOML, wrong value types, or
/// unknown keys.
pub fn parse_settings(content: &str) -> Result<Settings, SettingsError> {
    Ok(toml::from_str(content)?)
}

/// Loads the file at `path`, which must exist.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] if the file cannot be read (including "not
/// found") and [`SettingsError::Parse`] if it is malformed.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&content)
}

/// Loads the file at the default location, or an empty layer when there is
/// no such file.
///
/// # Errors
///
/// Same as [`load_settings`] except that a missing file is not an error.
pub fn load_default_settings() -> Result<Settings, SettingsError> {
    let Some(path) = default_settings_path() else {
        return Ok(Settings::default());
    };
    match load_settings(&path) {
        Err(SettingsError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(Settings::default())
        }
        other => other,
    }
}

/// `$XDG_CONFIG_HOME/phonemouse/config.toml`, falling back to
/// `$HOME/.config/phonemouse/config.toml`.
pub fn default_settings_path() -> Option<PathBuf> {
    settings_path_from(
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
}

fn settings_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let base = xdg_config_home
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("phonemouse").join("config.toml"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
