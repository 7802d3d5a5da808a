//! Storage infrastructure: the optional TOML settings file.
//!
//! The `settings` sub-module handles:
//!
//! - Locating `~/.config/phonemouse/config.toml` (honouring `XDG_CONFIG_HOME`).
//! - Parsing it into a [`Settings`] layer where every field is optional.
//! - Merging that layer under command-line overrides and validating the
//!   result into a [`BridgeConfig`](crate::domain::BridgeConfig).
//!
//! The bridge never writes the file.

pub mod settings;

pub use settings::{
    default_settings_path, load_default_settings, load_settings, parse_settings, Settings,
    SettingsError,
};
