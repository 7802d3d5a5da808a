//! Domain layer for phonemouse-bridge.
//!
//! Contains the validated runtime configuration.  Nothing here performs I/O:
//! the infrastructure layer (CLI parsing, TOML file loading) is responsible for
//! gathering raw values, and the domain layer decides whether they are valid.

pub mod config;

pub use config::{
    parse_button_mode, BridgeConfig, ConfigError, InterpolationConfig, LoopTiming, SpeedConfig,
    TransportKind, TransportName,
};
