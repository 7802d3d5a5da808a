//! Bluetooth phone mouse bridge: entry point.
//!
//! Wires together the settings, the virtual pointer, the listening socket and
//! the control loop, then runs until Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! phonemouse-bridge [OPTIONS]
//!
//! Options:
//!   --speed-percent <N>   Pointer speed in percent, may be negative [default: 100]
//!   --interp-steps <N>    Split each frame into N motion steps (0 = off) [default: 0]
//!   --channel <N>         RFCOMM channel, 1..=30 [default: 1]
//!   --button-mode <MODE>  pulse | hold [default: pulse]
//!   --transport <KIND>    rfcomm | tcp [default: rfcomm]
//!   --tcp-bind <ADDR>     Listen address for the TCP transport [default: 127.0.0.1:24810]
//!   --config <PATH>       Settings file [default: ~/.config/phonemouse/config.toml if present]
//!   --log-level <FILTER>  Log filter when RUST_LOG is unset [default: info]
//! ```
//!
//! # Precedence
//!
//! Command line (or its `PHONEMOUSE_*` environment variable) over the
//! settings file over built-in defaults.  `RUST_LOG` always wins for logging.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ settings: file ◀── CLI overrides ──▶ BridgeConfig
//!  └─ UinputPointer::new()            -- virtual mouse
//!  └─ RfcommListener / TcpLinkListener -- listening socket
//!  └─ tokio::spawn(ControlLoop::run)  -- accept, read, emit
//!  └─ Ctrl+C ─▶ running = false ─▶ worker releases client, then listener
//! ```
//!
//! Resources are acquired in the order above and released in reverse, also
//! when startup fails halfway.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use phonemouse_bridge::domain::BridgeConfig;
use phonemouse_bridge::infrastructure::storage::{
    load_default_settings, load_settings, Settings,
};

const DEFAULT_LOG_LEVEL: &str = "info";

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Bluetooth phone mouse bridge.
///
/// Receives pointer frames from a phone over Bluetooth RFCOMM and replays
/// them on a virtual uinput mouse.
///
/// Every option is optional so that unset values fall through to the
/// settings file.
#[derive(Debug, Parser)]
#[command(
    name = "phonemouse-bridge",
    about = "Bluetooth RFCOMM to uinput bridge for a phone-as-touchpad app",
    version
)]
struct Cli {
    /// Pointer speed in percent.  Negative values invert both axes.
    #[arg(long, env = "PHONEMOUSE_SPEED_PERCENT", allow_negative_numbers = true)]
    speed_percent: Option<i32>,

    /// Number of motion steps each frame is split into (0 disables).
    #[arg(long, env = "PHONEMOUSE_INTERP_STEPS", allow_negative_numbers = true)]
    interp_steps: Option<i64>,

    /// RFCOMM channel to listen on (1..=30).
    #[arg(long, env = "PHONEMOUSE_CHANNEL")]
    channel: Option<i64>,

    /// How the button mask is turned into presses.
    ///
    /// `pulse` clicks once for every frame with the bit set; `hold` keeps the
    /// button down while the bit stays set.
    #[arg(long, env = "PHONEMOUSE_BUTTON_MODE", value_parser = ["pulse", "hold"])]
    button_mode: Option<String>,

    /// Listening transport.
    #[arg(long, env = "PHONEMOUSE_TRANSPORT", value_parser = ["rfcomm", "tcp"])]
    transport: Option<String>,

    /// Listen address for `--transport tcp`.
    #[arg(long, env = "PHONEMOUSE_TCP_BIND")]
    tcp_bind: Option<String>,

    /// Settings file.  When given, it must exist.
    #[arg(long, env = "PHONEMOUSE_CONFIG")]
    config: Option<PathBuf>,

    /// `tracing` filter used when `RUST_LOG` is unset (e.g. `debug`).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// The command-line layer of the settings.
    fn overrides(&self) -> Settings {
        Settings {
            speed_percent: self.speed_percent,
            interp_steps: self.interp_steps,
            channel: self.channel,
            button_mode: self.button_mode.clone(),
            transport: self.transport.clone(),
            tcp_bind: self.tcp_bind.clone(),
            log_level: self.log_level.clone(),
        }
    }

    /// Loads the settings file (if any) and layers the command line on top.
    ///
    /// # Errors
    ///
    /// Fails if an explicit `--config` file is missing, or if any settings
    /// file is unreadable or malformed.
    fn resolve_settings(&self) -> anyhow::Result<Settings> {
        let file = match &self.config {
            Some(path) => load_settings(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => load_default_settings().context("failed to load default settings file")?,
        };
        Ok(file.merge(self.overrides()))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.resolve_settings()?;

    // `RUST_LOG` wins; otherwise the resolved `log_level`, otherwise `info`.
    let level = settings.log_level.clone().unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let config = settings.into_config().context("invalid configuration")?;
    info!(
        speed_percent = config.speed.speed_percent(),
        multiplier = config.speed.multiplier(),
        interp_steps = config.interpolation.steps(),
        button_mode = ?config.button_mode,
        "phone mouse bridge starting on {}",
        config.transport
    );

    run(config).await?;

    info!("phone mouse bridge stopped");
    Ok(())
}

/// Acquires the device and the listener, then drives the control loop until
/// Ctrl+C.
#[cfg(target_os = "linux")]
async fn run(config: BridgeConfig) -> anyhow::Result<()> {
    use phonemouse_bridge::application::{
        control_loop::ControlLoop,
        emulate_input::{EmulateInputUseCase, PointerSink},
    };
    use phonemouse_bridge::domain::TransportKind;
    use phonemouse_bridge::infrastructure::{
        input_emulation::uinput::UinputPointer,
        transport::{rfcomm::RfcommListener, tcp::TcpLinkListener, ConnectionManager, LinkListener},
    };

    let sink: Arc<dyn PointerSink> =
        Arc::new(UinputPointer::new().context("failed to register the uinput device")?);

    // On failure here `sink` is dropped on return, unregistering the device.
    let listener: Box<dyn LinkListener> = match config.transport {
        TransportKind::Rfcomm { channel } => Box::new(
            RfcommListener::bind(channel).context("failed to open the RFCOMM listener")?,
        ),
        TransportKind::Tcp { bind } => {
            Box::new(TcpLinkListener::bind(bind).context("failed to open the TCP listener")?)
        }
    };

    let control = ControlLoop::new(
        ConnectionManager::new(listener),
        EmulateInputUseCase::new(Arc::clone(&sink), &config),
        config.timing,
    );

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => tracing::error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    tokio::spawn(control.run(running))
        .await
        .context("control loop task failed")?;

    // The worker has released the client and the listener; the device goes last.
    drop(sink);
    Ok(())
}

#[cfg(not(target_os = "linux"))]
async fn run(_config: BridgeConfig) -> anyhow::Result<()> {
    anyhow::bail!("phonemouse-bridge needs Linux (uinput and BlueZ RFCOMM sockets)")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
