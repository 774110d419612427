//! AutoCopy agent entry point.
//!
//! Wires together all infrastructure services and runs the orchestrator on
//! the Tokio runtime until the tray's Exit item or Ctrl-C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ TomlConfigStore::open   -- loads config.toml
//!  └─ InstanceGuard::acquire  -- refuses a second agent
//!  └─ start_platform_desktop  -- UI thread: overlay, clipboard listener, tray
//!  └─ Orchestrator::run       -- select! over mouse, clipboard and tray events
//! ```

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use autocopy_agent::application::orchestrator::{
    ConfigStore, EventChannels, Orchestrator, OrchestratorSettings, Services,
};
use autocopy_agent::infrastructure::clipboard::platform_clipboard_reader;
use autocopy_agent::infrastructure::desktop::{
    platform_settings_dialog, start_platform_desktop, DesktopWiring,
};
use autocopy_agent::infrastructure::input_capture::platform_input_source;
use autocopy_agent::infrastructure::input_emulation::platform_injector;
use autocopy_agent::infrastructure::storage::config::TomlConfigStore;
use autocopy_agent::infrastructure::system::autostart::platform_autostart;
use autocopy_agent::infrastructure::system::caret::platform_caret_probe;
use autocopy_agent::infrastructure::system::single_instance::{
    report_already_running, InstanceError, InstanceGuard, INSTANCE_NAME,
};
use autocopy_core::EnabledFlag;

/// Copy on selection, paste on middle-click.
#[derive(Debug, Parser)]
#[command(name = "autocopy", version, about)]
struct Args {
    /// Path to config.toml (defaults to the platform config directory).
    #[arg(long, env = "AUTOCOPY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset: error, warn, info, debug or trace.
    #[arg(long, env = "AUTOCOPY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Start with automation off regardless of the saved setting.
    #[arg(long, env = "AUTOCOPY_START_DISABLED")]
    start_disabled: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let store = match args.config.clone() {
        Some(path) => TomlConfigStore::open(path),
        None => TomlConfigStore::open_default(),
    };

    // RUST_LOG wins, then --log-level, then the config file.
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| store.config().general.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"))
        }))
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "AutoCopy starting");
    if let Some(path) = store.path() {
        info!(path = %path.display(), "configuration file");
    }

    let _instance = match InstanceGuard::acquire(INSTANCE_NAME) {
        Ok(guard) => guard,
        Err(InstanceError::AlreadyRunning) => {
            report_already_running();
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let config = store.config().clone();
    let enabled = EnabledFlag::new(store.enabled() && !args.start_disabled);

    // ── Desktop host (UI thread) ──────────────────────────────────────────────
    let (clipboard_tx, clipboard_rx) = mpsc::unbounded_channel();
    let (control_tx, control_rx) = mpsc::unbounded_channel();
    let desktop = start_platform_desktop(DesktopWiring {
        presenter: config.presenter_settings(),
        enabled: enabled.clone(),
        clipboard_tx,
        control_tx,
    })?;

    // ── Orchestrator ──────────────────────────────────────────────────────────
    let caret = if config.selection.require_caret {
        platform_caret_probe()
    } else {
        None
    };
    let services = Services {
        enabled,
        config: store,
        input: platform_input_source(),
        desktop: desktop.host,
        injector: platform_injector(),
        clipboard: platform_clipboard_reader(),
        caret,
        autostart: platform_autostart(),
        settings_dialog: platform_settings_dialog(),
        notifications: desktop.notifications,
    };
    let settings = OrchestratorSettings {
        selection: config.selection_settings(),
        copied_message: config.notification.copied_message.clone(),
    };

    Orchestrator::new(services, settings)
        .run(EventChannels {
            clipboard: clipboard_rx,
            control: control_rx,
        })
        .await;

    info!("AutoCopy stopped");
    Ok(())
}
