//! Desktop host: the UI thread and everything it owns.
//!
//! The host runs the [`NotificationPresenter`] on a dedicated thread and hands
//! back a [`NotificationHandle`] for every other thread.  On Windows it also
//! owns the clipboard listener window and the tray icon; elsewhere a headless
//! host runs the same presenter against a logging surface.
//!
//! [`NotificationPresenter`]: crate::application::notification::NotificationPresenter

use std::sync::Arc;

use autocopy_core::EnabledFlag;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::application::clipboard_watch::ClipboardSignal;
use crate::application::notification::{NotificationHandle, PresenterSettings};
use crate::application::orchestrator::{ControlCommand, SettingsDialog};

pub mod headless;

#[cfg(target_os = "windows")]
pub mod windows;

/// Error type for starting the desktop host.
#[derive(Debug, Error)]
pub enum DesktopError {
    #[error("failed to spawn UI thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to create {what}: {reason}")]
    Window { what: &'static str, reason: String },
    #[error("invalid notification settings: {0}")]
    Presenter(#[from] autocopy_core::FadeError),
    #[error("UI thread exited during startup")]
    StartupAborted,
}

/// The running UI thread, as seen by the orchestrator.
pub trait DesktopHost: Send {
    /// Tears down the overlay, clipboard listener and tray, and waits for the
    /// UI thread to exit.  Idempotent.
    fn shutdown(&mut self);
}

/// Everything the UI thread reports into and reads from.
pub struct DesktopWiring {
    pub presenter: PresenterSettings,
    /// Read by the tray menu to show the check mark.
    pub enabled: EnabledFlag,
    pub clipboard_tx: UnboundedSender<ClipboardSignal>,
    pub control_tx: UnboundedSender<ControlCommand>,
}

/// A started host plus the handle used to reach its presenter.
pub struct StartedDesktop {
    pub host: Box<dyn DesktopHost>,
    pub notifications: NotificationHandle,
}

/// Starts the desktop host for the current platform.
///
/// # Errors
///
/// Returns [`DesktopError`] if the UI thread or its windows cannot be created.
pub fn start_platform_desktop(wiring: DesktopWiring) -> Result<StartedDesktop, DesktopError> {
    #[cfg(target_os = "windows")]
    {
        windows::start(wiring)
    }

    #[cfg(not(target_os = "windows"))]
    {
        headless::start(wiring)
    }
}

/// Returns the settings prompt for the current platform.
pub fn platform_settings_dialog() -> Arc<dyn SettingsDialog> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::MessageBoxSettingsDialog)
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(headless::UnavailableSettingsDialog)
    }
}
