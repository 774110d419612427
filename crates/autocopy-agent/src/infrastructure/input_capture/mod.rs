//! Input capture infrastructure.
//!
//! On Windows, this installs a low-level mouse hook (`WH_MOUSE_LL`) on a
//! dedicated Win32 message loop thread.  Classified events are pushed into an
//! unbounded Tokio channel and consumed by the orchestrator.
//!
//! # Windows-Specific Implementation
//!
//! The hook callback must complete within the system's low-level hook timeout
//! or Windows silently removes the hook.  The callback therefore only
//! classifies the message and sends it; everything else happens on the Tokio
//! side of the channel.
//!
//! # Testability
//!
//! The [`InputSource`] trait allows unit tests to inject synthetic events
//! without requiring Windows hooks.

use autocopy_core::InputEvent;
use tokio::sync::mpsc::UnboundedReceiver;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to install mouse hook: {0}")]
    HookInstallFailed(String),
    #[error("mouse hook is already installed")]
    AlreadyInstalled,
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting the system-wide mouse observer.
///
/// The production implementation uses a Windows hook; tests use
/// [`mock::MockInputSource`].
pub trait InputSource: Send {
    /// Registers the observer and returns a receiver for captured events.
    fn install(&self) -> Result<UnboundedReceiver<InputEvent>, CaptureError>;

    /// Unregisters the observer and waits for its thread to exit.  Closes the
    /// event channel.  Calling it when not installed is a no-op.
    fn uninstall(&self);
}

/// Placeholder for platforms without a hook implementation.
#[derive(Debug, Default)]
pub struct UnsupportedInputSource;

impl InputSource for UnsupportedInputSource {
    fn install(&self) -> Result<UnboundedReceiver<InputEvent>, CaptureError> {
        Err(CaptureError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }

    fn uninstall(&self) {}
}

/// Returns the input source for the current platform.
pub fn platform_input_source() -> Box<dyn InputSource> {
    #[cfg(target_os = "windows")]
    {
        Box::new(windows::WindowsMouseHook::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Box::new(UnsupportedInputSource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_source_reports_platform() {
        let result = UnsupportedInputSource.install();
        assert!(matches!(result, Err(CaptureError::UnsupportedPlatform(_))));
    }
}
