//! Mock input source for unit testing.
//!
//! Allows tests to inject synthetic [`InputEvent`]s without requiring a
//! running Windows message loop or OS hooks.

use std::sync::{Arc, Mutex, PoisonError};

use autocopy_core::InputEvent;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{CaptureError, InputSource};

/// A mock implementation of [`InputSource`] that allows tests to inject events.
///
/// Clones share state, so a test can keep one clone for injection while the
/// orchestrator owns another.
#[derive(Clone, Default)]
pub struct MockInputSource {
    sender: Arc<Mutex<Option<UnboundedSender<InputEvent>>>>,
    uninstall_count: Arc<Mutex<u32>>,
    fail_install: bool,
}

impl MockInputSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose `install` fails as if the hook were refused.
    pub fn failing() -> Self {
        Self {
            fail_install: true,
            ..Self::default()
        }
    }

    /// Injects a synthetic event, as if captured from hardware.
    ///
    /// Returns `false` when not installed or the receiver is gone.
    pub fn inject_event(&self, event: InputEvent) -> bool {
        let guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn uninstall_count(&self) -> u32 {
        *self
            .uninstall_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl InputSource for MockInputSource {
    fn install(&self) -> Result<UnboundedReceiver<InputEvent>, CaptureError> {
        if self.fail_install {
            return Err(CaptureError::HookInstallFailed("mock refusal".to_string()));
        }
        let mut guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_some() {
            return Err(CaptureError::AlreadyInstalled);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *guard = Some(tx);
        Ok(rx)
    }

    fn uninstall(&self) {
        // Dropping the sender closes the channel.
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        *self
            .uninstall_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
    }
}
