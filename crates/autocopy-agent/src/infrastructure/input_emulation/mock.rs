//! Mock shortcut injector for unit and integration tests.
//!
//! Records every shortcut together with the Tokio instant it was sent, so
//! tests running on a paused clock can assert exact delays.
//!
//! Set `should_fail = true` to simulate the OS rejecting the input.

use std::sync::{Mutex, PoisonError};

use tokio::time::Instant;

use super::Shortcut;
use crate::application::selection_copy::{EmulationError, ShortcutInjector};

#[derive(Default)]
pub struct MockShortcutInjector {
    /// Every shortcut attempted, in order, with its send time.
    pub sent: Mutex<Vec<(Shortcut, Instant)>>,
    pub should_fail: bool,
}

impl MockShortcutInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Send times of all attempts of `shortcut`.
    pub fn times_of(&self, shortcut: Shortcut) -> Vec<Instant> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(s, _)| *s == shortcut)
            .map(|(_, at)| *at)
            .collect()
    }

    fn record(&self, shortcut: Shortcut) -> Result<(), EmulationError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((shortcut, Instant::now()));
        if self.should_fail {
            return Err(EmulationError::Platform("mock failure".to_string()));
        }
        Ok(())
    }
}

impl ShortcutInjector for MockShortcutInjector {
    fn send_copy(&self) -> Result<(), EmulationError> {
        self.record(Shortcut::Copy)
    }

    fn send_paste(&self) -> Result<(), EmulationError> {
        self.record(Shortcut::Paste)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_shortcuts_in_order() {
        // Arrange
        let injector = MockShortcutInjector::new();

        // Act
        injector.send_copy().unwrap();
        injector.send_paste().unwrap();

        // Assert
        let sent = injector.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, Shortcut::Copy);
        assert_eq!(sent[1].0, Shortcut::Paste);
    }

    #[tokio::test]
    async fn test_failing_mock_still_records_attempt() {
        let injector = MockShortcutInjector::failing();
        assert!(injector.send_copy().is_err());
        assert_eq!(injector.times_of(Shortcut::Copy).len(), 1);
    }
}
