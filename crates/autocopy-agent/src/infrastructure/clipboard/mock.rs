//! In-memory clipboard for tests.
//!
//! `set_text` plays the role of the focused application answering a copy
//! shortcut; `set_busy` simulates another process holding the clipboard open.

use std::sync::{Mutex, PoisonError};

use crate::application::clipboard_watch::{ClipboardError, ClipboardReader};

#[derive(Default)]
pub struct MockClipboard {
    text: Mutex<Option<String>>,
    busy: Mutex<bool>,
}

impl MockClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let clipboard = Self::new();
        clipboard.set_text(text);
        clipboard
    }

    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.into());
    }

    /// Replaces the content with a non-text format.
    pub fn set_non_text(&self) {
        *self.text.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn set_busy(&self, busy: bool) {
        *self.busy.lock().unwrap_or_else(PoisonError::into_inner) = busy;
    }
}

impl ClipboardReader for MockClipboard {
    fn has_text(&self) -> bool {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        if *self.busy.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(ClipboardError::Busy);
        }
        Ok(self
            .text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
