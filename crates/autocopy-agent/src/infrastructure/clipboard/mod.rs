//! Clipboard read access.
//!
//! Only text is ever read; the agent never writes the clipboard itself (the
//! focused application does, in response to the synthetic copy shortcut).
//! Change notifications are not delivered here but by the desktop host's
//! clipboard listener window.

use std::sync::Arc;

use crate::application::clipboard_watch::{ClipboardError, ClipboardReader};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Reader for platforms without clipboard support: never has text.
#[derive(Debug, Default)]
pub struct UnsupportedClipboard;

impl ClipboardReader for UnsupportedClipboard {
    fn has_text(&self) -> bool {
        false
    }

    fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        Err(ClipboardError::Unsupported)
    }
}

/// Returns the clipboard reader for the current platform.
pub fn platform_clipboard_reader() -> Arc<dyn ClipboardReader> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::WindowsClipboardReader)
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(UnsupportedClipboard)
    }
}
