//! ClipboardWatcher: deduplicated clipboard-change events.
//!
//! The OS pushes a change signal (never polled) every time any process writes
//! the clipboard.  The desktop host reads the text right away and forwards a
//! [`ClipboardSignal`]; this use case folds it into the [`ClipboardSnapshot`]
//! and decides whether the user should hear about it.
//!
//! Rules:
//!
//! - No text format (an image, a file list) → ignored entirely.
//! - Read failure (another process holds the clipboard open) → swallowed; the
//!   next signal will bring the new content.  No retry.
//! - Same text as last time → nothing.
//! - New text → snapshot updated; [`ContentCopied`] emitted while enabled.
//!
//! A synthetic paste never writes the clipboard, so pastes issued by the
//! selection controller can never show up here.

use autocopy_core::{timing::DEFAULT_COPIED_MESSAGE, ClipboardSnapshot, EnabledFlag};
use thiserror::Error;
use tracing::{debug, trace};

/// Error type for clipboard access.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard is held open by another process")]
    Busy,
    #[error("failed to read clipboard data: {0}")]
    Read(String),
    #[error("clipboard access not supported on this platform")]
    Unsupported,
}

/// Read access to the system clipboard.
pub trait ClipboardReader: Send + Sync {
    /// Whether a text format is currently available.  Never opens the clipboard.
    fn has_text(&self) -> bool;

    /// Reads the clipboard text, `Ok(None)` when no text format is present.
    fn read_text(&self) -> Result<Option<String>, ClipboardError>;
}

/// One clipboard change notification, with the content read at that moment.
#[derive(Debug)]
pub enum ClipboardSignal {
    Text(String),
    NonText,
    ReadFailed(ClipboardError),
}

impl ClipboardSignal {
    /// Reads the clipboard through `reader` and wraps the outcome.
    pub fn read_from(reader: &dyn ClipboardReader) -> Self {
        match reader.read_text() {
            Ok(Some(text)) => ClipboardSignal::Text(text),
            Ok(None) => ClipboardSignal::NonText,
            Err(e) => ClipboardSignal::ReadFailed(e),
        }
    }
}

/// Event emitted when new, distinct text lands on the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCopied {
    /// Notification text to display.
    pub message: String,
    /// Snapshot revision that produced this event.
    pub revision: u64,
}

/// The Clipboard Watch use case.
pub struct ClipboardWatcher {
    snapshot: ClipboardSnapshot,
    enabled: EnabledFlag,
    message: String,
}

impl ClipboardWatcher {
    pub fn new(enabled: EnabledFlag) -> Self {
        Self::with_message(enabled, DEFAULT_COPIED_MESSAGE)
    }

    /// Creates a watcher that announces changes with a custom message.
    pub fn with_message(enabled: EnabledFlag, message: impl Into<String>) -> Self {
        Self {
            snapshot: ClipboardSnapshot::new(),
            enabled,
            message: message.into(),
        }
    }

    pub fn snapshot(&self) -> &ClipboardSnapshot {
        &self.snapshot
    }

    /// Handles one change signal.
    ///
    /// The snapshot tracks the clipboard even while disabled, so re-enabling
    /// does not announce text that was copied while the agent was off.
    pub fn on_signal(&mut self, signal: ClipboardSignal) -> Option<ContentCopied> {
        let text = match signal {
            ClipboardSignal::Text(text) => text,
            ClipboardSignal::NonText => {
                trace!("clipboard change without text ignored");
                return None;
            }
            ClipboardSignal::ReadFailed(e) => {
                debug!("clipboard read failed, waiting for next change: {e}");
                return None;
            }
        };

        let change = self.snapshot.observe(Some(&text))?;
        if !self.enabled.get() {
            trace!(revision = change.revision, "clipboard changed while disabled");
            return None;
        }
        debug!(revision = change.revision, len = change.text.len(), "clipboard text changed");
        Some(ContentCopied {
            message: self.message.clone(),
            revision: change.revision,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
