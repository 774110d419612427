//! SelectionCopyController: turns mouse gestures into copy and paste shortcuts.
//!
//! This use case is the heart of the agent.  It receives [`InputEvent`]s from
//! the capture service, runs them through the [`SelectionTracker`] and
//! dispatches synthetic keyboard shortcuts through a [`ShortcutInjector`].
//!
//! # Timing contract
//!
//! When a drag selection ends, the host application has not yet committed
//! its final selection range.  The copy is therefore *scheduled* on the Tokio
//! timer `copy_delay` after the button-up is handled, never executed inline
//! and never implemented as a sleep on the thread delivering events.  An
//! up-then-down inside the delay window does not cancel the pending copy.
//!
//! Paste on middle-click has no delay.
//!
//! # Feedback loops
//!
//! Shortcuts are injected as *keyboard* input.  The capture service only
//! observes *mouse* buttons, so an injected Ctrl+C can never re-enter this
//! controller.
//!
//! # Architecture
//!
//! Depends only on traits (`ShortcutInjector`, `ClipboardReader`,
//! `CaretProbe`) and domain types, so it is fully unit-testable.

use std::sync::Arc;
use std::time::Duration;

use autocopy_core::{
    timing::DEFAULT_COPY_DELAY, EnabledFlag, InputEvent, SelectionIntent, SelectionState,
    SelectionTracker,
};
use thiserror::Error;
use tracing::{debug, trace};

use crate::application::clipboard_watch::ClipboardReader;

/// Error type for synthetic input injection.
#[derive(Debug, Error)]
pub enum EmulationError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("only {sent} of {expected} input events were accepted")]
    PartiallySent { sent: u32, expected: u32 },
}

/// Injects the platform's copy and paste shortcuts.
///
/// Each call is fire-and-forget from the controller's point of view: errors
/// are logged, never retried.
pub trait ShortcutInjector: Send + Sync {
    /// Emits the copy shortcut (Ctrl+C on Windows).
    fn send_copy(&self) -> Result<(), EmulationError>;

    /// Emits the paste shortcut (Ctrl+V on Windows).
    fn send_paste(&self) -> Result<(), EmulationError>;
}

/// Reports whether the focused window currently shows a text caret.
///
/// Implementations must fail safe: any introspection error is reported as
/// `false` ("no selection").
pub trait CaretProbe: Send + Sync {
    fn has_caret(&self) -> bool;
}

/// Tunables for [`SelectionCopyController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSettings {
    /// Delay between the primary button-up and the synthetic copy.
    pub copy_delay: Duration,
    /// When `true`, a scheduled copy only fires if a caret is present.
    pub require_caret: bool,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            copy_delay: DEFAULT_COPY_DELAY,
            require_caret: false,
        }
    }
}

/// The Selection Copy use case.
pub struct SelectionCopyController {
    tracker: SelectionTracker,
    enabled: EnabledFlag,
    injector: Arc<dyn ShortcutInjector>,
    clipboard: Arc<dyn ClipboardReader>,
    caret: Option<Arc<dyn CaretProbe>>,
    settings: SelectionSettings,
}

impl SelectionCopyController {
    pub fn new(
        enabled: EnabledFlag,
        injector: Arc<dyn ShortcutInjector>,
        clipboard: Arc<dyn ClipboardReader>,
        settings: SelectionSettings,
    ) -> Self {
        Self {
            tracker: SelectionTracker::new(),
            enabled,
            injector,
            clipboard,
            caret: None,
            settings,
        }
    }

    /// Attaches the probe consulted when `require_caret` is set.
    pub fn with_caret_probe(mut self, probe: Arc<dyn CaretProbe>) -> Self {
        self.caret = Some(probe);
        self
    }

    pub fn selection_state(&self) -> SelectionState {
        self.tracker.state()
    }

    /// Handles one captured mouse event.
    ///
    /// Must be called from within a Tokio runtime: copies are scheduled with
    /// [`tokio::spawn`].  Returns the intent that was acted on.
    pub fn handle_event(&mut self, event: InputEvent) -> SelectionIntent {
        let enabled = self.enabled.get();
        let intent = self.tracker.on_event(event.kind, enabled);
        trace!(?event, enabled, ?intent, "selection event");

        match intent {
            SelectionIntent::Nothing => {}
            SelectionIntent::CopyAfterDelay => self.schedule_copy(event.timestamp_ms),
            SelectionIntent::PasteIfText => self.paste_if_text(),
        }
        intent
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn schedule_copy(&self, released_at_ms: u32) {
        let injector = Arc::clone(&self.injector);
        let caret = if self.settings.require_caret {
            self.caret.clone()
        } else {
            None
        };
        let delay = self.settings.copy_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(probe) = caret {
                if !probe.has_caret() {
                    debug!(released_at_ms, "no caret in focused window; copy skipped");
                    return;
                }
            }
            match injector.send_copy() {
                Ok(()) => debug!(released_at_ms, "copy shortcut sent"),
                Err(e) => debug!(released_at_ms, "copy shortcut failed: {e}"),
            }
        });
    }

    fn paste_if_text(&self) {
        if !self.clipboard.has_text() {
            trace!("middle-click ignored: clipboard holds no text");
            return;
        }
        match self.injector.send_paste() {
            Ok(()) => debug!("paste shortcut sent"),
            Err(e) => debug!("paste shortcut failed: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
