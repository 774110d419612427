//! Selection inference: the `Idle` / `Selecting` state machine.
//!
//! The agent never asks an application whether text is selected.  Instead it
//! infers intent from button timing:
//!
//! ```text
//!            PrimaryDown                PrimaryUp
//!   Idle ──────────────────▶ Selecting ──────────────▶ Idle
//!                                         │
//!                                         └─ enabled? → CopyAfterDelay
//!
//!   MiddleClick (any state) ── enabled? → PasteIfText
//! ```
//!
//! The tracker is a plain value with no clock and no I/O.  The caller owns the
//! delay and decides whether the clipboard actually holds text.

use super::input::InputEventKind;

/// Whether a drag selection is currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selecting,
}

/// What the controller should do in response to one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionIntent {
    /// Nothing to do.
    Nothing,
    /// A selection just finished: issue a synthetic copy after the debounce delay.
    CopyAfterDelay,
    /// Issue a synthetic paste immediately, but only if the clipboard holds text.
    PasteIfText,
}

/// Owns the [`SelectionState`] and maps events to [`SelectionIntent`]s.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    state: SelectionState,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Advances the state machine by one event.
    ///
    /// `enabled` is sampled once by the caller for this event.  State
    /// transitions happen regardless of `enabled`, so re-enabling in the middle
    /// of a drag never leaves a stale `Selecting` behind.
    pub fn on_event(&mut self, kind: InputEventKind, enabled: bool) -> SelectionIntent {
        match kind {
            InputEventKind::PrimaryDown => {
                self.state = SelectionState::Selecting;
                SelectionIntent::Nothing
            }
            InputEventKind::PrimaryUp => {
                let was_selecting = self.state == SelectionState::Selecting;
                self.state = SelectionState::Idle;
                if was_selecting && enabled {
                    SelectionIntent::CopyAfterDelay
                } else {
                    SelectionIntent::Nothing
                }
            }
            InputEventKind::MiddleClick => {
                if enabled {
                    SelectionIntent::PasteIfText
                } else {
                    SelectionIntent::Nothing
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
