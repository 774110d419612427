//! Notification fade lifecycle.
//!
//! ```text
//!   Hidden ──restart()──▶ Showing ──tick()──▶ Fading ──tick()…──▶ Hidden
//!                            ▲                   │
//!                            └────restart()──────┘
//! ```
//!
//! Each tick removes one fixed `step` of opacity; the window is hidden on the
//! tick that takes it to zero or below.  Opacity is derived from an integer
//! tick count rather than accumulated as a float, so float drift cannot add
//! a tick: a step of `0.1` always takes exactly ten.

use thiserror::Error;

/// Errors raised when constructing a [`FadeSequence`].
#[derive(Debug, Error, PartialEq)]
pub enum FadeError {
    #[error("fade step must be in (0, 1], got {0}")]
    InvalidStep(f32),
}

/// Visible lifecycle phase of the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadePhase {
    #[default]
    Hidden,
    /// Just shown at full opacity; no tick has elapsed yet.
    Showing,
    /// At least one tick has dimmed the window.
    Fading,
}

/// Snapshot of the fade: current opacity and whether a fade is in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeState {
    pub opacity: f32,
    pub active: bool,
}

/// Outcome of a single timer tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeTick {
    /// The window was dimmed to the contained opacity and keeps fading.
    Dimmed(f32),
    /// Opacity reached zero; the window must be hidden and the timer stopped.
    Expired,
    /// No fade was active; the tick was stale and should stop the timer.
    Idle,
}

impl FadeTick {
    /// Whether the timer driving this sequence should keep running.
    pub fn keeps_timer(self) -> bool {
        matches!(self, FadeTick::Dimmed(_))
    }
}

/// Slack absorbing the representation error of steps like `0.1`.
const STEP_EPSILON: f32 = 1e-4;

/// Number of ticks a given step needs to go from 1.0 to 0.0 or below.
pub(crate) fn steps_for(step: f32) -> u32 {
    ((1.0 / step - STEP_EPSILON).ceil() as u32).max(1)
}

/// The fade state machine owned by the notification presenter.
#[derive(Debug, Clone)]
pub struct FadeSequence {
    step: f32,
    total_steps: u32,
    elapsed: u32,
    phase: FadePhase,
}

impl FadeSequence {
    /// Creates a hidden sequence that removes `step` opacity per tick.
    ///
    /// # Errors
    ///
    /// Returns [`FadeError::InvalidStep`] unless `0 < step <= 1`.
    pub fn new(step: f32) -> Result<Self, FadeError> {
        if !(step > 0.0 && step <= 1.0) {
            return Err(FadeError::InvalidStep(step));
        }
        Ok(Self {
            step,
            total_steps: steps_for(step),
            elapsed: 0,
            phase: FadePhase::Hidden,
        })
    }

    pub fn phase(&self) -> FadePhase {
        self.phase
    }

    /// Number of ticks from a fresh show until the window is hidden.
    pub fn total_ticks(&self) -> u32 {
        self.total_steps
    }

    pub fn opacity(&self) -> f32 {
        if self.phase == FadePhase::Hidden {
            return 0.0;
        }
        (1.0 - self.elapsed as f32 * self.step).max(0.0)
    }

    pub fn is_active(&self) -> bool {
        self.phase != FadePhase::Hidden
    }

    pub fn state(&self) -> FadeState {
        FadeState {
            opacity: self.opacity(),
            active: self.is_active(),
        }
    }

    /// Starts (or restarts) the sequence at full opacity.
    ///
    /// Any in-flight fade is discarded; there is only ever one.
    pub fn restart(&mut self) {
        self.elapsed = 0;
        self.phase = FadePhase::Showing;
    }

    /// Abandons any fade in flight without producing a tick.
    pub fn cancel(&mut self) {
        self.elapsed = 0;
        self.phase = FadePhase::Hidden;
    }

    /// Applies one timer tick.
    pub fn tick(&mut self) -> FadeTick {
        if self.phase == FadePhase::Hidden {
            return FadeTick::Idle;
        }
        self.elapsed += 1;
        if self.elapsed >= self.total_steps {
            self.phase = FadePhase::Hidden;
            FadeTick::Expired
        } else {
            self.phase = FadePhase::Fading;
            FadeTick::Dimmed(self.opacity())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
