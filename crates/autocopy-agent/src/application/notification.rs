//! NotificationPresenter: the transient "Text copied" overlay.
//!
//! # Threading model
//!
//! The presenter is owned by exactly one thread, the desktop host's UI
//! thread, and is never shared.  Every other thread talks to it through a
//! [`NotificationHandle`]:
//!
//! ```text
//!  any thread                          UI thread
//!  ──────────                          ─────────
//!  handle.show_message("…")
//!    ├─ lock slot, overwrite request
//!    └─ waker.wake() ───────────────▶  presenter.deliver(&mailbox)
//!                                        └─ surface.show / set_opacity
//!                                     timer tick ─▶ presenter.tick()
//! ```
//!
//! The slot holds at most one request: a newer message overwrites an
//! undelivered older one, so there is no queue and the latest message always
//! wins.  Fade ticks are cooperative: [`NotificationPresenter::show`] and
//! [`NotificationPresenter::tick`] return a [`TimerDirective`] and the host
//! starts, keeps or stops its timer accordingly.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use autocopy_core::{
    timing::{DEFAULT_FADE_STEP, DEFAULT_FADE_TICK},
    FadeError, FadePhase, FadeSequence, FadeState, FadeTick, NotificationGeometry, WorkArea,
};
use tracing::{debug, trace};

/// A request to display `message`.  Consumed immediately, never queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub message: String,
}

/// The platform window the presenter draws into.
///
/// Implementations live on the presenter's thread and need not be `Send`.
pub trait OverlaySurface {
    /// Usable area of the primary display.
    fn work_area(&self) -> WorkArea;

    /// Sets the text, moves the window to `origin` with `geometry`'s size and
    /// makes it visible without taking focus.
    fn show(&mut self, text: &str, origin: (i32, i32), geometry: NotificationGeometry);

    /// Applies an opacity in `[0, 1]`.
    fn set_opacity(&mut self, opacity: f32);

    fn hide(&mut self);
}

/// What the owning thread must do with its fade timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerDirective {
    /// (Re)start the periodic timer with this interval.
    Restart(Duration),
    /// Leave the running timer alone.
    Keep,
    /// Stop the timer.
    Stop,
}

/// Presenter tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresenterSettings {
    pub fade_step: f32,
    pub tick_interval: Duration,
    pub geometry: NotificationGeometry,
}

impl Default for PresenterSettings {
    fn default() -> Self {
        Self {
            fade_step: DEFAULT_FADE_STEP,
            tick_interval: DEFAULT_FADE_TICK,
            geometry: NotificationGeometry::default(),
        }
    }
}

/// Single-owner presenter state: the fade, the surface and the current text.
pub struct NotificationPresenter<S: OverlaySurface> {
    surface: S,
    fade: FadeSequence,
    settings: PresenterSettings,
    message: Option<String>,
}

impl<S: OverlaySurface> NotificationPresenter<S> {
    /// # Errors
    ///
    /// Returns [`FadeError::InvalidStep`] if `settings.fade_step` is outside `(0, 1]`.
    pub fn new(surface: S, settings: PresenterSettings) -> Result<Self, FadeError> {
        Ok(Self {
            surface,
            fade: FadeSequence::new(settings.fade_step)?,
            settings,
            message: None,
        })
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn phase(&self) -> FadePhase {
        self.fade.phase()
    }

    pub fn fade_state(&self) -> FadeState {
        self.fade.state()
    }

    /// Text currently (or last) displayed.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Shows `request`, pre-empting any fade in progress.
    pub fn show(&mut self, request: NotificationRequest) -> TimerDirective {
        let geometry = self.settings.geometry;
        let origin = geometry.origin_in(self.surface.work_area());

        if self.fade.is_active() {
            trace!(opacity = self.fade.opacity(), "notification pre-empted");
        }
        self.fade.restart();
        self.surface.show(&request.message, origin, geometry);
        self.surface.set_opacity(self.fade.opacity());
        debug!(message = %request.message, x = origin.0, y = origin.1, "notification shown");
        self.message = Some(request.message);

        TimerDirective::Restart(self.settings.tick_interval)
    }

    /// Advances the fade by one timer tick.
    pub fn tick(&mut self) -> TimerDirective {
        match self.fade.tick() {
            FadeTick::Dimmed(opacity) => {
                self.surface.set_opacity(opacity);
                TimerDirective::Keep
            }
            FadeTick::Expired => {
                self.surface.set_opacity(0.0);
                self.surface.hide();
                trace!("notification hidden");
                TimerDirective::Stop
            }
            FadeTick::Idle => TimerDirective::Stop,
        }
    }

    /// Takes the pending request, if any, and shows it.
    pub fn deliver(&mut self, mailbox: &NotificationMailbox) -> Option<TimerDirective> {
        mailbox.take().map(|request| self.show(request))
    }

    /// Hides the window and abandons any fade; used at shutdown.
    pub fn dismiss(&mut self) {
        if self.fade.is_active() {
            self.fade.cancel();
            self.surface.hide();
        }
    }
}

// ── Cross-thread handle ───────────────────────────────────────────────────────

/// Wakes the presenter's owning thread so it drains the mailbox.
pub trait PresenterWaker: Send + Sync {
    fn wake(&self);
}

type Slot = Arc<Mutex<Option<NotificationRequest>>>;

/// Cloneable, thread-safe entry point to the presenter.
#[derive(Clone)]
pub struct NotificationHandle {
    slot: Slot,
    waker: Arc<dyn PresenterWaker>,
}

/// The presenter-side end of the single-slot mailbox.  Deliberately not `Clone`.
pub struct NotificationMailbox {
    slot: Slot,
}

impl NotificationHandle {
    /// Creates a connected handle/mailbox pair.
    pub fn new(waker: Arc<dyn PresenterWaker>) -> (Self, NotificationMailbox) {
        let slot: Slot = Arc::new(Mutex::new(None));
        (
            Self {
                slot: Arc::clone(&slot),
                waker,
            },
            NotificationMailbox { slot },
        )
    }

    /// Requests `message` to be shown.  Callable from any thread; returns
    /// without touching presenter state.
    pub fn show_message(&self, message: impl Into<String>) {
        let request = NotificationRequest {
            message: message.into(),
        };
        {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(dropped) = slot.replace(request) {
                trace!(message = %dropped.message, "undelivered notification superseded");
            }
        }
        self.waker.wake();
    }
}

impl NotificationMailbox {
    pub fn take(&self) -> Option<NotificationRequest> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
