//! Headless desktop host for platforms without a Windows UI.
//!
//! Runs the same [`NotificationPresenter`] as the Windows host on its own
//! thread.  The "window" is a [`LoggingSurface`] that reports notifications
//! through `tracing`, and fade ticks come from `recv_timeout` deadlines
//! instead of `WM_TIMER`.  There is no clipboard listener and no tray.
//!
//! The executor is generic over the surface, so tests drive it with a
//! recording surface and real threads.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use autocopy_core::{NotificationGeometry, WorkArea};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, trace, warn};

use super::{DesktopError, DesktopHost, DesktopWiring, StartedDesktop};
use crate::application::clipboard_watch::ClipboardSignal;
use crate::application::notification::{
    NotificationHandle, NotificationMailbox, NotificationPresenter, OverlaySurface,
    PresenterSettings, PresenterWaker, TimerDirective,
};
use crate::application::orchestrator::{ControlCommand, SettingsChoice, SettingsDialog};

/// Work area reported by the logging surface.
pub const HEADLESS_WORK_AREA: WorkArea = WorkArea {
    left: 0,
    top: 0,
    right: 1920,
    bottom: 1040,
};

enum Command {
    Wake,
    Quit,
}

struct ChannelWaker(Mutex<Sender<Command>>);

impl PresenterWaker for ChannelWaker {
    fn wake(&self) {
        let sender = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        // The executor may already have stopped during shutdown.
        let _ = sender.send(Command::Wake);
    }
}

/// Surface that logs instead of drawing.
#[derive(Debug, Default)]
pub struct LoggingSurface;

impl OverlaySurface for LoggingSurface {
    fn work_area(&self) -> WorkArea {
        HEADLESS_WORK_AREA
    }

    fn show(&mut self, text: &str, origin: (i32, i32), _geometry: NotificationGeometry) {
        info!(x = origin.0, y = origin.1, "notification: {text}");
    }

    fn set_opacity(&mut self, opacity: f32) {
        trace!(opacity, "notification opacity");
    }

    fn hide(&mut self) {
        trace!("notification hidden");
    }
}

/// A presenter running on its own thread.
pub struct PresenterThread {
    commands: Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl PresenterThread {
    /// Spawns the executor.  `make_surface` runs on the new thread, so the
    /// surface itself never has to be `Send`.
    ///
    /// # Errors
    ///
    /// Returns [`DesktopError`] for invalid settings or a failed spawn.
    pub fn spawn<S, F>(
        make_surface: F,
        settings: PresenterSettings,
    ) -> Result<(Self, NotificationHandle), DesktopError>
    where
        S: OverlaySurface + 'static,
        F: FnOnce() -> S + Send + 'static,
    {
        // Validate on the caller's thread so errors surface synchronously.
        autocopy_core::FadeSequence::new(settings.fade_step)?;

        let (tx, rx) = mpsc::channel();
        let (notifications, mailbox) =
            NotificationHandle::new(Arc::new(ChannelWaker(Mutex::new(tx.clone()))));

        let handle = thread::Builder::new()
            .name("autocopy-presenter".to_string())
            .spawn(move || match NotificationPresenter::new(make_surface(), settings) {
                Ok(presenter) => run_executor(presenter, mailbox, rx),
                Err(e) => warn!("presenter not started: {e}"),
            })
            .map_err(DesktopError::Spawn)?;

        Ok((
            Self {
                commands: tx,
                handle: Some(handle),
            },
            notifications,
        ))
    }

    /// Stops the executor and waits for it.  Idempotent.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.commands.send(Command::Quit);
        if handle.join().is_err() {
            warn!("presenter thread panicked");
        }
    }
}

impl Drop for PresenterThread {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Next fade deadline and the interval that produced it.
type NextTick = Option<(Instant, Duration)>;

/// Applies a presenter directive to the executor's timer.
fn apply_directive(directive: TimerDirective, current: NextTick, now: Instant) -> NextTick {
    match directive {
        TimerDirective::Restart(interval) => Some((now + interval, interval)),
        TimerDirective::Keep => current.map(|(at, interval)| (at + interval, interval)),
        TimerDirective::Stop => None,
    }
}

fn run_executor<S: OverlaySurface>(
    mut presenter: NotificationPresenter<S>,
    mailbox: NotificationMailbox,
    commands: Receiver<Command>,
) {
    debug!("presenter executor running");
    let mut next_tick: NextTick = None;

    loop {
        let received = match next_tick {
            Some((at, _)) => commands.recv_timeout(at.saturating_duration_since(Instant::now())),
            None => commands.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        let directive = match received {
            Ok(Command::Wake) => match presenter.deliver(&mailbox) {
                Some(directive) => directive,
                None => continue,
            },
            Ok(Command::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => presenter.tick(),
        };
        next_tick = apply_directive(directive, next_tick, Instant::now());
    }

    presenter.dismiss();
    debug!("presenter executor stopped");
}

// ── Host ──────────────────────────────────────────────────────────────────────

/// [`DesktopHost`] without windows: a presenter thread plus the (idle)
/// clipboard and control senders, kept open so the orchestrator's channels
/// stay live.
pub struct HeadlessDesktop {
    presenter: PresenterThread,
    _clipboard_tx: UnboundedSender<ClipboardSignal>,
    _control_tx: UnboundedSender<ControlCommand>,
}

impl DesktopHost for HeadlessDesktop {
    fn shutdown(&mut self) {
        self.presenter.stop();
        debug!("headless desktop stopped");
    }
}

/// Starts the headless host.
///
/// # Errors
///
/// Returns [`DesktopError`] if the presenter thread cannot start.
pub fn start(wiring: DesktopWiring) -> Result<StartedDesktop, DesktopError> {
    let (presenter, notifications) = PresenterThread::spawn(|| LoggingSurface, wiring.presenter)?;
    info!("headless desktop started; clipboard listener and tray are unavailable");
    Ok(StartedDesktop {
        host: Box::new(HeadlessDesktop {
            presenter,
            _clipboard_tx: wiring.clipboard_tx,
            _control_tx: wiring.control_tx,
        }),
        notifications,
    })
}

/// Settings prompt for hosts without a UI: always "cancelled".
#[derive(Debug, Default)]
pub struct UnavailableSettingsDialog;

impl SettingsDialog for UnavailableSettingsDialog {
    fn prompt(&self, current: SettingsChoice) -> Option<SettingsChoice> {
        info!(auto_start = current.auto_start, "settings prompt unavailable; edit config.toml instead");
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
