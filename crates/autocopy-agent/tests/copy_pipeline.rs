//! End-to-end tests for the agent pipeline.
//!
//! Runs the real [`Orchestrator`] against the in-memory input source,
//! shortcut injector and clipboard, a TOML config store in a scratch
//! directory, and a [`NotificationPresenter`] driven by hand from the test.
//! The Tokio clock is paused so copy delays are exact.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use autocopy_agent::application::clipboard_watch::ClipboardSignal;
use autocopy_agent::application::notification::{
    NotificationHandle, NotificationMailbox, NotificationPresenter, OverlaySurface,
    PresenterSettings, PresenterWaker, TimerDirective,
};
use autocopy_agent::application::orchestrator::{
    ControlCommand, EventChannels, Orchestrator, OrchestratorSettings, Services,
};
use autocopy_agent::infrastructure::clipboard::mock::MockClipboard;
use autocopy_agent::infrastructure::desktop::headless::UnavailableSettingsDialog;
use autocopy_agent::infrastructure::desktop::DesktopHost;
use autocopy_agent::infrastructure::input_capture::mock::MockInputSource;
use autocopy_agent::infrastructure::input_emulation::mock::MockShortcutInjector;
use autocopy_agent::infrastructure::input_emulation::Shortcut;
use autocopy_agent::infrastructure::storage::config::{load_config_from, TomlConfigStore};
use autocopy_agent::infrastructure::system::autostart::NoopAutostart;
use autocopy_core::{EnabledFlag, FadePhase, InputEvent, NotificationGeometry, WorkArea};

// ── Test doubles ──────────────────────────────────────────────────────────────

struct NotifyWaker(Arc<Notify>);

impl PresenterWaker for NotifyWaker {
    fn wake(&self) {
        self.0.notify_one();
    }
}

#[derive(Default)]
struct StoppedFlag(Arc<Mutex<bool>>);

impl DesktopHost for StoppedFlag {
    fn shutdown(&mut self) {
        *self.0.lock().unwrap() = true;
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SurfaceCall {
    Show(String, (i32, i32)),
    Opacity(f32),
    Hide,
}

#[derive(Default)]
struct RecordingSurface {
    calls: Vec<SurfaceCall>,
}

impl OverlaySurface for RecordingSurface {
    fn work_area(&self) -> WorkArea {
        WorkArea {
            left: 0,
            top: 0,
            right: 1920,
            bottom: 1040,
        }
    }
    fn show(&mut self, text: &str, origin: (i32, i32), _geometry: NotificationGeometry) {
        self.calls.push(SurfaceCall::Show(text.to_string(), origin));
    }
    fn set_opacity(&mut self, opacity: f32) {
        self.calls.push(SurfaceCall::Opacity(opacity));
    }
    fn hide(&mut self) {
        self.calls.push(SurfaceCall::Hide);
    }
}

// ── Harness ───────────────────────────────────────────────────────────────────

struct Agent {
    input: MockInputSource,
    injector: Arc<MockShortcutInjector>,
    clipboard: Arc<MockClipboard>,
    clipboard_tx: UnboundedSender<ClipboardSignal>,
    control_tx: UnboundedSender<ControlCommand>,
    mailbox: NotificationMailbox,
    woken: Arc<Notify>,
    desktop_stopped: Arc<Mutex<bool>>,
    config_path: PathBuf,
    task: Option<JoinHandle<()>>,
}

impl Agent {
    async fn start(enabled: bool) -> Self {
        let config_path = std::env::temp_dir()
            .join(format!("autocopy_e2e_{}", Uuid::new_v4()))
            .join("config.toml");
        let input = MockInputSource::new();
        let injector = Arc::new(MockShortcutInjector::new());
        let clipboard = Arc::new(MockClipboard::new());
        let woken = Arc::new(Notify::new());
        let (notifications, mailbox) =
            NotificationHandle::new(Arc::new(NotifyWaker(Arc::clone(&woken))));
        let (clipboard_tx, clipboard_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let stopped = StoppedFlag::default();
        let desktop_stopped = Arc::clone(&stopped.0);

        let orchestrator = Orchestrator::new(
            Services {
                enabled: EnabledFlag::new(enabled),
                config: TomlConfigStore::open(config_path.clone()),
                input: Box::new(input.clone()),
                desktop: Box::new(stopped),
                injector: injector.clone(),
                clipboard: clipboard.clone(),
                caret: None,
                autostart: Arc::new(NoopAutostart),
                settings_dialog: Arc::new(UnavailableSettingsDialog),
                notifications,
            },
            OrchestratorSettings::default(),
        );
        let task = tokio::spawn(orchestrator.run(EventChannels {
            clipboard: clipboard_rx,
            control: control_rx,
        }));

        while !input.is_installed() {
            tokio::task::yield_now().await;
        }

        Self {
            input,
            injector,
            clipboard,
            clipboard_tx,
            control_tx,
            mailbox,
            woken,
            desktop_stopped,
            config_path,
            task: Some(task),
        }
    }

    /// Plays the focused application: the copy shortcut puts `text` on the
    /// clipboard and the listener reports the change.
    fn application_copies(&self, text: &str) {
        self.clipboard.set_text(text);
        self.clipboard_tx
            .send(ClipboardSignal::read_from(self.clipboard.as_ref()))
            .unwrap();
    }

    /// Waits for the presenter waker; `false` on timeout.
    async fn woken(&self) -> bool {
        tokio::time::timeout(Duration::from_secs(2), self.woken.notified())
            .await
            .is_ok()
    }

    async fn next_notification(&self) -> Option<String> {
        if !self.woken().await {
            return None;
        }
        self.mailbox.take().map(|r| r.message)
    }

    /// Sends Exit and waits for the orchestrator to finish shutting down.
    async fn exit(&mut self) {
        // Already stopped if the control channel was closed elsewhere.
        let _ = self.control_tx.send(ControlCommand::Exit);
        if let Some(task) = self.task.take() {
            task.await.expect("orchestrator task");
        }
    }
}

impl Drop for Agent {
    fn drop(&mut self) {
        if let Some(dir) = self.config_path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }
}

fn presenter() -> NotificationPresenter<RecordingSurface> {
    NotificationPresenter::new(RecordingSurface::default(), PresenterSettings::default())
        .expect("default settings are valid")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_drag_selection_copies_once_and_notification_fades_out() {
    // Arrange
    let mut agent = Agent::start(true).await;
    let mut presenter = presenter();
    let start = Instant::now();

    // Act: down at t=0, up at t=50
    assert!(agent.input.inject_event(InputEvent::primary_down(0)));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(agent.input.inject_event(InputEvent::primary_up(50)));
    tokio::time::sleep(Duration::from_millis(200)).await;

    agent.application_copies("Hello World");
    assert!(agent.woken().await, "presenter was never woken");
    let directive = presenter.deliver(&agent.mailbox);
    let shown = presenter.message().map(str::to_string);
    let mut ticks = 0;
    while presenter.tick() != TimerDirective::Stop {
        ticks += 1;
    }
    agent.exit().await;

    // Assert
    let copies = agent.injector.times_of(Shortcut::Copy);
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0] - start, Duration::from_millis(150));
    assert_eq!(shown.as_deref(), Some("Text copied"));
    assert_eq!(directive, Some(TimerDirective::Restart(Duration::from_millis(50))));
    assert_eq!(ticks + 1, 10, "default fade hides on the tenth tick");
    assert_eq!(presenter.phase(), FadePhase::Hidden);
    let calls = &presenter.surface().calls;
    assert_eq!(calls[0], SurfaceCall::Show("Text copied".into(), (860, 990)));
    assert_eq!(calls.last(), Some(&SurfaceCall::Hide));
}

#[tokio::test(start_paused = true)]
async fn test_repeated_clipboard_signal_is_announced_once() {
    // Arrange
    let mut agent = Agent::start(true).await;

    // Act
    agent.application_copies("Hello World");
    let first = agent.next_notification().await;
    agent.application_copies("Hello World");
    agent.exit().await;

    // Assert
    assert_eq!(first.as_deref(), Some("Text copied"));
    assert!(agent.mailbox.take().is_none(), "duplicate text must not notify");
}

#[tokio::test(start_paused = true)]
async fn test_middle_click_pastes_only_when_clipboard_has_text() {
    // Arrange
    let mut agent = Agent::start(true).await;

    // Act
    agent.input.inject_event(InputEvent::middle_click(0));
    tokio::time::sleep(Duration::from_millis(10)).await;
    agent.clipboard.set_text("payload");
    agent.input.inject_event(InputEvent::middle_click(10));
    tokio::time::sleep(Duration::from_millis(10)).await;
    agent.exit().await;

    // Assert
    assert_eq!(agent.injector.times_of(Shortcut::Paste).len(), 1);
    assert!(agent.injector.times_of(Shortcut::Copy).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_disabled_agent_sends_nothing_and_stays_silent() {
    // Arrange
    let mut agent = Agent::start(false).await;
    agent.clipboard.set_text("existing");

    // Act
    agent.input.inject_event(InputEvent::primary_down(0));
    agent.input.inject_event(InputEvent::primary_up(40));
    agent.input.inject_event(InputEvent::middle_click(80));
    tokio::time::sleep(Duration::from_millis(500)).await;
    agent.application_copies("copied by hand");
    agent.exit().await;

    // Assert
    assert!(agent.injector.sent.lock().unwrap().is_empty());
    assert!(agent.mailbox.take().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_toggle_is_persisted_and_shutdown_releases_everything() {
    // Arrange
    let mut agent = Agent::start(true).await;

    // Act
    agent.control_tx.send(ControlCommand::ToggleEnabled).unwrap();
    let feedback = agent.next_notification().await;
    agent.exit().await;

    // Assert
    assert_eq!(feedback.as_deref(), Some("Disabled"));
    assert!(!agent.input.is_installed());
    assert_eq!(agent.input.uninstall_count(), 1);
    assert!(*agent.desktop_stopped.lock().unwrap());
    let saved = load_config_from(&agent.config_path).expect("config written on toggle");
    assert!(!saved.general.enabled);
}
