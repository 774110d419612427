//! Orchestrator: the agent's event loop.
//!
//! Owns the [`EnabledFlag`], the selection controller and the clipboard
//! watcher, and services control commands coming from the tray menu.
//!
//! ```text
//!  hook thread ──InputEvent──────┐
//!  UI thread  ──ClipboardSignal──┤
//!  tray menu  ──ControlCommand───┼──▶ Orchestrator::run (tokio::select!)
//!  settings prompt ──choice──────┘         │
//!                                          ├─▶ SelectionCopyController
//!                                          ├─▶ ClipboardWatcher ─▶ NotificationHandle
//!                                          └─▶ ConfigStore / AutostartRegistrar
//! ```
//!
//! # Shutdown order
//!
//! 1. The input hook is uninstalled (no new events).
//! 2. The desktop host is torn down (overlay, clipboard listener, tray).
//! 3. The configuration is flushed.
//!
//! Copies already scheduled are left to fire.

use std::ops::ControlFlow;
use std::sync::Arc;

use autocopy_core::{EnabledFlag, InputEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::application::clipboard_watch::{ClipboardReader, ClipboardSignal, ClipboardWatcher};
use crate::application::notification::NotificationHandle;
use crate::application::selection_copy::{
    CaretProbe, SelectionCopyController, SelectionSettings, ShortcutInjector,
};
use crate::infrastructure::desktop::DesktopHost;
use crate::infrastructure::input_capture::InputSource;
use crate::infrastructure::storage::config::ConfigError;
use crate::infrastructure::system::autostart::AutostartError;

/// Feedback shown after a toggle to enabled.
pub const ENABLED_MESSAGE: &str = "Enabled";
/// Feedback shown after a toggle to disabled.
pub const DISABLED_MESSAGE: &str = "Disabled";
/// Feedback shown after the settings prompt was confirmed.
pub const SETTINGS_SAVED_MESSAGE: &str = "Settings saved";

/// Commands issued by the control surface (tray menu).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    ToggleEnabled,
    OpenSettings,
    Exit,
}

/// Persisted user settings.
///
/// Implementations keep the in-memory values authoritative; `flush` failures
/// are reported but never roll the values back.
pub trait ConfigStore: Send {
    fn enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
    fn auto_start(&self) -> bool;
    fn set_auto_start(&mut self, auto_start: bool);
    /// Writes the current values to durable storage.
    fn flush(&mut self) -> Result<(), ConfigError>;
}

/// Registers or removes the agent from the user's login items.
#[cfg_attr(test, mockall::automock)]
pub trait AutostartRegistrar: Send + Sync {
    fn set_registered(&self, enabled: bool) -> Result<(), AutostartError>;
}

/// The values the settings prompt lets the user change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsChoice {
    pub auto_start: bool,
}

/// A modal settings prompt.  Runs on a blocking thread.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsDialog: Send + Sync {
    /// Shows the prompt pre-filled with `current`; `None` when cancelled.
    fn prompt(&self, current: SettingsChoice) -> Option<SettingsChoice>;
}

/// Everything the orchestrator drives.
pub struct Services<C: ConfigStore> {
    pub enabled: EnabledFlag,
    pub config: C,
    pub input: Box<dyn InputSource>,
    pub desktop: Box<dyn DesktopHost>,
    pub injector: Arc<dyn ShortcutInjector>,
    pub clipboard: Arc<dyn ClipboardReader>,
    pub caret: Option<Arc<dyn CaretProbe>>,
    pub autostart: Arc<dyn AutostartRegistrar>,
    pub settings_dialog: Arc<dyn SettingsDialog>,
    pub notifications: NotificationHandle,
}

/// Orchestrator tunables.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub selection: SelectionSettings,
    pub copied_message: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            selection: SelectionSettings::default(),
            copied_message: autocopy_core::timing::DEFAULT_COPIED_MESSAGE.to_string(),
        }
    }
}

/// Channels feeding the event loop.
pub struct EventChannels {
    pub clipboard: UnboundedReceiver<ClipboardSignal>,
    pub control: UnboundedReceiver<ControlCommand>,
}

pub struct Orchestrator<C: ConfigStore> {
    enabled: EnabledFlag,
    config: C,
    input: Box<dyn InputSource>,
    desktop: Box<dyn DesktopHost>,
    selection: SelectionCopyController,
    watcher: ClipboardWatcher,
    autostart: Arc<dyn AutostartRegistrar>,
    settings_dialog: Arc<dyn SettingsDialog>,
    notifications: NotificationHandle,
    settings_tx: UnboundedSender<Option<SettingsChoice>>,
    settings_rx: Option<UnboundedReceiver<Option<SettingsChoice>>>,
    settings_open: bool,
}

impl<C: ConfigStore> Orchestrator<C> {
    pub fn new(services: Services<C>, settings: OrchestratorSettings) -> Self {
        let mut selection = SelectionCopyController::new(
            services.enabled.clone(),
            services.injector,
            services.clipboard,
            settings.selection,
        );
        if let Some(caret) = services.caret {
            selection = selection.with_caret_probe(caret);
        }
        let watcher = ClipboardWatcher::with_message(services.enabled.clone(), settings.copied_message);
        let (settings_tx, settings_rx) = mpsc::unbounded_channel();

        Self {
            enabled: services.enabled,
            config: services.config,
            input: services.input,
            desktop: services.desktop,
            selection,
            watcher,
            autostart: services.autostart,
            settings_dialog: services.settings_dialog,
            notifications: services.notifications,
            settings_tx,
            settings_rx: Some(settings_rx),
            settings_open: false,
        }
    }

    /// A handle to the enabled flag, for readers such as the tray menu.
    pub fn enabled_flag(&self) -> EnabledFlag {
        self.enabled.clone()
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Runs until [`ControlCommand::Exit`], a closed control channel or Ctrl-C,
    /// then shuts everything down in order.
    pub async fn run(mut self, channels: EventChannels) {
        let EventChannels {
            mut clipboard,
            mut control,
        } = channels;
        let Some(mut settings) = self.settings_rx.take() else {
            warn!("settings channel already taken");
            return;
        };
        let mut input = self.start();
        let mut clipboard_open = true;

        info!(enabled = self.enabled.get(), "orchestrator running");
        loop {
            tokio::select! {
                biased;

                event = next_input(&mut input) => match event {
                    Some(event) => {
                        self.selection.handle_event(event);
                    }
                    None => {
                        warn!("mouse hook stopped delivering events, copy and paste automation is inert");
                        input = None;
                    }
                },
                signal = clipboard.recv(), if clipboard_open => match signal {
                    Some(signal) => self.on_clipboard(signal),
                    None => {
                        warn!("clipboard listener stopped, copy notifications are disabled");
                        clipboard_open = false;
                    }
                },
                Some(choice) = settings.recv() => {
                    self.apply_settings(choice);
                }
                command = control.recv() => {
                    let command = command.unwrap_or(ControlCommand::Exit);
                    if self.handle_command(command).is_break() {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupt received");
                    break;
                }
            }
        }

        self.shutdown();
    }

    /// Dispatches one control command.  `Break` means the loop must stop.
    pub fn handle_command(&mut self, command: ControlCommand) -> ControlFlow<()> {
        debug!(?command, "control command");
        match command {
            ControlCommand::ToggleEnabled => {
                self.toggle_enabled();
            }
            ControlCommand::OpenSettings => self.open_settings(),
            ControlCommand::Exit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Flips the enabled flag, persists it and announces the new state.
    pub fn toggle_enabled(&mut self) -> bool {
        let enabled = self.enabled.toggle();
        info!(enabled, "automation toggled");
        self.config.set_enabled(enabled);
        self.flush_config();
        self.notifications
            .show_message(if enabled { ENABLED_MESSAGE } else { DISABLED_MESSAGE });
        enabled
    }

    /// Opens the settings prompt on a detached thread.  The choice comes back
    /// through the event loop.  A second request while open is ignored.
    ///
    /// The thread is not owned by the runtime, so exiting while the prompt is
    /// still up does not wait for the user to answer it.
    pub fn open_settings(&mut self) {
        if self.settings_open {
            debug!("settings prompt already open");
            return;
        }
        self.settings_open = true;

        let current = SettingsChoice {
            auto_start: self.config.auto_start(),
        };
        let dialog = Arc::clone(&self.settings_dialog);
        let tx = self.settings_tx.clone();
        let spawned = std::thread::Builder::new()
            .name("autocopy-settings".to_string())
            .spawn(move || {
                let choice = dialog.prompt(current);
                // The loop may already have exited; nothing to do then.
                let _ = tx.send(choice);
            });
        if let Err(e) = spawned {
            warn!("failed to open settings prompt: {e}");
            self.settings_open = false;
        }
    }

    /// Applies the outcome of the settings prompt.
    pub fn apply_settings(&mut self, choice: Option<SettingsChoice>) {
        self.settings_open = false;
        let Some(choice) = choice else {
            debug!("settings prompt cancelled");
            return;
        };

        self.config.set_auto_start(choice.auto_start);
        if let Err(e) = self.autostart.set_registered(choice.auto_start) {
            warn!("failed to update run-at-login registration: {e}");
        }
        self.flush_config();
        info!(auto_start = choice.auto_start, "settings saved");
        self.notifications.show_message(SETTINGS_SAVED_MESSAGE);
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// Synchronises login registration and installs the input hook.
    fn start(&mut self) -> Option<UnboundedReceiver<InputEvent>> {
        if let Err(e) = self.autostart.set_registered(self.config.auto_start()) {
            warn!("failed to synchronise run-at-login registration: {e}");
        }

        match self.input.install() {
            Ok(rx) => {
                info!("mouse hook installed");
                Some(rx)
            }
            Err(e) => {
                warn!("mouse hook unavailable, copy and paste automation is inert: {e}");
                None
            }
        }
    }

    fn on_clipboard(&mut self, signal: ClipboardSignal) {
        if let Some(copied) = self.watcher.on_signal(signal) {
            self.notifications.show_message(copied.message);
        }
    }

    fn flush_config(&mut self) {
        if let Err(e) = self.config.flush() {
            warn!("failed to persist settings: {e}");
        }
    }

    fn shutdown(mut self) {
        info!("shutting down");
        self.input.uninstall();
        self.desktop.shutdown();
        self.flush_config();
        info!("shutdown complete");
    }
}

async fn next_input(rx: &mut Option<UnboundedReceiver<InputEvent>>) -> Option<InputEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clipboard_watch::ClipboardError;
    use crate::application::notification::{NotificationMailbox, PresenterWaker};
    use crate::application::selection_copy::EmulationError;
    use crate::infrastructure::input_capture::CaptureError;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    // ── Test doubles ──────────────────────────────────────────────────────────

    type Log = Arc<Mutex<Vec<&'static str>>>;
    type InputSender = Arc<Mutex<Option<UnboundedSender<InputEvent>>>>;

    struct RecordingConfig {
        enabled: bool,
        auto_start: bool,
        log: Log,
        fail_flush: bool,
    }

    impl ConfigStore for RecordingConfig {
        fn enabled(&self) -> bool {
            self.enabled
        }
        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }
        fn auto_start(&self) -> bool {
            self.auto_start
        }
        fn set_auto_start(&mut self, auto_start: bool) {
            self.auto_start = auto_start;
        }
        fn flush(&mut self) -> Result<(), ConfigError> {
            self.log.lock().unwrap().push("config.flush");
            if self.fail_flush {
                return Err(ConfigError::Io {
                    path: std::path::PathBuf::from("config.toml"),
                    source: std::io::Error::other("disk full"),
                });
            }
            Ok(())
        }
    }

    struct RecordingInput {
        log: Log,
        fail: bool,
        sender: Arc<Mutex<Option<UnboundedSender<InputEvent>>>>,
    }

    impl InputSource for RecordingInput {
        fn install(&self) -> Result<UnboundedReceiver<InputEvent>, CaptureError> {
            self.log.lock().unwrap().push("input.install");
            if self.fail {
                return Err(CaptureError::HookInstallFailed("access denied".into()));
            }
            let (tx, rx) = mpsc::unbounded_channel();
            *self.sender.lock().unwrap() = Some(tx);
            Ok(rx)
        }
        fn uninstall(&self) {
            self.log.lock().unwrap().push("input.uninstall");
            self.sender.lock().unwrap().take();
        }
    }

    struct RecordingDesktop(Log);

    impl DesktopHost for RecordingDesktop {
        fn shutdown(&mut self) {
            self.0.lock().unwrap().push("desktop.shutdown");
        }
    }

    struct NoopInjector;

    impl ShortcutInjector for NoopInjector {
        fn send_copy(&self) -> Result<(), EmulationError> {
            Ok(())
        }
        fn send_paste(&self) -> Result<(), EmulationError> {
            Ok(())
        }
    }

    struct EmptyClipboard;

    impl ClipboardReader for EmptyClipboard {
        fn has_text(&self) -> bool {
            false
        }
        fn read_text(&self) -> Result<Option<String>, ClipboardError> {
            Ok(None)
        }
    }

    struct NotifyWaker(Arc<Notify>);

    impl PresenterWaker for NotifyWaker {
        fn wake(&self) {
            self.0.notify_one();
        }
    }

    struct Harness {
        log: Log,
        mailbox: NotificationMailbox,
        woken: Arc<Notify>,
        flag: EnabledFlag,
        input_sender: InputSender,
        clipboard_tx: UnboundedSender<ClipboardSignal>,
        control_tx: UnboundedSender<ControlCommand>,
        channels: Option<EventChannels>,
    }

    impl Harness {
        async fn next_message(&self) -> Option<String> {
            tokio::time::timeout(Duration::from_secs(2), self.woken.notified())
                .await
                .ok()?;
            self.mailbox.take().map(|r| r.message)
        }
    }

    fn build(
        enabled: bool,
        hook_fails: bool,
        autostart: MockAutostartRegistrar,
        dialog: MockSettingsDialog,
    ) -> (Orchestrator<RecordingConfig>, Harness) {
        let log: Log = Arc::default();
        let woken = Arc::new(Notify::new());
        let (notifications, mailbox) =
            NotificationHandle::new(Arc::new(NotifyWaker(Arc::clone(&woken))));
        let flag = EnabledFlag::new(enabled);
        let (clipboard_tx, clipboard) = mpsc::unbounded_channel();
        let (control_tx, control) = mpsc::unbounded_channel();
        let input_sender: InputSender = Arc::default();

        let orchestrator = Orchestrator::new(
            Services {
                enabled: flag.clone(),
                config: RecordingConfig {
                    enabled,
                    auto_start: false,
                    log: Arc::clone(&log),
                    fail_flush: false,
                },
                input: Box::new(RecordingInput {
                    log: Arc::clone(&log),
                    fail: hook_fails,
                    sender: Arc::clone(&input_sender),
                }),
                desktop: Box::new(RecordingDesktop(Arc::clone(&log))),
                injector: Arc::new(NoopInjector),
                clipboard: Arc::new(EmptyClipboard),
                caret: None,
                autostart: Arc::new(autostart),
                settings_dialog: Arc::new(dialog),
                notifications,
            },
            OrchestratorSettings::default(),
        );

        let harness = Harness {
            log,
            mailbox,
            woken,
            flag,
            input_sender,
            clipboard_tx,
            control_tx,
            channels: Some(EventChannels { clipboard, control }),
        };
        (orchestrator, harness)
    }

    fn lenient_autostart() -> MockAutostartRegistrar {
        let mut mock = MockAutostartRegistrar::new();
        mock.expect_set_registered().returning(|_| Ok(()));
        mock
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_toggle_flips_flag_persists_and_announces() {
        // Arrange
        let (orch, mut h) = build(true, false, lenient_autostart(), MockSettingsDialog::new());
        let task = tokio::spawn(orch.run(h.channels.take().unwrap()));

        // Act
        h.control_tx.send(ControlCommand::ToggleEnabled).unwrap();
        let first = h.next_message().await;
        h.control_tx.send(ControlCommand::ToggleEnabled).unwrap();
        let second = h.next_message().await;
        h.control_tx.send(ControlCommand::Exit).unwrap();
        task.await.unwrap();

        // Assert
        assert_eq!(first.as_deref(), Some(DISABLED_MESSAGE));
        assert_eq!(second.as_deref(), Some(ENABLED_MESSAGE));
        assert!(h.flag.get());
        let flushes = h.log.lock().unwrap().iter().filter(|e| **e == "config.flush").count();
        assert_eq!(flushes, 3, "two toggles plus shutdown");
    }

    #[tokio::test]
    async fn test_exit_shuts_down_in_order() {
        // Arrange
        let (orch, mut h) = build(true, false, lenient_autostart(), MockSettingsDialog::new());

        // Act
        h.control_tx.send(ControlCommand::Exit).unwrap();
        orch.run(h.channels.take().unwrap()).await;

        // Assert
        assert_eq!(
            *h.log.lock().unwrap(),
            vec!["input.install", "input.uninstall", "desktop.shutdown", "config.flush"]
        );
    }

    #[tokio::test]
    async fn test_closed_control_channel_is_treated_as_exit() {
        let (orch, mut h) = build(true, false, lenient_autostart(), MockSettingsDialog::new());
        let channels = h.channels.take().unwrap();
        drop(h.control_tx);

        orch.run(channels).await;

        assert!(h.log.lock().unwrap().contains(&"desktop.shutdown"));
    }

    #[tokio::test]
    async fn test_queued_clipboard_signal_is_handled_before_exit() {
        // Arrange
        let (orch, mut h) = build(true, false, lenient_autostart(), MockSettingsDialog::new());
        h.clipboard_tx
            .send(ClipboardSignal::Text("Hello World".into()))
            .unwrap();
        h.control_tx.send(ControlCommand::Exit).unwrap();

        // Act
        orch.run(h.channels.take().unwrap()).await;

        // Assert
        assert_eq!(h.mailbox.take().map(|r| r.message).as_deref(), Some("Text copied"));
    }

    #[tokio::test]
    async fn test_clipboard_change_while_disabled_is_silent() {
        let (orch, mut h) = build(false, false, lenient_autostart(), MockSettingsDialog::new());
        h.clipboard_tx.send(ClipboardSignal::Text("quiet".into())).unwrap();
        h.control_tx.send(ControlCommand::Exit).unwrap();

        orch.run(h.channels.take().unwrap()).await;

        assert!(h.mailbox.take().is_none());
    }

    #[tokio::test]
    async fn test_hook_failure_leaves_clipboard_path_running() {
        // Arrange
        let (orch, mut h) = build(true, true, lenient_autostart(), MockSettingsDialog::new());
        let task = tokio::spawn(orch.run(h.channels.take().unwrap()));

        // Act
        h.clipboard_tx.send(ClipboardSignal::Text("still works".into())).unwrap();
        let message = h.next_message().await;
        h.control_tx.send(ControlCommand::Exit).unwrap();
        task.await.unwrap();

        // Assert
        assert_eq!(message.as_deref(), Some("Text copied"));
    }

    #[tokio::test]
    async fn test_flush_failure_is_not_fatal() {
        let (mut orch, _h) = build(true, false, lenient_autostart(), MockSettingsDialog::new());
        orch.config.fail_flush = true;

        let enabled = orch.toggle_enabled();

        assert!(!enabled);
        assert!(!orch.config().enabled());
    }

    #[tokio::test]
    async fn test_handle_command_continues_until_exit() {
        let (mut orch, h) = build(true, false, lenient_autostart(), MockSettingsDialog::new());

        let toggled = orch.handle_command(ControlCommand::ToggleEnabled);
        let exited = orch.handle_command(ControlCommand::Exit);

        assert_eq!(toggled, ControlFlow::Continue(()));
        assert_eq!(exited, ControlFlow::Break(()));
        assert!(!h.flag.get());
    }

    #[tokio::test]
    async fn test_closed_event_channels_leave_control_running() {
        // Arrange
        let (orch, mut h) = build(true, false, lenient_autostart(), MockSettingsDialog::new());
        let task = tokio::spawn(orch.run(h.channels.take().unwrap()));
        while h.input_sender.lock().unwrap().is_none() {
            tokio::task::yield_now().await;
        }

        // Act: the hook thread and the clipboard listener go away
        h.input_sender.lock().unwrap().take();
        let (replacement, _unused) = mpsc::unbounded_channel();
        h.clipboard_tx = replacement;
        h.control_tx.send(ControlCommand::ToggleEnabled).unwrap();
        let message = h.next_message().await;
        h.control_tx.send(ControlCommand::Exit).unwrap();
        task.await.unwrap();

        // Assert
        assert_eq!(message.as_deref(), Some(DISABLED_MESSAGE));
        assert_eq!(
            h.log.lock().unwrap().last().copied(),
            Some("config.flush"),
            "shutdown still ran to completion"
        );
    }

    // ── Settings ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_startup_syncs_autostart_registration() {
        // Arrange
        let mut autostart = MockAutostartRegistrar::new();
        autostart
            .expect_set_registered()
            .withf(|enabled| !*enabled)
            .times(1)
            .returning(|_| Ok(()));
        let (orch, mut h) = build(true, false, autostart, MockSettingsDialog::new());

        // Act
        h.control_tx.send(ControlCommand::Exit).unwrap();
        orch.run(h.channels.take().unwrap()).await;

        // Assert: expectations checked when the mock is dropped
    }

    #[tokio::test]
    async fn test_confirmed_settings_register_autostart_and_announce() {
        // Arrange
        let mut autostart = MockAutostartRegistrar::new();
        autostart
            .expect_set_registered()
            .withf(|enabled| !*enabled)
            .times(1)
            .returning(|_| Ok(()));
        autostart
            .expect_set_registered()
            .withf(|enabled| *enabled)
            .times(1)
            .returning(|_| Ok(()));
        let mut dialog = MockSettingsDialog::new();
        dialog
            .expect_prompt()
            .withf(|current| !current.auto_start)
            .times(1)
            .returning(|_| Some(SettingsChoice { auto_start: true }));
        let (orch, mut h) = build(true, false, autostart, dialog);
        let task = tokio::spawn(orch.run(h.channels.take().unwrap()));

        // Act
        h.control_tx.send(ControlCommand::OpenSettings).unwrap();
        let message = h.next_message().await;
        h.control_tx.send(ControlCommand::Exit).unwrap();
        task.await.unwrap();

        // Assert
        assert_eq!(message.as_deref(), Some(SETTINGS_SAVED_MESSAGE));
    }

    #[tokio::test]
    async fn test_cancelled_settings_change_nothing() {
        // Arrange
        let mut dialog = MockSettingsDialog::new();
        dialog.expect_prompt().times(1).returning(|_| None);
        let (mut orch, _h) = build(true, false, lenient_autostart(), dialog);

        // Act
        orch.open_settings();
        let choice = orch
            .settings_rx
            .as_mut()
            .unwrap()
            .recv()
            .await
            .expect("prompt result");
        orch.apply_settings(choice);

        // Assert
        assert!(!orch.config().auto_start());
        assert!(!orch.settings_open);
    }

    #[tokio::test]
    async fn test_autostart_failure_still_saves_settings() {
        let mut autostart = MockAutostartRegistrar::new();
        autostart
            .expect_set_registered()
            .returning(|_| Err(AutostartError::Unsupported));
        let (mut orch, h) = build(true, false, autostart, MockSettingsDialog::new());

        orch.apply_settings(Some(SettingsChoice { auto_start: true }));

        assert!(orch.config().auto_start());
        assert_eq!(
            h.mailbox.take().map(|r| r.message).as_deref(),
            Some(SETTINGS_SAVED_MESSAGE)
        );
    }

    // ── Input helper ──────────────────────────────────────────────────────────

    #[test]
    fn test_next_input_without_hook_stays_pending() {
        let mut none: Option<UnboundedReceiver<InputEvent>> = None;
        let mut fut = tokio_test::task::spawn(next_input(&mut none));

        tokio_test::assert_pending!(fut.poll());
    }

    #[test]
    fn test_next_input_yields_queued_event_then_end_of_stream() {
        // Arrange
        let (tx, rx) = mpsc::unbounded_channel();
        let mut input = Some(rx);
        tx.send(InputEvent::primary_down(7)).unwrap();
        drop(tx);

        // Act
        let first = tokio_test::block_on(next_input(&mut input));
        let second = tokio_test::block_on(next_input(&mut input));

        // Assert
        assert_eq!(first, Some(InputEvent::primary_down(7)));
        assert_eq!(second, None);
    }
    #[test]
    fn test_exit_with_settings_prompt_open_does_not_hold_runtime() {
        // Arrange: a prompt the user never answers
        let (opened_tx, opened_rx) = std::sync::mpsc::channel::<()>();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let mut dialog = MockSettingsDialog::new();
        dialog.expect_prompt().returning(move |_| {
            let _ = opened_tx.send(());
            let _ = release_rx.recv_timeout(Duration::from_secs(5));
            None
        });
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        let (orch, mut h) = build(true, false, lenient_autostart(), dialog);
        let task = runtime.spawn(orch.run(h.channels.take().unwrap()));

        // Act
        h.control_tx.send(ControlCommand::OpenSettings).unwrap();
        opened_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("prompt opened");
        h.control_tx.send(ControlCommand::Exit).unwrap();
        runtime.block_on(task).unwrap();
        let started = std::time::Instant::now();
        drop(runtime);
        let teardown = started.elapsed();
        drop(release_tx);

        // Assert
        assert!(
            teardown < Duration::from_secs(1),
            "runtime teardown waited {teardown:?} for the prompt"
        );
        assert!(h.log.lock().unwrap().contains(&"desktop.shutdown"));
    }
}
