//! Windows desktop host.
//!
//! One UI thread owns:
//!
//! - the **overlay**: a layered, topmost, non-activating tool window that
//!   shows the notification text and fades via `WM_TIMER`;
//! - the **controller**: a hidden window that receives clipboard updates
//!   (`AddClipboardFormatListener`), tray callbacks, menu commands and the
//!   presenter wake-up message.
//!
//! All presenter state lives in a thread-local on the UI thread.  Window
//! procedures borrow it with `try_borrow_mut`, so a message dispatched
//! re-entrantly from inside a Win32 call is dropped instead of panicking.
//!
//! # Safety
//!
//! `unsafe` is limited to Win32 FFI calls, each annotated with `// SAFETY:`.

#![cfg(target_os = "windows")]

use std::cell::RefCell;
use std::ffi::c_void;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use autocopy_core::{EnabledFlag, NotificationGeometry, WorkArea};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, trace, warn};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreateSolidBrush, DeleteObject, DrawTextW, EndPaint, FillRect, GetStockObject,
    InvalidateRect, SelectObject, SetBkMode, SetTextColor, DEFAULT_GUI_FONT, DT_CENTER,
    DT_SINGLELINE, DT_VCENTER, PAINTSTRUCT, TRANSPARENT,
};
use windows::Win32::System::DataExchange::{
    AddClipboardFormatListener, RemoveClipboardFormatListener,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Shell::{
    Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NOTIFYICONDATAW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyMenu, DestroyWindow,
    DispatchMessageW, GetClientRect, GetCursorPos, GetMessageW, GetSystemMetrics, KillTimer,
    LoadIconW, MessageBoxW, PostMessageW, PostQuitMessage, RegisterClassW, SetForegroundWindow,
    SetLayeredWindowAttributes, SetTimer, SetWindowPos, ShowWindow, SystemParametersInfoW,
    TrackPopupMenu, TranslateMessage, HWND_TOPMOST, IDI_APPLICATION, IDYES, IDNO, LWA_ALPHA,
    MB_ICONQUESTION, MB_TOPMOST, MB_YESNOCANCEL, MF_CHECKED, MF_SEPARATOR, MF_STRING,
    MF_UNCHECKED, MSG, SM_CXSCREEN, SM_CYSCREEN, SPI_GETWORKAREA, SWP_NOACTIVATE,
    SWP_SHOWWINDOW, SW_HIDE, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS, TPM_BOTTOMALIGN,
    TPM_RIGHTBUTTON, WINDOW_EX_STYLE, WINDOW_STYLE, WM_APP, WM_CLIPBOARDUPDATE, WM_CLOSE,
    WM_COMMAND, WM_DESTROY, WM_LBUTTONUP, WM_PAINT, WM_RBUTTONUP, WM_TIMER, WNDCLASSW, WNDPROC,
    WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

use super::{DesktopError, DesktopHost, DesktopWiring, StartedDesktop};
use crate::application::clipboard_watch::ClipboardSignal;
use crate::application::notification::{
    NotificationHandle, NotificationMailbox, NotificationPresenter, OverlaySurface,
    PresenterWaker, TimerDirective,
};
use crate::application::orchestrator::{ControlCommand, SettingsChoice, SettingsDialog};
use crate::infrastructure::clipboard::windows::WindowsClipboardReader;

const OVERLAY_CLASS: PCWSTR = w!("AutoCopyOverlay");
const CONTROLLER_CLASS: PCWSTR = w!("AutoCopyController");

/// Posted to the controller when the notification mailbox has a request.
const WM_APP_NOTIFY: u32 = WM_APP + 1;
/// Tray icon callback message.
const WM_APP_TRAY: u32 = WM_APP + 2;

const FADE_TIMER_ID: usize = 1;
const TRAY_ICON_ID: u32 = 1;

const MENU_TOGGLE: usize = 100;
const MENU_SETTINGS: usize = 101;
const MENU_EXIT: usize = 102;

/// Dark grey background, white text.
const BACKGROUND: COLORREF = COLORREF(0x0040_4040);
const FOREGROUND: COLORREF = COLORREF(0x00FF_FFFF);

fn hwnd_from(raw: isize) -> HWND {
    HWND(raw as *mut c_void)
}

// ── UI thread state ───────────────────────────────────────────────────────────

struct UiState {
    presenter: NotificationPresenter<OverlayWindow>,
    mailbox: NotificationMailbox,
    overlay: HWND,
    enabled: EnabledFlag,
    clipboard: WindowsClipboardReader,
    clipboard_tx: UnboundedSender<ClipboardSignal>,
    control_tx: UnboundedSender<ControlCommand>,
}

thread_local! {
    static UI: RefCell<Option<UiState>> = const { RefCell::new(None) };
    /// Text painted by the overlay's `WM_PAINT`, kept apart from `UI` so a
    /// paint dispatched during a presenter call still finds it.
    static OVERLAY_TEXT: RefCell<Vec<u16>> = const { RefCell::new(Vec::new()) };
}

fn with_ui<R>(f: impl FnOnce(&mut UiState) -> R) -> Option<R> {
    UI.with(|cell| match cell.try_borrow_mut() {
        Ok(mut guard) => guard.as_mut().map(f),
        Err(_) => {
            trace!("UI state busy; message dropped");
            None
        }
    })
}

// ── Overlay surface ───────────────────────────────────────────────────────────

struct OverlayWindow {
    hwnd: HWND,
}

impl OverlaySurface for OverlayWindow {
    fn work_area(&self) -> WorkArea {
        let mut rect = RECT::default();
        // SAFETY: SPI_GETWORKAREA writes one RECT into the pointed-to buffer.
        let ok = unsafe {
            SystemParametersInfoW(
                SPI_GETWORKAREA,
                0,
                Some(&mut rect as *mut RECT as *mut c_void),
                SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
            )
        };
        if ok.is_ok() {
            return WorkArea {
                left: rect.left,
                top: rect.top,
                right: rect.right,
                bottom: rect.bottom,
            };
        }
        // SAFETY: metric queries have no preconditions.
        let (w, h) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        WorkArea {
            left: 0,
            top: 0,
            right: w,
            bottom: h,
        }
    }

    fn show(&mut self, text: &str, origin: (i32, i32), geometry: NotificationGeometry) {
        OVERLAY_TEXT.with(|t| *t.borrow_mut() = text.encode_utf16().collect());
        // SAFETY: self.hwnd is the overlay window owned by this thread.
        unsafe {
            if let Err(e) = SetWindowPos(
                self.hwnd,
                Some(HWND_TOPMOST),
                origin.0,
                origin.1,
                geometry.width,
                geometry.height,
                SWP_NOACTIVATE | SWP_SHOWWINDOW,
            ) {
                warn!("failed to position notification: {e}");
            }
            let _ = InvalidateRect(Some(self.hwnd), None, true);
        }
    }

    fn set_opacity(&mut self, opacity: f32) {
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        // SAFETY: the overlay was created with WS_EX_LAYERED.
        if let Err(e) = unsafe { SetLayeredWindowAttributes(self.hwnd, COLORREF(0), alpha, LWA_ALPHA) } {
            trace!("SetLayeredWindowAttributes failed: {e}");
        }
    }

    fn hide(&mut self) {
        // SAFETY: hiding our own window.
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_HIDE);
        }
    }
}

fn apply_timer(overlay: HWND, directive: TimerDirective) {
    // SAFETY: the timer belongs to our overlay window on this thread.
    unsafe {
        match directive {
            TimerDirective::Restart(interval) => {
                let ms = interval.as_millis().clamp(1, u32::MAX as u128) as u32;
                SetTimer(Some(overlay), FADE_TIMER_ID, ms, None);
            }
            TimerDirective::Keep => {}
            TimerDirective::Stop => {
                let _ = KillTimer(Some(overlay), FADE_TIMER_ID);
            }
        }
    }
}

// ── Waker ─────────────────────────────────────────────────────────────────────

/// Posts [`WM_APP_NOTIFY`] to the controller window.  Holds the handle as an
/// integer because `HWND` is not `Send`.
struct PostMessageWaker {
    controller: isize,
}

impl PresenterWaker for PostMessageWaker {
    fn wake(&self) {
        // SAFETY: PostMessageW is thread-safe; a destroyed window just fails.
        if let Err(e) = unsafe {
            PostMessageW(
                Some(hwnd_from(self.controller)),
                WM_APP_NOTIFY,
                WPARAM(0),
                LPARAM(0),
            )
        } {
            trace!("notification wake-up not delivered: {e}");
        }
    }
}

// ── Window procedures ─────────────────────────────────────────────────────────

unsafe extern "system" fn overlay_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_TIMER if wparam.0 == FADE_TIMER_ID => {
            with_ui(|ui| {
                let directive = ui.presenter.tick();
                apply_timer(ui.overlay, directive);
            });
            LRESULT(0)
        }
        WM_PAINT => {
            paint_overlay(hwnd);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

unsafe fn paint_overlay(hwnd: HWND) {
    let mut ps = PAINTSTRUCT::default();
    let hdc = BeginPaint(hwnd, &mut ps);
    let mut rect = RECT::default();
    let _ = GetClientRect(hwnd, &mut rect);

    let brush = CreateSolidBrush(BACKGROUND);
    FillRect(hdc, &rect, brush);
    let _ = DeleteObject(brush.into());

    SelectObject(hdc, GetStockObject(DEFAULT_GUI_FONT));
    SetTextColor(hdc, FOREGROUND);
    SetBkMode(hdc, TRANSPARENT);
    OVERLAY_TEXT.with(|t| {
        let mut text = t.borrow().clone();
        DrawTextW(hdc, &mut text, &mut rect, DT_CENTER | DT_VCENTER | DT_SINGLELINE);
    });
    let _ = EndPaint(hwnd, &ps);
}

unsafe extern "system" fn controller_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_APP_NOTIFY => {
            with_ui(|ui| {
                if let Some(directive) = ui.presenter.deliver(&ui.mailbox) {
                    apply_timer(ui.overlay, directive);
                }
            });
            LRESULT(0)
        }
        WM_CLIPBOARDUPDATE => {
            with_ui(|ui| {
                let signal = ClipboardSignal::read_from(&ui.clipboard);
                if ui.clipboard_tx.send(signal).is_err() {
                    trace!("clipboard signal dropped: orchestrator stopped");
                }
            });
            LRESULT(0)
        }
        WM_APP_TRAY => {
            let event = (lparam.0 & 0xFFFF) as u32;
            if event == WM_RBUTTONUP || event == WM_LBUTTONUP {
                show_tray_menu(hwnd);
            }
            LRESULT(0)
        }
        WM_COMMAND => {
            let command = match wparam.0 & 0xFFFF {
                MENU_TOGGLE => Some(ControlCommand::ToggleEnabled),
                MENU_SETTINGS => Some(ControlCommand::OpenSettings),
                MENU_EXIT => Some(ControlCommand::Exit),
                _ => None,
            };
            if let Some(command) = command {
                with_ui(|ui| {
                    let _ = ui.control_tx.send(command);
                });
            }
            LRESULT(0)
        }
        WM_CLOSE => {
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }
        WM_DESTROY => {
            let _ = RemoveClipboardFormatListener(hwnd);
            remove_tray_icon(hwnd);
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

// ── Tray ──────────────────────────────────────────────────────────────────────

fn tray_data(hwnd: HWND) -> NOTIFYICONDATAW {
    let mut nid = NOTIFYICONDATAW {
        cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
        hWnd: hwnd,
        uID: TRAY_ICON_ID,
        ..Default::default()
    };
    let tip: Vec<u16> = "AutoCopy".encode_utf16().collect();
    nid.szTip[..tip.len()].copy_from_slice(&tip);
    nid
}

unsafe fn add_tray_icon(hwnd: HWND) {
    let mut nid = tray_data(hwnd);
    nid.uFlags = NIF_MESSAGE | NIF_ICON | NIF_TIP;
    nid.uCallbackMessage = WM_APP_TRAY;
    nid.hIcon = LoadIconW(None, IDI_APPLICATION).unwrap_or_default();
    if !Shell_NotifyIconW(NIM_ADD, &nid).as_bool() {
        warn!("failed to add tray icon");
    }
}

unsafe fn remove_tray_icon(hwnd: HWND) {
    let nid = tray_data(hwnd);
    let _ = Shell_NotifyIconW(NIM_DELETE, &nid);
}

unsafe fn show_tray_menu(hwnd: HWND) {
    let enabled = with_ui(|ui| ui.enabled.get()).unwrap_or(true);
    let Ok(menu) = CreatePopupMenu() else {
        return;
    };
    let check = if enabled { MF_CHECKED } else { MF_UNCHECKED };
    let _ = AppendMenuW(menu, MF_STRING | check, MENU_TOGGLE, w!("Enabled"));
    let _ = AppendMenuW(menu, MF_STRING, MENU_SETTINGS, w!("Settings"));
    let _ = AppendMenuW(menu, MF_SEPARATOR, 0, PCWSTR::null());
    let _ = AppendMenuW(menu, MF_STRING, MENU_EXIT, w!("Exit"));

    let mut pt = POINT::default();
    let _ = GetCursorPos(&mut pt);
    // The menu only dismisses on outside clicks if our window is foreground.
    let _ = SetForegroundWindow(hwnd);
    let _ = TrackPopupMenu(menu, TPM_RIGHTBUTTON | TPM_BOTTOMALIGN, pt.x, pt.y, None, hwnd, None);
    let _ = DestroyMenu(menu);
}

// ── Startup / shutdown ────────────────────────────────────────────────────────

unsafe fn register_class(instance: HINSTANCE, name: PCWSTR, proc_: WNDPROC) {
    let class = WNDCLASSW {
        lpfnWndProc: proc_,
        hInstance: instance,
        lpszClassName: name,
        ..Default::default()
    };
    RegisterClassW(&class);
}

unsafe fn create_windows(geometry: NotificationGeometry) -> Result<(HWND, HWND), DesktopError> {
    let instance: HINSTANCE = GetModuleHandleW(None)
        .map_err(|e| DesktopError::Window {
            what: "module handle",
            reason: e.to_string(),
        })?
        .into();

    register_class(instance, OVERLAY_CLASS, Some(overlay_proc));
    register_class(instance, CONTROLLER_CLASS, Some(controller_proc));

    let overlay = CreateWindowExW(
        WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE,
        OVERLAY_CLASS,
        w!("AutoCopy"),
        WS_POPUP,
        0,
        0,
        geometry.width,
        geometry.height,
        None,
        None,
        Some(instance),
        None,
    )
    .map_err(|e| DesktopError::Window {
        what: "notification window",
        reason: e.to_string(),
    })?;

    let controller = CreateWindowExW(
        WINDOW_EX_STYLE(0),
        CONTROLLER_CLASS,
        w!("AutoCopy Controller"),
        WINDOW_STYLE(0),
        0,
        0,
        0,
        0,
        None,
        None,
        Some(instance),
        None,
    )
    .map_err(|e| {
        let _ = DestroyWindow(overlay);
        DesktopError::Window {
            what: "controller window",
            reason: e.to_string(),
        }
    })?;

    Ok((overlay, controller))
}

/// The running Windows UI thread.
pub struct WindowsDesktop {
    controller: isize,
    handle: Option<JoinHandle<()>>,
}

impl DesktopHost for WindowsDesktop {
    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        // SAFETY: posting to our own controller window.
        if let Err(e) = unsafe {
            PostMessageW(Some(hwnd_from(self.controller)), WM_CLOSE, WPARAM(0), LPARAM(0))
        } {
            warn!("failed to close UI thread: {e}");
            return;
        }
        if handle.join().is_err() {
            warn!("UI thread panicked");
        }
        info!("desktop host stopped");
    }
}

/// Starts the UI thread and waits until its windows exist.
///
/// # Errors
///
/// Returns [`DesktopError`] if the thread or its windows cannot be created.
pub fn start(wiring: DesktopWiring) -> Result<StartedDesktop, DesktopError> {
    autocopy_core::FadeSequence::new(wiring.presenter.fade_step)?;
    let (ready_tx, ready_rx) = std_mpsc::channel::<Result<(isize, NotificationHandle), DesktopError>>();

    let handle = thread::Builder::new()
        .name("autocopy-ui".to_string())
        .spawn(move || run_ui_thread(wiring, ready_tx))
        .map_err(DesktopError::Spawn)?;

    match ready_rx.recv() {
        Ok(Ok((controller, notifications))) => {
            info!("desktop host started");
            Ok(StartedDesktop {
                host: Box::new(WindowsDesktop {
                    controller,
                    handle: Some(handle),
                }),
                notifications,
            })
        }
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(e)
        }
        Err(_) => {
            let _ = handle.join();
            Err(DesktopError::StartupAborted)
        }
    }
}

type Ready = std_mpsc::Sender<Result<(isize, NotificationHandle), DesktopError>>;

fn run_ui_thread(wiring: DesktopWiring, ready: Ready) {
    let geometry = wiring.presenter.geometry;

    // SAFETY: window creation and message pumping on this thread only.
    unsafe {
        let (overlay, controller) = match create_windows(geometry) {
            Ok(pair) => pair,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };

        let presenter = match NotificationPresenter::new(OverlayWindow { hwnd: overlay }, wiring.presenter) {
            Ok(p) => p,
            Err(e) => {
                let _ = DestroyWindow(controller);
                let _ = DestroyWindow(overlay);
                let _ = ready.send(Err(e.into()));
                return;
            }
        };
        let (notifications, mailbox) = NotificationHandle::new(Arc::new(PostMessageWaker {
            controller: controller.0 as isize,
        }));

        UI.with(|cell| {
            *cell.borrow_mut() = Some(UiState {
                presenter,
                mailbox,
                overlay,
                enabled: wiring.enabled,
                clipboard: WindowsClipboardReader,
                clipboard_tx: wiring.clipboard_tx,
                control_tx: wiring.control_tx,
            });
        });

        if let Err(e) = AddClipboardFormatListener(controller) {
            warn!("clipboard listener unavailable: {e}");
        }
        add_tray_icon(controller);
        let _ = ready.send(Ok((controller.0 as isize, notifications)));
        debug!("UI thread running");

        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }

        let _ = KillTimer(Some(overlay), FADE_TIMER_ID);
        if let Some(mut ui) = UI.with(|cell| cell.borrow_mut().take()) {
            ui.presenter.dismiss();
        }
        let _ = DestroyWindow(overlay);
    }
    debug!("UI thread exited");
}

// ── Settings prompt ───────────────────────────────────────────────────────────

/// Yes/No/Cancel message box asking whether to start at login.
pub struct MessageBoxSettingsDialog;

impl SettingsDialog for MessageBoxSettingsDialog {
    fn prompt(&self, current: SettingsChoice) -> Option<SettingsChoice> {
        let state = if current.auto_start { "on" } else { "off" };
        let text: Vec<u16> = format!(
            "Start AutoCopy when you sign in to Windows?\n\nCurrently: {state}"
        )
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();

        // SAFETY: both strings are NUL-terminated and outlive the call.
        let answer = unsafe {
            MessageBoxW(
                None,
                PCWSTR(text.as_ptr()),
                w!("AutoCopy Settings"),
                MB_YESNOCANCEL | MB_ICONQUESTION | MB_TOPMOST,
            )
        };
        match answer {
            IDYES => Some(SettingsChoice { auto_start: true }),
            IDNO => Some(SettingsChoice { auto_start: false }),
            _ => None,
        }
    }
}
