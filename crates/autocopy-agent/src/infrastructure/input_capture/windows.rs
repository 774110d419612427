//! Windows low-level mouse hook implementation.
//!
//! Installs `WH_MOUSE_LL` on a dedicated thread that owns a Win32 message
//! loop.  Only three messages are classified (left down, left up, middle
//! down); every other message, and every message when the channel is closed,
//! goes straight to `CallNextHookEx`.
//!
//! Injected mouse events (`LLMHF_INJECTED`) are forwarded like any other: the
//! agent itself only injects keyboard input, which never reaches this hook.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::sync::mpsc as std_mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use autocopy_core::{InputEvent, InputEventKind};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, UnhookWindowsHookEx, HC_ACTION, MSG, MSLLHOOKSTRUCT, PM_NOREMOVE,
    WH_MOUSE_LL, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN, WM_QUIT, WM_USER,
};

use super::{CaptureError, InputSource};

/// Sender used by the hook callback.  `None` while uninstalled.
static EVENT_SENDER: Mutex<Option<UnboundedSender<InputEvent>>> = Mutex::new(None);

struct HookThread {
    thread_id: u32,
    handle: JoinHandle<()>,
}

/// Windows low-level mouse observer.
pub struct WindowsMouseHook {
    thread: Mutex<Option<HookThread>>,
}

impl WindowsMouseHook {
    pub fn new() -> Self {
        Self {
            thread: Mutex::new(None),
        }
    }
}

impl Default for WindowsMouseHook {
    fn default() -> Self {
        Self::new()
    }
}

fn set_sender(sender: Option<UnboundedSender<InputEvent>>) {
    *EVENT_SENDER.lock().unwrap_or_else(PoisonError::into_inner) = sender;
}

impl InputSource for WindowsMouseHook {
    fn install(&self) -> Result<UnboundedReceiver<InputEvent>, CaptureError> {
        let mut guard = self.thread.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_some() {
            return Err(CaptureError::AlreadyInstalled);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        set_sender(Some(tx));

        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<u32, String>>();
        let handle = thread::Builder::new()
            .name("autocopy-mouse-hook".to_string())
            .spawn(move || run_hook_message_loop(ready_tx))
            .map_err(|e| {
                set_sender(None);
                CaptureError::HookInstallFailed(e.to_string())
            })?;

        match ready_rx.recv() {
            Ok(Ok(thread_id)) => {
                debug!(thread_id, "mouse hook thread running");
                *guard = Some(HookThread { thread_id, handle });
                Ok(rx)
            }
            Ok(Err(reason)) => {
                let _ = handle.join();
                set_sender(None);
                Err(CaptureError::HookInstallFailed(reason))
            }
            Err(_) => {
                let _ = handle.join();
                set_sender(None);
                Err(CaptureError::HookInstallFailed(
                    "hook thread exited before reporting".to_string(),
                ))
            }
        }
    }

    fn uninstall(&self) {
        let Some(hook) = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return;
        };

        // SAFETY: posting to a thread id we created; the queue exists because
        // the thread forced its creation before reporting ready.
        if let Err(e) = unsafe { PostThreadMessageW(hook.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) } {
            warn!("failed to stop mouse hook thread: {e}");
        }
        if hook.handle.join().is_err() {
            warn!("mouse hook thread panicked");
        }
        set_sender(None);
        debug!("mouse hook uninstalled");
    }
}

/// Entry point for the dedicated Win32 message loop thread.
fn run_hook_message_loop(ready: std_mpsc::Sender<Result<u32, String>>) {
    let mut msg = MSG::default();

    // SAFETY: plain Win32 calls on the current thread.  PeekMessageW creates
    // the thread's message queue so a later PostThreadMessageW cannot fail.
    let thread_id = unsafe {
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
        GetCurrentThreadId()
    };

    // SAFETY: the hook procedure is a valid `extern "system"` fn for the life
    // of the process, and this thread pumps messages below.
    let hook = match unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0) } {
        Ok(hook) => hook,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    let _ = ready.send(Ok(thread_id));

    // SAFETY: standard GetMessage/DispatchMessage loop; blocks until WM_QUIT.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            DispatchMessageW(&msg);
        }
        if let Err(e) = UnhookWindowsHookEx(hook) {
            warn!("UnhookWindowsHookEx failed: {e}");
        }
    }
}

/// Maps a hook message to the event kind the agent cares about.
fn classify(message: u32) -> Option<InputEventKind> {
    match message {
        WM_LBUTTONDOWN => Some(InputEventKind::PrimaryDown),
        WM_LBUTTONUP => Some(InputEventKind::PrimaryUp),
        WM_MBUTTONDOWN => Some(InputEventKind::MiddleClick),
        _ => None,
    }
}

/// Low-level mouse hook callback.
///
/// # Safety
///
/// Called by Windows from the hook message loop thread; must return quickly.
unsafe extern "system" fn mouse_hook_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        if let Some(kind) = classify(w_param.0 as u32) {
            // SAFETY: l_param points to a MSLLHOOKSTRUCT when n_code == HC_ACTION.
            let info = &*(l_param.0 as *const MSLLHOOKSTRUCT);
            let event = InputEvent::new(kind, info.time);
            if let Ok(guard) = EVENT_SENDER.try_lock() {
                if let Some(sender) = guard.as_ref() {
                    // A closed channel during shutdown is expected.
                    let _ = sender.send(event);
                }
            }
        }
    }

    // SAFETY: always forward to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}
