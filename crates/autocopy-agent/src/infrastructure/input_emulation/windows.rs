//! Windows `SendInput` implementation of the copy and paste shortcuts.
//!
//! # Safety
//!
//! `unsafe` is limited to the `SendInput` FFI call.

#![cfg(target_os = "windows")]

use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP,
    VIRTUAL_KEY,
};

use super::{KeyStroke, Shortcut};
use crate::application::selection_copy::{EmulationError, ShortcutInjector};

pub struct WindowsShortcutInjector;

impl WindowsShortcutInjector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsShortcutInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutInjector for WindowsShortcutInjector {
    fn send_copy(&self) -> Result<(), EmulationError> {
        send_chord(Shortcut::Copy)
    }

    fn send_paste(&self) -> Result<(), EmulationError> {
        send_chord(Shortcut::Paste)
    }
}

fn keyboard_input(stroke: KeyStroke) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(stroke.vk),
                wScan: 0,
                dwFlags: if stroke.key_up {
                    KEYEVENTF_KEYUP
                } else {
                    KEYBD_EVENT_FLAGS(0)
                },
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

/// Sends the whole chord as one batch.
fn send_chord(shortcut: Shortcut) -> Result<(), EmulationError> {
    let inputs = shortcut.strokes().map(keyboard_input);
    let expected = inputs.len() as u32;

    // SAFETY: every element is a fully initialised KEYBDINPUT.
    let sent = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) };
    match sent {
        0 => Err(EmulationError::Platform(
            windows::core::Error::from_win32().to_string(),
        )),
        n if n < expected => Err(EmulationError::PartiallySent { sent: n, expected }),
        _ => Ok(()),
    }
}
