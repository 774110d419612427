//! Synthetic keyboard shortcuts.
//!
//! The copy and paste shortcuts are described once, platform-independently,
//! as a chord of virtual-key strokes.  The Windows module turns the chord
//! into a single `SendInput` batch so no other input can interleave.

use std::sync::Arc;

use crate::application::selection_copy::{EmulationError, ShortcutInjector};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Windows virtual-key code of the Control key.
pub const VK_CONTROL: u16 = 0x11;
/// Virtual-key code of the `C` key.
pub const VK_C: u16 = 0x43;
/// Virtual-key code of the `V` key.
pub const VK_V: u16 = 0x56;

/// The two shortcuts the agent emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Copy,
    Paste,
}

/// One key transition inside a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub vk: u16,
    pub key_up: bool,
}

impl Shortcut {
    fn letter(self) -> u16 {
        match self {
            Shortcut::Copy => VK_C,
            Shortcut::Paste => VK_V,
        }
    }

    /// Ctrl down, letter down, letter up, Ctrl up.
    pub fn strokes(self) -> [KeyStroke; 4] {
        let letter = self.letter();
        [
            KeyStroke { vk: VK_CONTROL, key_up: false },
            KeyStroke { vk: letter, key_up: false },
            KeyStroke { vk: letter, key_up: true },
            KeyStroke { vk: VK_CONTROL, key_up: true },
        ]
    }
}

/// Injector for platforms without synthetic input support.
#[derive(Debug, Default)]
pub struct UnsupportedInjector;

impl ShortcutInjector for UnsupportedInjector {
    fn send_copy(&self) -> Result<(), EmulationError> {
        Err(EmulationError::Platform(format!(
            "synthetic input not supported on {}",
            std::env::consts::OS
        )))
    }

    fn send_paste(&self) -> Result<(), EmulationError> {
        self.send_copy()
    }
}

/// Returns the injector for the current platform.
pub fn platform_injector() -> Arc<dyn ShortcutInjector> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::WindowsShortcutInjector::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(UnsupportedInjector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_chord_wraps_letter_in_control() {
        let strokes = Shortcut::Copy.strokes();
        assert_eq!(strokes[0], KeyStroke { vk: VK_CONTROL, key_up: false });
        assert_eq!(strokes[1], KeyStroke { vk: VK_C, key_up: false });
        assert_eq!(strokes[2], KeyStroke { vk: VK_C, key_up: true });
        assert_eq!(strokes[3], KeyStroke { vk: VK_CONTROL, key_up: true });
    }

    #[test]
    fn test_paste_chord_uses_v() {
        let letters: Vec<u16> = Shortcut::Paste.strokes()[1..3].iter().map(|s| s.vk).collect();
        assert_eq!(letters, vec![VK_V, VK_V]);
    }

    #[test]
    fn test_every_key_pressed_is_released() {
        for shortcut in [Shortcut::Copy, Shortcut::Paste] {
            let strokes = shortcut.strokes();
            let downs = strokes.iter().filter(|s| !s.key_up).count();
            let ups = strokes.iter().filter(|s| s.key_up).count();
            assert_eq!(downs, ups);
        }
    }

    #[test]
    fn test_unsupported_injector_reports_platform_error() {
        assert!(matches!(
            UnsupportedInjector.send_paste(),
            Err(EmulationError::Platform(_))
        ));
    }
}
