//! Caret probe: a cheap hint that the focused window holds editable text.
//!
//! On Windows the GUI thread info of the foreground thread reports the window
//! that owns the caret.  No caret window means "no selection".  Any failure
//! also means "no selection".

use std::sync::Arc;

use crate::application::selection_copy::CaretProbe;

/// Returns the probe for the current platform, if one exists.
pub fn platform_caret_probe() -> Option<Arc<dyn CaretProbe>> {
    #[cfg(target_os = "windows")]
    {
        Some(Arc::new(GuiThreadCaretProbe))
    }

    #[cfg(not(target_os = "windows"))]
    {
        None
    }
}

#[cfg(target_os = "windows")]
pub struct GuiThreadCaretProbe;

#[cfg(target_os = "windows")]
impl CaretProbe for GuiThreadCaretProbe {
    fn has_caret(&self) -> bool {
        use windows::Win32::UI::WindowsAndMessaging::{GetGUIThreadInfo, GUITHREADINFO};

        let mut info = GUITHREADINFO {
            cbSize: std::mem::size_of::<GUITHREADINFO>() as u32,
            ..Default::default()
        };
        // SAFETY: thread id 0 selects the foreground thread; info is sized.
        match unsafe { GetGUIThreadInfo(0, &mut info) } {
            Ok(()) => !info.hwndCaret.is_invalid(),
            Err(e) => {
                tracing::debug!("caret probe failed: {e}");
                false
            }
        }
    }
}
