//! Win32 clipboard reader (`CF_UNICODETEXT`).
//!
//! # Safety
//!
//! `unsafe` covers the clipboard FFI calls.  The clipboard is always closed
//! again through [`OpenGuard`], including on error paths.

#![cfg(target_os = "windows")]

use windows::Win32::Foundation::{HANDLE, HGLOBAL};
use windows::Win32::System::DataExchange::{
    CloseClipboard, GetClipboardData, IsClipboardFormatAvailable, OpenClipboard,
};
use windows::Win32::System::Memory::{GlobalLock, GlobalSize, GlobalUnlock};

use crate::application::clipboard_watch::{ClipboardError, ClipboardReader};

/// Standard clipboard format id for UTF-16 text.
const CF_UNICODETEXT: u32 = 13;

pub struct WindowsClipboardReader;

/// Closes the clipboard on drop.
struct OpenGuard;

impl OpenGuard {
    fn open() -> Result<Self, ClipboardError> {
        // SAFETY: no owner window; the clipboard is associated with this task.
        unsafe { OpenClipboard(None) }.map_err(|_| ClipboardError::Busy)?;
        Ok(Self)
    }
}

impl Drop for OpenGuard {
    fn drop(&mut self) {
        // SAFETY: paired with the successful OpenClipboard above.
        let _ = unsafe { CloseClipboard() };
    }
}

impl ClipboardReader for WindowsClipboardReader {
    fn has_text(&self) -> bool {
        // SAFETY: format query only; does not open the clipboard.
        unsafe { IsClipboardFormatAvailable(CF_UNICODETEXT) }.is_ok()
    }

    fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        if !self.has_text() {
            return Ok(None);
        }
        let _guard = OpenGuard::open()?;

        // SAFETY: the clipboard is open; the handle stays valid until it closes.
        let handle: HANDLE = unsafe { GetClipboardData(CF_UNICODETEXT) }
            .map_err(|e| ClipboardError::Read(e.to_string()))?;
        let global = HGLOBAL(handle.0);

        // SAFETY: CF_UNICODETEXT data is a global memory block of UTF-16 units.
        unsafe {
            let ptr = GlobalLock(global) as *const u16;
            if ptr.is_null() {
                return Err(ClipboardError::Read("GlobalLock returned null".to_string()));
            }
            let max_units = GlobalSize(global) / std::mem::size_of::<u16>();
            let units = std::slice::from_raw_parts(ptr, max_units);
            let len = units.iter().position(|&u| u == 0).unwrap_or(max_units);
            let text = String::from_utf16_lossy(&units[..len]);
            let _ = GlobalUnlock(global);
            Ok(Some(text))
        }
    }
}
