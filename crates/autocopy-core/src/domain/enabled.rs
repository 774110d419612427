//! The process-wide on/off switch.
//!
//! Read from the hook event path and the clipboard path, written from tray
//! and settings commands.  Every read is a single atomic load, every toggle a
//! single atomic read-modify-write, so no caller can observe a half-applied
//! update.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle to one shared boolean.
///
/// All clones observe the same value.
#[derive(Debug, Clone)]
pub struct EnabledFlag(Arc<AtomicBool>);

impl EnabledFlag {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Release);
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::AcqRel)
    }
}

impl Default for EnabledFlag {
    fn default() -> Self {
        Self::new(true)
    }
}
