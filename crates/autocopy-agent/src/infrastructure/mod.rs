//! Infrastructure layer for the agent.
//!
//! Contains OS-facing adapters: the low-level mouse hook, synthetic keyboard
//! input, clipboard access, the desktop host (overlay window, clipboard
//! listener, tray), configuration storage and system services (instance mutex,
//! run-at-login, caret probe).
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `autocopy_core`, and is only reached from `application` through the error
//! types and traits re-used at its seams.

pub mod clipboard;
pub mod desktop;
pub mod input_capture;
pub mod input_emulation;
pub mod storage;
pub mod system;
