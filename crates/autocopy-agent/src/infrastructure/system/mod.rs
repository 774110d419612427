//! Process-level OS services.
//!
//! - **`single_instance`** – the named mutex that keeps a second agent from
//!   starting.
//! - **`autostart`** – the run-at-login registration.
//! - **`caret`** – the optional "does the focused window show a caret" probe
//!   used to gate synthetic copies.

pub mod autostart;
pub mod caret;
pub mod single_instance;
