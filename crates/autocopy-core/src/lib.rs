//! # autocopy-core
//!
//! Domain model for AutoCopy, a background utility that copies text as soon as
//! a mouse-drag selection finishes and pastes on a middle-click.
//!
//! This crate is shared by the agent binary and its tests.  It has zero
//! dependencies on OS APIs, windows, hooks, or the clipboard itself: every
//! type here is a plain state machine that can be driven from a unit test.
//!
//! # Architecture overview (for beginners)
//!
//! The agent observes raw mouse buttons system-wide and has to *guess* what
//! the user meant.  The guessing rules live here:
//!
//! - **`domain::input`** – The three mouse events the agent cares about.
//!
//! - **`domain::selection`** – The `Idle`/`Selecting` state machine that turns
//!   a button-down/button-up pair into "copy after a short delay", and a
//!   middle-click into "paste if the clipboard holds text".
//!
//! - **`domain::snapshot`** – Remembers the last clipboard text so repeated
//!   change notifications with identical text are not announced twice.
//!
//! - **`domain::fade`** – The notification's `Hidden → Showing → Fading`
//!   lifecycle, driven by cooperative timer ticks.
//!
//! - **`domain::placement`** – Where the notification sits on the primary
//!   display's work area.
//!
//! - **`domain::enabled`** – The lock-free on/off switch shared across threads.
//!
//! - **`timing`** – Default delays and fade parameters.

pub mod domain;
pub mod timing;

pub use domain::enabled::EnabledFlag;
pub use domain::fade::{FadeError, FadePhase, FadeSequence, FadeState, FadeTick};
pub use domain::input::{InputEvent, InputEventKind};
pub use domain::placement::{NotificationGeometry, WorkArea};
pub use domain::selection::{SelectionIntent, SelectionState, SelectionTracker};
pub use domain::snapshot::{ClipboardSnapshot, ContentChange};
