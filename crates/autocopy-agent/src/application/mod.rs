//! Application layer use cases for the agent.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure state machines in `autocopy-core`) and the infrastructure (hooks,
//! clipboard, windows, registry).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "copy the
//!   text the user just dragged over").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so the Windows adapters can be swapped for recording doubles in tests.
//! - **Contain no OS calls**.
//!
//! # Sub-modules
//!
//! - **`selection_copy`** – Consumes mouse events, runs the selection state
//!   machine and issues synthetic copy/paste shortcuts.  Runs on every mouse
//!   button press on the machine.
//!
//! - **`clipboard_watch`** – Turns raw clipboard change signals into
//!   deduplicated `ContentCopied` events.
//!
//! - **`notification`** – The transient overlay's presenter and the
//!   thread-safe handle used to reach it.
//!
//! - **`orchestrator`** – Owns the enabled flag and settings, wires the
//!   above together, serves tray commands and enforces shutdown order.

pub mod clipboard_watch;
pub mod notification;
pub mod orchestrator;
pub mod selection_copy;
