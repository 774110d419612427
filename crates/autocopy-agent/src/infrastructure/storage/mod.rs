//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Reading the TOML configuration file from the platform-appropriate directory.
//! - Writing the enabled and run-at-login choices back when the user changes them.
//! - Providing defaults when the file does not exist yet (first run) or is
//!   unreadable.

pub mod config;
