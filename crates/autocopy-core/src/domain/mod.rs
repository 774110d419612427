//! Pure domain types and state machines.
//!
//! Nothing in this module performs I/O.  The agent's application layer feeds
//! OS observations in and turns the returned decisions into OS calls.

pub mod enabled;
pub mod fade;
pub mod input;
pub mod placement;
pub mod selection;
pub mod snapshot;
