//! Mouse events observed by the system-wide input hook.

/// The subset of mouse activity that drives selection inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEventKind {
    /// The primary (left) button was pressed.
    PrimaryDown,
    /// The primary (left) button was released.
    PrimaryUp,
    /// The middle button was pressed.
    MiddleClick,
}

/// A single observed mouse event.
///
/// Produced once by the input observer and consumed once by the selection
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: InputEventKind,
    /// Milliseconds since system start, as stamped by the OS hook.
    pub timestamp_ms: u32,
}

impl InputEvent {
    pub fn new(kind: InputEventKind, timestamp_ms: u32) -> Self {
        Self { kind, timestamp_ms }
    }

    pub fn primary_down(timestamp_ms: u32) -> Self {
        Self::new(InputEventKind::PrimaryDown, timestamp_ms)
    }

    pub fn primary_up(timestamp_ms: u32) -> Self {
        Self::new(InputEventKind::PrimaryUp, timestamp_ms)
    }

    pub fn middle_click(timestamp_ms: u32) -> Self {
        Self::new(InputEventKind::MiddleClick, timestamp_ms)
    }
}
