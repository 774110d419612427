//! Default timing parameters.
//!
//! These values reproduce the behaviour users expect out of the box.  Every
//! one of them can be overridden from the agent's configuration file.

use std::time::Duration;

/// Delay between the primary button being released and the synthetic copy.
///
/// The button-up event arrives before the target application has committed
/// its final selection range, so copying immediately can capture an empty or
/// stale selection.
pub const DEFAULT_COPY_DELAY: Duration = Duration::from_millis(100);

/// Opacity removed from the notification on every fade tick.
pub const DEFAULT_FADE_STEP: f32 = 0.1;

/// Interval between two fade ticks.
pub const DEFAULT_FADE_TICK: Duration = Duration::from_millis(50);

/// Message shown when new text lands on the clipboard.
pub const DEFAULT_COPIED_MESSAGE: &str = "Text copied";

/// Total visible time of a notification for a given step and tick interval.
///
/// With the defaults this is `10 × 50 ms = 500 ms`.
pub fn fade_duration(step: f32, tick: Duration) -> Duration {
    tick * crate::domain::fade::steps_for(step)
}
