//! Notification window geometry on the primary display.

use serde::{Deserialize, Serialize};

/// The usable area of the primary display (excludes the taskbar), in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkArea {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl WorkArea {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Size of the notification window and its distance from the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationGeometry {
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default = "default_bottom_margin")]
    pub bottom_margin: i32,
}

fn default_width() -> i32 {
    200
}
fn default_height() -> i32 {
    40
}
fn default_bottom_margin() -> i32 {
    10
}

impl Default for NotificationGeometry {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            bottom_margin: default_bottom_margin(),
        }
    }
}

impl NotificationGeometry {
    /// Top-left corner that centres the window horizontally in `area` and
    /// anchors it `bottom_margin` pixels above the area's bottom edge.
    pub fn origin_in(&self, area: WorkArea) -> (i32, i32) {
        let x = area.left + (area.width() - self.width) / 2;
        let y = area.bottom - self.height - self.bottom_margin;
        (x, y)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_centred_above_taskbar_on_1080p() {
        // Arrange: 1920×1080 display with a 40 px taskbar
        let area = WorkArea {
            left: 0,
            top: 0,
            right: 1920,
            bottom: 1040,
        };

        // Act
        let origin = NotificationGeometry::default().origin_in(area);

        // Assert
        assert_eq!(origin, (860, 990));
    }

    #[test]
    fn test_origin_respects_offset_work_area() {
        // Taskbar docked on the left pushes the work area right.
        let area = WorkArea {
            left: 100,
            top: 0,
            right: 1100,
            bottom: 800,
        };
        let geom = NotificationGeometry {
            width: 300,
            height: 50,
            bottom_margin: 20,
        };
        assert_eq!(geom.origin_in(area), (450, 730));
    }

    #[test]
    fn test_partial_geometry_uses_defaults() {
        let geom: NotificationGeometry = toml::from_str("width = 320").unwrap();
        assert_eq!(geom.width, 320);
        assert_eq!(geom.height, 40);
        assert_eq!(geom.bottom_margin, 10);
    }
}
