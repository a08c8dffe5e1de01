//! Pointer and wheel input as delivered by the presentation layer.

use crate::manipulation::ResizeHandle;
use crate::model::{BuildingId, ConnectionId, DeviceId, RoomId, WallId};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS: turns a background press into a box select.
    pub fn structural(self) -> bool {
        self.ctrl || self.meta
    }
}

/// What the pointer is over, as reported by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "kebab-case")]
pub enum HitTarget {
    /// Empty canvas.
    Background,
    Device(DeviceId),
    Connection(ConnectionId),
    Room(RoomId),
    /// A resize handle of a room.
    RoomHandle { room: RoomId, handle: ResizeHandle },
    Wall(WallId),
    /// Building chrome (outline or title bar), not a device or room inside it.
    Building(BuildingId),
}

/// A pointer down/move/up event in screen coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerInput {
    pub position: Point,
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Hit target, when the caller already knows it. `None` asks the canvas
    /// to hit-test its own geometry.
    #[serde(default)]
    pub target: Option<HitTarget>,
}

impl PointerInput {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            ..Self::default()
        }
    }

    pub fn on(mut self, target: HitTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A wheel event at a screen position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelInput {
    pub position: Point,
    pub delta_y: f64,
}
