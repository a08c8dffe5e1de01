//! Selection state, click-vs-drag disambiguation and box selection.

use crate::model::{ConnectionId, DeviceId, Diagram, RoomId, ViewKind, WallId};
use kurbo::{Point, Rect};
use std::collections::BTreeSet;

/// Screen pixels a press may travel before it counts as a drag.
pub const CLICK_THRESHOLD: f64 = 5.0;

/// Rubber-band rectangle, corners in diagram space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionBox {
    pub start: Point,
    pub end: Point,
}

impl SelectionBox {
    pub fn new(start: Point) -> Self {
        Self { start, end: start }
    }

    /// The box as a normalized rectangle (min/max per axis).
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.start.x.min(self.end.x),
            self.start.y.min(self.end.y),
            self.start.x.max(self.end.x),
            self.start.y.max(self.end.y),
        )
    }
}

/// Everything currently selected on the canvas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub devices: BTreeSet<DeviceId>,
    pub connection: Option<ConnectionId>,
    pub rooms: BTreeSet<RoomId>,
    pub walls: BTreeSet<WallId>,
    pub selection_box: Option<SelectionBox>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.connection.is_none() && self.rooms.is_empty() && self.walls.is_empty()
    }

    pub fn is_device_selected(&self, id: &str) -> bool {
        self.devices.contains(id)
    }

    /// Select exactly one device.
    pub fn select_device(&mut self, id: impl Into<DeviceId>) {
        self.clear();
        self.devices.insert(id.into());
    }

    /// Toggle a device in the device selection, keeping the rest.
    pub fn toggle_device(&mut self, id: &str) {
        self.connection = None;
        self.rooms.clear();
        self.walls.clear();
        if !self.devices.remove(id) {
            self.devices.insert(id.to_string());
        }
    }

    /// Replace the device selection.
    pub fn set_devices(&mut self, ids: BTreeSet<DeviceId>) {
        self.clear();
        self.devices = ids;
    }

    /// Select a connection; device selection is dropped.
    pub fn select_connection(&mut self, id: impl Into<ConnectionId>) {
        self.clear();
        self.connection = Some(id.into());
    }

    pub fn select_room(&mut self, id: impl Into<RoomId>, additive: bool) {
        if !additive {
            self.clear();
        }
        self.devices.clear();
        self.connection = None;
        self.rooms.insert(id.into());
    }

    pub fn select_wall(&mut self, id: impl Into<WallId>) {
        self.clear();
        self.walls.insert(id.into());
    }

    /// Deselect everything (the box, being a gesture, is left alone).
    pub fn clear(&mut self) {
        self.devices.clear();
        self.connection = None;
        self.rooms.clear();
        self.walls.clear();
    }

    /// Drop ids that no longer exist in the diagram.
    pub fn retain_existing(&mut self, diagram: &Diagram) {
        self.devices.retain(|id| diagram.devices.contains_key(id));
        if let Some(id) = &self.connection {
            if !diagram.connections.contains_key(id) {
                self.connection = None;
            }
        }
        self.rooms.retain(|id| diagram.room(id).is_some());
        self.walls.retain(|id| diagram.wall_exists(id));
    }
}

/// Devices whose position in `view` lies inside `rect` (bounds inclusive).
pub fn devices_in_rect(diagram: &Diagram, rect: Rect, view: ViewKind) -> BTreeSet<DeviceId> {
    diagram
        .devices
        .values()
        .filter(|d| {
            let p = d.position(view);
            p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
        })
        .map(|d| d.id.clone())
        .collect()
}

/// Tracks one press on the background to tell a click from a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressTracker {
    /// Screen position of the press.
    pub down: Point,
    /// Set once the pointer travelled beyond the threshold.
    pub used_for_drag: bool,
    threshold: f64,
}

impl PressTracker {
    pub fn new(down: Point, threshold: f64) -> Self {
        Self {
            down,
            used_for_drag: false,
            threshold,
        }
    }

    /// Feed a move; returns whether the press has become a drag.
    pub fn update(&mut self, screen: Point) -> bool {
        if !self.used_for_drag && self.down.distance(screen) > self.threshold {
            self.used_for_drag = true;
        }
        self.used_for_drag
    }

    /// Whether releasing at `screen` completes a click.
    pub fn is_click(&self, screen: Point) -> bool {
        !self.used_for_drag && self.down.distance(screen) <= self.threshold
    }
}
