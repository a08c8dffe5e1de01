//! Spatial mutations: device drags, room resize/move and building moves.
//!
//! Everything here is a plain function over the diagram (or over geometry
//! captured at gesture start). The interaction state machine decides when to
//! call them.

use crate::model::{Building, DeviceId, Diagram, Room, ViewKind};
use crate::snap::snap_if;
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Minimum width and height of a room, in diagram units.
pub const MIN_ROOM_SIZE: f64 = 20.0;

/// Room resize handle: the eight compass points plus the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
    /// Drag the whole room without resizing it.
    Center,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 9] = [
        ResizeHandle::N,
        ResizeHandle::Ne,
        ResizeHandle::E,
        ResizeHandle::Se,
        ResizeHandle::S,
        ResizeHandle::Sw,
        ResizeHandle::W,
        ResizeHandle::Nw,
        ResizeHandle::Center,
    ];

    fn moves_left(self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::Nw | ResizeHandle::Sw)
    }

    fn moves_right(self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::Ne | ResizeHandle::Se)
    }

    fn moves_top(self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::Ne | ResizeHandle::Nw)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::Se | ResizeHandle::Sw)
    }

    /// Handle position on a room rectangle (building-relative).
    pub fn position(self, room: &RoomGeometry) -> Point {
        let left = room.x;
        let right = room.x + room.width;
        let top = room.y;
        let bottom = room.y + room.height;
        let cx = room.x + room.width / 2.0;
        let cy = room.y + room.height / 2.0;
        match self {
            ResizeHandle::N => Point::new(cx, top),
            ResizeHandle::Ne => Point::new(right, top),
            ResizeHandle::E => Point::new(right, cy),
            ResizeHandle::Se => Point::new(right, bottom),
            ResizeHandle::S => Point::new(cx, bottom),
            ResizeHandle::Sw => Point::new(left, bottom),
            ResizeHandle::W => Point::new(left, cy),
            ResizeHandle::Nw => Point::new(left, top),
            ResizeHandle::Center => Point::new(cx, cy),
        }
    }
}

/// Room rectangle captured at gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<&Room> for RoomGeometry {
    fn from(room: &Room) -> Self {
        Self {
            x: room.x,
            y: room.y,
            width: room.width,
            height: room.height,
        }
    }
}

impl RoomGeometry {
    pub fn apply_to(&self, room: &mut Room) {
        room.x = self.x;
        room.y = self.y;
        room.width = self.width;
        room.height = self.height;
    }
}

/// New room geometry for dragging `handle` by `delta` from `start`.
///
/// Width and height never drop below `min_size`; when a left/top edge is
/// dragged past the limit, the opposite edge stays where it was.
pub fn resize_room(start: RoomGeometry, handle: ResizeHandle, delta: Vec2, min_size: f64) -> RoomGeometry {
    if handle == ResizeHandle::Center {
        return RoomGeometry {
            x: start.x + delta.x,
            y: start.y + delta.y,
            ..start
        };
    }

    let mut next = start;
    if handle.moves_left() {
        next.width = (start.width - delta.x).max(min_size);
        next.x = start.x + start.width - next.width;
    } else if handle.moves_right() {
        next.width = (start.width + delta.x).max(min_size);
    }
    if handle.moves_top() {
        next.height = (start.height - delta.y).max(min_size);
        next.y = start.y + start.height - next.height;
    } else if handle.moves_bottom() {
        next.height = (start.height + delta.y).max(min_size);
    }
    next
}

/// Offset a room from its start position, keeping it inside its building.
pub fn translate_room_clamped(start: RoomGeometry, delta: Vec2, building: Size) -> RoomGeometry {
    let max_x = (building.width - start.width).max(0.0);
    let max_y = (building.height - start.height).max(0.0);
    RoomGeometry {
        x: (start.x + delta.x).clamp(0.0, max_x),
        y: (start.y + delta.y).clamp(0.0, max_y),
        ..start
    }
}

/// Trim a resized room so it does not extend past its building.
///
/// Only the edges outside the building move; an edge inside stays put.
pub fn clamp_room_to_building(room: RoomGeometry, building: Size) -> RoomGeometry {
    let x0 = room.x.max(0.0);
    let y0 = room.y.max(0.0);
    let x1 = (room.x + room.width).min(building.width);
    let y1 = (room.y + room.height).min(building.height);
    RoomGeometry {
        x: x0,
        y: y0,
        width: (x1 - x0).max(0.0),
        height: (y1 - y0).max(0.0),
    }
}

/// Move one device so it sits at `point` (diagram space), snapped when enabled.
///
/// Returns the position actually written.
pub fn move_device(
    diagram: &mut Diagram,
    id: &str,
    point: Point,
    view: ViewKind,
    snap: bool,
    grid: f64,
) -> Option<Point> {
    let device = diagram.device_mut(id)?;
    let target = snap_if(point, snap, grid);
    device.set_position(view, target);
    Some(target)
}

/// Move a group of devices, anchored on the device under the pointer.
///
/// The anchor is placed (and snapped) like a single device. Every other member
/// is then offset by the anchor's actual displacement, without snapping of its
/// own, so relative offsets inside the group survive grid rounding exactly.
/// Locked members stay put.
pub fn move_device_group(
    diagram: &mut Diagram,
    anchor: &str,
    members: &BTreeSet<DeviceId>,
    point: Point,
    view: ViewKind,
    snap: bool,
    grid: f64,
) -> Option<Vec2> {
    let before = diagram.device_position(anchor, view)?;
    let after = move_device(diagram, anchor, point, view, snap, grid)?;
    let delta = after - before;
    translate_devices(diagram, members.iter().filter(|id| id.as_str() != anchor), delta, view);
    Some(delta)
}

/// Offset the given devices by `delta` in one view, skipping locked ones.
pub fn translate_devices<'a>(
    diagram: &mut Diagram,
    ids: impl IntoIterator<Item = &'a DeviceId>,
    delta: Vec2,
    view: ViewKind,
) {
    for id in ids {
        if let Some(device) = diagram.device_mut(id) {
            if device.locked {
                continue;
            }
            let moved = device.position(view) + delta;
            device.set_position(view, moved);
        }
    }
}

/// Physical positions of devices after their building moved from `old_anchor`
/// to `new_anchor`.
///
/// Each device keeps its offset from the building origin. The result depends
/// only on each device's own origin, never on iteration order.
pub fn cascade_device_positions(
    origins: &BTreeMap<DeviceId, Point>,
    old_anchor: Point,
    new_anchor: Point,
) -> BTreeMap<DeviceId, Point> {
    origins
        .iter()
        .map(|(id, origin)| (id.clone(), new_anchor + (*origin - old_anchor)))
        .collect()
}

/// Physical positions of every device placed in `building`.
pub fn building_device_origins(diagram: &Diagram, building: &Building) -> BTreeMap<DeviceId, Point> {
    diagram
        .devices
        .values()
        .filter(|d| d.building_id.as_deref() == Some(building.id.as_str()))
        .map(|d| (d.id.clone(), d.position(ViewKind::Physical)))
        .collect()
}

/// Move a building to `new_anchor`, carrying its devices along.
pub fn move_building(
    diagram: &mut Diagram,
    building_id: &str,
    old_anchor: Point,
    new_anchor: Point,
    device_origins: &BTreeMap<DeviceId, Point>,
) -> bool {
    let Some(building) = diagram.building_mut(building_id) else {
        return false;
    };
    building.x = new_anchor.x;
    building.y = new_anchor.y;

    for (id, position) in cascade_device_positions(device_origins, old_anchor, new_anchor) {
        if let Some(device) = diagram.device_mut(&id) {
            device.set_position(ViewKind::Physical, position);
        }
    }
    true
}
