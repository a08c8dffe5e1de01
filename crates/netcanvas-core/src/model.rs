//! Diagram data model: devices, connections, buildings, floors, rooms and walls.
//!
//! All collections are ordered maps keyed by id so that a serialized diagram
//! has a canonical form (history snapshots rely on byte equality).

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type DeviceId = String;
pub type ConnectionId = String;
pub type BuildingId = String;
pub type RoomId = String;
pub type WallId = String;

/// Which of the two diagram views is active.
///
/// Devices carry one position per view; the physical view also shows
/// buildings, floors, rooms and walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    #[default]
    Logical,
    Physical,
}

/// Device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    /// WAN egress point (ISP handoff / internet).
    Internet,
    Router,
    Firewall,
    Switch,
    AccessPoint,
    Server,
    Workstation,
    Printer,
    Camera,
    Phone,
    #[default]
    Other,
}

impl DeviceKind {
    /// Whether this device type is the network's uplink.
    pub fn is_uplink(self) -> bool {
        matches!(self, DeviceKind::Internet)
    }
}

/// A network device placed on the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DeviceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: DeviceKind,
    /// Logical view position.
    pub x: f64,
    pub y: f64,
    /// Physical (floor plan) view position.
    #[serde(default)]
    pub physical_x: f64,
    #[serde(default)]
    pub physical_y: f64,
    /// Locked devices cannot be dragged.
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub building_id: Option<BuildingId>,
    #[serde(default)]
    pub floor: Option<usize>,
}

impl Device {
    /// Create an unlocked, unplaced device at a logical position.
    pub fn new(id: impl Into<DeviceId>, kind: DeviceKind, x: f64, y: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            x,
            y,
            physical_x: x,
            physical_y: y,
            locked: false,
            building_id: None,
            floor: None,
        }
    }

    /// Position in the given view.
    pub fn position(&self, view: ViewKind) -> Point {
        match view {
            ViewKind::Logical => Point::new(self.x, self.y),
            ViewKind::Physical => Point::new(self.physical_x, self.physical_y),
        }
    }

    /// Write the position pair of the given view.
    pub fn set_position(&mut self, view: ViewKind, point: Point) {
        match view {
            ViewKind::Logical => {
                self.x = point.x;
                self.y = point.y;
            }
            ViewKind::Physical => {
                self.physical_x = point.x;
                self.physical_y = point.y;
            }
        }
    }
}

/// A link between two devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub from: DeviceId,
    pub to: DeviceId,
    #[serde(default)]
    pub from_port: Option<String>,
    #[serde(default)]
    pub to_port: Option<String>,
    #[serde(default)]
    pub cable_type: Option<String>,
    #[serde(default)]
    pub cable_length: Option<f64>,
    #[serde(default)]
    pub speed: Option<String>,
}

impl Connection {
    pub fn new(id: impl Into<ConnectionId>, from: impl Into<DeviceId>, to: impl Into<DeviceId>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            from_port: None,
            to_port: None,
            cable_type: None,
            cable_length: None,
            speed: None,
        }
    }

    /// Whether `device` is one of the two endpoints.
    pub fn touches(&self, device: &str) -> bool {
        self.from == device || self.to == device
    }
}

/// A room, positioned relative to its building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    #[serde(default)]
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Room {
    pub fn new(id: impl Into<RoomId>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            x,
            y,
            width,
            height,
        }
    }

    /// Building-relative rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// A wall segment, positioned relative to its building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: WallId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Wall {
    pub fn new(id: impl Into<WallId>, start: Point, end: Point) -> Self {
        Self {
            id: id.into(),
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
        }
    }

    pub fn length(&self) -> f64 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }
}

/// One storey of a building.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Floor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub walls: Vec<Wall>,
}

/// A building on the physical view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    #[serde(default)]
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub floors: Vec<Floor>,
}

impl Building {
    /// Create a building with a single empty floor.
    pub fn new(id: impl Into<BuildingId>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            x,
            y,
            width,
            height,
            floors: vec![Floor::default()],
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Diagram-space rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Where a room lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomLocation {
    pub building_id: BuildingId,
    pub floor: usize,
}

/// The full mutable diagram state: the part captured by undo history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(default)]
    pub devices: BTreeMap<DeviceId, Device>,
    #[serde(default)]
    pub connections: BTreeMap<ConnectionId, Connection>,
    #[serde(default)]
    pub buildings: BTreeMap<BuildingId, Building>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&mut self, device: Device) {
        self.devices.insert(device.id.clone(), device);
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.insert(connection.id.clone(), connection);
    }

    pub fn add_building(&mut self, building: Building) {
        self.buildings.insert(building.id.clone(), building);
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.get(id)
    }

    pub fn device_mut(&mut self, id: &str) -> Option<&mut Device> {
        self.devices.get_mut(id)
    }

    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.get(id)
    }

    pub fn building_mut(&mut self, id: &str) -> Option<&mut Building> {
        self.buildings.get_mut(id)
    }

    /// Position of a device in the given view.
    pub fn device_position(&self, id: &str, view: ViewKind) -> Option<Point> {
        self.devices.get(id).map(|d| d.position(view))
    }

    /// Number of connections incident to a device.
    pub fn degree(&self, id: &str) -> usize {
        self.connections.values().filter(|c| c.touches(id)).count()
    }

    /// Locate the building and floor that own a room.
    pub fn room_location(&self, room_id: &str) -> Option<RoomLocation> {
        self.buildings.values().find_map(|building| {
            building.floors.iter().enumerate().find_map(|(floor, f)| {
                f.rooms.iter().any(|r| r.id == room_id).then(|| RoomLocation {
                    building_id: building.id.clone(),
                    floor,
                })
            })
        })
    }

    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.buildings
            .values()
            .flat_map(|b| b.floors.iter())
            .flat_map(|f| f.rooms.iter())
            .find(|r| r.id == room_id)
    }

    pub fn room_mut(&mut self, room_id: &str) -> Option<&mut Room> {
        self.buildings
            .values_mut()
            .flat_map(|b| b.floors.iter_mut())
            .flat_map(|f| f.rooms.iter_mut())
            .find(|r| r.id == room_id)
    }

    pub fn wall_exists(&self, wall_id: &str) -> bool {
        self.buildings
            .values()
            .flat_map(|b| b.floors.iter())
            .flat_map(|f| f.walls.iter())
            .any(|w| w.id == wall_id)
    }

    pub fn floor(&self, building_id: &str, floor: usize) -> Option<&Floor> {
        self.buildings.get(building_id)?.floors.get(floor)
    }

    pub fn floor_mut(&mut self, building_id: &str, floor: usize) -> Option<&mut Floor> {
        self.buildings.get_mut(building_id)?.floors.get_mut(floor)
    }

    /// Bounding box of everything visible in a view.
    pub fn bounds(&self, view: ViewKind) -> Option<Rect> {
        let mut result: Option<Rect> = None;
        let mut include = |r: Rect| {
            result = Some(match result {
                Some(acc) => acc.union(r),
                None => r,
            });
        };
        for device in self.devices.values() {
            let p = device.position(view);
            include(Rect::from_points(p, p));
        }
        if view == ViewKind::Physical {
            for building in self.buildings.values() {
                include(building.rect());
            }
        }
        result
    }
}

/// Smallest length treated as a real connection when offsetting labels.
const MIN_LABEL_SEGMENT: f64 = 1e-6;

/// Anchor for a connection label: the segment midpoint pushed `offset` units
/// along the segment's normal.
///
/// Coincident endpoints have no normal; the label is then pushed straight up.
pub fn label_anchor(from: Point, to: Point, offset: f64) -> Point {
    let mid = from.midpoint(to);
    let dir = to - from;
    let len = dir.hypot();
    let normal = if len < MIN_LABEL_SEGMENT {
        Vec2::new(0.0, -1.0)
    } else {
        Vec2::new(-dir.y / len, dir.x / len)
    };
    mid + normal * offset
}
