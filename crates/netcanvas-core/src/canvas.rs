//! Canvas runtime state: the diagram plus everything needed to interpret
//! pointer input against it.

use crate::config::EngineConfig;
use crate::input::HitTarget;
use crate::manipulation::{ResizeHandle, RoomGeometry};
use crate::model::{BuildingId, Diagram, ViewKind};
use crate::selection::SelectionState;
use crate::tools::ToolKind;
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size, Vec2};

/// Connection hit tolerance in screen pixels.
const CONNECTION_HIT_TOLERANCE: f64 = 6.0;
/// Height of the title strip above a building outline, in diagram units.
const BUILDING_HEADER_HEIGHT: f64 = 24.0;

/// The floor currently shown in the physical view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFloor {
    pub building_id: BuildingId,
    pub floor: usize,
}

/// Runtime canvas state (not persisted).
#[derive(Debug, Clone)]
pub struct Canvas {
    /// The diagram being edited.
    pub diagram: Diagram,
    pub viewport: Viewport,
    pub view: ViewKind,
    /// Floor plan that drawing tools and room hit-testing work on.
    pub active_floor: Option<ActiveFloor>,
    pub tool: ToolKind,
    pub selection: SelectionState,
    pub config: EngineConfig,
    /// Screen size, used by fit-to-content.
    pub viewport_size: Size,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(Diagram::default(), EngineConfig::default())
    }
}

impl Canvas {
    pub fn new(diagram: Diagram, config: EngineConfig) -> Self {
        Self {
            diagram,
            viewport: Viewport::with_limits(config.min_zoom, config.max_zoom),
            view: ViewKind::default(),
            active_floor: None,
            tool: ToolKind::default(),
            selection: SelectionState::new(),
            config,
            viewport_size: Size::new(800.0, 600.0),
        }
    }

    /// Screen point to diagram space.
    pub fn diagram_point(&self, screen: Point) -> Point {
        self.viewport.to_diagram_space(screen)
    }

    /// Grid size of the active view.
    pub fn grid_size(&self) -> f64 {
        self.config.grid_size(self.view)
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_size = Size::new(width, height);
    }

    /// Fit the view to everything visible in the active view.
    pub fn fit_to_content(&mut self) {
        if let Some(bounds) = self.diagram.bounds(self.view) {
            self.viewport.fit_to_bounds(bounds, self.viewport_size, 50.0);
        }
    }

    /// Origin of the active floor's building, if the physical view is showing one.
    pub fn active_building_origin(&self) -> Option<Point> {
        let active = self.active_floor.as_ref()?;
        self.diagram.building(&active.building_id).map(|b| b.origin())
    }

    /// Find what lies under a screen point.
    ///
    /// Priority, front to back: devices, resize handles of selected rooms,
    /// walls, rooms, connections, building chrome. Empty floor space inside a
    /// building is background.
    pub fn hit_test(&self, screen: Point) -> HitTarget {
        let point = self.diagram_point(screen);
        let zoom = self.viewport.zoom;

        if let Some(id) = self.device_at(point, self.config.device_hit_radius / zoom) {
            return HitTarget::Device(id);
        }

        if self.view == ViewKind::Physical {
            if let Some(target) = self.floor_hit(point, self.config.handle_hit_radius / zoom) {
                return target;
            }
        }

        if let Some(id) = self.connection_at(point, CONNECTION_HIT_TOLERANCE / zoom) {
            return HitTarget::Connection(id);
        }

        if self.view == ViewKind::Physical {
            if let Some(id) = self.building_chrome_at(point, self.config.handle_hit_radius / zoom) {
                return HitTarget::Building(id);
            }
        }

        HitTarget::Background
    }

    fn device_at(&self, point: Point, radius: f64) -> Option<String> {
        let active = self.active_floor.as_ref();
        self.diagram
            .devices
            .values()
            .filter(|d| match (self.view, active) {
                // devices on other floors of the shown building are hidden
                (ViewKind::Physical, Some(active)) => {
                    d.building_id.as_deref() != Some(active.building_id.as_str())
                        || d.floor.is_none_or(|f| f == active.floor)
                }
                _ => true,
            })
            .map(|d| (d, d.position(self.view).distance(point)))
            .filter(|(_, dist)| *dist <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(d, _)| d.id.clone())
    }

    fn connection_at(&self, point: Point, tolerance: f64) -> Option<String> {
        self.diagram.connections.values().find_map(|c| {
            let from = self.diagram.device_position(&c.from, self.view)?;
            let to = self.diagram.device_position(&c.to, self.view)?;
            (distance_to_segment(point, from, to) <= tolerance).then(|| c.id.clone())
        })
    }

    /// Building outline (within `tolerance` of an edge) or title strip.
    /// The interior is floor space, not chrome.
    fn building_chrome_at(&self, point: Point, tolerance: f64) -> Option<String> {
        self.diagram
            .buildings
            .values()
            .rev()
            .find(|b| {
                let rect = b.rect();
                let header = Rect::new(rect.x0, rect.y0 - BUILDING_HEADER_HEIGHT, rect.x1, rect.y0);
                let outline = rect.inflate(tolerance, tolerance).contains(point)
                    && !rect.inflate(-tolerance, -tolerance).contains(point);
                outline || header.contains(point)
            })
            .map(|b| b.id.clone())
    }

    /// Handles, walls and rooms of the active floor.
    fn floor_hit(&self, point: Point, tolerance: f64) -> Option<HitTarget> {
        let active = self.active_floor.as_ref()?;
        let building = self.diagram.building(&active.building_id)?;
        let floor = building.floors.get(active.floor)?;
        let local = point - building.origin().to_vec2();

        for room in floor.rooms.iter().filter(|r| self.selection.rooms.contains(&r.id)) {
            let geometry = RoomGeometry::from(room);
            let handle = ResizeHandle::ALL
                .into_iter()
                .filter(|h| *h != ResizeHandle::Center)
                .find(|h| h.position(&geometry).distance(local) <= tolerance);
            if let Some(handle) = handle {
                return Some(HitTarget::RoomHandle {
                    room: room.id.clone(),
                    handle,
                });
            }
        }

        if let Some(wall) = floor.walls.iter().rev().find(|w| {
            distance_to_segment(local, Point::new(w.x1, w.y1), Point::new(w.x2, w.y2)) <= tolerance
        }) {
            return Some(HitTarget::Wall(wall.id.clone()));
        }

        floor
            .rooms
            .iter()
            .rev()
            .find(|r| r.rect().contains(local))
            .map(|r| HitTarget::Room(r.id.clone()))
    }
}

/// Distance from `p` to the segment `a`-`b`. A zero-length segment is a point.
fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab: Vec2 = b - a;
    let len_sq = ab.hypot2();
    if len_sq < f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
