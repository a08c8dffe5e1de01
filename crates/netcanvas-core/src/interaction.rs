//! Interaction state machine: turns pointer events into canvas operations.
//!
//! Exactly one gesture can be in progress at a time; [`Mode`] carries that
//! gesture's state, so two gestures can never be half-active together.

use crate::canvas::Canvas;
use crate::id::IdGenerator;
use crate::input::{HitTarget, MouseButton, PointerInput};
use crate::manipulation::{
    ResizeHandle, RoomGeometry, building_device_origins, clamp_room_to_building, move_building, move_device,
    move_device_group, resize_room, translate_room_clamped,
};
use crate::model::{BuildingId, DeviceId, Room, RoomId, ViewKind, Wall, WallId};
use crate::selection::{PressTracker, SelectionBox, devices_in_rect};
use crate::snap::{snap_if, snap_value};
use crate::tools::ToolKind;
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::BTreeMap;

/// A wall or room being drawn. Points are relative to the building.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawGesture {
    pub building_id: BuildingId,
    pub floor: usize,
    pub start: Point,
    pub current: Point,
}

impl DrawGesture {
    /// The drawn rectangle, normalized.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.start.x.min(self.current.x),
            self.start.y.min(self.current.y),
            self.start.x.max(self.current.x),
            self.start.y.max(self.current.y),
        )
    }
}

/// A room resize in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomResize {
    pub room_id: RoomId,
    pub handle: ResizeHandle,
    /// Pointer at press, diagram space.
    pub start_pointer: Point,
    pub start: RoomGeometry,
    pub building_size: Size,
}

/// Rooms being moved together. All share one building floor.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomMove {
    pub building_size: Size,
    pub start_pointer: Point,
    pub origins: BTreeMap<RoomId, RoomGeometry>,
}

/// A building drag in progress, with the devices it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingDrag {
    pub building_id: BuildingId,
    /// Building origin at press.
    pub anchor: Point,
    pub start_pointer: Point,
    /// Physical positions at press of every device placed in the building.
    pub device_origins: BTreeMap<DeviceId, Point>,
}

/// The active gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    #[default]
    Idle,
    /// Dragging the view. `origin` is `pointer - pan` at press.
    Panning {
        origin: Vec2,
        /// Present for background presses, which deselect on a plain click.
        press: Option<PressTracker>,
    },
    DraggingDevice {
        device: DeviceId,
        /// Whether the whole device selection follows the pointer.
        group: bool,
        moved: bool,
    },
    /// Rubber-band selection; the box itself is `SelectionState::selection_box`.
    BoxSelecting,
    DrawingWall(DrawGesture),
    DrawingRoom(DrawGesture),
    ResizingRoom(RoomResize),
    MovingRooms(RoomMove),
    DraggingBuilding(BuildingDrag),
    Connecting {
        from: DeviceId,
        cursor: Point,
    },
    Measuring {
        start: Point,
        current: Point,
    },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Panning { .. } => "panning",
            Mode::DraggingDevice { .. } => "dragging-device",
            Mode::BoxSelecting => "box-selecting",
            Mode::DrawingWall(_) => "drawing-wall",
            Mode::DrawingRoom(_) => "drawing-room",
            Mode::ResizingRoom(_) => "resizing-room",
            Mode::MovingRooms(_) => "moving-rooms",
            Mode::DraggingBuilding(_) => "dragging-building",
            Mode::Connecting { .. } => "connecting",
            Mode::Measuring { .. } => "measuring",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Mode::Idle)
    }
}

/// What an event did, for the presentation layer and for history.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing happened.
    None,
    /// Pan or zoom changed.
    ViewChanged,
    SelectionChanged,
    /// A preview (box, drawing, measuring line) moved; no diagram change.
    GestureUpdated,
    /// Entity positions or sizes changed.
    DiagramChanged,
    RoomCreated(RoomId),
    WallCreated(WallId),
    /// The user linked two devices; creating the connection is up to the caller.
    ConnectionRequested { from: DeviceId, to: DeviceId },
    /// Distance of a finished measurement, in diagram units.
    Measured { distance: f64 },
}

impl Outcome {
    /// Whether the diagram itself changed (and history should capture it).
    pub fn mutates_diagram(&self) -> bool {
        matches!(
            self,
            Outcome::DiagramChanged | Outcome::RoomCreated(_) | Outcome::WallCreated(_)
        )
    }
}

/// Owns the current [`Mode`] and dispatches pointer events to it.
#[derive(Debug, Clone, Default)]
pub struct InteractionHandler {
    mode: Mode,
}

impl InteractionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    fn enter(&mut self, mode: Mode) {
        log::debug!("Interaction: {} -> {}", self.mode.name(), mode.name());
        self.mode = mode;
    }

    /// Abort any gesture and drop the selection box. Always returns to idle.
    pub fn cancel(&mut self, canvas: &mut Canvas) {
        if !self.mode.is_idle() {
            log::debug!("Interaction: {} cancelled", self.mode.name());
        }
        self.mode = Mode::Idle;
        canvas.selection.selection_box = None;
    }

    /// Handle a press (pointer down).
    pub fn handle_pointer_down(&mut self, canvas: &mut Canvas, input: &PointerInput) -> Outcome {
        // a press without a release in between: drop the stale gesture
        if !self.mode.is_idle() {
            self.cancel(canvas);
        }

        let screen = input.position;
        match input.button {
            MouseButton::Left => {}
            MouseButton::Middle => {
                self.enter(Mode::Panning {
                    origin: screen.to_vec2() - canvas.viewport.pan,
                    press: None,
                });
                return Outcome::None;
            }
            MouseButton::Right => return Outcome::None,
        }

        let point = canvas.diagram_point(screen);
        let target = input.target.clone().unwrap_or_else(|| canvas.hit_test(screen));

        match canvas.tool {
            ToolKind::Wall | ToolKind::Room => self.begin_drawing(canvas, point),
            ToolKind::Measure => {
                self.enter(Mode::Measuring { start: point, current: point });
                Outcome::None
            }
            ToolKind::Connect => match target {
                HitTarget::Device(id) if canvas.diagram.device(&id).is_some() => {
                    self.enter(Mode::Connecting { from: id, cursor: point });
                    Outcome::None
                }
                other => self.press_select(canvas, other, input, point),
            },
            ToolKind::Select => self.press_select(canvas, target, input, point),
        }
    }

    fn begin_drawing(&mut self, canvas: &Canvas, point: Point) -> Outcome {
        if !canvas.tool.requires_floor() || canvas.view != ViewKind::Physical {
            return Outcome::None;
        }
        let Some(active) = canvas.active_floor.clone() else {
            return Outcome::None;
        };
        let Some(origin) = canvas.active_building_origin() else {
            return Outcome::None;
        };
        if canvas.diagram.floor(&active.building_id, active.floor).is_none() {
            return Outcome::None;
        }

        let local = snap_if(
            point - origin.to_vec2(),
            canvas.config.snap_to_grid,
            canvas.grid_size(),
        );
        let gesture = DrawGesture {
            building_id: active.building_id,
            floor: active.floor,
            start: local,
            current: local,
        };
        match canvas.tool {
            ToolKind::Wall => self.enter(Mode::DrawingWall(gesture)),
            _ => self.enter(Mode::DrawingRoom(gesture)),
        }
        Outcome::None
    }

    fn press_select(&mut self, canvas: &mut Canvas, target: HitTarget, input: &PointerInput, point: Point) -> Outcome {
        let screen = input.position;
        match target {
            HitTarget::Background => {
                if input.modifiers.structural() {
                    canvas.selection.selection_box = Some(SelectionBox::new(point));
                    self.enter(Mode::BoxSelecting);
                } else {
                    self.enter(Mode::Panning {
                        origin: screen.to_vec2() - canvas.viewport.pan,
                        press: Some(PressTracker::new(screen, canvas.config.drag_threshold)),
                    });
                }
                Outcome::None
            }
            HitTarget::Device(id) => {
                let Some(locked) = canvas.diagram.device(&id).map(|d| d.locked) else {
                    return Outcome::None;
                };
                if input.modifiers.shift {
                    canvas.selection.toggle_device(&id);
                    return Outcome::SelectionChanged;
                }
                if !canvas.selection.is_device_selected(&id) {
                    canvas.selection.select_device(id.clone());
                }
                if locked {
                    return Outcome::SelectionChanged;
                }
                let group = canvas.selection.devices.len() > 1 && canvas.selection.is_device_selected(&id);
                self.enter(Mode::DraggingDevice {
                    device: id,
                    group,
                    moved: false,
                });
                Outcome::SelectionChanged
            }
            HitTarget::Connection(id) => {
                canvas.selection.select_connection(id);
                Outcome::SelectionChanged
            }
            HitTarget::Wall(id) => {
                canvas.selection.select_wall(id);
                Outcome::SelectionChanged
            }
            HitTarget::RoomHandle { room, handle } => {
                let Some(start) = canvas.diagram.room(&room).map(RoomGeometry::from) else {
                    return Outcome::None;
                };
                let Some(building_size) = self.room_building_size(canvas, &room) else {
                    return Outcome::None;
                };
                canvas.selection.select_room(room.clone(), false);
                self.enter(Mode::ResizingRoom(RoomResize {
                    room_id: room,
                    handle,
                    start_pointer: point,
                    start,
                    building_size,
                }));
                Outcome::SelectionChanged
            }
            HitTarget::Room(room) => self.press_room(canvas, room, input.modifiers.shift, point),
            HitTarget::Building(building_id) => {
                let Some(building) = canvas.diagram.building(&building_id) else {
                    return Outcome::None;
                };
                let device_origins = building_device_origins(&canvas.diagram, building);
                let anchor = building.origin();
                self.enter(Mode::DraggingBuilding(BuildingDrag {
                    building_id,
                    anchor,
                    start_pointer: point,
                    device_origins,
                }));
                Outcome::None
            }
        }
    }

    fn room_building_size(&self, canvas: &Canvas, room: &str) -> Option<Size> {
        let location = canvas.diagram.room_location(room)?;
        canvas.diagram.building(&location.building_id).map(|b| b.size())
    }

    /// Select a room and start moving every selected room on its floor.
    fn press_room(&mut self, canvas: &mut Canvas, room: RoomId, additive: bool, point: Point) -> Outcome {
        let Some(location) = canvas.diagram.room_location(&room) else {
            return Outcome::None;
        };
        let Some(building) = canvas.diagram.building(&location.building_id) else {
            return Outcome::None;
        };
        let building_size = building.size();

        // pressing an already selected room keeps the group together
        let keep = additive || canvas.selection.rooms.contains(&room);
        canvas.selection.select_room(room.clone(), keep);

        let origins: BTreeMap<RoomId, RoomGeometry> = building
            .floors
            .get(location.floor)
            .map(|floor| {
                floor
                    .rooms
                    .iter()
                    .filter(|r| canvas.selection.rooms.contains(&r.id))
                    .map(|r| (r.id.clone(), RoomGeometry::from(r)))
                    .collect()
            })
            .unwrap_or_default();

        self.enter(Mode::MovingRooms(RoomMove {
            building_size,
            start_pointer: point,
            origins,
        }));
        Outcome::SelectionChanged
    }

    /// Handle pointer motion.
    pub fn handle_pointer_move(&mut self, canvas: &mut Canvas, input: &PointerInput) -> Outcome {
        let screen = input.position;
        let point = canvas.diagram_point(screen);
        let snap = canvas.config.snap_to_grid;
        let grid = canvas.grid_size();
        let view = canvas.view;
        let snapped_delta = |from: Point| {
            let delta = point - from;
            if snap {
                Vec2::new(snap_value(delta.x, grid), snap_value(delta.y, grid))
            } else {
                delta
            }
        };

        match &mut self.mode {
            Mode::Idle => Outcome::None,
            Mode::Panning { origin, press } => {
                if let Some(press) = press {
                    press.update(screen);
                }
                canvas.viewport.pan_to(screen.to_vec2() - *origin);
                Outcome::ViewChanged
            }
            Mode::DraggingDevice { device, group, moved } => {
                let result = if *group {
                    move_device_group(
                        &mut canvas.diagram,
                        device,
                        &canvas.selection.devices,
                        point,
                        view,
                        snap,
                        grid,
                    )
                    .map(|_| ())
                } else {
                    move_device(&mut canvas.diagram, device, point, view, snap, grid).map(|_| ())
                };
                if result.is_none() {
                    return Outcome::None;
                }
                *moved = true;
                Outcome::DiagramChanged
            }
            Mode::BoxSelecting => {
                if let Some(selection_box) = canvas.selection.selection_box.as_mut() {
                    selection_box.end = point;
                }
                Outcome::GestureUpdated
            }
            Mode::DrawingWall(gesture) | Mode::DrawingRoom(gesture) => {
                let Some(origin) = canvas.diagram.building(&gesture.building_id).map(|b| b.origin()) else {
                    return Outcome::None;
                };
                gesture.current = snap_if(point - origin.to_vec2(), snap, grid);
                Outcome::GestureUpdated
            }
            Mode::ResizingRoom(resize) => {
                let delta = snapped_delta(resize.start_pointer);
                let next = if resize.handle == ResizeHandle::Center {
                    translate_room_clamped(resize.start, delta, resize.building_size)
                } else {
                    let resized = resize_room(resize.start, resize.handle, delta, canvas.config.min_room_size);
                    clamp_room_to_building(resized, resize.building_size)
                };
                let Some(room) = canvas.diagram.room_mut(&resize.room_id) else {
                    return Outcome::None;
                };
                next.apply_to(room);
                Outcome::DiagramChanged
            }
            Mode::MovingRooms(movement) => {
                let delta = snapped_delta(movement.start_pointer);
                for (id, origin) in &movement.origins {
                    if let Some(room) = canvas.diagram.room_mut(id) {
                        translate_room_clamped(*origin, delta, movement.building_size).apply_to(room);
                    }
                }
                Outcome::DiagramChanged
            }
            Mode::DraggingBuilding(drag) => {
                let delta = snapped_delta(drag.start_pointer);
                let new_anchor = drag.anchor + delta;
                if move_building(&mut canvas.diagram, &drag.building_id, drag.anchor, new_anchor, &drag.device_origins) {
                    Outcome::DiagramChanged
                } else {
                    Outcome::None
                }
            }
            Mode::Connecting { cursor, .. } => {
                *cursor = point;
                Outcome::GestureUpdated
            }
            Mode::Measuring { current, .. } => {
                *current = point;
                Outcome::GestureUpdated
            }
        }
    }

    /// Handle a release (pointer up): finish the gesture and return to idle.
    pub fn handle_pointer_up(&mut self, canvas: &mut Canvas, ids: &mut dyn IdGenerator, input: &PointerInput) -> Outcome {
        let screen = input.position;
        let point = canvas.diagram_point(screen);
        let mode = std::mem::take(&mut self.mode);
        if !mode.is_idle() {
            log::debug!("Interaction: {} -> idle", mode.name());
        }

        match mode {
            Mode::Idle => Outcome::None,
            Mode::Panning { press, .. } => match press {
                Some(press) if press.is_click(screen) => {
                    canvas.selection.clear();
                    Outcome::SelectionChanged
                }
                _ => Outcome::None,
            },
            Mode::DraggingDevice { moved, .. } => {
                if moved {
                    Outcome::DiagramChanged
                } else {
                    Outcome::None
                }
            }
            Mode::BoxSelecting => {
                let Some(mut selection_box) = canvas.selection.selection_box.take() else {
                    return Outcome::None;
                };
                selection_box.end = point;
                let inside = devices_in_rect(&canvas.diagram, selection_box.to_rect(), canvas.view);
                canvas.selection.set_devices(inside);
                Outcome::SelectionChanged
            }
            Mode::DrawingRoom(gesture) => finish_room(canvas, ids, &gesture),
            Mode::DrawingWall(gesture) => finish_wall(canvas, ids, &gesture),
            Mode::ResizingRoom(_) | Mode::MovingRooms(_) | Mode::DraggingBuilding(_) => Outcome::None,
            Mode::Connecting { from, .. } => {
                let target = input.target.clone().unwrap_or_else(|| canvas.hit_test(screen));
                match target {
                    HitTarget::Device(to) if to != from && canvas.diagram.device(&to).is_some() => {
                        Outcome::ConnectionRequested { from, to }
                    }
                    _ => Outcome::None,
                }
            }
            Mode::Measuring { start, .. } => Outcome::Measured {
                distance: start.distance(point),
            },
        }
    }
}

/// Create the drawn room if it is larger than the minimum in both dimensions.
fn finish_room(canvas: &mut Canvas, ids: &mut dyn IdGenerator, gesture: &DrawGesture) -> Outcome {
    let rect = gesture.rect();
    let min = canvas.config.min_room_size;
    if rect.width() <= min || rect.height() <= min {
        log::debug!("Room {}x{} below minimum, discarded", rect.width(), rect.height());
        return Outcome::None;
    }
    let Some(floor) = canvas.diagram.floor_mut(&gesture.building_id, gesture.floor) else {
        return Outcome::None;
    };
    let id = ids.next_id("room");
    floor.rooms.push(Room::new(id.clone(), rect.x0, rect.y0, rect.width(), rect.height()));
    Outcome::RoomCreated(id)
}

/// Create the drawn wall if it is longer than the minimum.
fn finish_wall(canvas: &mut Canvas, ids: &mut dyn IdGenerator, gesture: &DrawGesture) -> Outcome {
    let min = canvas.config.min_room_size;
    let mut wall = Wall::new(String::new(), gesture.start, gesture.current);
    if wall.length() <= min {
        log::debug!("Wall shorter than {min}, discarded");
        return Outcome::None;
    }
    let Some(floor) = canvas.diagram.floor_mut(&gesture.building_id, gesture.floor) else {
        return Outcome::None;
    };
    wall.id = ids.next_id("wall");
    let id = wall.id.clone();
    floor.walls.push(wall);
    Outcome::WallCreated(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::ActiveFloor;
    use crate::config::EngineConfig;
    use crate::id::SequentialIdGenerator;
    use crate::input::Modifiers;
    use crate::model::{Building, Device, DeviceKind, Diagram};

    fn logical_canvas() -> Canvas {
        let mut diagram = Diagram::new();
        diagram.add_device(Device::new("a", DeviceKind::Switch, 100.0, 100.0));
        diagram.add_device(Device::new("b", DeviceKind::Router, 300.0, 100.0));
        diagram.add_device(Device::new("c", DeviceKind::Server, 500.0, 500.0));
        Canvas::new(diagram, EngineConfig::default())
    }

    /// Building "hq" at (100, 100), 400x300, with room r1 {10,10,50,50}.
    fn physical_canvas() -> Canvas {
        let mut diagram = Diagram::new();
        let mut building = Building::new("hq", 100.0, 100.0, 400.0, 300.0);
        building.floors[0].rooms.push(Room::new("r1", 10.0, 10.0, 50.0, 50.0));
        diagram.add_building(building);
        let mut placed = Device::new("d", DeviceKind::AccessPoint, 0.0, 0.0);
        placed.physical_x = 150.0;
        placed.physical_y = 150.0;
        placed.building_id = Some("hq".into());
        placed.floor = Some(0);
        diagram.add_device(placed);

        let mut canvas = Canvas::new(diagram, EngineConfig::default());
        canvas.view = ViewKind::Physical;
        canvas.active_floor = Some(ActiveFloor {
            building_id: "hq".into(),
            floor: 0,
        });
        canvas
    }

    fn ctrl() -> Modifiers {
        Modifiers {
            ctrl: true,
            ..Default::default()
        }
    }

    fn gesture(
        handler: &mut InteractionHandler,
        canvas: &mut Canvas,
        down: PointerInput,
        moves: &[(f64, f64)],
        up: PointerInput,
    ) -> Outcome {
        let mut ids = SequentialIdGenerator::new();
        handler.handle_pointer_down(canvas, &down);
        for (x, y) in moves {
            handler.handle_pointer_move(canvas, &PointerInput::at(*x, *y));
        }
        handler.handle_pointer_up(canvas, &mut ids, &up)
    }

    #[test]
    fn test_background_click_deselects() {
        let mut canvas = logical_canvas();
        let mut handler = InteractionHandler::new();
        canvas.selection.select_device("a");

        let outcome = gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(400.0, 400.0),
            &[(402.0, 401.0)],
            PointerInput::at(402.0, 401.0),
        );
        assert_eq!(outcome, Outcome::SelectionChanged);
        assert!(canvas.selection.is_empty());
        assert!(handler.mode().is_idle());
    }

    #[test]
    fn test_background_drag_pans_and_keeps_selection() {
        let mut canvas = logical_canvas();
        let mut handler = InteractionHandler::new();
        canvas.selection.select_device("a");

        handler.handle_pointer_down(&mut canvas, &PointerInput::at(400.0, 400.0));
        assert_eq!(handler.mode().name(), "panning");
        handler.handle_pointer_move(&mut canvas, &PointerInput::at(450.0, 400.0));
        // back near the press point: still a drag, not a click
        handler.handle_pointer_move(&mut canvas, &PointerInput::at(401.0, 400.0));
        let mut ids = SequentialIdGenerator::new();
        let outcome = handler.handle_pointer_up(&mut canvas, &mut ids, &PointerInput::at(401.0, 400.0));

        assert_eq!(outcome, Outcome::None);
        assert!(canvas.selection.is_device_selected("a"));
        assert_eq!(canvas.viewport.pan, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_middle_button_pans_anywhere() {
        let mut canvas = logical_canvas();
        let mut handler = InteractionHandler::new();
        let down = PointerInput {
            button: MouseButton::Middle,
            ..PointerInput::at(100.0, 100.0)
        };
        handler.handle_pointer_down(&mut canvas, &down);
        assert_eq!(handler.mode().name(), "panning");
        assert_eq!(
            handler.handle_pointer_move(&mut canvas, &PointerInput::at(130.0, 90.0)),
            Outcome::ViewChanged
        );
        assert_eq!(canvas.viewport.pan, Vec2::new(30.0, -10.0));
    }

    #[test]
    fn test_box_select() {
        let mut canvas = logical_canvas();
        let mut handler = InteractionHandler::new();

        handler.handle_pointer_down(&mut canvas, &PointerInput::at(50.0, 50.0).with_modifiers(ctrl()));
        assert_eq!(*handler.mode(), Mode::BoxSelecting);
        assert!(canvas.selection.selection_box.is_some());
        handler.handle_pointer_move(&mut canvas, &PointerInput::at(320.0, 150.0));
        let mut ids = SequentialIdGenerator::new();
        let outcome = handler.handle_pointer_up(&mut canvas, &mut ids, &PointerInput::at(320.0, 150.0));

        assert_eq!(outcome, Outcome::SelectionChanged);
        let selected: Vec<&str> = canvas.selection.devices.iter().map(String::as_str).collect();
        assert_eq!(selected, vec!["a", "b"]);
        assert!(canvas.selection.selection_box.is_none());
    }

    #[test]
    fn test_device_drag_snaps() {
        let mut canvas = logical_canvas();
        let mut handler = InteractionHandler::new();
        let outcome = gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(100.0, 100.0).on(HitTarget::Device("a".into())),
            &[(113.0, 128.0)],
            PointerInput::at(113.0, 128.0),
        );
        assert_eq!(outcome, Outcome::DiagramChanged);
        assert_eq!(canvas.diagram.device_position("a", ViewKind::Logical), Some(Point::new(120.0, 120.0)));
        assert!(canvas.selection.is_device_selected("a"));
    }

    #[test]
    fn test_press_without_move_is_not_a_change() {
        let mut canvas = logical_canvas();
        let mut handler = InteractionHandler::new();
        let outcome = gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(100.0, 100.0).on(HitTarget::Device("a".into())),
            &[],
            PointerInput::at(100.0, 100.0),
        );
        assert_eq!(outcome, Outcome::None);
    }

    #[test]
    fn test_locked_device_is_selected_not_dragged() {
        let mut canvas = logical_canvas();
        if let Some(device) = canvas.diagram.device_mut("a") {
            device.locked = true;
        }
        let mut handler = InteractionHandler::new();
        let down = PointerInput::at(100.0, 100.0).on(HitTarget::Device("a".into()));
        assert_eq!(handler.handle_pointer_down(&mut canvas, &down), Outcome::SelectionChanged);
        assert!(handler.mode().is_idle());
        assert!(canvas.selection.is_device_selected("a"));
    }

    #[test]
    fn test_group_drag_keeps_offsets() {
        let mut canvas = logical_canvas();
        let mut handler = InteractionHandler::new();
        canvas.selection.set_devices(["a".to_string(), "b".to_string()].into());

        gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(100.0, 100.0).on(HitTarget::Device("a".into())),
            &[(140.0, 120.0)],
            PointerInput::at(140.0, 120.0),
        );
        assert_eq!(canvas.diagram.device_position("a", ViewKind::Logical), Some(Point::new(140.0, 120.0)));
        assert_eq!(canvas.diagram.device_position("b", ViewKind::Logical), Some(Point::new(340.0, 120.0)));
        assert_eq!(canvas.diagram.device_position("c", ViewKind::Logical), Some(Point::new(500.0, 500.0)));
    }

    #[test]
    fn test_shift_click_toggles_device() {
        let mut canvas = logical_canvas();
        let mut handler = InteractionHandler::new();
        canvas.selection.select_device("a");
        let shift = Modifiers {
            shift: true,
            ..Default::default()
        };
        let down = PointerInput::at(300.0, 100.0).on(HitTarget::Device("b".into())).with_modifiers(shift);
        handler.handle_pointer_down(&mut canvas, &down);
        assert_eq!(canvas.selection.devices.len(), 2);
        handler.handle_pointer_down(&mut canvas, &down);
        assert!(!canvas.selection.is_device_selected("b"));
    }

    #[test]
    fn test_room_below_minimum_is_discarded() {
        let mut canvas = physical_canvas();
        canvas.tool = ToolKind::Room;
        let mut handler = InteractionHandler::new();
        let outcome = gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(110.0, 110.0),
            &[(124.0, 124.0)],
            PointerInput::at(124.0, 124.0),
        );
        assert_eq!(outcome, Outcome::None);
        assert_eq!(canvas.diagram.floor("hq", 0).map(|f| f.rooms.len()), Some(1));
    }

    #[test]
    fn test_room_drawn_relative_to_building() {
        let mut canvas = physical_canvas();
        canvas.tool = ToolKind::Room;
        let mut handler = InteractionHandler::new();
        let outcome = gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(210.0, 210.0),
            &[(260.0, 250.0)],
            PointerInput::at(260.0, 250.0),
        );
        assert_eq!(outcome, Outcome::RoomCreated("room-1".into()));
        let room = canvas.diagram.room("room-1").unwrap();
        assert_eq!((room.x, room.y, room.width, room.height), (110.0, 110.0, 50.0, 40.0));
    }

    #[test]
    fn test_wall_needs_length() {
        let mut canvas = physical_canvas();
        canvas.tool = ToolKind::Wall;
        let mut handler = InteractionHandler::new();
        let short = gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(110.0, 110.0),
            &[(110.0, 124.0)],
            PointerInput::at(110.0, 124.0),
        );
        assert_eq!(short, Outcome::None);

        let long = gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(110.0, 110.0),
            &[(110.0, 200.0)],
            PointerInput::at(110.0, 200.0),
        );
        assert_eq!(long, Outcome::WallCreated("wall-1".into()));
        let wall = &canvas.diagram.floor("hq", 0).unwrap().walls[0];
        assert_eq!((wall.x1, wall.y1, wall.x2, wall.y2), (10.0, 10.0, 10.0, 100.0));
    }

    #[test]
    fn test_drawing_without_active_floor_is_ignored() {
        let mut canvas = physical_canvas();
        canvas.active_floor = None;
        canvas.tool = ToolKind::Room;
        let mut handler = InteractionHandler::new();
        handler.handle_pointer_down(&mut canvas, &PointerInput::at(110.0, 110.0));
        assert!(handler.mode().is_idle());
    }

    #[test]
    fn test_resize_se_clamps_height() {
        let mut canvas = physical_canvas();
        canvas.config.snap_to_grid = false;
        let mut handler = InteractionHandler::new();
        let handle = HitTarget::RoomHandle {
            room: "r1".into(),
            handle: ResizeHandle::Se,
        };
        gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(160.0, 160.0).on(handle),
            &[(165.0, 100.0)],
            PointerInput::at(165.0, 100.0),
        );
        let room = canvas.diagram.room("r1").unwrap();
        assert_eq!((room.x, room.y, room.width, room.height), (10.0, 10.0, 55.0, 20.0));
    }

    #[test]
    fn test_room_move_stays_in_building() {
        let mut canvas = physical_canvas();
        let mut handler = InteractionHandler::new();
        gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(130.0, 130.0).on(HitTarget::Room("r1".into())),
            &[(1000.0, 130.0)],
            PointerInput::at(1000.0, 130.0),
        );
        let room = canvas.diagram.room("r1").unwrap();
        assert_eq!((room.x, room.y), (350.0, 10.0));
        assert!(canvas.selection.rooms.contains("r1"));
    }

    #[test]
    fn test_building_drag_carries_devices() {
        let mut canvas = physical_canvas();
        let mut handler = InteractionHandler::new();
        let outcome = gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(300.0, 300.0).on(HitTarget::Building("hq".into())),
            &[(320.0, 310.0), (340.0, 320.0)],
            PointerInput::at(340.0, 320.0),
        );
        assert_eq!(outcome, Outcome::None);
        let building = canvas.diagram.building("hq").unwrap();
        assert_eq!(building.origin(), Point::new(140.0, 120.0));
        assert_eq!(
            canvas.diagram.device_position("d", ViewKind::Physical),
            Some(Point::new(190.0, 170.0))
        );
        // room coordinates are building-relative
        let room = canvas.diagram.room("r1").unwrap();
        assert_eq!((room.x, room.y), (10.0, 10.0));
    }

    #[test]
    fn test_click_on_empty_floor_deselects() {
        let mut canvas = physical_canvas();
        let mut handler = InteractionHandler::new();
        canvas.selection.select_device("d");

        handler.handle_pointer_down(&mut canvas, &PointerInput::at(350.0, 300.0));
        assert_eq!(handler.mode().name(), "panning");
        let mut ids = SequentialIdGenerator::new();
        let outcome = handler.handle_pointer_up(&mut canvas, &mut ids, &PointerInput::at(350.0, 300.0));

        assert_eq!(outcome, Outcome::SelectionChanged);
        assert!(canvas.selection.is_empty());
    }

    #[test]
    fn test_ctrl_drag_on_floor_box_selects() {
        let mut canvas = physical_canvas();
        let mut handler = InteractionHandler::new();

        handler.handle_pointer_down(&mut canvas, &PointerInput::at(350.0, 300.0).with_modifiers(ctrl()));
        assert_eq!(*handler.mode(), Mode::BoxSelecting);
        handler.handle_pointer_move(&mut canvas, &PointerInput::at(120.0, 120.0));
        let mut ids = SequentialIdGenerator::new();
        let outcome = handler.handle_pointer_up(&mut canvas, &mut ids, &PointerInput::at(120.0, 120.0));

        assert_eq!(outcome, Outcome::SelectionChanged);
        assert!(canvas.selection.is_device_selected("d"));
        assert_eq!(canvas.diagram.building("hq").unwrap().origin(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_building_outline_press_drags_building() {
        let mut canvas = physical_canvas();
        let mut handler = InteractionHandler::new();
        handler.handle_pointer_down(&mut canvas, &PointerInput::at(497.0, 300.0));
        assert_eq!(handler.mode().name(), "dragging-building");
    }

    #[test]
    fn test_resize_stays_inside_building() {
        let mut canvas = physical_canvas();
        canvas.config.snap_to_grid = false;
        let mut handler = InteractionHandler::new();
        let handle = HitTarget::RoomHandle {
            room: "r1".into(),
            handle: ResizeHandle::Se,
        };
        gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(160.0, 160.0).on(handle),
            &[(1000.0, 1000.0)],
            PointerInput::at(1000.0, 1000.0),
        );
        let room = canvas.diagram.room("r1").unwrap();
        assert_eq!((room.x, room.y, room.width, room.height), (10.0, 10.0, 390.0, 290.0));
    }

    #[test]
    fn test_connect_tool_requests_connection() {
        let mut canvas = logical_canvas();
        canvas.tool = ToolKind::Connect;
        let mut handler = InteractionHandler::new();
        let outcome = gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(100.0, 100.0).on(HitTarget::Device("a".into())),
            &[(200.0, 100.0)],
            PointerInput::at(300.0, 100.0).on(HitTarget::Device("b".into())),
        );
        assert_eq!(
            outcome,
            Outcome::ConnectionRequested {
                from: "a".into(),
                to: "b".into()
            }
        );
        assert_eq!(canvas.diagram.device_position("a", ViewKind::Logical), Some(Point::new(100.0, 100.0)));

        let onto_self = gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(100.0, 100.0).on(HitTarget::Device("a".into())),
            &[],
            PointerInput::at(100.0, 100.0).on(HitTarget::Device("a".into())),
        );
        assert_eq!(onto_self, Outcome::None);
    }

    #[test]
    fn test_measure_reports_distance() {
        let mut canvas = logical_canvas();
        canvas.tool = ToolKind::Measure;
        let mut handler = InteractionHandler::new();
        let outcome = gesture(
            &mut handler,
            &mut canvas,
            PointerInput::at(0.0, 0.0),
            &[(30.0, 40.0)],
            PointerInput::at(30.0, 40.0),
        );
        assert_eq!(outcome, Outcome::Measured { distance: 50.0 });
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut canvas = logical_canvas();
        let mut handler = InteractionHandler::new();
        handler.handle_pointer_down(&mut canvas, &PointerInput::at(50.0, 50.0).with_modifiers(ctrl()));
        handler.handle_pointer_move(&mut canvas, &PointerInput::at(320.0, 150.0));
        handler.cancel(&mut canvas);

        assert!(handler.mode().is_idle());
        assert!(canvas.selection.selection_box.is_none());
        assert!(canvas.selection.devices.is_empty());

        let mut ids = SequentialIdGenerator::new();
        let outcome = handler.handle_pointer_up(&mut canvas, &mut ids, &PointerInput::at(320.0, 150.0));
        assert_eq!(outcome, Outcome::None);
    }

    #[test]
    fn test_outcome_mutation_flags() {
        assert!(Outcome::DiagramChanged.mutates_diagram());
        assert!(Outcome::RoomCreated("room-1".into()).mutates_diagram());
        assert!(!Outcome::ViewChanged.mutates_diagram());
        assert!(!Outcome::SelectionChanged.mutates_diagram());
    }
}
