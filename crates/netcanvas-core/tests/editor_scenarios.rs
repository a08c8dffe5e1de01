//! End-to-end editing sessions driven through the `Editor`.

use kurbo::Point;
use netcanvas_core::{
    ActiveFloor, Building, Connection, Device, DeviceKind, Diagram, Editor, EngineConfig, HitTarget, Modifiers,
    Outcome, PathFailure, PathResult, PointerInput, ResizeHandle, Room, SequentialIdGenerator, ToolKind, ViewKind,
};
use pretty_assertions::assert_eq;

fn office() -> Diagram {
    let mut diagram = Diagram::new();
    diagram.add_device(Device::new("wan", DeviceKind::Internet, 40.0, 40.0));
    diagram.add_device(Device::new("core", DeviceKind::Router, 200.0, 40.0));
    diagram.add_device(Device::new("sw1", DeviceKind::Switch, 200.0, 200.0));
    diagram.add_device(Device::new("sw2", DeviceKind::Switch, 400.0, 200.0));
    let mut ap = Device::new("ap", DeviceKind::AccessPoint, 400.0, 400.0);
    ap.physical_x = 620.0;
    ap.physical_y = 540.0;
    ap.building_id = Some("hq".into());
    ap.floor = Some(0);
    diagram.add_device(ap);

    diagram.add_connection(Connection::new("l1", "wan", "core"));
    diagram.add_connection(Connection::new("l2", "core", "sw1"));
    diagram.add_connection(Connection::new("l3", "sw1", "sw2"));
    diagram.add_connection(Connection::new("l4", "sw2", "ap"));

    let mut hq = Building::new("hq", 500.0, 500.0, 400.0, 300.0);
    hq.floors[0].rooms.push(Room::new("lab", 20.0, 20.0, 100.0, 80.0));
    diagram.add_building(hq);
    diagram
}

fn editor() -> Editor {
    Editor::new(office(), EngineConfig::default())
        .unwrap()
        .with_id_generator(SequentialIdGenerator::new())
}

fn floor_plan(editor: &mut Editor) {
    editor.set_view(ViewKind::Physical);
    assert!(editor.set_active_floor(Some(ActiveFloor {
        building_id: "hq".into(),
        floor: 0,
    })));
}

fn click(editor: &mut Editor, x: f64, y: f64) {
    editor.on_pointer_down(&PointerInput::at(x, y));
    editor.on_pointer_up(&PointerInput::at(x, y));
}

fn drag(editor: &mut Editor, down: PointerInput, to: (f64, f64)) -> Outcome {
    editor.on_pointer_down(&down);
    editor.on_pointer_move(&PointerInput::at(to.0, to.1));
    editor.on_pointer_up(&PointerInput::at(to.0, to.1))
}

fn logical(editor: &Editor, id: &str) -> Point {
    editor.diagram().device_position(id, ViewKind::Logical).unwrap()
}

#[test]
fn box_select_then_group_drag() {
    let mut editor = editor();
    let ctrl = Modifiers {
        ctrl: true,
        ..Default::default()
    };
    let outcome = drag(&mut editor, PointerInput::at(150.0, 150.0).with_modifiers(ctrl), (450.0, 250.0));
    assert_eq!(outcome, Outcome::SelectionChanged);

    let selected: Vec<&str> = editor.selection().devices.iter().map(String::as_str).collect();
    assert_eq!(selected, vec!["sw1", "sw2"]);

    // grab sw1 a few pixels off its centre
    drag(&mut editor, PointerInput::at(203.0, 198.0), (263.0, 238.0));
    assert_eq!(logical(&editor, "sw1"), Point::new(260.0, 240.0));
    assert_eq!(logical(&editor, "sw2"), Point::new(460.0, 240.0));
    assert_eq!(logical(&editor, "core"), Point::new(200.0, 40.0));
}

#[test]
fn click_on_background_clears_selection() {
    let mut editor = editor();
    click(&mut editor, 200.0, 200.0);
    assert!(editor.selection().is_device_selected("sw1"));

    click(&mut editor, 700.0, 100.0);
    assert!(editor.selection().is_empty());
}

#[test]
fn pan_beyond_threshold_keeps_selection() {
    let mut editor = editor();
    click(&mut editor, 200.0, 200.0);

    let outcome = drag(&mut editor, PointerInput::at(700.0, 100.0), (760.0, 130.0));
    assert_eq!(outcome, Outcome::None);
    assert!(editor.selection().is_device_selected("sw1"));
    assert_eq!(editor.viewport().pan, kurbo::Vec2::new(60.0, 30.0));
    assert_eq!(editor.diagram_point(Point::new(260.0, 230.0)), Point::new(200.0, 200.0));
}

#[test]
fn room_drawing_respects_minimum() {
    let mut editor = editor();
    floor_plan(&mut editor);
    editor.set_tool(ToolKind::Room);

    let tiny = drag(&mut editor, PointerInput::at(700.0, 700.0), (715.0, 710.0));
    assert_eq!(tiny, Outcome::None);

    let room = drag(&mut editor, PointerInput::at(700.0, 700.0), (780.0, 760.0));
    assert_eq!(room, Outcome::RoomCreated("room-1".into()));
    let created = editor.diagram().room("room-1").unwrap();
    assert_eq!((created.x, created.y, created.width, created.height), (200.0, 200.0, 80.0, 60.0));
}

#[test]
fn resize_handle_clamps_to_minimum() {
    let mut editor = editor();
    floor_plan(&mut editor);
    click(&mut editor, 550.0, 550.0);
    assert!(editor.selection().rooms.contains("lab"));

    // lab spans building-relative 20..120 x 20..100; its se handle is at (620, 600) on screen
    let handle = PointerInput::at(620.0, 600.0).on(HitTarget::RoomHandle {
        room: "lab".into(),
        handle: ResizeHandle::Se,
    });
    drag(&mut editor, handle, (640.0, 500.0));
    let lab = editor.diagram().room("lab").unwrap();
    assert_eq!((lab.x, lab.y, lab.width, lab.height), (20.0, 20.0, 120.0, 20.0));
}

#[test]
fn building_drag_moves_devices_and_undoes_in_one_step() {
    let mut editor = editor();
    floor_plan(&mut editor);

    // grab the right-hand outline
    editor.on_pointer_down(&PointerInput::at(897.0, 750.0));
    assert_eq!(editor.mode().name(), "dragging-building");
    for step in 1..=10 {
        let offset = f64::from(step) * 10.0;
        editor.on_pointer_move(&PointerInput::at(897.0 + offset, 750.0 + offset / 2.0));
    }
    editor.on_pointer_up(&PointerInput::at(997.0, 800.0));

    let hq = editor.diagram().building("hq").unwrap();
    assert_eq!(hq.origin(), Point::new(600.0, 550.0));
    assert_eq!(
        editor.diagram().device_position("ap", ViewKind::Physical),
        Some(Point::new(720.0, 590.0))
    );

    // the whole drag was a single burst
    assert!(editor.undo().unwrap());
    assert_eq!(editor.diagram().building("hq").unwrap().origin(), Point::new(500.0, 500.0));
    assert_eq!(
        editor.diagram().device_position("ap", ViewKind::Physical),
        Some(Point::new(620.0, 540.0))
    );
    assert!(!editor.undo().unwrap());

    assert!(editor.redo().unwrap());
    assert_eq!(editor.diagram().building("hq").unwrap().origin(), Point::new(600.0, 550.0));
}

#[test]
fn empty_floor_space_behaves_like_background() {
    let mut editor = editor();
    floor_plan(&mut editor);
    editor.on_pointer_down(&PointerInput::at(620.0, 540.0));
    editor.on_pointer_up(&PointerInput::at(620.0, 540.0));
    assert!(editor.selection().is_device_selected("ap"));

    click(&mut editor, 700.0, 650.0);
    assert!(editor.selection().is_empty());

    let ctrl = Modifiers {
        ctrl: true,
        ..Default::default()
    };
    let outcome = drag(&mut editor, PointerInput::at(700.0, 650.0).with_modifiers(ctrl), (600.0, 520.0));
    assert_eq!(outcome, Outcome::SelectionChanged);
    let selected: Vec<&str> = editor.selection().devices.iter().map(String::as_str).collect();
    assert_eq!(selected, vec!["ap"]);
    assert_eq!(editor.diagram().building("hq").unwrap().origin(), Point::new(500.0, 500.0));
}

#[test]
fn new_edit_after_undo_discards_redo() {
    let mut editor = editor();
    drag(&mut editor, PointerInput::at(200.0, 200.0), (300.0, 300.0));
    editor.flush_history().unwrap();
    drag(&mut editor, PointerInput::at(300.0, 300.0), (300.0, 400.0));
    editor.flush_history().unwrap();
    assert_eq!(editor.history().len(), 3);

    editor.undo().unwrap();
    drag(&mut editor, PointerInput::at(300.0, 300.0), (100.0, 300.0));
    editor.flush_history().unwrap();

    assert!(!editor.redo().unwrap());
    assert_eq!(logical(&editor, "sw1"), Point::new(100.0, 300.0));
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn uplink_path_follows_links() {
    let editor = editor();
    match editor.find_path_to_uplink("ap") {
        PathResult::Found { path, uplink_device } => {
            let hops: Vec<&str> = path.iter().map(|s| s.connection_id.as_str()).collect();
            assert_eq!(hops, vec!["l4", "l3", "l2", "l1"]);
            assert_eq!(uplink_device.id, "wan");
        }
        other => panic!("expected a path, got {other:?}"),
    }
    assert_eq!(editor.find_path_to_uplink("wan").failure(), Some(PathFailure::IsUplink));
}
