//! NetCanvas Core Library
//!
//! Canvas interaction engine for network topology diagrams: viewport,
//! pointer-driven editing, selection, undo history and uplink path queries.

pub mod canvas;
pub mod config;
pub mod editor;
pub mod history;
pub mod id;
pub mod input;
pub mod interaction;
pub mod manipulation;
pub mod model;
pub mod path;
pub mod selection;
pub mod snap;
pub mod tools;
pub mod viewport;

pub use canvas::{ActiveFloor, Canvas};
pub use config::{ConfigError, EngineConfig};
pub use editor::Editor;
pub use history::{HistoryError, HistoryManager, Snapshot};
pub use id::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use input::{HitTarget, Modifiers, MouseButton, PointerInput, WheelInput};
pub use interaction::{InteractionHandler, Mode, Outcome};
pub use manipulation::{ResizeHandle, RoomGeometry};
pub use model::{Building, Connection, Device, DeviceKind, Diagram, Floor, Room, ViewKind, Wall};
pub use path::{PathFailure, PathResult, PathSegment, find_path_to_uplink};
pub use selection::SelectionState;
pub use snap::{snap_to_grid, LOGICAL_GRID_SIZE, PHYSICAL_GRID_SIZE};
pub use tools::ToolKind;
pub use viewport::Viewport;
