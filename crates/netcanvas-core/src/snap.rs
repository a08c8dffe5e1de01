//! Grid snapping.

use kurbo::Point;

/// Grid size of the logical view, in diagram units.
pub const LOGICAL_GRID_SIZE: f64 = 20.0;
/// Grid size of the physical (floor plan) view, in diagram units.
pub const PHYSICAL_GRID_SIZE: f64 = 10.0;

/// Round a single coordinate to the nearest multiple of `grid_size`.
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size))
}

/// Snap a point only when snapping is enabled.
pub fn snap_if(point: Point, enabled: bool, grid_size: f64) -> Point {
    if enabled {
        snap_to_grid(point, grid_size)
    } else {
        point
    }
}
