//! Viewport module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom factor the viewport allows by default.
pub const MIN_ZOOM: f64 = 0.15;
/// Largest zoom factor the viewport allows by default.
pub const MAX_ZOOM: f64 = 5.0;

/// Viewport maps between screen pixels and diagram space.
///
/// `screen = diagram * zoom + pan`, so `diagram = (screen - pan) / zoom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Screen-space translation.
    pub pan: Vec2,
    /// Current zoom level.
    pub zoom: f64,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Viewport with custom zoom limits.
    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Transform from diagram space to screen space.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Transform from screen space to diagram space.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Convert a screen point to diagram coordinates.
    pub fn to_diagram_space(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a diagram point to screen coordinates.
    pub fn to_screen_space(&self, diagram_point: Point) -> Point {
        self.transform() * diagram_point
    }

    /// Set the pan offset directly.
    pub fn pan_to(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    /// Set a new zoom level, keeping the diagram point under `screen_point` fixed.
    pub fn zoom_at(&mut self, screen_point: Point, zoom: f64) {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        let anchor = self.to_diagram_space(screen_point);
        self.zoom = new_zoom;
        self.pan = screen_point.to_vec2() - anchor.to_vec2() * new_zoom;
    }

    /// Apply a wheel delta at a screen position.
    ///
    /// Positive deltas (scrolling down) zoom out.
    pub fn apply_wheel(&mut self, screen_point: Point, delta_y: f64, sensitivity: f64) {
        let factor = (1.0 - delta_y * sensitivity).max(f64::EPSILON);
        self.zoom_at(screen_point, self.zoom * factor);
    }

    /// Reset to identity pan and zoom.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Fit the viewport to show the given bounding box.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            self.pan = Vec2::new(
                viewport.width / 2.0 - bounds.center().x,
                viewport.height / 2.0 - bounds.center().y,
            );
            return;
        }

        let padded = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        let bounds_center = bounds.center();
        self.pan = Vec2::new(
            viewport.width / 2.0 - bounds_center.x * self.zoom,
            viewport.height / 2.0 - bounds_center.y * self.zoom,
        );
    }
}
