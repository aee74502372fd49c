//! A 2D camera: a viewport placed in the world with its own placement.
//!
//! Rendering through a camera applies the inverse of the camera's placement
//! transform, so moving the camera right scrolls the world left.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::anchor::Anchor;
use crate::surface::Renderer;
use crate::transform::Transform;

/// Unique identifier for each camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(u64);

impl CameraId {
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        CameraId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value (for debugging/logging).
    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    id: CameraId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub angle: f64,
    pub anchor: Option<Anchor>,
}

impl Camera {
    /// Create a camera covering a `width × height` viewport at the origin.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            id: CameraId::next(),
            x: 0.0,
            y: 0.0,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            anchor: None,
        }
    }

    pub fn id(&self) -> CameraId {
        self.id
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn scale(mut self, sx: f64, sy: f64) -> Self {
        self.scale_x = sx;
        self.scale_y = sy;
        self
    }

    pub fn angle(mut self, degrees: f64) -> Self {
        self.angle = degrees;
        self
    }

    pub fn anchor(mut self, anchor: Option<Anchor>) -> Self {
        self.anchor = anchor;
        self
    }

    /// Where the camera sits in the world.
    pub fn placement_matrix(&self) -> Transform {
        let (ax, ay) = self.anchor_coords();
        Transform::from_placement(
            self.width,
            self.height,
            self.scale_x,
            self.scale_y,
            self.angle,
            self.x,
            self.y,
            ax,
            ay,
        )
    }

    /// World-to-view transform.
    pub fn view_matrix(&self) -> Transform {
        let (ax, ay) = self.anchor_coords();
        let mut t = Transform::new();
        t.update_by_inverse(
            self.width,
            self.height,
            self.scale_x,
            self.scale_y,
            self.angle,
            self.x,
            self.y,
            ax,
            ay,
        );
        t
    }

    /// Concatenate the view transform onto `renderer`.
    pub fn apply(&self, renderer: &mut dyn Renderer) {
        renderer.transform(&self.view_matrix());
    }

    fn anchor_coords(&self) -> (Option<f64>, Option<f64>) {
        match self.anchor {
            Some(a) => (Some(a.x), Some(a.y)),
            None => (None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_view_undoes_placement() {
        let camera = Camera::new(320.0, 240.0)
            .position(40.0, -10.0)
            .scale(2.0, 2.0)
            .angle(15.0);
        let world = Point::new(12.0, 34.0);
        let view = camera
            .view_matrix()
            .multiply_point(camera.placement_matrix().multiply_point(world));
        assert!(approx_eq(view.x, world.x));
        assert!(approx_eq(view.y, world.y));
    }

    #[test]
    fn test_moving_camera_scrolls_world() {
        let camera = Camera::new(100.0, 100.0).position(30.0, 0.0);
        let p = camera.view_matrix().multiply_point(Point::new(30.0, 0.0));
        assert!(approx_eq(p.x, 0.0));
        assert!(approx_eq(p.y, 0.0));
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(Camera::new(1.0, 1.0).id(), Camera::new(1.0, 1.0).id());
    }
}
