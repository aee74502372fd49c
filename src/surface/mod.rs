//! Drawing surfaces and the renderer capability bound to them.
//!
//! Two handle types encode who is responsible for destroying a surface:
//!
//! - [`SurfaceRef`] is a shared, non-owning handle. Externally supplied
//!   surfaces (background images, effector outputs before adoption) travel as
//!   `SurfaceRef` and are never destroyed implicitly.
//! - [`OwnedSurface`] is the single owner of a surface. It destroys the surface
//!   when released or dropped, at most once.

pub mod raster;

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::geometry::Color;
use crate::transform::Transform;

pub use raster::{RasterConfig, RasterImageAsset, RasterRenderer, RasterSurface, RasterSurfaceFactory};

/// An offscreen or onscreen pixel buffer.
pub trait Surface: fmt::Debug {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// The drawing-command sink bound to this surface.
    fn renderer(&mut self) -> &mut dyn Renderer;

    /// Release the pixel storage. Calling this twice is a caller error;
    /// check [`Surface::destroyed`] first.
    fn destroy(&mut self);
    fn destroyed(&self) -> bool;

    /// Backend hook so renderers can read pixels of their own surface type.
    fn as_any(&self) -> &dyn Any;
}

/// Drawing commands issued against a [`Surface`].
///
/// Coordinates are in the renderer's current user space, which starts as the
/// surface's pixel space and is changed by [`Renderer::translate`] and
/// [`Renderer::transform`].
pub trait Renderer {
    fn begin(&mut self);
    fn end(&mut self);

    /// Reset every pixel to transparent, ignoring the current transform.
    fn clear(&mut self);

    /// Push the current drawing state.
    fn save(&mut self);
    /// Pop the drawing state pushed by the matching [`Renderer::save`].
    fn restore(&mut self);

    fn translate(&mut self, dx: f64, dy: f64);

    /// Concatenate `matrix` onto the current transform.
    fn transform(&mut self, matrix: &Transform);

    /// Copy the `width × height` region at `(sx, sy)` of `source` to `(dx, dy)`.
    #[allow(clippy::too_many_arguments)]
    fn draw_image(
        &mut self,
        source: &dyn Surface,
        sx: f64,
        sy: f64,
        width: f64,
        height: f64,
        dx: f64,
        dy: f64,
    );

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color);
}

/// Allocates surfaces for a rendering backend.
pub trait SurfaceFactory: fmt::Debug {
    fn create_surface(&self, width: u32, height: u32) -> Result<SurfaceRef>;
}

/// Shared, non-owning handle to a surface.
#[derive(Clone)]
pub struct SurfaceRef(Rc<RefCell<dyn Surface>>);

impl SurfaceRef {
    pub fn new<S: Surface + 'static>(surface: S) -> Self {
        SurfaceRef(Rc::new(RefCell::new(surface)))
    }

    /// Whether both handles point at the same surface.
    pub fn ptr_eq(&self, other: &SurfaceRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// # Panics
    ///
    /// Panics if the surface is currently borrowed mutably, e.g. when a
    /// surface is drawn into itself.
    pub fn borrow(&self) -> Ref<'_, dyn Surface> {
        self.0.borrow()
    }

    /// # Panics
    ///
    /// Panics if the surface is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, dyn Surface> {
        self.0.borrow_mut()
    }

    pub fn width(&self) -> u32 {
        self.0.borrow().width()
    }

    pub fn height(&self) -> u32 {
        self.0.borrow().height()
    }

    pub fn destroyed(&self) -> bool {
        self.0.borrow().destroyed()
    }

    /// Destroy the underlying surface if it is still alive.
    ///
    /// Every holder of this surface observes the destruction.
    pub fn destroy(&self) {
        match self.0.try_borrow_mut() {
            Ok(mut surface) => {
                if !surface.destroyed() {
                    surface.destroy();
                }
            }
            Err(_) => log::warn!("Surface is in use, skipping destroy"),
        }
    }
}

impl fmt::Debug for SurfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(s) => f
                .debug_struct("SurfaceRef")
                .field("width", &s.width())
                .field("height", &s.height())
                .field("destroyed", &s.destroyed())
                .finish(),
            Err(_) => f.write_str("SurfaceRef(<borrowed>)"),
        }
    }
}

/// Exclusive owner of a surface; destroys it when dropped.
#[derive(Debug)]
pub struct OwnedSurface {
    inner: SurfaceRef,
}

impl OwnedSurface {
    /// Take ownership of `surface`. From now on this value decides when it dies.
    pub fn adopt(surface: SurfaceRef) -> Self {
        Self { inner: surface }
    }

    pub fn handle(&self) -> &SurfaceRef {
        &self.inner
    }

    /// Whether `other` refers to the owned surface.
    pub fn is(&self, other: &SurfaceRef) -> bool {
        self.inner.ptr_eq(other)
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Destroy the surface now.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for OwnedSurface {
    fn drop(&mut self) {
        self.inner.destroy();
    }
}

/// A decoded image that can be viewed as a surface.
pub trait ImageAsset: fmt::Debug {
    fn id(&self) -> &str;
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Surface view of the image. The asset keeps ownership of it.
    fn as_surface(&self) -> SurfaceRef;
}

/// What a pane paints beneath its children.
#[derive(Clone, Debug)]
pub enum BackgroundSource {
    Image(Rc<dyn ImageAsset>),
    Surface(SurfaceRef),
}

impl BackgroundSource {
    /// Identity comparison; two sources are the same only if they are the same object.
    pub fn same_as(&self, other: &BackgroundSource) -> bool {
        match (self, other) {
            (BackgroundSource::Image(a), BackgroundSource::Image(b)) => Rc::ptr_eq(a, b),
            (BackgroundSource::Surface(a), BackgroundSource::Surface(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Surface view of the source, without taking ownership.
    pub fn as_surface(&self) -> SurfaceRef {
        match self {
            BackgroundSource::Image(asset) => asset.as_surface(),
            BackgroundSource::Surface(surface) => surface.clone(),
        }
    }
}

impl From<SurfaceRef> for BackgroundSource {
    fn from(surface: SurfaceRef) -> Self {
        BackgroundSource::Surface(surface)
    }
}

impl From<Rc<dyn ImageAsset>> for BackgroundSource {
    fn from(asset: Rc<dyn ImageAsset>) -> Self {
        BackgroundSource::Image(asset)
    }
}

/// Identity comparison of two optional background sources.
pub(crate) fn same_background(a: Option<&BackgroundSource>, b: Option<&BackgroundSource>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_as(b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_surface_destroys_on_drop() {
        let surface = SurfaceRef::new(RasterSurface::new(4, 4));
        let observer = surface.clone();
        let owned = OwnedSurface::adopt(surface);
        assert!(owned.is(&observer));
        drop(owned);
        assert!(observer.destroyed());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let surface = SurfaceRef::new(RasterSurface::new(2, 2));
        surface.destroy();
        surface.destroy();
        assert!(surface.destroyed());
    }

    #[test]
    fn test_background_identity() {
        let a = SurfaceRef::new(RasterSurface::new(1, 1));
        let b = SurfaceRef::new(RasterSurface::new(1, 1));
        let src_a = BackgroundSource::from(a.clone());
        assert!(src_a.same_as(&BackgroundSource::from(a)));
        assert!(!src_a.same_as(&BackgroundSource::from(b)));
        assert!(same_background(None, None));
        assert!(!same_background(Some(&src_a), None));
    }
}
