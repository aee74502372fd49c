//! CPU surfaces backed by `image::RgbaImage`.
//!
//! Every draw maps destination pixel centers back through the current
//! transform, so translated, scaled and rotated draws share one code path.
//! Sampling is nearest-neighbour and blending is straight-alpha source-over.

use std::any::Any;
use std::cell::Cell;
use std::path::Path;

use image::RgbaImage;

use super::{ImageAsset, Renderer, Surface, SurfaceFactory, SurfaceRef};
use crate::error::{Error, Result};
use crate::geometry::{Color, Point, Rect};
use crate::transform::Transform;

/// Limits applied by [`RasterSurfaceFactory`].
#[derive(Debug, Clone)]
pub struct RasterConfig {
    /// Largest width or height a surface may have.
    pub max_dimension: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            max_dimension: 8192,
        }
    }
}

impl RasterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }
}

/// Allocates [`RasterSurface`]s and counts the allocations.
#[derive(Debug, Default)]
pub struct RasterSurfaceFactory {
    config: RasterConfig,
    allocations: Cell<u64>,
}

impl RasterSurfaceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RasterConfig) -> Self {
        Self {
            config,
            allocations: Cell::new(0),
        }
    }

    /// Number of surfaces created so far.
    pub fn allocation_count(&self) -> u64 {
        self.allocations.get()
    }
}

impl SurfaceFactory for RasterSurfaceFactory {
    fn create_surface(&self, width: u32, height: u32) -> Result<SurfaceRef> {
        let limit = self.config.max_dimension;
        if width > limit || height > limit {
            return Err(Error::SurfaceTooLarge {
                width,
                height,
                limit,
            });
        }
        self.allocations.set(self.allocations.get() + 1);
        log::debug!("Allocating raster surface {}x{}", width, height);
        Ok(SurfaceRef::new(RasterSurface::new(width, height)))
    }
}

#[derive(Debug)]
pub struct RasterSurface {
    renderer: RasterRenderer,
    destroyed: bool,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width, height))
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        Self {
            renderer: RasterRenderer::new(pixels),
            destroyed: false,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.renderer.pixels
    }

    /// RGBA of the pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.renderer.pixels.get_pixel_checked(x, y).map(|p| p.0)
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        if self.destroyed {
            return Err(Error::SurfaceDestroyed);
        }
        self.renderer.pixels.save(path)?;
        Ok(())
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.renderer.pixels.width()
    }

    fn height(&self) -> u32 {
        self.renderer.pixels.height()
    }

    fn renderer(&mut self) -> &mut dyn Renderer {
        if self.destroyed {
            log::warn!("Renderer requested for a destroyed surface");
        }
        &mut self.renderer
    }

    fn destroy(&mut self) {
        log::debug!(
            "Destroying raster surface {}x{}",
            self.renderer.pixels.width(),
            self.renderer.pixels.height()
        );
        self.renderer.pixels = RgbaImage::new(0, 0);
        self.destroyed = true;
    }

    fn destroyed(&self) -> bool {
        self.destroyed
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct RasterRenderer {
    pixels: RgbaImage,
    current: Transform,
    stack: Vec<Transform>,
    depth: u32,
}

impl RasterRenderer {
    fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            current: Transform::IDENTITY,
            stack: Vec::new(),
            depth: 0,
        }
    }

    /// The transform currently applied to drawing commands.
    pub fn current_transform(&self) -> &Transform {
        &self.current
    }
}

impl Renderer for RasterRenderer {
    fn begin(&mut self) {
        self.depth += 1;
    }

    fn end(&mut self) {
        if self.depth == 0 {
            log::warn!("Renderer end() without matching begin()");
            return;
        }
        self.depth -= 1;
        if self.depth == 0 && !self.stack.is_empty() {
            log::warn!("{} unbalanced save() calls at end()", self.stack.len());
        }
    }

    fn clear(&mut self) {
        let raw: &mut [u8] = &mut self.pixels;
        raw.fill(0);
    }

    fn save(&mut self) {
        self.stack.push(self.current.clone());
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(t) => self.current = t,
            None => log::warn!("Renderer restore() without matching save()"),
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.current.multiply(&Transform::translation(dx, dy));
    }

    fn transform(&mut self, matrix: &Transform) {
        self.current.multiply(matrix);
    }

    fn draw_image(
        &mut self,
        source: &dyn Surface,
        sx: f64,
        sy: f64,
        width: f64,
        height: f64,
        dx: f64,
        dy: f64,
    ) {
        if source.destroyed() {
            log::warn!("Skipping draw of a destroyed surface");
            return;
        }
        let Some(src) = source.as_any().downcast_ref::<RasterSurface>() else {
            log::warn!("Raster renderer cannot read from {:?}", source);
            return;
        };
        let src = &src.renderer.pixels;
        let dest = Rect::new(dx, dy, dx + width, dy + height);
        rasterize(&mut self.pixels, &self.current, dest, |local| {
            let u = (sx + local.x - dx).floor();
            let v = (sy + local.y - dy).floor();
            if u < 0.0 || v < 0.0 {
                return None;
            }
            src.get_pixel_checked(u as u32, v as u32).map(|p| p.0)
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        let rgba = color.to_rgba8();
        if rgba[3] == 0 {
            return;
        }
        let dest = Rect::new(x, y, x + width, y + height);
        rasterize(&mut self.pixels, &self.current, dest, |_| Some(rgba));
    }
}

/// Shade every device pixel whose center falls inside `dest` (user space).
fn rasterize(
    pixels: &mut RgbaImage,
    transform: &Transform,
    dest: Rect,
    mut shade: impl FnMut(Point) -> Option<[u8; 4]>,
) {
    if dest.width() <= 0.0 || dest.height() <= 0.0 {
        return;
    }
    if transform.determinant() == 0.0 {
        log::trace!("Skipping draw through a degenerate transform");
        return;
    }
    let Some(bounds) = Rect::bounding(dest.corners().map(|c| transform.multiply_point(c))) else {
        return;
    };
    let (w, h) = pixels.dimensions();
    let clamp = |v: f64, max: u32| v.max(0.0).min(f64::from(max)) as u32;
    let (x0, x1) = (clamp(bounds.left.floor(), w), clamp(bounds.right.ceil(), w));
    let (y0, y1) = (clamp(bounds.top.floor(), h), clamp(bounds.bottom.ceil(), h));
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let stride = w as usize;
    let raw: &mut [u8] = pixels;
    let data: &mut [[u8; 4]] = bytemuck::cast_slice_mut(raw);
    for py in y0..y1 {
        for px in x0..x1 {
            let center = Point::new(f64::from(px) + 0.5, f64::from(py) + 0.5);
            let local = transform.multiply_inverse_for_point(center);
            if local.x < dest.left
                || local.x >= dest.right
                || local.y < dest.top
                || local.y >= dest.bottom
            {
                continue;
            }
            if let Some(src) = shade(local) {
                let dst = &mut data[py as usize * stride + px as usize];
                *dst = blend_over(src, *dst);
            }
        }
    }
}

fn blend_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    match src[3] {
        255 => return src,
        0 => return dst,
        _ => {}
    }
    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let channel = |i: usize| {
        let v = (f32::from(src[i]) * sa + f32::from(dst[i]) * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    [
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round() as u8,
    ]
}

/// An image asset decoded into a raster surface.
#[derive(Debug)]
pub struct RasterImageAsset {
    id: String,
    surface: SurfaceRef,
}

impl RasterImageAsset {
    pub fn new(id: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            id: id.into(),
            surface: SurfaceRef::new(RasterSurface::from_image(pixels)),
        }
    }

    /// Decode an encoded image (PNG) from memory.
    pub fn from_memory(id: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let pixels = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self::new(id, pixels))
    }

    pub fn open(id: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let pixels = image::open(path)?.to_rgba8();
        Ok(Self::new(id, pixels))
    }
}

impl ImageAsset for RasterImageAsset {
    fn id(&self) -> &str {
        &self.id
    }

    fn width(&self) -> u32 {
        self.surface.width()
    }

    fn height(&self) -> u32 {
        self.surface.height()
    }

    fn as_surface(&self) -> SurfaceRef {
        self.surface.clone()
    }
}
