//! Background effectors: turn a source surface into a surface of a requested size.

use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::geometry::Padding;
use crate::surface::{Surface, SurfaceFactory, SurfaceRef};
use crate::transform::Transform;

/// Derives a `width × height` surface from a source.
///
/// Returning the same surface as the previous call tells the caller it can
/// keep it. Returning a different one hands the caller ownership of the new
/// surface and retires the old one.
pub trait SurfaceEffector: fmt::Debug {
    fn render(&mut self, source: &dyn Surface, width: f64, height: f64) -> Result<SurfaceRef>;
}

/// Nine-slice scaling.
///
/// Corners keep their pixel size, edges stretch along one axis and the
/// center stretches along both.
#[derive(Debug)]
pub struct NinePatchEffector {
    factory: Rc<dyn SurfaceFactory>,
    borders: Padding,
    output: Option<SurfaceRef>,
}

impl NinePatchEffector {
    pub fn new(factory: Rc<dyn SurfaceFactory>, borders: impl Into<Padding>) -> Self {
        Self {
            factory,
            borders: borders.into(),
            output: None,
        }
    }

    pub fn borders(&self) -> Padding {
        self.borders
    }

    fn output_for(&mut self, width: u32, height: u32) -> Result<SurfaceRef> {
        if let Some(output) = &self.output {
            if !output.destroyed() && output.width() == width && output.height() == height {
                return Ok(output.clone());
            }
        }
        let output = self.factory.create_surface(width, height)?;
        self.output = Some(output.clone());
        Ok(output)
    }
}

impl SurfaceEffector for NinePatchEffector {
    fn render(&mut self, source: &dyn Surface, width: f64, height: f64) -> Result<SurfaceRef> {
        let out_w = width.max(0.0).ceil() as u32;
        let out_h = height.max(0.0).ceil() as u32;
        let output = self.output_for(out_w, out_h)?;

        let src_w = f64::from(source.width());
        let src_h = f64::from(source.height());
        let b = self.borders;

        // Source and destination slice edges along each axis.
        let src_x = [0.0, b.left, src_w - b.right, src_w];
        let src_y = [0.0, b.top, src_h - b.bottom, src_h];
        let dst_x = [0.0, b.left, width - b.right, width];
        let dst_y = [0.0, b.top, height - b.bottom, height];

        let mut surface = output.borrow_mut();
        let renderer = surface.renderer();
        renderer.begin();
        renderer.clear();
        for row in 0..3 {
            for col in 0..3 {
                let sw = src_x[col + 1] - src_x[col];
                let sh = src_y[row + 1] - src_y[row];
                let dw = dst_x[col + 1] - dst_x[col];
                let dh = dst_y[row + 1] - dst_y[row];
                if sw <= 0.0 || sh <= 0.0 || dw <= 0.0 || dh <= 0.0 {
                    continue;
                }
                let mut placement = Transform::translation(dst_x[col], dst_y[row]);
                placement.multiply(&Transform::scaling(dw / sw, dh / sh));
                renderer.save();
                renderer.transform(&placement);
                renderer.draw_image(source, src_x[col], src_y[row], sw, sh, 0.0, 0.0);
                renderer.restore();
            }
        }
        renderer.end();
        drop(surface);

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Color;
    use crate::surface::{RasterSurface, RasterSurfaceFactory};

    fn source() -> RasterSurface {
        // 3x3 with a red 1px frame and a blue center pixel
        let mut src = RasterSurface::new(3, 3);
        let r = src.renderer();
        r.fill_rect(0.0, 0.0, 3.0, 3.0, Color::rgb(1.0, 0.0, 0.0));
        r.fill_rect(1.0, 1.0, 1.0, 1.0, Color::rgb(0.0, 0.0, 1.0));
        src
    }

    fn pixel(surface: &SurfaceRef, x: u32, y: u32) -> [u8; 4] {
        let s = surface.borrow();
        let raster = s.as_any().downcast_ref::<RasterSurface>().unwrap();
        raster.pixel(x, y).unwrap()
    }

    #[test]
    fn test_corners_keep_size_and_center_stretches() {
        let factory = Rc::new(RasterSurfaceFactory::new());
        let mut effector = NinePatchEffector::new(factory, 1.0);
        let out = effector.render(&source(), 6.0, 4.0).unwrap();

        assert_eq!((out.width(), out.height()), (6, 4));
        assert_eq!(pixel(&out, 0, 0), [255, 0, 0, 255]);
        assert_eq!(pixel(&out, 5, 3), [255, 0, 0, 255]);
        assert_eq!(pixel(&out, 3, 0), [255, 0, 0, 255]);
        for x in 1..5 {
            for y in 1..3 {
                assert_eq!(pixel(&out, x, y), [0, 0, 255, 255]);
            }
        }
    }

    #[test]
    fn test_output_reused_while_size_unchanged() {
        let factory = Rc::new(RasterSurfaceFactory::new());
        let mut effector = NinePatchEffector::new(factory.clone(), 1.0);
        let src = source();

        let first = effector.render(&src, 8.0, 8.0).unwrap();
        let second = effector.render(&src, 8.0, 8.0).unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(factory.allocation_count(), 1);

        let third = effector.render(&src, 9.0, 8.0).unwrap();
        assert!(!first.ptr_eq(&third));
        assert_eq!(factory.allocation_count(), 2);
    }

    #[test]
    fn test_destroyed_output_is_replaced() {
        let factory = Rc::new(RasterSurfaceFactory::new());
        let mut effector = NinePatchEffector::new(factory, 1.0);
        let src = source();
        let first = effector.render(&src, 4.0, 4.0).unwrap();
        first.destroy();
        let second = effector.render(&src, 4.0, 4.0).unwrap();
        assert!(!first.ptr_eq(&second));
        assert!(!second.destroyed());
    }
}
