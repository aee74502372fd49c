//! Renders a padded pane with a nine-patch background into a PNG.
//!
//! The pane is drawn twice through a camera; the second frame reuses the
//! cached rendering. Run with `RUST_LOG=debug` to watch surfaces being
//! allocated and reused.

use std::rc::Rc;

use paneframe::prelude::*;

fn frame_source() -> SurfaceRef {
    // 9x9 frame: dark border, lighter center
    let mut source = RasterSurface::new(9, 9);
    let r = source.renderer();
    r.fill_rect(0.0, 0.0, 9.0, 9.0, Color::from_hex(0x2e3440));
    r.fill_rect(3.0, 3.0, 3.0, 3.0, Color::from_hex(0xd8dee9));
    SurfaceRef::new(source)
}

fn main() -> paneframe::Result<()> {
    env_logger::init();

    let factory = Rc::new(RasterSurfaceFactory::new());

    let mut pane = Pane::new(
        factory.clone(),
        PaneConfig::new(200.0, 120.0)
            .position(60.0, 60.0)
            .angle(10.0)
            .padding(12.0)
            .background(frame_source())
            .background_effector(NinePatchEffector::new(factory.clone(), 3.0)),
    )?
    .child(FilledRect::new(
        EntityCore::new(80.0, 40.0).position(10.0, 10.0),
        Color::from_hex(0xbf616a),
    ))
    .child(FilledRect::new(
        EntityCore::new(120.0, 60.0)
            .position(90.0, 50.0)
            .rotated(-20.0)
            .anchored(Some(Anchor::CENTER)),
        Color::rgba(0.53, 0.75, 0.82, 0.8),
    ));

    let camera = Camera::new(320.0, 240.0);
    let mut screen = RasterSurface::new(320, 240);
    for frame in 0..2 {
        let renderer = screen.renderer();
        renderer.begin();
        renderer.clear();
        renderer.save();
        camera.apply(renderer);
        pane.render(renderer, Some(&camera));
        renderer.restore();
        renderer.end();
        log::info!(
            "Frame {} rendered, {} surfaces allocated so far",
            frame,
            factory.allocation_count()
        );
    }

    if let Some(rect) = pane.calculate_bounding_rect(None) {
        log::info!("Pane bounds: {:?}", rect);
    }

    screen.save_png("cached_pane.png")?;
    pane.destroy();
    Ok(())
}
