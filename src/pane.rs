//! Pane: a clipped, padded container that renders its children through an
//! owned offscreen surface and composites them over an optional background.
//!
//! Rendering is two-level. The pane keeps a frame cache the size of the whole
//! pane that is reused until the pane is invalidated or a descendant changes.
//! Refreshing the frame cache runs [`Pane::render_cache`], which draws the
//! children into a second surface sized to the content area (the pane minus
//! its padding) and composites it over the background. That child surface is
//! only reallocated when `width`, `height` or the padding change.

use std::fmt;
use std::rc::Rc;

use crate::anchor::Anchor;
use crate::camera::{Camera, CameraId};
use crate::effector::SurfaceEffector;
use crate::entity::{Entity, EntityCore};
use crate::error::Result;
use crate::geometry::{ceil_to_pixels, Area, Padding, Point, Rect};
use crate::state::{self, EntityStateFlags, Invalidatable};
use crate::surface::{
    same_background, BackgroundSource, OwnedSurface, Renderer, SurfaceFactory, SurfaceRef,
};
use crate::transform::Transform;

/// Construction parameters for a [`Pane`].
pub struct PaneConfig {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub angle: f64,
    pub anchor: Option<Anchor>,
    pub padding: Padding,
    pub background: Option<BackgroundSource>,
    pub background_effector: Option<Box<dyn SurfaceEffector>>,
    pub touchable: bool,
}

impl Default for PaneConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            anchor: None,
            padding: Padding::ZERO,
            background: None,
            background_effector: None,
            touchable: false,
        }
    }
}

impl fmt::Debug for PaneConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaneConfig")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("padding", &self.padding)
            .field("background", &self.background.is_some())
            .field("background_effector", &self.background_effector.is_some())
            .finish_non_exhaustive()
    }
}

impl PaneConfig {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
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

    pub fn padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = padding.into();
        self
    }

    pub fn background(mut self, background: impl Into<BackgroundSource>) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn background_effector(mut self, effector: impl SurfaceEffector + 'static) -> Self {
        self.background_effector = Some(Box::new(effector));
        self
    }

    pub fn touchable(mut self, touchable: bool) -> Self {
        self.touchable = touchable;
        self
    }
}

#[derive(Debug)]
pub struct Pane {
    core: EntityCore,
    children: Vec<Box<dyn Entity>>,
    factory: Rc<dyn SurfaceFactory>,

    padding: Padding,
    padding_changed: bool,
    /// Padding the current child surface was built with.
    normalized_padding: Padding,
    child_area: Area,
    child_surface: Option<OwnedSurface>,
    built_width: f64,
    built_height: f64,

    background: Option<BackgroundSource>,
    before_background: Option<BackgroundSource>,
    background_surface: Option<SurfaceRef>,
    background_effector: Option<Box<dyn SurfaceEffector>>,
    effected_background: Option<OwnedSurface>,

    frame_cache: Option<OwnedSurface>,
    /// Camera the frame cache was last rendered through.
    rendered_camera: Option<CameraId>,
    destroyed: bool,
}

impl Pane {
    /// Create a pane and allocate its child surface.
    pub fn new(factory: Rc<dyn SurfaceFactory>, config: PaneConfig) -> Result<Self> {
        let core = EntityCore::new(config.width, config.height)
            .position(config.x, config.y)
            .scaled(config.scale_x, config.scale_y)
            .rotated(config.angle)
            .anchored(config.anchor)
            .touchable(config.touchable);
        let background_surface = config.background.as_ref().map(BackgroundSource::as_surface);

        let mut pane = Self {
            core,
            children: Vec::new(),
            factory,
            padding: config.padding,
            padding_changed: false,
            normalized_padding: config.padding,
            child_area: Area::default(),
            child_surface: None,
            built_width: config.width,
            built_height: config.height,
            before_background: config.background.clone(),
            background: config.background,
            background_surface,
            background_effector: config.background_effector,
            effected_background: None,
            frame_cache: None,
            rendered_camera: None,
            destroyed: false,
        };
        pane.initialize()?;
        Ok(pane)
    }

    pub fn child(mut self, child: impl Entity + 'static) -> Self {
        self.append(Box::new(child));
        self
    }

    pub fn append(&mut self, child: Box<dyn Entity>) {
        self.children.push(child);
        self.modified(true);
    }

    /// Insert `child` so that it is painted before the current child at `index`.
    pub fn insert(&mut self, index: usize, child: Box<dyn Entity>) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
        self.modified(true);
    }

    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Entity>> {
        if index >= self.children.len() {
            return None;
        }
        let child = self.children.remove(index);
        self.modified(true);
        Some(child)
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Change the padding. The child surface is rebuilt on the next render.
    pub fn set_padding(&mut self, padding: impl Into<Padding>) {
        self.padding = padding.into();
        self.padding_changed = true;
        self.invalidate();
    }

    pub fn background(&self) -> Option<&BackgroundSource> {
        self.background.as_ref()
    }

    /// Replace the background. Swapping it never rebuilds the child surface.
    pub fn set_background(&mut self, background: Option<BackgroundSource>) {
        self.background = background;
        self.invalidate();
    }

    pub fn set_background_effector(&mut self, effector: Option<Box<dyn SurfaceEffector>>) {
        self.background_effector = effector;
        self.invalidate();
    }

    /// The content area the children are clipped to, as of the last rebuild.
    pub fn child_area(&self) -> Area {
        self.child_area
    }

    /// Surface the children are currently drawn into.
    pub fn child_surface(&self) -> Option<&SurfaceRef> {
        self.child_surface.as_ref().map(OwnedSurface::handle)
    }

    /// Surface the background effector produced, if one is in use.
    pub fn effected_background(&self) -> Option<&SurfaceRef> {
        self.effected_background.as_ref().map(OwnedSurface::handle)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Draw the background and the clipped children into `renderer`, in the
    /// pane's local space.
    pub fn render_cache(&mut self, renderer: &mut dyn Renderer, camera: Option<&Camera>) {
        let width = self.core.width();
        let height = self.core.height();
        if self.destroyed || width <= 0.0 || height <= 0.0 {
            return;
        }
        self.render_background();
        self.render_children(camera);

        let background = self
            .effected_background
            .as_ref()
            .map(|s| s.handle().clone())
            .or_else(|| self.background_surface.clone());
        if let Some(background) = background {
            renderer.draw_image(&*background.borrow(), 0.0, 0.0, width, height, 0.0, 0.0);
        }

        let area = self.child_area;
        if area.is_empty() {
            return;
        }
        let Some(child_surface) = &self.child_surface else {
            return;
        };
        renderer.save();
        if area.x != 0.0 || area.y != 0.0 {
            renderer.translate(area.x, area.y);
        }
        renderer.draw_image(
            &*child_surface.handle().borrow(),
            0.0,
            0.0,
            area.width,
            area.height,
            0.0,
            0.0,
        );
        renderer.restore();
    }

    /// Destroy the pane's own surfaces. The background source is only
    /// destroyed when `destroy_background_surface` is set.
    pub fn destroy_with(&mut self, destroy_background_surface: bool) {
        if destroy_background_surface {
            if let Some(surface) = &self.background_surface {
                surface.destroy();
            }
        }
        if let Some(surface) = self.effected_background.take() {
            surface.release();
        }
        if let Some(surface) = self.child_surface.take() {
            surface.release();
        }
        if let Some(surface) = self.frame_cache.take() {
            surface.release();
        }
        self.background_surface = None;
        self.before_background = None;
        self.background = None;
        for child in self.children.iter_mut() {
            child.destroy();
        }
        self.destroyed = true;
        log::debug!("Pane {:?} destroyed", self.core.id());
    }

    fn needs_rebuild(&self) -> bool {
        self.padding_changed
            || self.child_surface.is_none()
            || self.built_width != self.core.width()
            || self.built_height != self.core.height()
    }

    /// Recompute the child area and allocate a fresh child surface for it.
    fn initialize(&mut self) -> Result<()> {
        let width = self.core.width();
        let height = self.core.height();
        let padding = self.padding;
        self.child_area = padding.content_area(width, height);
        self.normalized_padding = padding;

        if let Some(old) = self.child_surface.take() {
            old.release();
        }
        let (pw, ph) = self.child_area.pixel_size();
        let surface = self.factory.create_surface(pw, ph)?;
        self.child_surface = Some(OwnedSurface::adopt(surface));

        self.padding_changed = false;
        self.built_width = width;
        self.built_height = height;
        log::debug!(
            "Pane {:?} child surface rebuilt at {}x{}",
            self.core.id(),
            pw,
            ph
        );
        Ok(())
    }

    fn render_background(&mut self) {
        if !same_background(self.background.as_ref(), self.before_background.as_ref()) {
            self.background_surface = self.background.as_ref().map(BackgroundSource::as_surface);
            self.before_background = self.background.clone();
        }

        let (Some(source), Some(effector)) =
            (&self.background_surface, self.background_effector.as_mut())
        else {
            if let Some(old) = self.effected_background.take() {
                old.release();
            }
            return;
        };

        let result = effector.render(&*source.borrow(), self.core.width(), self.core.height());
        match result {
            Ok(surface) => {
                let unchanged = self
                    .effected_background
                    .as_ref()
                    .map_or(false, |owned| owned.is(&surface));
                if !unchanged {
                    log::debug!("Pane {:?} background effect replaced", self.core.id());
                    if let Some(old) = self.effected_background.replace(OwnedSurface::adopt(surface)) {
                        old.release();
                    }
                }
            }
            Err(err) => log::error!("Background effector failed: {}", err),
        }
    }

    fn render_children(&mut self, camera: Option<&Camera>) {
        if self.needs_rebuild() {
            if let Err(err) = self.initialize() {
                log::error!(
                    "Pane {:?} could not allocate its child surface: {}",
                    self.core.id(),
                    err
                );
                return;
            }
        }
        let Some(child_surface) = &self.child_surface else {
            return;
        };

        let mut surface = child_surface.handle().borrow_mut();
        let renderer = surface.renderer();
        renderer.begin();
        renderer.clear();
        for child in self.children.iter_mut() {
            child.render(renderer, camera);
        }
        renderer.end();
    }

    /// The frame cache, reallocated when the pane's pixel size changed.
    fn ensure_frame_cache(&mut self) -> Option<SurfaceRef> {
        let pw = ceil_to_pixels(self.core.width());
        let ph = ceil_to_pixels(self.core.height());
        if let Some(cache) = &self.frame_cache {
            let handle = cache.handle();
            if !handle.destroyed() && handle.width() == pw && handle.height() == ph {
                return Some(handle.clone());
            }
        }

        if let Some(old) = self.frame_cache.take() {
            old.release();
        }
        state::invalidate(self.core.state_mut());
        match self.factory.create_surface(pw, ph) {
            Ok(surface) => {
                self.frame_cache = Some(OwnedSurface::adopt(surface.clone()));
                Some(surface)
            }
            Err(err) => {
                log::error!(
                    "Pane {:?} could not allocate its frame cache: {}",
                    self.core.id(),
                    err
                );
                None
            }
        }
    }
}

impl Invalidatable for Pane {
    fn invalidate(&mut self) {
        state::invalidate(self.core.state_mut());
    }

    fn modified(&mut self, bubbling: bool) {
        state::mark_modified(self.core.state_mut(), bubbling);
    }
}

impl Entity for Pane {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn render_self(&mut self, renderer: &mut dyn Renderer, camera: Option<&Camera>) -> bool {
        let width = self.core.width();
        let height = self.core.height();
        if self.destroyed || width <= 0.0 || height <= 0.0 {
            return false;
        }
        if self.children.iter().any(|c| c.needs_redraw()) {
            self.modified(true);
        }
        if self.needs_rebuild() {
            self.invalidate();
        }
        let camera_id = camera.map(Camera::id);
        if camera_id != self.rendered_camera {
            self.invalidate();
        }

        let Some(cache) = self.ensure_frame_cache() else {
            return false;
        };
        if !self.core.state().contains(EntityStateFlags::CACHED) {
            {
                let mut surface = cache.borrow_mut();
                let target = surface.renderer();
                target.begin();
                target.clear();
                self.render_cache(target, camera);
                target.end();
            }
            state::mark_cached(self.core.state_mut());
            self.rendered_camera = camera_id;
        }

        renderer.draw_image(&*cache.borrow(), 0.0, 0.0, width, height, 0.0, 0.0);
        false
    }

    fn children(&self) -> &[Box<dyn Entity>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Entity>] {
        &mut self.children
    }

    /// Only points strictly inside the padded content area reach the children.
    fn should_find_children_by_point(&self, point: Point) -> bool {
        self.normalized_padding
            .content_rect(self.core.width(), self.core.height())
            .contains_strict(point)
    }

    fn children_offset(&self) -> Point {
        Point::new(self.child_area.x, self.child_area.y)
    }

    /// The pane's own rectangle only; children are clipped and never extend it.
    fn calculate_bounding_rect(&self, m: Option<&Transform>) -> Option<Rect> {
        let local = self.core.current_matrix();
        let matrix = match m {
            Some(m) => m.multiply_new(&local),
            None => local,
        };
        if !self.core.visible() {
            return None;
        }
        Some(self.core.own_bounding_rect(&matrix))
    }

    fn destroy(&mut self) {
        self.destroy_with(false);
    }
}
