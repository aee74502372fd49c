//! Entities: placed, renderable nodes of the scene graph.
//!
//! Every entity embeds an [`EntityCore`] holding its placement, state flags
//! and its own [`Transform`]. Placement setters only mark the transform dirty;
//! [`EntityCore::matrix`] recomputes it on demand.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::anchor::Anchor;
use crate::camera::{Camera, CameraId};
use crate::geometry::{Color, Point, Rect};
use crate::state::{self, EntityStateFlags};
use crate::surface::Renderer;
use crate::transform::Transform;

/// Unique identifier for an entity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EntityId(u64);

impl EntityId {
    pub fn next() -> Self {
        static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);
        EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Placement, state and transform shared by all entities.
#[derive(Debug)]
pub struct EntityCore {
    id: EntityId,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    scale_x: f64,
    scale_y: f64,
    angle: f64,
    anchor: Option<Anchor>,
    state: EntityStateFlags,
    touchable: bool,
    target_cameras: Option<Vec<CameraId>>,
    matrix: Transform,
}

impl EntityCore {
    pub fn new(width: f64, height: f64) -> Self {
        let mut matrix = Transform::new();
        matrix.mark_dirty();
        Self {
            id: EntityId::next(),
            x: 0.0,
            y: 0.0,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            anchor: None,
            state: EntityStateFlags::MODIFIED,
            touchable: false,
            target_cameras: None,
            matrix,
        }
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.set_position(x, y);
        self
    }

    pub fn scaled(mut self, sx: f64, sy: f64) -> Self {
        self.set_scale(sx, sy);
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.set_angle(degrees);
        self
    }

    pub fn anchored(mut self, anchor: Option<Anchor>) -> Self {
        self.set_anchor(anchor);
        self
    }

    pub fn touchable(mut self, touchable: bool) -> Self {
        self.touchable = touchable;
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn anchor(&self) -> Option<Anchor> {
        self.anchor
    }

    pub fn is_touchable(&self) -> bool {
        self.touchable
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.placement_changed();
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.placement_changed();
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
        self.placement_changed();
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height;
        self.placement_changed();
    }

    pub fn set_scale(&mut self, sx: f64, sy: f64) {
        self.scale_x = sx;
        self.scale_y = sy;
        self.placement_changed();
    }

    pub fn set_angle(&mut self, degrees: f64) {
        self.angle = degrees;
        self.placement_changed();
    }

    pub fn set_anchor(&mut self, anchor: Option<Anchor>) {
        self.anchor = anchor;
        self.placement_changed();
    }

    pub fn set_touchable(&mut self, touchable: bool) {
        self.touchable = touchable;
    }

    /// Restrict rendering to the given cameras. `None` renders for every camera.
    pub fn set_target_cameras(&mut self, cameras: Option<Vec<CameraId>>) {
        self.target_cameras = cameras;
        state::mark_modified(&mut self.state, false);
    }

    fn placement_changed(&mut self) {
        self.matrix.mark_dirty();
        state::mark_modified(&mut self.state, false);
    }

    pub fn state(&self) -> EntityStateFlags {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut EntityStateFlags {
        &mut self.state
    }

    pub fn visible(&self) -> bool {
        !self.state.contains(EntityStateFlags::HIDDEN)
    }

    pub fn show(&mut self) {
        self.state.remove(EntityStateFlags::HIDDEN);
        state::mark_modified(&mut self.state, false);
    }

    pub fn hide(&mut self) {
        self.state.insert(EntityStateFlags::HIDDEN);
        state::mark_modified(&mut self.state, false);
    }

    pub fn is_modified(&self) -> bool {
        self.state.contains(EntityStateFlags::MODIFIED)
    }

    /// Whether this entity takes part in rendering through `camera`.
    pub fn is_visible_to(&self, camera: Option<&Camera>) -> bool {
        match (&self.target_cameras, camera) {
            (Some(targets), Some(camera)) => targets.contains(&camera.id()),
            _ => true,
        }
    }

    /// The local transform, refreshed from the placement if it went stale.
    pub fn matrix(&mut self) -> &Transform {
        if self.matrix.is_dirty() {
            let (ax, ay) = self.anchor_coords();
            self.matrix.update(
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
            self.matrix.clear_dirty();
        }
        &self.matrix
    }

    /// Like [`EntityCore::matrix`] but without caching the refreshed value.
    pub fn current_matrix(&self) -> Transform {
        if !self.matrix.is_dirty() {
            return self.matrix.clone();
        }
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

    fn anchor_coords(&self) -> (Option<f64>, Option<f64>) {
        match self.anchor {
            Some(a) => (Some(a.x), Some(a.y)),
            None => (None, None),
        }
    }

    /// Box of this entity's own `width × height` rectangle mapped through `matrix`.
    pub fn own_bounding_rect(&self, matrix: &Transform) -> Rect {
        let corners = Rect::from_size(self.width, self.height)
            .corners()
            .map(|c| matrix.multiply_point(c));
        Rect::bounding(corners).unwrap_or_default()
    }
}

pub trait Entity: fmt::Debug {
    fn core(&self) -> &EntityCore;
    fn core_mut(&mut self) -> &mut EntityCore;

    /// Draw this entity's own content in its local space.
    ///
    /// Returns whether the children should be rendered into the same renderer
    /// afterwards.
    fn render_self(&mut self, renderer: &mut dyn Renderer, camera: Option<&Camera>) -> bool;

    fn children(&self) -> &[Box<dyn Entity>] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Entity>] {
        &mut []
    }

    fn render(&mut self, renderer: &mut dyn Renderer, camera: Option<&Camera>) {
        render_entity(self, renderer, camera);
    }

    /// Whether hit testing should descend into the children for a point in
    /// local coordinates.
    fn should_find_children_by_point(&self, _point: Point) -> bool {
        true
    }

    /// Origin of the children's coordinate space within this entity's local space.
    fn children_offset(&self) -> Point {
        Point::ORIGIN
    }

    /// World-space box of this entity (and, by default, its children) under
    /// the ambient transform `m`. `None` when not visible.
    fn calculate_bounding_rect(&self, m: Option<&Transform>) -> Option<Rect> {
        bounding_rect_with_children(self, m)
    }

    /// Whether this entity or any descendant changed since it was last rendered.
    fn needs_redraw(&self) -> bool {
        self.core().is_modified() || self.children().iter().any(|c| c.needs_redraw())
    }

    fn destroy(&mut self) {
        for child in self.children_mut() {
            child.destroy();
        }
    }
}

/// The standard render sequence: apply the local transform, draw, draw children.
pub fn render_entity<E: Entity + ?Sized>(
    entity: &mut E,
    renderer: &mut dyn Renderer,
    camera: Option<&Camera>,
) {
    let core = entity.core_mut();
    if !core.visible() || !core.is_visible_to(camera) {
        state::mark_rendered(core.state_mut());
        return;
    }
    let matrix = core.matrix().clone();

    renderer.save();
    if !matrix.is_identity() {
        renderer.transform(&matrix);
    }
    if entity.render_self(renderer, camera) {
        for child in entity.children_mut() {
            child.render(renderer, camera);
        }
    }
    renderer.restore();
    state::mark_rendered(entity.core_mut().state_mut());
}

/// Bounding box covering the entity's rectangle and every visible descendant.
pub fn bounding_rect_with_children<E: Entity + ?Sized>(
    entity: &E,
    m: Option<&Transform>,
) -> Option<Rect> {
    let local = entity.core().current_matrix();
    let matrix = match m {
        Some(m) => m.multiply_new(&local),
        None => local,
    };
    if !entity.core().visible() {
        return None;
    }
    let mut result = entity.core().own_bounding_rect(&matrix);
    for child in entity.children() {
        if let Some(r) = child.calculate_bounding_rect(Some(&matrix)) {
            result = result.union(&r);
        }
    }
    Some(result)
}

/// A plain container that renders its children in its own coordinate space.
#[derive(Debug)]
pub struct Group {
    core: EntityCore,
    children: Vec<Box<dyn Entity>>,
}

impl Group {
    pub fn new(core: EntityCore) -> Self {
        Self {
            core,
            children: Vec::new(),
        }
    }

    pub fn child(mut self, child: impl Entity + 'static) -> Self {
        self.append(Box::new(child));
        self
    }

    pub fn append(&mut self, child: Box<dyn Entity>) {
        self.children.push(child);
        state::mark_modified(self.core.state_mut(), true);
    }

    /// Remove and return the child at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Entity>> {
        if index >= self.children.len() {
            return None;
        }
        state::mark_modified(self.core.state_mut(), true);
        Some(self.children.remove(index))
    }
}

impl Entity for Group {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn render_self(&mut self, _renderer: &mut dyn Renderer, _camera: Option<&Camera>) -> bool {
        true
    }

    fn children(&self) -> &[Box<dyn Entity>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Entity>] {
        &mut self.children
    }
}

/// A solid rectangle filling its `width × height`.
#[derive(Debug)]
pub struct FilledRect {
    core: EntityCore,
    color: Color,
}

impl FilledRect {
    pub fn new(core: EntityCore, color: Color) -> Self {
        Self { core, color }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        state::mark_modified(self.core.state_mut(), false);
    }
}

impl Entity for FilledRect {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn render_self(&mut self, renderer: &mut dyn Renderer, _camera: Option<&Camera>) -> bool {
        renderer.fill_rect(0.0, 0.0, self.core.width(), self.core.height(), self.color);
        true
    }
}
