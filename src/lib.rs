//! 2D affine transforms and cached pane compositing.
//!
//! [`Transform`] maps an entity's local space to its parent's space from a
//! placement (position, scale, rotation, anchor). [`Pane`] is a padded
//! container that draws its children into an owned offscreen surface, clips
//! them to the content area and composites them over a background.

pub mod anchor;
pub mod camera;
pub mod effector;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod pane;
pub mod state;
pub mod surface;
pub mod transform;

pub use anchor::Anchor;
pub use camera::{Camera, CameraId};
pub use effector::{NinePatchEffector, SurfaceEffector};
pub use entity::{Entity, EntityCore, EntityId, FilledRect, Group};
pub use error::{Error, Result};
pub use geometry::{Area, Color, Padding, Point, Rect};
pub use hit_test::{find_point_target, PointTarget};
pub use pane::{Pane, PaneConfig};
pub use state::{EntityStateFlags, Invalidatable};
pub use transform::Transform;

pub mod prelude {
    pub use crate::surface::{
        BackgroundSource, ImageAsset, OwnedSurface, RasterConfig, RasterImageAsset,
        RasterSurface, RasterSurfaceFactory, Renderer, Surface, SurfaceFactory, SurfaceRef,
    };
    pub use crate::{
        find_point_target, Anchor, Area, Camera, Color, Entity, EntityCore, FilledRect, Group,
        Invalidatable, NinePatchEffector, Padding, Pane, PaneConfig, Point, Rect, SurfaceEffector,
        Transform,
    };
}
