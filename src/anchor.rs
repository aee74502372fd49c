/// Relative pivot point for scale and rotation.
///
/// Coordinates are fractions of the object's size: `0.0` is the left/top
/// edge, `0.5` the center, `1.0` the right/bottom edge. Values outside that
/// range are allowed and put the pivot outside the object.
///
/// Entities store an `Option<Anchor>`; `None` selects the legacy center mode
/// of [`Transform::update`](crate::transform::Transform::update).
///
/// # Example
/// ```
/// use paneframe::Anchor;
///
/// // Rotate around the bottom-right corner
/// let (x, y) = Anchor::BOTTOM_RIGHT.resolve(100.0, 50.0);
/// assert_eq!((x, y), (100.0, 50.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// Horizontal position of the pivot
    pub x: f64,
    /// Vertical position of the pivot
    pub y: f64,
}

impl Anchor {
    /// Center of the object (0.5, 0.5)
    pub const CENTER: Self = Self::new(0.5, 0.5);

    /// Top-left corner (0, 0)
    pub const TOP_LEFT: Self = Self::new(0.0, 0.0);

    /// Top center (0.5, 0)
    pub const TOP: Self = Self::new(0.5, 0.0);

    /// Top-right corner (1, 0)
    pub const TOP_RIGHT: Self = Self::new(1.0, 0.0);

    /// Center left (0, 0.5)
    pub const LEFT: Self = Self::new(0.0, 0.5);

    /// Center right (1, 0.5)
    pub const RIGHT: Self = Self::new(1.0, 0.5);

    /// Bottom-left corner (0, 1)
    pub const BOTTOM_LEFT: Self = Self::new(0.0, 1.0);

    /// Bottom center (0.5, 1)
    pub const BOTTOM: Self = Self::new(0.5, 1.0);

    /// Bottom-right corner (1, 1)
    pub const BOTTOM_RIGHT: Self = Self::new(1.0, 1.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Resolve to absolute coordinates within a `width × height` object.
    pub fn resolve(&self, width: f64, height: f64) -> (f64, f64) {
        (self.x * width, self.y * height)
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self::TOP_LEFT
    }
}
