//! Plain value shapes shared by transforms, entities and surfaces.

/// A point or offset in some 2D coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An axis-aligned rectangle described by its four edges.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle spanning `(0, 0)` to `(width, height)`.
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// The smallest rectangle containing every point, or `None` for an empty input.
    pub fn bounding<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut result = Self::new(first.x, first.y, first.x, first.y);
        for p in points {
            if result.left > p.x {
                result.left = p.x;
            }
            if result.right < p.x {
                result.right = p.x;
            }
            if result.top > p.y {
                result.top = p.y;
            }
            if result.bottom < p.y {
                result.bottom = p.y;
            }
        }
        Some(result)
    }

    /// The four corners, clockwise from the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right, self.top),
            Point::new(self.right, self.bottom),
            Point::new(self.left, self.bottom),
        ]
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Strict containment: points on an edge are outside.
    pub fn contains_strict(&self, p: Point) -> bool {
        self.left < p.x && p.x < self.right && self.top < p.y && p.y < self.bottom
    }
}

/// A rectangle described by its origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Area {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Area {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the area covers no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Pixel dimensions needed to hold this area, rounded up.
    ///
    /// Negative sizes clamp to zero.
    pub fn pixel_size(&self) -> (u32, u32) {
        (ceil_to_pixels(self.width), ceil_to_pixels(self.height))
    }
}

pub(crate) fn ceil_to_pixels(v: f64) -> u32 {
    if v.is_nan() || v <= 0.0 {
        0
    } else {
        v.ceil().min(u32::MAX as f64) as u32
    }
}

/// Space between a container's edges and the area its children are drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub const ZERO: Padding = Padding::all(0.0);

    pub const fn all(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn symmetric(horizontal: f64, vertical: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// The content area of a `width × height` box inside this padding.
    ///
    /// The result is not clamped; oversized padding yields a non-positive size.
    pub fn content_area(&self, width: f64, height: f64) -> Area {
        Area {
            x: self.left,
            y: self.top,
            width: width - self.left - self.right,
            height: height - self.top - self.bottom,
        }
    }

    /// The content rectangle of a `width × height` box, as edges.
    pub fn content_rect(&self, width: f64, height: f64) -> Rect {
        Rect::new(self.left, self.top, width - self.right, height - self.bottom)
    }
}

impl From<f64> for Padding {
    fn from(v: f64) -> Self {
        Padding::all(v)
    }
}

impl From<i32> for Padding {
    fn from(v: i32) -> Self {
        Padding::all(f64::from(v))
    }
}

impl From<u32> for Padding {
    fn from(v: u32) -> Self {
        Padding::all(f64::from(v))
    }
}

/// `[vertical, horizontal]` shorthand.
impl From<[f64; 2]> for Padding {
    fn from(v: [f64; 2]) -> Self {
        Padding::symmetric(v[1], v[0])
    }
}

/// `[top, right, bottom, left]` shorthand.
impl From<[f64; 4]> for Padding {
    fn from(v: [f64; 4]) -> Self {
        Padding::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Rect> for Padding {
    /// Reads the rectangle's edges as per-side padding amounts.
    fn from(r: Rect) -> Self {
        Padding::new(r.top, r.right, r.bottom, r.left)
    }
}

/// Straight-alpha color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}
