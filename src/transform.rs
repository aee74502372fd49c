use crate::anchor::Anchor;
use crate::error::{Error, Result};
use crate::geometry::Point;

/// A 2D affine transform stored as six coefficients `[a, b, c, d, e, f]`.
///
/// The layout follows the canvas `transform(a, b, c, d, e, f)` convention:
///
/// ```text
///   a c e
/// [ b d f ]
///   0 0 1
/// ```
///
/// so a point maps as `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`.
///
/// The `dirty` flag is advisory. Nothing in this type reads it; the entity
/// owning the transform sets it when its placement changes and clears it after
/// recomputing.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    m: [f64; 6],
    dirty: bool,
}

impl Transform {
    /// Identity matrix (no transformation)
    pub const IDENTITY: Self = Self {
        m: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        dirty: false,
    };

    /// Create an identity transform
    pub fn new() -> Self {
        Self::IDENTITY
    }

    pub fn from_coefficients(m: [f64; 6]) -> Self {
        Self { m, dirty: false }
    }

    /// Create a translation transform
    pub fn translation(x: f64, y: f64) -> Self {
        Self::from_coefficients([1.0, 0.0, 0.0, 1.0, x, y])
    }

    /// Create a rotation transform from degrees
    pub fn rotation_degrees(angle: f64) -> Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        Self::from_coefficients([cos, sin, -sin, cos, 0.0, 0.0])
    }

    /// Create a non-uniform scale transform
    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::from_coefficients([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// Create a transform placing a `width × height` object, see [`Transform::update`].
    #[allow(clippy::too_many_arguments)]
    pub fn from_placement(
        width: f64,
        height: f64,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        x: f64,
        y: f64,
        anchor_x: Option<f64>,
        anchor_y: Option<f64>,
    ) -> Self {
        let mut t = Self::new();
        t.update(
            width, height, scale_x, scale_y, angle, x, y, anchor_x, anchor_y,
        );
        t
    }

    pub fn coefficients(&self) -> [f64; 6] {
        self.m
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Check if this is the identity transform
    pub fn is_identity(&self) -> bool {
        self.m == Self::IDENTITY.m
    }

    pub fn determinant(&self) -> f64 {
        self.m[0] * self.m[3] - self.m[2] * self.m[1]
    }

    /// Recompute the matrix for an object of `width × height`.
    ///
    /// The result is `M = A⁻¹ · T · R · S · A`: the object is scaled, then
    /// rotated by `angle` degrees (clockwise on a y-down surface) about the
    /// pivot `(anchor_x * width, anchor_y * height)`, and the pivot is placed
    /// at `(x, y)`.
    ///
    /// If either anchor is `None` the pivot is the geometric center, but
    /// `(x, y)` keeps referring to the unrotated top-left corner, so the
    /// center ends up at `(x + width / 2, y + height / 2)`. This is not the
    /// same as passing `Some(0.5)` for both anchors.
    ///
    /// With `c, s` the cosine and sine of the angle, `sx, sy` the scale and
    /// `w, h` the pivot, the factors are
    ///
    /// ```text
    ///        1  0 -w        sx  0  0        c -s  0        1  0  x
    /// A = [  0  1 -h ]  S = [ 0 sy  0 ]  R = [ s  c  0 ]  T = [ 0  1  y ]
    ///        0  0  1         0  0  1         0  0  1         0  0  1
    /// ```
    ///
    /// and the product is written out element by element below.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        width: f64,
        height: f64,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        x: f64,
        y: f64,
        anchor_x: Option<f64>,
        anchor_y: Option<f64>,
    ) {
        let (w, h, ox, oy) = pivot(width, height, anchor_x, anchor_y);
        let (sin, cos) = angle.to_radians().sin_cos();
        let a = cos * scale_x;
        let b = sin * scale_x;
        let c = sin * scale_y;
        let d = cos * scale_y;
        self.m = [
            a,
            b,
            -c,
            d,
            -a * w + c * h + ox + x,
            -b * w - d * h + oy + y,
        ];
    }

    /// Recompute the matrix as the inverse of what [`Transform::update`]
    /// produces for the same arguments.
    ///
    /// `M⁻¹ = A⁻¹ · S⁻¹ · R⁻¹ · T⁻¹ · A`, evaluated in closed form instead of
    /// inverting the forward matrix.
    #[allow(clippy::too_many_arguments)]
    pub fn update_by_inverse(
        &mut self,
        width: f64,
        height: f64,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        x: f64,
        y: f64,
        anchor_x: Option<f64>,
        anchor_y: Option<f64>,
    ) {
        let (w, h, ox, oy) = pivot(width, height, anchor_x, anchor_y);
        let (sin, cos) = angle.to_radians().sin_cos();
        let a = cos / scale_x;
        let b = sin / scale_y;
        let c = sin / scale_x;
        let d = cos / scale_y;
        self.m = [
            a,
            -b,
            c,
            d,
            -a * (ox + x) - c * (oy + y) + w,
            b * (ox + x) - d * (oy + y) + h,
        ];
    }

    /// `self = self · other`: `other` is applied first, in the frame `self` establishes.
    pub fn multiply(&mut self, other: &Transform) {
        let m1 = &mut self.m;
        let m2 = &other.m;
        let (m10, m11, m12, m13) = (m1[0], m1[1], m1[2], m1[3]);
        m1[0] = m10 * m2[0] + m12 * m2[1];
        m1[1] = m11 * m2[0] + m13 * m2[1];
        m1[2] = m10 * m2[2] + m12 * m2[3];
        m1[3] = m11 * m2[2] + m13 * m2[3];
        m1[4] = m10 * m2[4] + m12 * m2[5] + m1[4];
        m1[5] = m11 * m2[4] + m13 * m2[5] + m1[5];
    }

    /// `self = other · self`: `self` is applied first, then `other`.
    pub fn multiply_left(&mut self, other: &Transform) {
        let m1 = &other.m;
        let m2 = &mut self.m;
        let (m20, m22, m24) = (m2[0], m2[2], m2[4]);
        m2[0] = m1[0] * m20 + m1[2] * m2[1];
        m2[1] = m1[1] * m20 + m1[3] * m2[1];
        m2[2] = m1[0] * m22 + m1[2] * m2[3];
        m2[3] = m1[1] * m22 + m1[3] * m2[3];
        m2[4] = m1[0] * m24 + m1[2] * m2[5] + m1[4];
        m2[5] = m1[1] * m24 + m1[3] * m2[5] + m1[5];
    }

    /// Non-mutating [`Transform::multiply`].
    pub fn multiply_new(&self, other: &Transform) -> Transform {
        let mut ret = self.clone();
        ret.multiply(other);
        ret
    }

    /// Reset to the identity, optionally translated by `(x, y)`.
    pub fn reset(&mut self, x: Option<f64>, y: Option<f64>) {
        self.m = [1.0, 0.0, 0.0, 1.0, x.unwrap_or(0.0), y.unwrap_or(0.0)];
    }

    /// Scale every coefficient in place; x components by `sx`, y components by `sy`.
    ///
    /// The translation is scaled too, so this is the same as applying the
    /// scale after the existing transform.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        let m = &mut self.m;
        m[0] *= sx;
        m[1] *= sy;
        m[2] *= sx;
        m[3] *= sy;
        m[4] *= sx;
        m[5] *= sy;
    }

    /// Map a point through this matrix.
    pub fn multiply_point(&self, p: Point) -> Point {
        let m = &self.m;
        Point {
            x: m[0] * p.x + m[2] * p.y + m[4],
            y: m[1] * p.x + m[3] * p.y + m[5],
        }
    }

    /// Map a point through the inverse of this matrix without building it.
    ///
    /// The caller must make sure the transform is invertible. With a zero
    /// determinant (for example a zero scale) the result has non-finite
    /// coordinates; use [`Transform::try_multiply_inverse_for_point`] when
    /// that needs to be reported.
    pub fn multiply_inverse_for_point(&self, p: Point) -> Point {
        let m = &self.m;
        let id = 1.0 / (m[0] * m[3] + m[2] * -m[1]);
        Point {
            x: m[3] * id * p.x + -m[2] * id * p.y + (m[5] * m[2] - m[4] * m[3]) * id,
            y: m[0] * id * p.y + -m[1] * id * p.x + (-m[5] * m[0] + m[4] * m[1]) * id,
        }
    }

    /// Checked [`Transform::multiply_inverse_for_point`].
    pub fn try_multiply_inverse_for_point(&self, p: Point) -> Result<Point> {
        let determinant = self.determinant();
        if determinant == 0.0 || !determinant.is_finite() {
            return Err(Error::DegenerateTransform { determinant });
        }
        let mapped = self.multiply_inverse_for_point(p);
        if mapped.is_finite() {
            Ok(mapped)
        } else {
            Err(Error::DegenerateTransform { determinant })
        }
    }

    /// The generic inverse of this matrix.
    pub fn inverse(&self) -> Result<Transform> {
        let determinant = self.determinant();
        if determinant == 0.0 || !determinant.is_finite() {
            return Err(Error::DegenerateTransform { determinant });
        }
        let [a, b, c, d, e, f] = self.m;
        let id = 1.0 / determinant;
        Ok(Transform::from_coefficients([
            d * id,
            -b * id,
            -c * id,
            a * id,
            (c * f - d * e) * id,
            (b * e - a * f) * id,
        ]))
    }
}

/// The pivot `(w, h)` and where it sits before translation `(ox, oy)`.
///
/// Anchored placements move the pivot onto `(x, y)`; the center mode leaves
/// it at the center so `(x, y)` stays the top-left corner.
fn pivot(
    width: f64,
    height: f64,
    anchor_x: Option<f64>,
    anchor_y: Option<f64>,
) -> (f64, f64, f64, f64) {
    match (anchor_x, anchor_y) {
        (Some(ax), Some(ay)) => {
            let (w, h) = Anchor::new(ax, ay).resolve(width, height);
            (w, h, 0.0, 0.0)
        }
        _ => {
            let (w, h) = Anchor::CENTER.resolve(width, height);
            (w, h, w, h)
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn assert_point(p: Point, x: f64, y: f64) {
        assert!(approx_eq(p.x, x), "x: {} != {}", p.x, x);
        assert!(approx_eq(p.y, y), "y: {} != {}", p.y, y);
    }

    #[test]
    fn test_identity() {
        let t = Transform::new();
        assert!(t.is_identity());
        assert!(!t.is_dirty());
        assert_eq!(t.coefficients(), [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_update_translation_only() {
        let mut t = Transform::new();
        t.update(100.0, 50.0, 1.0, 1.0, 0.0, 10.0, 20.0, Some(0.0), Some(0.0));
        assert_eq!(t.coefficients(), [1.0, 0.0, 0.0, 1.0, 10.0, 20.0]);
    }

    #[test]
    fn test_update_rotates_about_center_anchor() {
        let mut t = Transform::new();
        t.update(100.0, 50.0, 1.0, 1.0, 90.0, 50.0, 25.0, Some(0.5), Some(0.5));
        assert_point(t.multiply_point(Point::new(50.0, 25.0)), 50.0, 25.0);
        // Top-left swings to the right of the center on a y-down surface.
        assert_point(t.multiply_point(Point::new(0.0, 0.0)), 75.0, -25.0);
    }

    #[test]
    fn test_anchor_lands_on_position() {
        let t = Transform::from_placement(40.0, 20.0, 2.0, 3.0, 30.0, 7.0, -4.0, Some(1.0), Some(0.5));
        assert_point(t.multiply_point(Point::new(40.0, 10.0)), 7.0, -4.0);
    }

    #[test]
    fn test_center_mode_differs_from_center_anchor() {
        let anchored = Transform::from_placement(100.0, 50.0, 1.0, 1.0, 90.0, 0.0, 0.0, Some(0.5), Some(0.5));
        let center = Transform::from_placement(100.0, 50.0, 1.0, 1.0, 90.0, 0.0, 0.0, None, None);
        assert_ne!(anchored.coefficients(), center.coefficients());
        assert_point(anchored.multiply_point(Point::new(50.0, 25.0)), 0.0, 0.0);
        assert_point(center.multiply_point(Point::new(50.0, 25.0)), 50.0, 25.0);
    }

    #[test]
    fn test_update_by_inverse_inverts_center_mode() {
        let fwd = Transform::from_placement(30.0, 10.0, 0.5, 4.0, 200.0, -6.0, 9.0, None, None);
        let mut inv = Transform::new();
        inv.update_by_inverse(30.0, 10.0, 0.5, 4.0, 200.0, -6.0, 9.0, None, None);
        let p = Point::new(3.0, -8.0);
        let back = inv.multiply_point(fwd.multiply_point(p));
        assert_point(back, p.x, p.y);
    }

    #[test]
    fn test_center_mode_keeps_top_left_reference() {
        let mut t = Transform::new();
        t.update(40.0, 20.0, 2.0, 2.0, 0.0, 5.0, 7.0, None, None);
        // Scaling about the center: the center moves only by (x, y).
        assert_point(t.multiply_point(Point::new(20.0, 10.0)), 25.0, 17.0);
        assert_point(t.multiply_point(Point::new(0.0, 0.0)), -15.0, -3.0);
    }

    #[test]
    fn test_missing_single_anchor_falls_back_to_center() {
        let a = Transform::from_placement(30.0, 10.0, 1.5, 0.5, 33.0, 1.0, 2.0, Some(0.0), None);
        let b = Transform::from_placement(30.0, 10.0, 1.5, 0.5, 33.0, 1.0, 2.0, None, None);
        assert_eq!(a.coefficients(), b.coefficients());
    }

    #[test]
    fn test_update_by_inverse_inverts_update() {
        let mut fwd = Transform::new();
        let mut inv = Transform::new();
        fwd.update(64.0, 32.0, 2.0, 0.5, 30.0, 12.0, -8.0, Some(0.25), Some(1.0));
        inv.update_by_inverse(64.0, 32.0, 2.0, 0.5, 30.0, 12.0, -8.0, Some(0.25), Some(1.0));
        let product = fwd.multiply_new(&inv);
        for (got, want) in product
            .coefficients()
            .iter()
            .zip(Transform::IDENTITY.coefficients())
        {
            assert!(approx_eq(*got, want), "{:?}", product);
        }
    }

    #[test]
    fn test_multiply_applies_other_in_own_frame() {
        let mut t = Transform::translation(10.0, 0.0);
        t.multiply(&Transform::rotation_degrees(90.0));
        // Rotate (1, 0) to (0, 1), then translate.
        assert_point(t.multiply_point(Point::new(1.0, 0.0)), 10.0, 1.0);
    }

    #[test]
    fn test_multiply_left_applies_self_first() {
        let mut t = Transform::translation(10.0, 0.0);
        t.multiply_left(&Transform::rotation_degrees(90.0));
        // Translate (1, 0) to (11, 0), then rotate.
        assert_point(t.multiply_point(Point::new(1.0, 0.0)), 0.0, 11.0);
    }

    #[test]
    fn test_multiply_new_leaves_self_untouched() {
        let t = Transform::translation(3.0, 4.0);
        let product = t.multiply_new(&Transform::scaling(2.0, 2.0));
        assert_eq!(t, Transform::translation(3.0, 4.0));
        assert_point(product.multiply_point(Point::new(1.0, 1.0)), 5.0, 6.0);
    }

    #[test]
    fn test_reset() {
        let mut t = Transform::rotation_degrees(45.0);
        t.reset(Some(7.0), None);
        assert_eq!(t.coefficients(), [1.0, 0.0, 0.0, 1.0, 7.0, 0.0]);
        t.reset(None, None);
        assert!(t.is_identity());
    }

    #[test]
    fn test_scale_scales_translation() {
        let mut t = Transform::translation(10.0, 20.0);
        t.scale(2.0, 3.0);
        assert_eq!(t.coefficients(), [2.0, 0.0, 0.0, 3.0, 20.0, 60.0]);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Transform::translation(1.0, 2.0);
        let mut copy = original.clone();
        copy.scale(5.0, 5.0);
        copy.mark_dirty();
        assert_eq!(original.coefficients(), [1.0, 0.0, 0.0, 1.0, 1.0, 2.0]);
        assert!(!original.is_dirty());
    }

    #[test]
    fn test_inverse_point_roundtrip() {
        let t = Transform::from_placement(20.0, 10.0, 3.0, -2.0, 71.0, 4.0, 9.0, Some(0.3), Some(0.6));
        let p = Point::new(-12.5, 40.25);
        let back = t.multiply_inverse_for_point(t.multiply_point(p));
        assert_point(back, p.x, p.y);
    }

    #[test]
    fn test_degenerate_inverse_point() {
        let t = Transform::scaling(0.0, 1.0);
        let p = t.multiply_inverse_for_point(Point::new(1.0, 1.0));
        assert!(!p.is_finite());
        assert!(matches!(
            t.try_multiply_inverse_for_point(Point::new(1.0, 1.0)),
            Err(Error::DegenerateTransform { .. })
        ));
        assert!(t.inverse().is_err());
    }

    #[test]
    fn test_generic_inverse_matches_closed_form() {
        let fwd = Transform::from_placement(50.0, 20.0, 1.25, 0.75, -20.0, 3.0, 6.0, None, None);
        let mut closed = Transform::new();
        closed.update_by_inverse(50.0, 20.0, 1.25, 0.75, -20.0, 3.0, 6.0, None, None);
        let generic = fwd.inverse().unwrap();
        for (a, b) in generic.coefficients().iter().zip(closed.coefficients()) {
            assert!(approx_eq(*a, b));
        }
    }
}
