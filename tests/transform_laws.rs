use paneframe::{Anchor, Point, Transform};

const EPS: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

fn assert_identity(t: &Transform) {
    let m = t.coefficients();
    let expected = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
    for (got, want) in m.iter().zip(expected) {
        assert!(approx_eq(*got, want), "{:?} is not the identity", m);
    }
}

/// Placements covering both pivot modes, non-uniform scale and mirroring.
fn placements() -> Vec<(f64, f64, f64, f64, f64, f64, f64, Option<f64>, Option<f64>)> {
    vec![
        (100.0, 50.0, 1.0, 1.0, 0.0, 10.0, 20.0, Some(0.0), Some(0.0)),
        (100.0, 50.0, 2.0, 0.5, 33.0, -4.0, 7.5, Some(0.25), Some(1.0)),
        (64.0, 64.0, -1.0, 1.0, 180.0, 3.0, 3.0, None, None),
        (12.0, 30.0, 1.5, 1.5, -75.0, 0.0, 0.0, Some(0.5), None),
        (1.0, 1.0, 0.1, 10.0, 359.0, 1e3, -1e3, Some(Anchor::CENTER.x), Some(Anchor::CENTER.y)),
    ]
}

#[test]
fn test_update_times_update_by_inverse_is_identity() {
    for (w, h, sx, sy, angle, x, y, ax, ay) in placements() {
        let mut forward = Transform::new();
        forward.update(w, h, sx, sy, angle, x, y, ax, ay);
        let mut inverse = Transform::new();
        inverse.update_by_inverse(w, h, sx, sy, angle, x, y, ax, ay);

        assert_identity(&forward.multiply_new(&inverse));
        assert_identity(&inverse.multiply_new(&forward));
    }
}

#[test]
fn test_update_is_deterministic() {
    for (w, h, sx, sy, angle, x, y, ax, ay) in placements() {
        let mut a = Transform::new();
        let mut b = Transform::new();
        a.update(w, h, sx, sy, angle, x, y, ax, ay);
        b.update(w, h, sx, sy, angle, x, y, ax, ay);
        a.update(w, h, sx, sy, angle, x, y, ax, ay);
        assert_eq!(a.coefficients(), b.coefficients());
    }
}

#[test]
fn test_update_by_inverse_is_deterministic() {
    for (w, h, sx, sy, angle, x, y, ax, ay) in placements() {
        let mut a = Transform::new();
        let mut b = Transform::from_coefficients([3.0, 1.0, 4.0, 1.0, 5.0, 9.0]);
        a.update_by_inverse(w, h, sx, sy, angle, x, y, ax, ay);
        b.update_by_inverse(w, h, sx, sy, angle, x, y, ax, ay);
        a.update_by_inverse(w, h, sx, sy, angle, x, y, ax, ay);
        let bits = |t: &Transform| t.coefficients().map(f64::to_bits);
        assert_eq!(bits(&a), bits(&b));
    }
}

#[test]
fn test_anchored_and_center_modes_differ() {
    let anchored = Transform::from_placement(100.0, 50.0, 1.0, 1.0, 90.0, 0.0, 0.0, Some(0.5), Some(0.5));
    let center = Transform::from_placement(100.0, 50.0, 1.0, 1.0, 90.0, 0.0, 0.0, None, None);
    assert_ne!(anchored.coefficients(), center.coefficients());

    let p = anchored.multiply_point(Point::new(50.0, 25.0));
    assert!(approx_eq(p.x, 0.0) && approx_eq(p.y, 0.0));
}

#[test]
fn test_point_and_inverse_point_are_dual() {
    let points = [
        Point::new(0.0, 0.0),
        Point::new(17.0, -3.0),
        Point::new(100.0, 50.0),
    ];
    for (w, h, sx, sy, angle, x, y, ax, ay) in placements() {
        let t = Transform::from_placement(w, h, sx, sy, angle, x, y, ax, ay);
        for p in points {
            let back = t.multiply_inverse_for_point(t.multiply_point(p));
            assert!(approx_eq(back.x, p.x) && approx_eq(back.y, p.y));
        }
    }
}

#[test]
fn test_translation_then_rotation_by_hand() {
    // Rotate 90° about the origin, then move by (10, 0).
    let mut t = Transform::translation(10.0, 0.0);
    t.multiply(&Transform::rotation_degrees(90.0));
    let p = t.multiply_point(Point::new(1.0, 0.0));
    assert!(approx_eq(p.x, 10.0));
    assert!(approx_eq(p.y, 1.0));

    // Same factors in the other order: move first, then rotate.
    let mut u = Transform::translation(10.0, 0.0);
    u.multiply_left(&Transform::rotation_degrees(90.0));
    let q = u.multiply_point(Point::new(1.0, 0.0));
    assert!(approx_eq(q.x, 0.0));
    assert!(approx_eq(q.y, 11.0));
}

#[test]
fn test_clone_is_independent() {
    let mut original = Transform::from_placement(10.0, 10.0, 1.0, 1.0, 45.0, 1.0, 2.0, None, None);
    let copy = original.clone();
    original.scale(3.0, 3.0);
    original.reset(Some(5.0), None);
    assert_ne!(original.coefficients(), copy.coefficients());
    assert_eq!(
        copy.coefficients(),
        Transform::from_placement(10.0, 10.0, 1.0, 1.0, 45.0, 1.0, 2.0, None, None).coefficients()
    );
}

#[test]
fn test_reference_placements() {
    let mut t = Transform::new();
    t.update(100.0, 50.0, 1.0, 1.0, 0.0, 10.0, 20.0, Some(0.0), Some(0.0));
    assert_eq!(t.coefficients(), [1.0, 0.0, 0.0, 1.0, 10.0, 20.0]);

    // Anchored placements put the anchor at (x, y).
    t.update(100.0, 50.0, 1.0, 1.0, 90.0, 50.0, 25.0, Some(0.5), Some(0.5));
    let center = t.multiply_point(Point::new(50.0, 25.0));
    assert!(approx_eq(center.x, 50.0));
    assert!(approx_eq(center.y, 25.0));

    // The center mode keeps (x, y) as the top-left corner.
    t.update(100.0, 50.0, 1.0, 1.0, 90.0, 0.0, 0.0, None, None);
    let center = t.multiply_point(Point::new(50.0, 25.0));
    assert!(approx_eq(center.x, 50.0));
    assert!(approx_eq(center.y, 25.0));
}
