use crate::geom::{ControlPoint, CurveFitError, Point2, Point3, Tolerance, interpolate_bezier};

fn zigzag() -> Vec<Point2> {
    vec![
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 2.0),
        Point2::new(3.0, 1.5),
        Point2::new(4.0, -1.0),
        Point2::new(6.0, 0.5),
        Point2::new(7.0, 0.0),
    ]
}

#[test]
fn two_points_give_one_straight_segment() {
    let segments = interpolate_bezier(&[Point2::new(0.0, 0.0), Point2::new(5.0, 0.0)]).unwrap();
    assert_eq!(segments.len(), 1);

    let tol = Tolerance::new(1e-12);
    let [p0, p1, p2, p3] = segments[0].control_points();
    assert_eq!(p0, Point2::new(0.0, 0.0));
    assert!(tol.approx_eq_point(p1, Point2::new(5.0 / 3.0, 0.0)));
    assert!(tol.approx_eq_point(p2, Point2::new(10.0 / 3.0, 0.0)));
    assert_eq!(p3, Point2::new(5.0, 0.0));
    assert!([p0, p1, p2, p3].iter().all(|p| p.y == 0.0));
}

#[test]
fn segments_join_at_the_input_points() {
    let points = zigzag();
    let segments = interpolate_bezier(&points).unwrap();
    assert_eq!(segments.len(), points.len() - 1);

    for (i, segment) in segments.iter().enumerate() {
        assert_eq!(segment.start(), points[i]);
        assert_eq!(segment.end(), points[i + 1]);
        assert_eq!(segment.point_at(0.0), points[i]);
        assert_eq!(segment.point_at(1.0), points[i + 1]);
    }
}

#[test]
fn joins_are_tangent_continuous() {
    let segments = interpolate_bezier(&zigzag()).unwrap();
    let tol = Tolerance::new(1e-9);
    for pair in segments.windows(2) {
        let outgoing = pair[0].derivative_at(1.0);
        let incoming = pair[1].derivative_at(0.0);
        assert!(tol.approx_eq_point(outgoing, incoming));
    }
}

#[test]
fn joins_are_curvature_continuous() {
    // Second derivative at t=1 is 6(P1 - 2P2 + P3), at t=0 it is 6(P0 - 2P1 + P2).
    let segments = interpolate_bezier(&zigzag()).unwrap();
    let tol = Tolerance::new(1e-9);
    for pair in segments.windows(2) {
        let a = pair[0];
        let b = pair[1];
        let end = a.p1.combine(1.0, a.p2, -2.0).plus(a.p3);
        let start = b.p0.combine(1.0, b.p1, -2.0).plus(b.p2);
        assert!(tol.approx_eq_point(end, start));
    }
}

#[test]
fn works_in_three_dimensions() {
    let points = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(2.0, 0.0, 2.0),
        Point3::new(3.0, -1.0, 1.0),
    ];
    let segments = interpolate_bezier(&points).unwrap();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[2].end(), points[3]);
}

#[test]
fn empty_input_is_an_error() {
    assert!(matches!(
        interpolate_bezier::<Point3>(&[]),
        Err(CurveFitError::EmptyInput)
    ));
}
