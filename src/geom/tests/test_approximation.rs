use crate::geom::{
    CurveFitError, CurveFitOptions, FitMode, Parameterization, Point2, Point3, Tolerance,
    approximate_curve, fit_curve, parameterize,
};

fn quarter_circle(count: usize) -> Vec<Point2> {
    (0..count)
        .map(|i| {
            let angle = std::f64::consts::FRAC_PI_2 * i as f64 / (count - 1) as f64;
            Point2::new(angle.cos(), angle.sin())
        })
        .collect()
}

#[test]
fn collinear_points_are_reproduced_exactly() {
    let points: Vec<Point3> = (0..8)
        .map(|i| {
            let x = f64::from(i);
            Point3::new(x, 2.0 * x + 1.0, -x)
        })
        .collect();
    let (curve, diagnostics) = fit_curve(&points, CurveFitOptions::approximating()).unwrap();

    assert_eq!(curve.control_points().len(), 7);
    assert!(diagnostics.max_deviation < 1e-9, "{}", diagnostics.max_deviation);

    // Anywhere on the curve stays on the line.
    for step in 0..=20 {
        let p = curve.point_at(f64::from(step) / 20.0).unwrap();
        assert!((p.y - (2.0 * p.x + 1.0)).abs() < 1e-9);
        assert!((p.z + p.x).abs() < 1e-9);
    }
}

#[test]
fn one_less_control_point_approaches_interpolation() {
    let mut previous = f64::INFINITY;
    for count in [6, 10, 30] {
        let points = quarter_circle(count);
        let (curve, diagnostics) = fit_curve(&points, CurveFitOptions::approximating()).unwrap();
        assert_eq!(curve.control_points().len(), count - 1);
        assert!(
            diagnostics.max_deviation < previous,
            "{count} points: {}",
            diagnostics.max_deviation
        );
        previous = diagnostics.max_deviation;
    }
    assert!(previous < 1e-8, "{previous}");
}

#[test]
fn dense_fit_matches_samples_at_their_parameters() {
    let points = quarter_circle(30);
    let curve = approximate_curve(&points, 3, Some(29), Parameterization::ChordLength).unwrap();
    let params = parameterize(&points, Parameterization::ChordLength).unwrap();

    let tol = Tolerance::new(1e-8);
    for (point, u) in points.iter().zip(params) {
        assert!(tol.approx_eq_point(curve.point_at(u).unwrap(), *point));
    }
}

#[test]
fn few_control_points_smooth_the_data() {
    let points = quarter_circle(30);
    let options = CurveFitOptions::default()
        .with_control_point_count(6)
        .centripetal();
    let (curve, diagnostics) = fit_curve(&points, options).unwrap();

    assert_eq!(curve.control_points().len(), 6);
    assert_eq!(diagnostics.control_point_count, 6);
    assert!(diagnostics.max_deviation < 5e-3, "{}", diagnostics.max_deviation);
    assert!(diagnostics.max_deviation > 0.0);
}

#[test]
fn approximation_keeps_end_points() {
    let points = quarter_circle(15);
    let curve = approximate_curve(&points, 2, Some(7), Parameterization::ChordLength).unwrap();
    let tol = Tolerance::default();
    assert_eq!(curve.control_points()[0], points[0]);
    assert_eq!(curve.control_points()[6], points[14]);
    assert!(tol.approx_eq_point(curve.point_at(0.0).unwrap(), points[0]));
    assert!(tol.approx_eq_point(curve.point_at(1.0).unwrap(), points[14]));
}

#[test]
fn default_control_point_count_is_one_less_than_points() {
    let points = quarter_circle(10);
    let options = CurveFitOptions::approximating();
    assert_eq!(options.mode, FitMode::Approximate { control_points: None });
    let (curve, _) = fit_curve(&points, options).unwrap();
    assert_eq!(curve.control_points().len(), 9);
}

#[test]
fn too_few_points_fail_before_solving() {
    let points = quarter_circle(3);
    assert!(matches!(
        approximate_curve(&points, 3, None, Parameterization::ChordLength),
        Err(CurveFitError::InsufficientPoints { provided: 3, required: 4 })
    ));
}

#[test]
fn control_point_count_must_fit_between_degree_and_point_count() {
    let points = quarter_circle(8);
    for count in [3, 8, 12] {
        assert!(matches!(
            approximate_curve(&points, 3, Some(count), Parameterization::ChordLength),
            Err(CurveFitError::InvalidDegreeOfFreedom { .. })
        ));
    }
    assert!(approximate_curve(&points, 3, Some(4), Parameterization::ChordLength).is_ok());
}
