//! Mapping an ordered point sequence to curve parameters in `[0, 1]`.

use super::core::{ControlPoint, Tolerance};
use super::curve_fit::CurveFitError;

/// How parameter values are spaced along the input points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parameterization {
    /// Parameters proportional to cumulative chord length.
    #[default]
    ChordLength,
    /// Parameters proportional to cumulative square-rooted chord length.
    /// Less sensitive to sharp turns and uneven point spacing.
    Centripetal,
}

impl Parameterization {
    #[must_use]
    pub const fn from_centripetal(centripetal: bool) -> Self {
        if centripetal { Self::Centripetal } else { Self::ChordLength }
    }

    fn chord_weight(self, chord: f64) -> f64 {
        match self {
            Self::ChordLength => chord,
            Self::Centripetal => chord.sqrt(),
        }
    }
}

/// Computes non-decreasing parameters `u_0 = 0 ..= u_last = 1`, one per point.
///
/// Repeated consecutive points produce repeated parameters; the caller decides
/// whether that is acceptable for its system.
///
/// # Errors
/// * [`CurveFitError::DegenerateInput`] for fewer than 2 points or if all
///   points coincide.
/// * [`CurveFitError::NonFinitePoint`] if any coordinate is NaN or infinite.
pub fn parameterize<P: ControlPoint>(
    points: &[P],
    method: Parameterization,
) -> Result<Vec<f64>, CurveFitError> {
    if points.len() < 2 {
        return Err(CurveFitError::DegenerateInput {
            reason: format!("{} point(s) span no parameter range", points.len()),
        });
    }
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(CurveFitError::NonFinitePoint { index });
    }

    let mut params = Vec::with_capacity(points.len());
    params.push(0.0);

    let mut total = 0.0;
    for window in points.windows(2) {
        total += method.chord_weight(window[1].distance_between(window[0]));
        params.push(total);
    }

    if Tolerance::ZERO_LENGTH.is_zero_length(total) {
        return Err(CurveFitError::DegenerateInput {
            reason: format!("all {} points coincide (total chord length {total})", points.len()),
        });
    }

    for value in &mut params {
        *value /= total;
    }
    // Pin the end so later comparisons against 1.0 are exact.
    if let Some(last) = params.last_mut() {
        *last = 1.0;
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::core::{Point2, Point3};

    #[test]
    fn chord_length_follows_distances() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(4.0, 0.0),
        ];
        let params = parameterize(&points, Parameterization::ChordLength).unwrap();
        assert_eq!(params.len(), 3);
        assert!((params[1] - 0.25).abs() < 1e-12);
        assert_eq!(params[0], 0.0);
        assert_eq!(params[2], 1.0);
    }

    #[test]
    fn centripetal_uses_square_root_of_chords() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(5.0, 0.0),
        ];
        // sqrt(1) = 1, sqrt(4) = 2
        let params = parameterize(&points, Parameterization::Centripetal).unwrap();
        assert!((params[1] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn equal_chords_make_methods_coincide() {
        let points: Vec<Point3> = (0..6)
            .map(|i| {
                let angle = f64::from(i) * 0.4;
                Point3::new(angle.cos(), angle.sin(), 0.0)
            })
            .collect();
        let chord = parameterize(&points, Parameterization::ChordLength).unwrap();
        let centripetal = parameterize(&points, Parameterization::Centripetal).unwrap();
        for (a, b) in chord.iter().zip(&centripetal) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn repeated_point_gives_repeated_parameter() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        let params = parameterize(&points, Parameterization::ChordLength).unwrap();
        assert_eq!(params[1], params[2]);
        assert!(params.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn degenerate_inputs_fail() {
        let single = [Point2::new(1.0, 1.0)];
        assert!(matches!(
            parameterize(&single, Parameterization::ChordLength),
            Err(CurveFitError::DegenerateInput { .. })
        ));
        assert!(matches!(
            parameterize::<Point2>(&[], Parameterization::Centripetal),
            Err(CurveFitError::DegenerateInput { .. })
        ));

        let coincident = [Point2::new(1.0, 1.0); 4];
        assert!(matches!(
            parameterize(&coincident, Parameterization::Centripetal),
            Err(CurveFitError::DegenerateInput { .. })
        ));

        let nan = [Point2::new(0.0, 0.0), Point2::new(f64::NAN, 1.0)];
        assert!(matches!(
            parameterize(&nan, Parameterization::ChordLength),
            Err(CurveFitError::NonFinitePoint { index: 1 })
        ));
    }

    #[test]
    fn from_centripetal_flag() {
        assert_eq!(Parameterization::from_centripetal(true), Parameterization::Centripetal);
        assert_eq!(Parameterization::from_centripetal(false), Parameterization::ChordLength);
    }
}
