use super::core::ControlPoint;
use super::curve::CubicBezier;
use super::curve_fit::CurveFitError;
use super::fit_system::solve_per_dimension;
use super::linalg::Matrix;
use super::metrics::{FitMetrics, TimingBucket};

/// Piecewise cubic Bézier interpolation through `points`.
///
/// Returns one segment per consecutive pair of points. Adjacent segments share
/// their end point and are C2 at the joins; the second derivative vanishes at
/// both ends.
///
/// A single point yields no segments. Two points yield the straight segment
/// with inner control points at the thirds.
///
/// # Errors
/// * [`CurveFitError::EmptyInput`] for an empty slice.
/// * [`CurveFitError::NonFinitePoint`] for NaN or infinite coordinates.
pub fn interpolate_bezier<P: ControlPoint>(
    points: &[P],
) -> Result<Vec<CubicBezier<P>>, CurveFitError> {
    if points.is_empty() {
        return Err(CurveFitError::EmptyInput);
    }
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(CurveFitError::NonFinitePoint { index });
    }
    if points.len() == 1 {
        return Ok(Vec::new());
    }

    let mut metrics = FitMetrics::default();
    metrics.begin();
    let segments = metrics.time(TimingBucket::Bezier, || build_segments(points))?;
    if let Some(report) = metrics.end() {
        log::debug!("bezier fit of {} points: {} ns", points.len(), report.bezier_ns);
    }
    Ok(segments)
}

fn build_segments<P: ControlPoint>(points: &[P]) -> Result<Vec<CubicBezier<P>>, CurveFitError> {
    let n = points.len() - 1;
    let k = points;

    let (matrix, rhs) = if n == 1 {
        (
            Matrix::from_diagonals(1, &[(0, 3.0)]),
            vec![k[0].combine(2.0, k[1], 1.0)],
        )
    } else {
        let mut matrix = Matrix::from_diagonals(n, &[(-1, 1.0), (0, 4.0), (1, 1.0)]);
        matrix[(0, 0)] = 2.0;
        matrix[(n - 1, n - 2)] = 2.0;
        matrix[(n - 1, n - 1)] = 7.0;

        let mut rhs = Vec::with_capacity(n);
        rhs.push(k[0].combine(1.0, k[1], 2.0));
        for i in 1..n - 1 {
            rhs.push(k[i].combine(4.0, k[i + 1], 2.0));
        }
        rhs.push(k[n - 1].combine(8.0, k[n], 1.0));
        (matrix, rhs)
    };

    let first = solve_per_dimension(&matrix, &rhs)?;
    let second: Vec<P> = (0..n)
        .map(|i| {
            if i + 1 < n {
                k[i + 1].combine(2.0, first[i + 1], -1.0)
            } else {
                first[i].combine(0.5, k[n], 0.5)
            }
        })
        .collect();

    log::trace!("bezier system {n}x{n} solved");
    Ok((0..n)
        .map(|i| CubicBezier::new(k[i], first[i], second[i], k[i + 1]))
        .collect())
}
