//! Clamped knot vectors synthesized from curve parameters.
//!
//! Both synthesizers clamp the ends with `degree + 1` copies of 0 and 1 and
//! differ only in how the interior knots are placed.

use super::core::Tolerance;
use super::curve_fit::CurveFitError;

/// Knot vector for global interpolation, by averaging `degree` consecutive parameters.
///
/// With `has_tangents` the two extra control points introduced by the end
/// derivative rows need two more knots, so the averaging window also covers
/// the first and last parameters.
///
/// The result has `params.len() + degree + 1` entries, plus 2 with tangents.
///
/// # Errors
/// * [`CurveFitError::InvalidDegree`] for degree 0, or degree 1 with tangents.
/// * [`CurveFitError::InsufficientPoints`] for fewer than `degree + 1` parameters.
pub fn interpolation_knots(
    params: &[f64],
    degree: usize,
    has_tangents: bool,
) -> Result<Vec<f64>, CurveFitError> {
    validate_degree(degree, has_tangents)?;
    let n = params.len();
    if n < degree + 1 {
        return Err(CurveFitError::InsufficientPoints {
            provided: n,
            required: degree + 1,
        });
    }

    let (start, end) = averaging_window(n, degree, has_tangents);
    let p = degree as f64;

    let mut knots = Vec::with_capacity(n + degree + 1 + if has_tangents { 2 } else { 0 });
    knots.extend(std::iter::repeat_n(0.0, degree + 1));
    for i in start..end {
        let sum: f64 = params[i..i + degree].iter().sum();
        knots.push(sum / p);
    }
    knots.extend(std::iter::repeat_n(1.0, degree + 1));

    log::trace!("interpolation knots (degree {degree}, tangents {has_tangents}): {knots:?}");
    Ok(knots)
}

/// Half-open range of window starts used by [`interpolation_knots`].
const fn averaging_window(point_count: usize, degree: usize, has_tangents: bool) -> (usize, usize) {
    if has_tangents {
        (0, point_count + 1 - degree)
    } else {
        (1, point_count - degree)
    }
}

/// Knot vector for least-squares approximation with `control_point_count` control points.
///
/// Interior knots are blended from neighbouring parameters at a fixed real
/// stride `d = point_count / (control_point_count - degree)`. This spreads the
/// knots over the data but does not guarantee a parameter in every span: when
/// `control_point_count` approaches `point_count` the first and last interior
/// spans can be very narrow.
///
/// # Errors
/// * [`CurveFitError::InvalidDegree`] for degree 0.
/// * [`CurveFitError::InvalidCurve`] if `params` does not hold `point_count` values.
/// * [`CurveFitError::InvalidDegreeOfFreedom`] unless
///   `degree < control_point_count < point_count`.
pub fn approximation_knots(
    params: &[f64],
    degree: usize,
    control_point_count: usize,
    point_count: usize,
) -> Result<Vec<f64>, CurveFitError> {
    validate_degree(degree, false)?;
    if params.len() != point_count {
        return Err(CurveFitError::InvalidCurve {
            reason: format!("{} parameters for {point_count} points", params.len()),
        });
    }
    if control_point_count <= degree || control_point_count >= point_count {
        return Err(CurveFitError::InvalidDegreeOfFreedom {
            control_points: control_point_count,
            points: point_count,
            degree,
        });
    }

    let free = control_point_count - degree;
    let d = point_count as f64 / free as f64;

    let mut knots = Vec::with_capacity(control_point_count + degree + 1);
    knots.extend(std::iter::repeat_n(0.0, degree + 1));
    for j in 1..free {
        let jd = j as f64 * d;
        let i = jd.floor() as usize;
        let alpha = jd - i as f64;
        knots.push((1.0 - alpha) * params[i - 1] + alpha * params[i]);
    }
    knots.extend(std::iter::repeat_n(1.0, degree + 1));

    log::trace!(
        "approximation knots (degree {degree}, {control_point_count} control points): {knots:?}"
    );
    Ok(knots)
}

fn validate_degree(degree: usize, has_tangents: bool) -> Result<(), CurveFitError> {
    if degree == 0 {
        return Err(CurveFitError::InvalidDegree {
            degree,
            reason: "degree must be >= 1",
        });
    }
    if has_tangents && degree < 2 {
        return Err(CurveFitError::InvalidDegree {
            degree,
            reason: "end tangent constraints require degree >= 2",
        });
    }
    Ok(())
}

/// Distinct knot values with their multiplicities, merged within `tol`.
#[must_use]
pub fn knot_multiplicities(knots: &[f64], tol: Tolerance) -> Vec<(f64, usize)> {
    let Some((&first, rest)) = knots.split_first() else {
        return Vec::new();
    };

    let mut result = Vec::new();
    let mut current = first;
    let mut count = 1usize;
    for &k in rest {
        if tol.approx_eq_f64(k, current) {
            count += 1;
        } else {
            result.push((current, count));
            current = k;
            count = 1;
        }
    }
    result.push((current, count));
    result
}

/// True when `knots` is non-decreasing, starts with `degree + 1` zeros, ends
/// with `degree + 1` ones, and no interior knot repeats more than `degree + 1` times.
#[must_use]
pub fn is_clamped(knots: &[f64], degree: usize, tol: Tolerance) -> bool {
    if knots.len() < 2 * (degree + 1) || !is_non_decreasing(knots) {
        return false;
    }
    let ends_ok = knots[..=degree].iter().all(|k| tol.approx_zero_f64(*k))
        && knots[knots.len() - degree - 1..]
            .iter()
            .all(|k| tol.approx_eq_f64(*k, 1.0));
    ends_ok
        && knot_multiplicities(knots, tol)
            .iter()
            .all(|(_, count)| *count <= degree + 1)
}

#[must_use]
pub fn is_non_decreasing(knots: &[f64]) -> bool {
    knots.windows(2).all(|w| w[0] <= w[1])
}
