//! B-spline basis evaluation over clamped knot vectors.
//!
//! All functions are pure and allocate only their return value, so they can
//! be called from any number of threads at once.

/// Locate the knot span `[knots[s], knots[s + 1])` containing `u`.
///
/// `control_point_count` is the number of control points the knot vector
/// belongs to (`knots.len() == control_point_count + degree + 1`). Parameters
/// at or beyond the end of the domain map to the last non-empty span so that
/// `u == 1` evaluates the final control point.
#[must_use]
pub fn find_span(control_point_count: usize, degree: usize, u: f64, knots: &[f64]) -> usize {
    let n = control_point_count - 1;
    if u >= knots[n + 1] {
        return n;
    }
    if u <= knots[degree] {
        return degree;
    }

    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// The `degree + 1` basis functions that are nonzero on `span`, evaluated at `u`.
///
/// Entry `j` of the result is `N_{span - degree + j, degree}(u)`. The values
/// are non-negative and sum to one (partition of unity).
#[must_use]
pub fn basis_functions(degree: usize, knots: &[f64], span: usize, u: f64) -> Vec<f64> {
    let mut values = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    values[0] = 1.0;

    for j in 1..=degree {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom == 0.0 { 0.0 } else { values[r] / denom };
            values[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        values[j] = saved;
    }

    values
}

/// A single basis function `N_{i,degree}(u)`.
///
/// Slower than [`basis_functions`] when several functions on the same span are
/// needed, but convenient for picking out one column of a collocation matrix.
#[must_use]
pub fn one_basis_function(degree: usize, knots: &[f64], i: usize, u: f64) -> f64 {
    let m = knots.len() - 1;

    // Clamped end conditions: the first and last functions are 1 at the domain ends.
    if (i == 0 && u == knots[0]) || (i == m - degree - 1 && u == knots[m]) {
        return 1.0;
    }
    if u < knots[i] || u >= knots[i + degree + 1] {
        return 0.0;
    }

    // Degree-zero functions on the support, raised one degree at a time.
    let mut table: Vec<f64> = (0..=degree)
        .map(|j| {
            if u >= knots[i + j] && u < knots[i + j + 1] {
                1.0
            } else {
                0.0
            }
        })
        .collect();

    for k in 1..=degree {
        let mut saved = if table[0] == 0.0 {
            0.0
        } else {
            ((u - knots[i]) * table[0]) / (knots[i + k] - knots[i])
        };
        for j in 0..(degree - k + 1) {
            let u_left = knots[i + j + 1];
            let u_right = knots[i + j + k + 1];
            if table[j + 1] == 0.0 {
                table[j] = saved;
                saved = 0.0;
            } else {
                let temp = table[j + 1] / (u_right - u_left);
                table[j] = saved + (u_right - u) * temp;
                saved = (u - u_left) * temp;
            }
        }
    }

    table[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBIC_KNOTS: [f64; 11] = [0.0, 0.0, 0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 1.0, 1.0, 1.0];

    #[test]
    fn span_search_handles_domain_ends() {
        // 7 control points, degree 3
        assert_eq!(find_span(7, 3, 0.0, &CUBIC_KNOTS), 3);
        assert_eq!(find_span(7, 3, 0.1, &CUBIC_KNOTS), 3);
        assert_eq!(find_span(7, 3, 0.25, &CUBIC_KNOTS), 4);
        assert_eq!(find_span(7, 3, 0.6, &CUBIC_KNOTS), 5);
        assert_eq!(find_span(7, 3, 1.0, &CUBIC_KNOTS), 6);
    }

    #[test]
    fn basis_functions_form_partition_of_unity() {
        for step in 0..=40 {
            let u = f64::from(step) / 40.0;
            let span = find_span(7, 3, u, &CUBIC_KNOTS);
            let values = basis_functions(3, &CUBIC_KNOTS, span, u);
            assert_eq!(values.len(), 4);
            let sum: f64 = values.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "sum {sum} at u={u}");
            assert!(values.iter().all(|v| *v >= -1e-15));
        }
    }

    #[test]
    fn bernstein_values_on_single_span() {
        let knots = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let values = basis_functions(2, &knots, 2, 0.5);
        assert!((values[0] - 0.25).abs() < 1e-12);
        assert!((values[1] - 0.5).abs() < 1e-12);
        assert!((values[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn one_basis_function_matches_span_evaluation() {
        for step in 0..=20 {
            let u = f64::from(step) / 20.0;
            let span = find_span(7, 3, u, &CUBIC_KNOTS);
            let values = basis_functions(3, &CUBIC_KNOTS, span, u);
            for (j, expected) in values.iter().enumerate() {
                let single = one_basis_function(3, &CUBIC_KNOTS, span - 3 + j, u);
                assert!(
                    (single - expected).abs() < 1e-12,
                    "N_{} at u={u}: {single} vs {expected}",
                    span - 3 + j
                );
            }
        }
    }

    #[test]
    fn one_basis_function_is_zero_outside_support() {
        assert_eq!(one_basis_function(3, &CUBIC_KNOTS, 0, 0.5), 0.0);
        assert_eq!(one_basis_function(3, &CUBIC_KNOTS, 6, 0.2), 0.0);
        assert_eq!(one_basis_function(3, &CUBIC_KNOTS, 6, 1.0), 1.0);
        assert_eq!(one_basis_function(3, &CUBIC_KNOTS, 0, 0.0), 1.0);
    }
}
