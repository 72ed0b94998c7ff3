//! Linear systems whose solutions are the control points of a fitted curve.
//!
//! Each assembler samples the basis functions at the point parameters and
//! places the nonzero values in the columns of the control points that are
//! still unknown. Control points fixed by the input (the curve ends) move
//! their contribution to the right-hand side.

use super::basis::{basis_functions, find_span};
use super::core::ControlPoint;
use super::curve_fit::CurveFitError;
use super::linalg::{LuDecomposition, Matrix};

/// Square coefficient matrix and one right-hand-side point per row.
///
/// Keeping the right-hand side as points lets one factorization serve every
/// coordinate axis.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSystem<P: ControlPoint> {
    pub matrix: Matrix,
    pub rhs: Vec<P>,
}

impl<P: ControlPoint> FitSystem<P> {
    /// Number of unknown control points.
    #[must_use]
    pub fn unknowns(&self) -> usize {
        self.matrix.cols()
    }

    /// # Errors
    /// See [`solve_per_dimension`].
    pub fn solve(&self) -> Result<Vec<P>, CurveFitError> {
        solve_per_dimension(&self.matrix, &self.rhs)
    }
}

/// Maps control point indices `first..first + count` onto matrix columns `0..count`.
#[derive(Debug, Clone, Copy)]
struct FreeColumns {
    first: usize,
    count: usize,
}

impl FreeColumns {
    fn column(self, control_index: usize) -> Option<usize> {
        control_index
            .checked_sub(self.first)
            .filter(|col| *col < self.count)
    }
}

/// Basis sampling shared by every row of one system.
#[derive(Debug, Clone, Copy)]
struct Collocation<'a> {
    degree: usize,
    knots: &'a [f64],
    control_point_count: usize,
    columns: FreeColumns,
}

impl Collocation<'_> {
    /// Writes the basis values of the free control points at `u` into `row`.
    ///
    /// Returns `(control index, basis value)` for the nonzero values that fall
    /// outside the free columns.
    fn place_row(self, row: &mut [f64], u: f64) -> Vec<(usize, f64)> {
        let span = find_span(self.control_point_count, self.degree, u, self.knots);
        let values = basis_functions(self.degree, self.knots, span, u);

        let mut fixed = Vec::new();
        for (j, value) in values.into_iter().enumerate() {
            if value == 0.0 {
                continue;
            }
            let index = span - self.degree + j;
            match self.columns.column(index) {
                Some(col) => row[col] = value,
                None => fixed.push((index, value)),
            }
        }
        fixed
    }

    /// Like [`Self::place_row`], subtracting the fixed contributions from `target`.
    fn place_row_with_rhs<P: ControlPoint>(
        self,
        row: &mut [f64],
        target: P,
        u: f64,
        fixed_point: impl Fn(usize) -> P,
    ) -> P {
        self.place_row(row, u)
            .into_iter()
            .fold(target, |rhs, (index, value)| {
                rhs.combine(1.0, fixed_point(index), -value)
            })
    }
}

/// Global interpolation system with fixed end control points.
///
/// `points.len() - 2` equations, one per interior point, in the interior
/// control points `P_1 ..= P_{n-2}`. Needs at least 3 points.
///
/// # Errors
/// * [`CurveFitError::InsufficientPoints`] for fewer than 3 points.
/// * [`CurveFitError::InvalidCurve`] for a mismatched parameter count.
pub fn assemble_interpolation<P: ControlPoint>(
    points: &[P],
    params: &[f64],
    knots: &[f64],
    degree: usize,
) -> Result<FitSystem<P>, CurveFitError> {
    let n = points.len();
    check_lengths(n, params.len(), 3)?;

    let unknowns = n - 2;
    let collocation = Collocation {
        degree,
        knots,
        control_point_count: n,
        columns: FreeColumns {
            first: 1,
            count: unknowns,
        },
    };
    let (first, last) = (points[0], points[n - 1]);
    let fixed = |index: usize| if index == 0 { first } else { last };

    let mut matrix = Matrix::zeros(unknowns, unknowns);
    let mut rhs = Vec::with_capacity(unknowns);
    for k in 1..n - 1 {
        rhs.push(collocation.place_row_with_rhs(
            matrix.row_mut(k - 1),
            points[k],
            params[k],
            fixed,
        ));
    }

    log::trace!("interpolation system {unknowns}x{unknowns}");
    Ok(FitSystem { matrix, rhs })
}

/// Interpolation system with prescribed first derivatives at both ends.
///
/// `n + 2` unknown control points: the `n` data rows plus a `(-1, 1)` row
/// after the first data row and another before the last, whose right-hand
/// sides are the tangents scaled by the knot spacing at each end.
///
/// # Errors
/// * [`CurveFitError::InvalidDegree`] for degree < 2.
/// * [`CurveFitError::InsufficientPoints`] for fewer than 2 points.
/// * [`CurveFitError::InvalidCurve`] for a mismatched parameter count, or if
///   `knots` does not have `n + degree + 3` entries.
pub fn assemble_tangent_interpolation<P: ControlPoint>(
    points: &[P],
    params: &[f64],
    knots: &[f64],
    degree: usize,
    start_tangent: P,
    end_tangent: P,
) -> Result<FitSystem<P>, CurveFitError> {
    if degree < 2 {
        return Err(CurveFitError::InvalidDegree {
            degree,
            reason: "end tangent constraints require degree >= 2",
        });
    }
    let n = points.len();
    check_lengths(n, params.len(), 2)?;

    let control_count = n + 2;
    if knots.len() != control_count + degree + 1 {
        return Err(CurveFitError::InvalidCurve {
            reason: format!(
                "tangent interpolation of {n} points needs {} knots, got {}",
                control_count + degree + 1,
                knots.len()
            ),
        });
    }

    let collocation = Collocation {
        degree,
        knots,
        control_point_count: control_count,
        columns: FreeColumns {
            first: 0,
            count: control_count,
        },
    };
    let mut matrix = Matrix::zeros(n, control_count);
    let mut rhs = Vec::with_capacity(control_count);
    for (k, (&point, &u)) in points.iter().zip(params).enumerate() {
        // Every control point is a column here.
        let fixed = collocation.place_row(matrix.row_mut(k), u);
        debug_assert!(fixed.is_empty());
        rhs.push(point);
    }

    let p = degree as f64;
    let mult0 = knots[degree + 1] / p;
    let mult1 = (1.0 - knots[knots.len() - degree - 2]) / p;

    let mut start_row = vec![0.0; control_count];
    start_row[0] = -1.0;
    start_row[1] = 1.0;
    matrix.insert_row(1, &start_row)?;
    rhs.insert(1, start_tangent.scaled(mult0));

    let mut end_row = vec![0.0; control_count];
    end_row[control_count - 2] = -1.0;
    end_row[control_count - 1] = 1.0;
    let before_last = matrix.rows() - 1;
    matrix.insert_row(before_last, &end_row)?;
    rhs.insert(before_last, end_tangent.scaled(mult1));

    log::trace!("tangent interpolation system {control_count}x{control_count}");
    Ok(FitSystem { matrix, rhs })
}

/// Normal equations `NᵗN P = R` of the least-squares fit with fixed ends.
///
/// `N` samples the interior basis functions `N_1 ..= N_{c-2}` at the interior
/// parameters. Each residual `R_k = Q_k - N_0(u_k) Q_0 - N_{c-1}(u_k) Q_m`
/// is accumulated into `R_i = Σ_k N_i(u_k) R_k`. With two control points
/// there is nothing to solve and the system is empty.
///
/// # Errors
/// * [`CurveFitError::InsufficientPoints`] for fewer than 2 points.
/// * [`CurveFitError::InvalidCurve`] for a mismatched parameter count.
/// * [`CurveFitError::InvalidDegreeOfFreedom`] unless `2 <= c < points.len()`.
pub fn assemble_least_squares<P: ControlPoint>(
    points: &[P],
    params: &[f64],
    knots: &[f64],
    degree: usize,
    control_point_count: usize,
) -> Result<FitSystem<P>, CurveFitError> {
    let m = points.len();
    check_lengths(m, params.len(), 2)?;
    if control_point_count < 2 || control_point_count >= m {
        return Err(CurveFitError::InvalidDegreeOfFreedom {
            control_points: control_point_count,
            points: m,
            degree,
        });
    }

    let rows = m - 2;
    let unknowns = control_point_count - 2;
    let collocation = Collocation {
        degree,
        knots,
        control_point_count,
        columns: FreeColumns {
            first: 1,
            count: unknowns,
        },
    };
    let (first, last) = (points[0], points[m - 1]);
    let fixed = |index: usize| if index == 0 { first } else { last };

    let mut basis = Matrix::zeros(rows, unknowns);
    let mut residuals = Vec::with_capacity(rows);
    for k in 1..m - 1 {
        residuals.push(collocation.place_row_with_rhs(
            basis.row_mut(k - 1),
            points[k],
            params[k],
            fixed,
        ));
    }

    let basis_t = basis.transpose();
    let matrix = basis_t.mul(&basis)?;
    let rhs = (0..unknowns)
        .map(|i| {
            basis_t
                .row(i)
                .iter()
                .zip(&residuals)
                .filter(|(weight, _)| **weight != 0.0)
                .fold(P::from_coords(|_| 0.0), |acc, (&weight, &r)| {
                    acc.combine(1.0, r, weight)
                })
        })
        .collect();

    log::trace!("least-squares system {rows}x{unknowns}, normal matrix {unknowns}x{unknowns}");
    Ok(FitSystem { matrix, rhs })
}

fn check_lengths(points: usize, params: usize, required: usize) -> Result<(), CurveFitError> {
    if points < required {
        return Err(CurveFitError::InsufficientPoints {
            provided: points,
            required,
        });
    }
    if params != points {
        return Err(CurveFitError::InvalidCurve {
            reason: format!("{params} parameters for {points} points"),
        });
    }
    Ok(())
}

/// Factors `matrix` once and solves it for every coordinate axis of `rhs`.
///
/// Returns one point per matrix column. An empty system yields no points.
///
/// # Errors
/// * [`CurveFitError::SingularSystem`] if the factorization finds no usable pivot.
/// * [`CurveFitError::InvalidCurve`] if the matrix is not square or `rhs` has
///   the wrong length.
pub fn solve_per_dimension<P: ControlPoint>(
    matrix: &Matrix,
    rhs: &[P],
) -> Result<Vec<P>, CurveFitError> {
    if matrix.rows() == 0 && matrix.cols() == 0 && rhs.is_empty() {
        return Ok(Vec::new());
    }
    if rhs.len() != matrix.rows() {
        return Err(CurveFitError::InvalidCurve {
            reason: format!(
                "right-hand side has {} rows, matrix has {}",
                rhs.len(),
                matrix.rows()
            ),
        });
    }

    let lu = LuDecomposition::decompose(matrix)?;
    let per_axis = solve_axes(&lu, rhs)?;

    Ok((0..matrix.cols())
        .map(|i| P::from_coords(|axis| per_axis[axis][i]))
        .collect())
}

fn axis_column<P: ControlPoint>(rhs: &[P], axis: usize) -> Vec<f64> {
    rhs.iter().map(|p| p.coord(axis)).collect()
}

cfg_if::cfg_if! {
    if #[cfg(feature = "parallel")] {
        fn solve_axes<P: ControlPoint>(
            lu: &LuDecomposition,
            rhs: &[P],
        ) -> Result<Vec<Vec<f64>>, CurveFitError> {
            use rayon::prelude::*;
            (0..P::DIM)
                .into_par_iter()
                .map(|axis| lu.solve(&axis_column(rhs, axis)).map_err(CurveFitError::from))
                .collect()
        }
    } else {
        fn solve_axes<P: ControlPoint>(
            lu: &LuDecomposition,
            rhs: &[P],
        ) -> Result<Vec<Vec<f64>>, CurveFitError> {
            (0..P::DIM)
                .map(|axis| lu.solve(&axis_column(rhs, axis)).map_err(CurveFitError::from))
                .collect()
        }
    }
}
