//! NURBS curve fitting through or near ordered points.
//!
//! Three fitting modes share one pipeline: parameterize the points, synthesize
//! a clamped knot vector, assemble the linear system for the mode, and solve
//! it once per coordinate axis.
//!
//! - [`interpolate_curve`]: the curve passes through every point.
//! - [`interpolate_curve_with_tangents`]: as above, with prescribed end derivatives.
//! - [`approximate_curve`]: least-squares fit with fewer control points than
//!   input points; the end points are still matched exactly.
//!
//! [`fit_curve`] runs any of these from a [`CurveFitOptions`] and reports
//! [`CurveFitDiagnostics`] alongside the curve.

use thiserror::Error;

use super::core::{ControlPoint, Tolerance};
use super::curve::NurbsCurve;
use super::fit_system::{assemble_interpolation, assemble_least_squares, assemble_tangent_interpolation};
use super::knot_vector::{approximation_knots, interpolation_knots};
use super::linalg::LinalgError;
use super::metrics::{FitMetrics, FitTimingReport, TimingBucket};
use super::parameterization::{Parameterization, parameterize};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveFitError {
    #[error("insufficient points: {provided} provided, {required} required")]
    InsufficientPoints { provided: usize, required: usize },
    #[error("no input points")]
    EmptyInput,
    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: String },
    #[error("point {index} contains NaN or infinite coordinates")]
    NonFinitePoint { index: usize },
    #[error("invalid degree {degree}: {reason}")]
    InvalidDegree { degree: usize, reason: &'static str },
    #[error(
        "{control_points} control points cannot fit {points} points at degree {degree} \
         (need degree < control points < points)"
    )]
    InvalidDegreeOfFreedom {
        control_points: usize,
        points: usize,
        degree: usize,
    },
    #[error("end tangents are only supported when interpolating")]
    TangentsRequireInterpolation,
    #[error("linear system is singular at pivot {pivot}")]
    SingularSystem { pivot: usize },
    #[error("parameter {t} is outside the curve domain [{start}, {end}]")]
    OutOfDomain { t: f64, start: f64, end: f64 },
    #[error("invalid curve: {reason}")]
    InvalidCurve { reason: String },
}

impl From<LinalgError> for CurveFitError {
    fn from(err: LinalgError) -> Self {
        match err {
            LinalgError::Singular { pivot } => Self::SingularSystem { pivot },
            other => Self::InvalidCurve {
                reason: other.to_string(),
            },
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// How control points are determined from the input points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Pass exactly through every point.
    #[default]
    Interpolate,
    /// Least-squares fit. `None` uses `points.len() - 1` control points.
    Approximate { control_points: Option<usize> },
}

/// Options for [`fit_curve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveFitOptions {
    /// Curve degree. Default is 3 (cubic). Must be >= 1 and < point count.
    pub degree: usize,

    /// Parameter spacing along the input points.
    pub parameterization: Parameterization,

    pub mode: FitMode,

    /// Threshold for coincident points and for flagging interpolation residuals.
    pub tolerance: Tolerance,
}

impl Default for CurveFitOptions {
    fn default() -> Self {
        Self {
            degree: 3,
            parameterization: Parameterization::ChordLength,
            mode: FitMode::Interpolate,
            tolerance: Tolerance::default_geom(),
        }
    }
}

impl CurveFitOptions {
    /// Create options for a curve through every point.
    #[must_use]
    pub fn interpolating() -> Self {
        Self {
            mode: FitMode::Interpolate,
            ..Default::default()
        }
    }

    /// Create options for a least-squares curve with the default control point count.
    #[must_use]
    pub fn approximating() -> Self {
        Self {
            mode: FitMode::Approximate {
                control_points: None,
            },
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }

    #[must_use]
    pub fn centripetal(mut self) -> Self {
        self.parameterization = Parameterization::Centripetal;
        self
    }

    #[must_use]
    pub fn with_parameterization(mut self, parameterization: Parameterization) -> Self {
        self.parameterization = parameterization;
        self
    }

    /// Switch to approximation with exactly `count` control points.
    #[must_use]
    pub fn with_control_point_count(mut self, count: usize) -> Self {
        self.mode = FitMode::Approximate {
            control_points: Some(count),
        };
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Diagnostics from curve fitting operations.
#[derive(Debug, Clone, Default)]
pub struct CurveFitDiagnostics {
    /// Number of input points.
    pub input_point_count: usize,

    pub control_point_count: usize,

    pub degree: usize,

    /// Parameter assigned to each input point.
    pub parameters: Vec<f64>,

    /// Maximum distance between an input point and the curve at its parameter.
    pub max_deviation: f64,

    /// Average of the same distances.
    pub avg_deviation: f64,

    /// Per-phase timings, present only with the `fit_metrics` feature.
    pub timing: Option<FitTimingReport>,

    /// Warnings generated during fitting.
    pub warnings: Vec<String>,
}

// ============================================================================
// Public Fitting Functions
// ============================================================================

/// Global interpolation: a curve of `degree` through every point, with the
/// first and last points as end control points.
///
/// # Errors
/// * [`CurveFitError::InvalidDegree`] for degree 0.
/// * [`CurveFitError::InsufficientPoints`] for fewer than `degree + 1` points.
/// * [`CurveFitError::NonFinitePoint`], [`CurveFitError::DegenerateInput`]
///   from parameterization.
/// * [`CurveFitError::SingularSystem`] if repeated points make the system singular.
pub fn interpolate_curve<P: ControlPoint>(
    points: &[P],
    degree: usize,
    parameterization: Parameterization,
) -> Result<NurbsCurve<P>, CurveFitError> {
    let mut metrics = FitMetrics::default();
    let fitted = run_interpolation(points, degree, parameterization, &mut metrics)?;
    Ok(fitted.curve)
}

/// Global interpolation whose first derivative equals `start_tangent` at the
/// start and `end_tangent` at the end.
///
/// The curve has `points.len() + 2` control points.
///
/// # Errors
/// As [`interpolate_curve`], plus [`CurveFitError::InvalidDegree`] for degree < 2
/// and [`CurveFitError::DegenerateInput`] for non-finite tangents.
pub fn interpolate_curve_with_tangents<P: ControlPoint>(
    points: &[P],
    degree: usize,
    start_tangent: P,
    end_tangent: P,
    parameterization: Parameterization,
) -> Result<NurbsCurve<P>, CurveFitError> {
    let mut metrics = FitMetrics::default();
    let fitted = run_tangent_interpolation(
        points,
        degree,
        (start_tangent, end_tangent),
        parameterization,
        &mut metrics,
    )?;
    Ok(fitted.curve)
}

/// Least-squares approximation with `control_point_count` control points
/// (default `points.len() - 1`). The end points are interpolated exactly.
///
/// # Errors
/// * [`CurveFitError::InvalidDegree`] for degree 0.
/// * [`CurveFitError::InsufficientPoints`] for fewer than `degree + 1` points.
/// * [`CurveFitError::InvalidDegreeOfFreedom`] unless
///   `degree < control_point_count < points.len()`.
/// * [`CurveFitError::SingularSystem`] if the normal equations are singular.
pub fn approximate_curve<P: ControlPoint>(
    points: &[P],
    degree: usize,
    control_point_count: Option<usize>,
    parameterization: Parameterization,
) -> Result<NurbsCurve<P>, CurveFitError> {
    let mut metrics = FitMetrics::default();
    let fitted = run_approximation(
        points,
        degree,
        control_point_count,
        parameterization,
        &mut metrics,
    )?;
    Ok(fitted.curve)
}

/// Fit a curve according to `options` and report how well it matches.
///
/// # Errors
/// See [`interpolate_curve`] and [`approximate_curve`].
pub fn fit_curve<P: ControlPoint>(
    points: &[P],
    options: CurveFitOptions,
) -> Result<(NurbsCurve<P>, CurveFitDiagnostics), CurveFitError> {
    let mut metrics = FitMetrics::default();
    metrics.begin();

    let fitted = match options.mode {
        FitMode::Interpolate => {
            run_interpolation(points, options.degree, options.parameterization, &mut metrics)?
        }
        FitMode::Approximate { control_points } => run_approximation(
            points,
            options.degree,
            control_points,
            options.parameterization,
            &mut metrics,
        )?,
    };
    finish(points, fitted, options, metrics)
}

/// Tangent-constrained variant of [`fit_curve`].
///
/// # Errors
/// [`CurveFitError::TangentsRequireInterpolation`] if `options.mode` is
/// [`FitMode::Approximate`]; otherwise see [`interpolate_curve_with_tangents`].
pub fn fit_curve_with_tangents<P: ControlPoint>(
    points: &[P],
    start_tangent: P,
    end_tangent: P,
    options: CurveFitOptions,
) -> Result<(NurbsCurve<P>, CurveFitDiagnostics), CurveFitError> {
    if options.mode != FitMode::Interpolate {
        return Err(CurveFitError::TangentsRequireInterpolation);
    }

    let mut metrics = FitMetrics::default();
    metrics.begin();
    let fitted = run_tangent_interpolation(
        points,
        options.degree,
        (start_tangent, end_tangent),
        options.parameterization,
        &mut metrics,
    )?;
    finish(points, fitted, options, metrics)
}

// ============================================================================
// Pipeline
// ============================================================================

struct Fitted<P: ControlPoint> {
    curve: NurbsCurve<P>,
    params: Vec<f64>,
    warnings: Vec<String>,
}

fn run_interpolation<P: ControlPoint>(
    points: &[P],
    degree: usize,
    parameterization: Parameterization,
    metrics: &mut FitMetrics,
) -> Result<Fitted<P>, CurveFitError> {
    check_degree_and_count(points.len(), degree)?;
    log::debug!(
        "interpolating {} points, degree {degree}, {parameterization:?}",
        points.len()
    );

    let params = metrics.time(TimingBucket::Parameterization, || {
        parameterize(points, parameterization)
    })?;
    let warnings = coincident_point_warnings(&params);
    let knots = metrics.time(TimingBucket::Knots, || {
        interpolation_knots(&params, degree, false)
    })?;

    let n = points.len();
    let control_points = if n == 2 {
        points.to_vec()
    } else {
        let system = metrics.time(TimingBucket::Assembly, || {
            assemble_interpolation(points, &params, &knots, degree)
        })?;
        let interior = metrics.time(TimingBucket::Solve, || system.solve())?;
        with_fixed_ends(points[0], interior, points[n - 1])
    };

    let curve = NurbsCurve::new(degree, control_points, knots)?;
    Ok(Fitted {
        curve,
        params,
        warnings,
    })
}

fn run_tangent_interpolation<P: ControlPoint>(
    points: &[P],
    degree: usize,
    (start_tangent, end_tangent): (P, P),
    parameterization: Parameterization,
    metrics: &mut FitMetrics,
) -> Result<Fitted<P>, CurveFitError> {
    if degree < 2 {
        return Err(CurveFitError::InvalidDegree {
            degree,
            reason: "end tangent constraints require degree >= 2",
        });
    }
    check_degree_and_count(points.len(), degree)?;
    if !start_tangent.is_finite() || !end_tangent.is_finite() {
        return Err(CurveFitError::DegenerateInput {
            reason: "end tangents must be finite".to_string(),
        });
    }
    log::debug!(
        "interpolating {} points with end tangents, degree {degree}, {parameterization:?}",
        points.len()
    );

    let params = metrics.time(TimingBucket::Parameterization, || {
        parameterize(points, parameterization)
    })?;
    let warnings = coincident_point_warnings(&params);
    let knots = metrics.time(TimingBucket::Knots, || {
        interpolation_knots(&params, degree, true)
    })?;

    let system = metrics.time(TimingBucket::Assembly, || {
        assemble_tangent_interpolation(points, &params, &knots, degree, start_tangent, end_tangent)
    })?;
    let control_points = metrics.time(TimingBucket::Solve, || system.solve())?;

    let curve = NurbsCurve::new(degree, control_points, knots)?;
    Ok(Fitted {
        curve,
        params,
        warnings,
    })
}

fn run_approximation<P: ControlPoint>(
    points: &[P],
    degree: usize,
    control_point_count: Option<usize>,
    parameterization: Parameterization,
    metrics: &mut FitMetrics,
) -> Result<Fitted<P>, CurveFitError> {
    check_degree_and_count(points.len(), degree)?;
    let m = points.len();
    let count = control_point_count.unwrap_or(m - 1);
    if count <= degree || count >= m {
        return Err(CurveFitError::InvalidDegreeOfFreedom {
            control_points: count,
            points: m,
            degree,
        });
    }
    log::debug!(
        "approximating {m} points with {count} control points, degree {degree}, {parameterization:?}"
    );

    let params = metrics.time(TimingBucket::Parameterization, || {
        parameterize(points, parameterization)
    })?;
    let mut warnings = coincident_point_warnings(&params);
    let knots = metrics.time(TimingBucket::Knots, || {
        approximation_knots(&params, degree, count, m)
    })?;
    warnings.extend(empty_span_warnings(&knots, &params, degree, count));

    let system = metrics.time(TimingBucket::Assembly, || {
        assemble_least_squares(points, &params, &knots, degree, count)
    })?;
    let interior = metrics.time(TimingBucket::Solve, || system.solve())?;
    let control_points = with_fixed_ends(points[0], interior, points[m - 1]);

    let curve = NurbsCurve::new(degree, control_points, knots)?;
    Ok(Fitted {
        curve,
        params,
        warnings,
    })
}

fn finish<P: ControlPoint>(
    points: &[P],
    fitted: Fitted<P>,
    options: CurveFitOptions,
    mut metrics: FitMetrics,
) -> Result<(NurbsCurve<P>, CurveFitDiagnostics), CurveFitError> {
    let Fitted {
        curve,
        params,
        mut warnings,
    } = fitted;

    let (max_deviation, avg_deviation) = metrics.time(TimingBucket::Diagnostics, || {
        measure_deviation(&curve, points, &params)
    })?;

    if options.mode == FitMode::Interpolate {
        let scale = points
            .iter()
            .map(|p| p.norm())
            .fold(1.0_f64, f64::max);
        let limit = options.tolerance.scaled(scale).eps;
        if max_deviation > limit {
            let message = format!(
                "interpolation residual {max_deviation:.3e} exceeds tolerance {limit:.3e}"
            );
            log::warn!("{message}");
            warnings.push(message);
        }
    }

    let diagnostics = CurveFitDiagnostics {
        input_point_count: points.len(),
        control_point_count: curve.control_points().len(),
        degree: curve.degree(),
        parameters: params,
        max_deviation,
        avg_deviation,
        timing: metrics.end(),
        warnings,
    };
    log::debug!(
        "fit done: {} control points, max deviation {max_deviation:.3e}",
        diagnostics.control_point_count
    );
    Ok((curve, diagnostics))
}

// ============================================================================
// Helpers
// ============================================================================

fn check_degree_and_count(point_count: usize, degree: usize) -> Result<(), CurveFitError> {
    if degree == 0 {
        return Err(CurveFitError::InvalidDegree {
            degree,
            reason: "degree must be >= 1",
        });
    }
    if point_count < degree + 1 {
        return Err(CurveFitError::InsufficientPoints {
            provided: point_count,
            required: degree + 1,
        });
    }
    Ok(())
}

fn with_fixed_ends<P: ControlPoint>(first: P, interior: Vec<P>, last: P) -> Vec<P> {
    let mut control_points = Vec::with_capacity(interior.len() + 2);
    control_points.push(first);
    control_points.extend(interior);
    control_points.push(last);
    control_points
}

fn coincident_point_warnings(params: &[f64]) -> Vec<String> {
    params
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] == w[1])
        .map(|(i, _)| {
            let message = format!("points {i} and {} coincide", i + 1);
            log::warn!("{message}");
            message
        })
        .collect()
}

/// Warns about knot spans that contain no parameter; the normal equations
/// lose rank there.
fn empty_span_warnings(knots: &[f64], params: &[f64], degree: usize, count: usize) -> Vec<String> {
    let mut warnings = Vec::new();
    for span in degree..count {
        let (lo, hi) = (knots[span], knots[span + 1]);
        if lo == hi {
            continue;
        }
        let last = span + 1 == count;
        let occupied = params
            .iter()
            .any(|&u| u >= lo && (u < hi || (last && u <= hi)));
        if !occupied {
            let message = format!(
                "knot span [{lo:.4}, {hi:.4}) holds no parameter; least-squares system may be ill-conditioned"
            );
            log::warn!("{message}");
            warnings.push(message);
        }
    }
    warnings
}

fn measure_deviation<P: ControlPoint>(
    curve: &NurbsCurve<P>,
    points: &[P],
    params: &[f64],
) -> Result<(f64, f64), CurveFitError> {
    let mut max = 0.0_f64;
    let mut sum = 0.0;
    for (point, &u) in points.iter().zip(params) {
        let d = curve.point_at(u)?.distance_between(*point);
        max = max.max(d);
        sum += d;
    }
    let avg = if points.is_empty() {
        0.0
    } else {
        sum / points.len() as f64
    };
    Ok((max, avg))
}
